//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Round counter (1-based while a match is running, 0 before the first round)
pub type Round = u32;

/// The three moves available to the stabilization agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Spend stabilization budget to buy shares and support the price
    AddDemand,
    /// Exercise one greenshoe to release extra shares and cool the price
    AddSupply,
    DoNothing,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::AddDemand, Action::AddSupply, Action::DoNothing];

    pub fn label(&self) -> &'static str {
        match self {
            Self::AddDemand => "Add Demand",
            Self::AddSupply => "Add Supply (Greenshoe)",
            Self::DoNothing => "Do Nothing",
        }
    }
}

impl Default for Action {
    fn default() -> Self {
        Self::DoNothing
    }
}

/// Direction of the market event in a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Rising,
    Falling,
    Stable,
}

impl ScenarioKind {
    /// The response that keeps the price near target for this kind of move
    pub fn correct_action(&self) -> Action {
        match self {
            Self::Rising => Action::AddSupply,
            Self::Falling => Action::AddDemand,
            Self::Stable => Action::DoNothing,
        }
    }
}

/// Stage of the IPO lifecycle. Only biases scenario selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MarketPhase {
    BookbuildingRush,
    FirstPrint,
    AftermarketWave,
}

impl MarketPhase {
    /// Map a phase index to a phase. Indices past the last phase clamp to it.
    pub fn from_index(index: u32) -> Self {
        match index {
            0 => Self::BookbuildingRush,
            1 => Self::FirstPrint,
            _ => Self::AftermarketWave,
        }
    }

    /// Phase for a 1-based round number
    pub fn for_round(round: Round, rounds_per_phase: u32) -> Self {
        let rounds_per_phase = rounds_per_phase.max(1);
        Self::from_index(round.saturating_sub(1) / rounds_per_phase)
    }

    pub fn index(&self) -> u32 {
        match self {
            Self::BookbuildingRush => 0,
            Self::FirstPrint => 1,
            Self::AftermarketWave => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::BookbuildingRush => "Bookbuilding Rush",
            Self::FirstPrint => "First Print",
            Self::AftermarketWave => "Aftermarket Wave",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::BookbuildingRush => "Orders flowing in - manage allocation",
            Self::FirstPrint => "Trading begins - stabilize the price!",
            Self::AftermarketWave => "News events - react quickly!",
        }
    }
}

impl Default for MarketPhase {
    fn default() -> Self {
        Self::BookbuildingRush
    }
}
