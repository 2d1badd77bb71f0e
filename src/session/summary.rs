//! Snapshots and the final game summary handed to the results screen

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{MarketPhase, Round, SessionId};
use crate::market::price::PricePoint;
use crate::session::scoring::{CategoryRatings, CategoryScores, Rank};

/// Point-in-time view of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session: SessionId,
    pub round: Round,
    pub total_rounds: u32,
    pub phase: MarketPhase,
    pub price: f64,
    pub stabilization_budget: f64,
    pub greenshoes_remaining: u32,
    pub scores: CategoryScores,
    pub correct_decisions: u32,
    pub total_decisions: u32,
    pub in_decision_mode: bool,
    pub time_remaining_secs: f64,
}

/// Informational achievements. No gameplay effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Badge {
    SharpInstincts,
    PriceMaster,
    BudgetHawk,
    ReservedPower,
}

impl Badge {
    pub fn id(&self) -> &'static str {
        match self {
            Self::SharpInstincts => "accurate",
            Self::PriceMaster => "price_master",
            Self::BudgetHawk => "budget_hawk",
            Self::ReservedPower => "reserved_power",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SharpInstincts => "Sharp Instincts",
            Self::PriceMaster => "Price Master",
            Self::BudgetHawk => "Budget Hawk",
            Self::ReservedPower => "Reserved Power",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::SharpInstincts => "Made at least 10 correct calls. You read the market like a pro!",
            Self::PriceMaster => "Kept the final price within $3 of the target.",
            Self::BudgetHawk => "Kept more than 30 points of stabilization budget in reserve.",
            Self::ReservedPower => "Saved at least one greenshoe option for emergencies.",
        }
    }
}

// Badge thresholds
pub const SHARP_INSTINCTS_MIN_CORRECT: u32 = 10;
pub const PRICE_MASTER_MAX_DEVIATION: f64 = 3.0;
pub const BUDGET_HAWK_MIN_BUDGET: f64 = 30.0;

/// Award badges from the final state
pub fn award_badges(
    correct_decisions: u32,
    final_deviation: f64,
    budget_remaining: f64,
    greenshoes_remaining: u32,
) -> Vec<Badge> {
    let mut badges = Vec::new();
    if correct_decisions >= SHARP_INSTINCTS_MIN_CORRECT {
        badges.push(Badge::SharpInstincts);
    }
    if final_deviation < PRICE_MASTER_MAX_DEVIATION {
        badges.push(Badge::PriceMaster);
    }
    if budget_remaining > BUDGET_HAWK_MIN_BUDGET {
        badges.push(Badge::BudgetHawk);
    }
    if greenshoes_remaining > 0 {
        badges.push(Badge::ReservedPower);
    }
    badges
}

/// Emitted once when the match ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalSummary {
    pub session: SessionId,
    pub total_score: u32,
    pub rank: Rank,
    pub badges: Vec<Badge>,
    pub scores: CategoryScores,
    pub ratings: CategoryRatings,
    pub accuracy_bonus: f64,
    pub price_bonus: f64,
    pub price_history: Vec<PricePoint>,
    pub final_price: f64,
    pub budget_remaining: f64,
    pub budget_used: f64,
    pub greenshoes_used: u32,
    pub correct_decisions: u32,
    pub total_decisions: u32,
    pub timeouts: u32,
}

impl FinalSummary {
    /// Correct calls as a whole percentage
    pub fn accuracy_percent(&self) -> u32 {
        if self.total_decisions == 0 {
            return 0;
        }
        ((self.correct_decisions as f64 / self.total_decisions as f64) * 100.0).round() as u32
    }

    pub fn has_badge(&self, badge: Badge) -> bool {
        self.badges.contains(&badge)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn headline(&self) -> String {
        format!(
            "{}/1000 - {} | {}/{} correct, final price ${:.2}",
            self.total_score,
            self.rank.name(),
            self.correct_decisions,
            self.total_decisions,
            self.final_price,
        )
    }
}
