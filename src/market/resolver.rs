//! Round resolution: price impact, resource charge, and outcome class
//!
//! Resolution is deterministic. Given the same scenario, action and ledger
//! state it always yields the same price change and classification.

use serde::{Deserialize, Serialize};

use crate::core::types::{Action, Round, ScenarioKind};
use crate::market::constants::{
    CORRECT_DAMPENING, INACTION_DRIFT_FACTOR, WRONG_AMPLIFY_FACTOR, WRONG_AMPLIFY_OFFSET,
    WRONG_STABLE_OFFSET,
};
use crate::market::ledger::{Charge, ResourceLedger};
use crate::market::price::PriceTrack;
use crate::market::scenario::Scenario;

/// How a round turned out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    CorrectDemand,
    CorrectSupply,
    CorrectNothing,
    WrongDemandRising,
    WrongDemandStable,
    WrongSupplyFalling,
    WrongSupplyStable,
    WrongNothingRising,
    WrongNothingFalling,
    NoResource,
}

impl Classification {
    pub fn is_correct(&self) -> bool {
        matches!(
            self,
            Self::CorrectDemand | Self::CorrectSupply | Self::CorrectNothing
        )
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Self::CorrectDemand => "Support bought - the drop was absorbed",
            Self::CorrectSupply => "Greenshoe exercised - the spike cooled",
            Self::CorrectNothing => "Held steady - no intervention needed",
            Self::WrongDemandRising => "Buying into a rally overheated the stock",
            Self::WrongDemandStable => "Unneeded support pushed the price up",
            Self::WrongSupplyFalling => "Extra shares deepened the selloff",
            Self::WrongSupplyStable => "Unneeded supply pushed the price down",
            Self::WrongNothingRising => "The rally ran unchecked",
            Self::WrongNothingFalling => "The drop ran unchecked",
            Self::NoResource => "Out of ammunition - the market moved on its own",
        }
    }
}

/// Everything the scoring and feedback layers need about one resolved round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub round: Round,
    pub scenario_kind: ScenarioKind,
    pub natural_move_percent: f64,
    pub action: Action,
    /// `action == scenario.correct_action`, regardless of affordability
    pub is_correct: bool,
    pub can_afford: bool,
    /// The decision window expired and Do Nothing was applied
    pub timed_out: bool,
    pub price_before: f64,
    pub price_after: f64,
    pub price_change_percent: f64,
    pub classification: Classification,
    pub charge: Charge,
}

impl RoundOutcome {
    /// A correct outcome that came from the timeout default, not a real pick
    pub fn is_lucky_timeout(&self) -> bool {
        self.timed_out && self.classification.is_correct()
    }
}

/// Price change and class for an executed action, before any clamping
pub fn price_impact(scenario: &Scenario, action: Action) -> (f64, Classification) {
    let m = scenario.price_move_percent;

    match (action, scenario.kind) {
        (Action::AddDemand, ScenarioKind::Falling) => {
            (m * CORRECT_DAMPENING, Classification::CorrectDemand)
        }
        (Action::AddSupply, ScenarioKind::Rising) => {
            (m * CORRECT_DAMPENING, Classification::CorrectSupply)
        }
        (Action::DoNothing, ScenarioKind::Stable) => (m, Classification::CorrectNothing),

        (Action::AddDemand, ScenarioKind::Rising) => (
            m * WRONG_AMPLIFY_FACTOR + WRONG_AMPLIFY_OFFSET,
            Classification::WrongDemandRising,
        ),
        (Action::AddDemand, ScenarioKind::Stable) => {
            (m + WRONG_STABLE_OFFSET, Classification::WrongDemandStable)
        }
        (Action::AddSupply, ScenarioKind::Falling) => (
            m * WRONG_AMPLIFY_FACTOR - WRONG_AMPLIFY_OFFSET,
            Classification::WrongSupplyFalling,
        ),
        (Action::AddSupply, ScenarioKind::Stable) => {
            (m - WRONG_STABLE_OFFSET, Classification::WrongSupplyStable)
        }
        (Action::DoNothing, ScenarioKind::Rising) => {
            (m * INACTION_DRIFT_FACTOR, Classification::WrongNothingRising)
        }
        (Action::DoNothing, ScenarioKind::Falling) => {
            (m * INACTION_DRIFT_FACTOR, Classification::WrongNothingFalling)
        }
    }
}

/// Resolve one round against the ledger and price
///
/// The caller guards timing: this must only run while a decision window is open.
pub fn resolve(
    round: Round,
    scenario: &Scenario,
    action: Action,
    ledger: &mut ResourceLedger,
    price: &mut PriceTrack,
    timed_out: bool,
) -> RoundOutcome {
    let is_correct = action == scenario.correct_action;
    let can_afford = ledger.can_afford(action);

    let (price_change_percent, classification, charge) =
        if action != Action::DoNothing && !can_afford {
            (
                scenario.price_move_percent,
                Classification::NoResource,
                Charge::default(),
            )
        } else {
            let (change, classification) = price_impact(scenario, action);
            let charge = ledger.spend(action);
            (change, classification, charge)
        };

    let price_before = price.price();
    let price_after = price.apply_change(round, price_change_percent);

    RoundOutcome {
        round,
        scenario_kind: scenario.kind,
        natural_move_percent: scenario.price_move_percent,
        action,
        is_correct,
        can_afford,
        timed_out,
        price_before,
        price_after,
        price_change_percent,
        classification,
        charge,
    }
}
