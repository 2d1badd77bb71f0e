//! Running sub-scores and end-of-game scoring
//!
//! Four categories accumulate per round, each with its own cap. Two bonuses
//! (accuracy and final price) are added on top at the end.

use serde::{Deserialize, Serialize};

use crate::market::ledger::ResourceLedger;
use crate::market::resolver::RoundOutcome;

// Category caps (nominal 1000 total)
pub const STABILITY_CAP: f64 = 400.0;
pub const LIQUIDITY_CAP: f64 = 200.0;
pub const EFFICIENCY_CAP: f64 = 200.0;
pub const REPUTATION_CAP: f64 = 200.0;

// Per-round increments
pub const STABILITY_RATE: f64 = 20.0;
pub const STABILITY_DEVIATION_WEIGHT: f64 = 4.0;
pub const LIQUIDITY_PER_ROUND: f64 = 15.0;
pub const REPUTATION_PER_ROUND: f64 = 15.0;
/// Rounds ending within this many dollars of target earn reputation
pub const REPUTATION_DEVIATION_THRESHOLD: f64 = 5.0;
pub const CORRECT_STABILITY_BONUS: f64 = 30.0;
pub const CORRECT_EFFICIENCY_BONUS: f64 = 15.0;

// End of game
pub const BUDGET_EFFICIENCY_WEIGHT: f64 = 80.0;
pub const DECISION_EFFICIENCY_WEIGHT: f64 = 120.0;
pub const NEUTRAL_DECISION_RATIO: f64 = 0.5;
pub const ACCURACY_BONUS_MAX: f64 = 200.0;
pub const PRICE_BONUS_MAX: f64 = 100.0;
pub const PRICE_BONUS_PER_DOLLAR: f64 = 10.0;
pub const MAX_TOTAL_SCORE: f64 = 1000.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub stability: f64,
    pub liquidity: f64,
    pub efficiency: f64,
    pub reputation: f64,
}

impl CategoryScores {
    pub fn sum(&self) -> f64 {
        self.stability + self.liquidity + self.efficiency + self.reputation
    }
}

/// Status of a category relative to its cap, as shown on the results screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Good,
    Moderate,
    Poor,
}

impl Rating {
    pub fn from_fraction(fraction: f64) -> Self {
        if fraction >= 0.6 {
            Self::Good
        } else if fraction >= 0.3 {
            Self::Moderate
        } else {
            Self::Poor
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRatings {
    pub stability: Rating,
    pub liquidity: Rating,
    pub efficiency: Rating,
    pub reputation: Rating,
}

impl From<&CategoryScores> for CategoryRatings {
    fn from(scores: &CategoryScores) -> Self {
        Self {
            stability: Rating::from_fraction(scores.stability / STABILITY_CAP),
            liquidity: Rating::from_fraction(scores.liquidity / LIQUIDITY_CAP),
            efficiency: Rating::from_fraction(scores.efficiency / EFFICIENCY_CAP),
            reputation: Rating::from_fraction(scores.reputation / REPUTATION_CAP),
        }
    }
}

/// Career rank, a step function of total score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Analyst,
    Associate,
    Vp,
    Director,
    ManagingDirector,
}

impl Rank {
    pub fn from_score(total: u32) -> Self {
        match total {
            800.. => Self::ManagingDirector,
            650..=799 => Self::Director,
            500..=649 => Self::Vp,
            350..=499 => Self::Associate,
            _ => Self::Analyst,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ManagingDirector => "Managing Director",
            Self::Director => "Director",
            Self::Vp => "VP",
            Self::Associate => "Associate",
            Self::Analyst => "Analyst",
        }
    }
}

/// Result of [`ScoreAccumulator::finalize`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalScores {
    pub categories: CategoryScores,
    pub accuracy_bonus: f64,
    pub price_bonus: f64,
    /// Categories plus bonuses, capped at 1000 and rounded
    pub total_score: u32,
    pub rank: Rank,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreAccumulator {
    scores: CategoryScores,
    correct_decisions: u32,
    total_decisions: u32,
    timeouts: u32,
}

impl ScoreAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scores(&self) -> CategoryScores {
        self.scores
    }

    pub fn correct_decisions(&self) -> u32 {
        self.correct_decisions
    }

    pub fn total_decisions(&self) -> u32 {
        self.total_decisions
    }

    pub fn timeouts(&self) -> u32 {
        self.timeouts
    }

    /// Share of resolved rounds classified correct, if any were resolved
    pub fn accuracy(&self) -> Option<f64> {
        (self.total_decisions > 0)
            .then(|| self.correct_decisions as f64 / self.total_decisions as f64)
    }

    /// Fold one resolved round into the running totals.
    /// `price_deviation` is the absolute distance from target after the round.
    pub fn update(&mut self, outcome: &RoundOutcome, price_deviation: f64) {
        self.total_decisions += 1;
        if outcome.timed_out {
            self.timeouts += 1;
        }

        let deviation_term =
            (1.0 - price_deviation / 100.0 * STABILITY_DEVIATION_WEIGHT) * STABILITY_RATE;
        let mut stability = deviation_term.max(0.0);
        let mut efficiency = 0.0;

        if outcome.classification.is_correct() {
            self.correct_decisions += 1;
            stability += CORRECT_STABILITY_BONUS;
            efficiency += CORRECT_EFFICIENCY_BONUS;
        }

        let s = &mut self.scores;
        s.stability = (s.stability + stability).min(STABILITY_CAP);
        s.efficiency = (s.efficiency + efficiency).min(EFFICIENCY_CAP);
        s.liquidity = (s.liquidity + LIQUIDITY_PER_ROUND).min(LIQUIDITY_CAP);
        if price_deviation < REPUTATION_DEVIATION_THRESHOLD {
            s.reputation = (s.reputation + REPUTATION_PER_ROUND).min(REPUTATION_CAP);
        }
    }

    /// Compute end-of-game scores without mutating the running totals
    pub fn finalize(&self, ledger: &ResourceLedger, final_price: f64, target_price: f64) -> FinalScores {
        let decision_ratio = self.accuracy().unwrap_or(NEUTRAL_DECISION_RATIO);

        let mut categories = self.scores;
        let end_efficiency = ledger.budget_ratio() * BUDGET_EFFICIENCY_WEIGHT
            + decision_ratio * DECISION_EFFICIENCY_WEIGHT;
        categories.efficiency = (categories.efficiency + end_efficiency).min(EFFICIENCY_CAP);

        let accuracy_bonus = self.accuracy().unwrap_or(0.0) * ACCURACY_BONUS_MAX;
        let price_bonus = (PRICE_BONUS_MAX
            - (final_price - target_price).abs() * PRICE_BONUS_PER_DOLLAR)
            .max(0.0);

        let raw_total = categories.sum() + accuracy_bonus + price_bonus;
        let total_score = raw_total.clamp(0.0, MAX_TOTAL_SCORE).round() as u32;

        FinalScores {
            categories,
            accuracy_bonus,
            price_bonus,
            total_score,
            rank: Rank::from_score(total_score),
        }
    }
}
