//! Session configuration with documented defaults
//!
//! Every tunable of a match lives here. Configs can be built in code,
//! deserialized from TOML, and must pass [`SessionConfig::validate`]
//! before a session will start.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{GreenshoeError, Result};
use crate::market::constants::{
    DEFAULT_DEMAND_COST, DEFAULT_PRICE_CEILING, DEFAULT_PRICE_FLOOR, MAX_BUDGET, MAX_GREENSHOES,
};

/// Configuration for one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    // === ROUNDS ===
    /// Number of decision rounds in a match
    pub total_rounds: u32,

    /// Rounds grouped into each phase (3 phases x 4 rounds by default)
    pub rounds_per_phase: u32,

    // === TIMING (seconds) ===
    /// Length of the decision window before the round auto-resolves as Do Nothing
    pub decision_time_limit_secs: f64,

    /// Pause between the phase-change notification and the next decision window
    pub phase_transition_secs: f64,

    /// How long the outcome stays on screen before the next round begins
    pub feedback_secs: f64,

    // === RESOURCES ===
    /// Starting stabilization budget (0-100)
    pub initial_budget: f64,

    /// Starting greenshoe options (0-3)
    pub initial_greenshoes: u32,

    /// Budget charged by an Add Demand action
    pub demand_cost: f64,

    // === PRICE ===
    pub initial_price: f64,
    pub target_price: f64,

    /// Price is clamped into [price_floor, price_ceiling] after every update
    pub price_floor: f64,
    pub price_ceiling: f64,

    /// Maximum retained price history points (oldest dropped first)
    pub history_capacity: usize,

    /// Seed for scenario draws. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            total_rounds: 12,
            rounds_per_phase: 4,

            decision_time_limit_secs: 7.0,
            phase_transition_secs: 2.0,
            feedback_secs: 2.0,

            initial_budget: MAX_BUDGET,
            initial_greenshoes: MAX_GREENSHOES,
            demand_cost: DEFAULT_DEMAND_COST,

            initial_price: 100.0,
            target_price: 100.0,
            price_floor: DEFAULT_PRICE_FLOOR,
            price_ceiling: DEFAULT_PRICE_CEILING,
            history_capacity: 200,

            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse a config from TOML. Missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: SessionConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.total_rounds == 0 {
            return Err(invalid("total_rounds must be at least 1"));
        }
        if self.rounds_per_phase == 0 {
            return Err(invalid("rounds_per_phase must be at least 1"));
        }

        if !(self.decision_time_limit_secs.is_finite() && self.decision_time_limit_secs > 0.0) {
            return Err(invalid(format!(
                "decision_time_limit_secs ({}) must be positive",
                self.decision_time_limit_secs
            )));
        }
        for (name, value) in [
            ("phase_transition_secs", self.phase_transition_secs),
            ("feedback_secs", self.feedback_secs),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(format!("{} ({}) must be >= 0", name, value)));
            }
        }

        if !(0.0..=MAX_BUDGET).contains(&self.initial_budget) {
            return Err(invalid(format!(
                "initial_budget ({}) must be within 0..={}",
                self.initial_budget, MAX_BUDGET
            )));
        }
        if self.initial_greenshoes > MAX_GREENSHOES {
            return Err(invalid(format!(
                "initial_greenshoes ({}) must be <= {}",
                self.initial_greenshoes, MAX_GREENSHOES
            )));
        }
        if !(self.demand_cost.is_finite() && self.demand_cost > 0.0) {
            return Err(invalid("demand_cost must be positive"));
        }

        if !(self.price_floor < self.target_price && self.target_price < self.price_ceiling) {
            return Err(invalid(format!(
                "price bounds must satisfy floor ({}) < target ({}) < ceiling ({})",
                self.price_floor, self.target_price, self.price_ceiling
            )));
        }
        if !(self.price_floor..=self.price_ceiling).contains(&self.initial_price) {
            return Err(invalid(format!(
                "initial_price ({}) must lie within the price bounds",
                self.initial_price
            )));
        }
        if self.history_capacity == 0 {
            return Err(invalid("history_capacity must be at least 1"));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> GreenshoeError {
    GreenshoeError::InvalidConfig(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.total_rounds, 12);
        assert_eq!(config.rounds_per_phase, 4);
        assert_eq!(config.decision_time_limit_secs, 7.0);
        assert_eq!(config.initial_budget, 100.0);
        assert_eq!(config.initial_greenshoes, 3);
        assert_eq!(config.demand_cost, 15.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SessionConfig::from_toml_str(
            r#"
            total_rounds = 6
            rounds_per_phase = 2
            seed = 42
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(config.total_rounds, 6);
        assert_eq!(config.rounds_per_phase, 2);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.demand_cost, 15.0);
        assert_eq!(config.price_floor, 82.0);
    }

    #[test]
    fn test_rejects_out_of_domain_resources() {
        let config = SessionConfig {
            initial_greenshoes: 4,
            ..SessionConfig::default()
        };
        assert!(matches!(config.validate(), Err(GreenshoeError::InvalidConfig(_))));

        let config = SessionConfig {
            initial_budget: 120.0,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_price_bounds() {
        let config = SessionConfig {
            price_floor: 130.0,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_time_limit() {
        let config = SessionConfig {
            decision_time_limit_secs: 0.0,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let err = SessionConfig::from_toml_str("total_rounds = \"twelve\"").unwrap_err();
        assert!(matches!(err, GreenshoeError::Toml(_)));
    }
}
