//! Market rule constants - all tunable values in one place
//!
//! Price moves are expressed in percentage points of the current price.

// Resources
pub const MAX_BUDGET: f64 = 100.0;
pub const MAX_GREENSHOES: u32 = 3;
pub const DEFAULT_DEMAND_COST: f64 = 15.0;

// Price clamp
pub const DEFAULT_PRICE_FLOOR: f64 = 82.0;
pub const DEFAULT_PRICE_CEILING: f64 = 125.0;

// Correct intervention keeps 15% of the natural move
pub const CORRECT_DAMPENING: f64 = 0.15;

// Pushing the same way as the market
pub const WRONG_AMPLIFY_FACTOR: f64 = 1.6;
pub const WRONG_AMPLIFY_OFFSET: f64 = 3.0;

// Intervening in a flat market
pub const WRONG_STABLE_OFFSET: f64 = 2.0;

// Standing aside while the price runs
pub const INACTION_DRIFT_FACTOR: f64 = 1.1;

// Phase 2 rejects this share of Stable draws and redraws once
pub const AFTERMARKET_STABLE_REJECT_CHANCE: f64 = 0.5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cost_affordable_from_full_budget() {
        assert!(DEFAULT_DEMAND_COST <= MAX_BUDGET);
    }

    #[test]
    fn test_price_bounds_bracket_par() {
        assert!(DEFAULT_PRICE_FLOOR < 100.0 && DEFAULT_PRICE_CEILING > 100.0);
    }

    #[test]
    fn test_wrong_moves_amplify() {
        assert!(WRONG_AMPLIFY_FACTOR > 1.0);
        assert!(INACTION_DRIFT_FACTOR > 1.0);
        assert!(CORRECT_DAMPENING < 1.0);
    }
}
