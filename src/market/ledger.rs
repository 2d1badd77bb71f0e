//! Stabilization budget and greenshoe accounting

use serde::{Deserialize, Serialize};

use crate::core::types::Action;
use crate::market::constants::{DEFAULT_DEMAND_COST, MAX_BUDGET, MAX_GREENSHOES};

/// What an action actually cost
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    pub budget: f64,
    pub greenshoes: u32,
}

impl Charge {
    pub fn is_free(&self) -> bool {
        self.budget == 0.0 && self.greenshoes == 0
    }
}

/// Tracks the two depletable resources. Neither ever regenerates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLedger {
    stabilization_budget: f64,
    greenshoes_remaining: u32,
    demand_cost: f64,
    budget_used: f64,
    greenshoes_used: u32,
}

impl ResourceLedger {
    pub fn new(initial_budget: f64, initial_greenshoes: u32, demand_cost: f64) -> Self {
        Self {
            stabilization_budget: initial_budget.clamp(0.0, MAX_BUDGET),
            greenshoes_remaining: initial_greenshoes.min(MAX_GREENSHOES),
            demand_cost: demand_cost.max(0.0),
            budget_used: 0.0,
            greenshoes_used: 0,
        }
    }

    pub fn stabilization_budget(&self) -> f64 {
        self.stabilization_budget
    }

    pub fn greenshoes_remaining(&self) -> u32 {
        self.greenshoes_remaining
    }

    pub fn demand_cost(&self) -> f64 {
        self.demand_cost
    }

    pub fn budget_used(&self) -> f64 {
        self.budget_used
    }

    pub fn greenshoes_used(&self) -> u32 {
        self.greenshoes_used
    }

    /// Fraction of the full budget still available
    pub fn budget_ratio(&self) -> f64 {
        self.stabilization_budget / MAX_BUDGET
    }

    pub fn can_afford(&self, action: Action) -> bool {
        match action {
            Action::AddDemand => self.stabilization_budget >= self.demand_cost,
            Action::AddSupply => self.greenshoes_remaining > 0,
            Action::DoNothing => true,
        }
    }

    /// Deduct the cost of `action`. Unaffordable actions are a no-op and
    /// return a free charge.
    pub fn spend(&mut self, action: Action) -> Charge {
        if !self.can_afford(action) {
            return Charge::default();
        }

        let charge = match action {
            Action::AddDemand => {
                let before = self.stabilization_budget;
                self.stabilization_budget =
                    (self.stabilization_budget - self.demand_cost).clamp(0.0, MAX_BUDGET);
                Charge {
                    budget: before - self.stabilization_budget,
                    greenshoes: 0,
                }
            }
            Action::AddSupply => {
                self.greenshoes_remaining = self.greenshoes_remaining.saturating_sub(1);
                Charge {
                    budget: 0.0,
                    greenshoes: 1,
                }
            }
            Action::DoNothing => Charge::default(),
        };

        self.budget_used += charge.budget;
        self.greenshoes_used += charge.greenshoes;
        charge
    }
}

impl Default for ResourceLedger {
    fn default() -> Self {
        Self::new(MAX_BUDGET, MAX_GREENSHOES, DEFAULT_DEMAND_COST)
    }
}
