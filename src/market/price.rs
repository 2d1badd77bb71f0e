//! Stock price with clamp bounds and a capped history

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::types::Round;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub round: Round,
    pub price: f64,
}

/// Current price plus a ring buffer of past prices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTrack {
    price: f64,
    target: f64,
    floor: f64,
    ceiling: f64,
    capacity: usize,
    history: VecDeque<PricePoint>,
}

impl PriceTrack {
    pub fn new(initial: f64, target: f64, floor: f64, ceiling: f64, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let price = initial.clamp(floor, ceiling);
        let mut history = VecDeque::with_capacity(capacity);
        history.push_back(PricePoint { round: 0, price });

        Self {
            price,
            target,
            floor,
            ceiling,
            capacity,
            history,
        }
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Absolute distance from the target price
    pub fn deviation(&self) -> f64 {
        (self.price - self.target).abs()
    }

    /// Apply a percent change, clamp, and record the result for `round`
    pub fn apply_change(&mut self, round: Round, change_percent: f64) -> f64 {
        let next = self.price * (1.0 + change_percent / 100.0);
        self.price = if next.is_finite() {
            next.clamp(self.floor, self.ceiling)
        } else {
            self.price
        };

        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(PricePoint {
            round,
            price: self.price,
        });

        self.price
    }

    pub fn history(&self) -> impl Iterator<Item = &PricePoint> {
        self.history.iter()
    }

    pub fn history_vec(&self) -> Vec<PricePoint> {
        self.history.iter().copied().collect()
    }
}
