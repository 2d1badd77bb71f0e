//! Headless autoplay for balancing and regression runs
//!
//! Plays full matches without a wall clock: the session is stepped directly
//! and a [`Strategy`] stands in for the player.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::config::SessionConfig;
use crate::core::error::{GreenshoeError, Result};
use crate::core::types::Action;
use crate::market::ledger::ResourceLedger;
use crate::market::scenario::Scenario;
use crate::session::events::NullSink;
use crate::session::game::GameSession;
use crate::session::summary::FinalSummary;

/// Game seconds skipped per step while no decision window is open
const HEADLESS_STEP_SECS: f64 = 0.5;

/// Keeps strategy randomness independent of scenario draws for the same seed
const STRATEGY_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Always the textbook response
    Perfect,
    /// Uniformly random among the actions the ledger can still pay for
    Random,
    /// Never act; every round times out
    Idle,
    AlwaysDemand,
    AlwaysSupply,
}

impl Strategy {
    /// Pick an action, or `None` to let the window expire
    pub fn choose<R: Rng + ?Sized>(
        &self,
        scenario: &Scenario,
        ledger: &ResourceLedger,
        rng: &mut R,
    ) -> Option<Action> {
        match self {
            Self::Perfect => Some(scenario.correct_action),
            Self::Random => {
                let affordable: Vec<Action> = Action::ALL
                    .into_iter()
                    .filter(|action| ledger.can_afford(*action))
                    .collect();
                affordable.choose(rng).copied()
            }
            Self::Idle => None,
            Self::AlwaysDemand => Some(Action::AddDemand),
            Self::AlwaysSupply => Some(Action::AddSupply),
        }
    }
}

/// Play one complete match with `strategy`, seeded by `seed`
pub fn play_headless(config: SessionConfig, strategy: Strategy, seed: u64) -> Result<FinalSummary> {
    let config = SessionConfig {
        seed: Some(seed),
        ..config
    };
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ STRATEGY_SEED_SALT);
    let mut sink = NullSink;

    let mut session = GameSession::start(config, &mut sink)?;
    let window = session.config().decision_time_limit_secs;

    while !session.is_over() {
        if !session.in_decision_mode() {
            session.advance(HEADLESS_STEP_SECS, &mut sink);
            continue;
        }

        let choice = session
            .current_scenario()
            .and_then(|scenario| strategy.choose(scenario, session.ledger(), &mut rng));

        match choice {
            Some(action) => {
                session.submit_decision(action, &mut sink);
            }
            None => session.advance(window, &mut sink),
        }
    }

    session
        .summary()
        .cloned()
        .ok_or(GreenshoeError::Aborted(session.id()))
}

/// Aggregate statistics over a batch of headless games
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub strategy: Strategy,
    pub games: u32,
    pub base_seed: u64,
    pub mean_score: f64,
    pub min_score: u32,
    pub max_score: u32,
    pub mean_accuracy_percent: f64,
    pub mean_final_price: f64,
    pub mean_timeouts: f64,
    pub rank_counts: BTreeMap<String, u32>,
    pub badge_counts: BTreeMap<String, u32>,
}

impl BatchReport {
    fn from_summaries(strategy: Strategy, base_seed: u64, summaries: &[FinalSummary]) -> Self {
        let games = summaries.len() as u32;
        let n = summaries.len().max(1) as f64;

        let mut rank_counts = BTreeMap::new();
        let mut badge_counts = BTreeMap::new();
        for summary in summaries {
            *rank_counts.entry(summary.rank.name().to_string()).or_insert(0) += 1;
            for badge in &summary.badges {
                *badge_counts.entry(badge.name().to_string()).or_insert(0) += 1;
            }
        }

        Self {
            strategy,
            games,
            base_seed,
            mean_score: summaries.iter().map(|s| s.total_score as f64).sum::<f64>() / n,
            min_score: summaries.iter().map(|s| s.total_score).min().unwrap_or(0),
            max_score: summaries.iter().map(|s| s.total_score).max().unwrap_or(0),
            mean_accuracy_percent: summaries
                .iter()
                .map(|s| s.accuracy_percent() as f64)
                .sum::<f64>()
                / n,
            mean_final_price: summaries.iter().map(|s| s.final_price).sum::<f64>() / n,
            mean_timeouts: summaries.iter().map(|s| s.timeouts as f64).sum::<f64>() / n,
            rank_counts,
            badge_counts,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{:?}: {} games, score mean {:.1} (min {}, max {}), accuracy {:.1}%, final price ${:.2}",
            self.strategy,
            self.games,
            self.mean_score,
            self.min_score,
            self.max_score,
            self.mean_accuracy_percent,
            self.mean_final_price,
        )
    }
}

/// Pretty JSON for a set of batch reports
pub fn reports_to_json(reports: &[BatchReport]) -> Result<String> {
    Ok(serde_json::to_string_pretty(reports)?)
}

/// Play `games` matches in parallel with consecutive seeds from `base_seed`
pub fn run_batch(
    config: &SessionConfig,
    strategy: Strategy,
    base_seed: u64,
    games: u32,
) -> Result<BatchReport> {
    config.validate()?;

    let summaries = (0..games)
        .into_par_iter()
        .map(|i| play_headless(config.clone(), strategy, base_seed.wrapping_add(i as u64)))
        .collect::<Result<Vec<_>>>()?;

    Ok(BatchReport::from_summaries(strategy, base_seed, &summaries))
}
