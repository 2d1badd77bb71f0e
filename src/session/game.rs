//! GameSession - the single source of truth for one match
//!
//! The session is plain owned state advanced by two inputs: elapsed time
//! ([`GameSession::advance`]) and player decisions
//! ([`GameSession::submit_decision`]). Both emit events into a caller-provided
//! sink. Nothing here sleeps or spawns; drivers own the wall clock.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::core::config::SessionConfig;
use crate::core::error::Result;
use crate::core::types::{Action, MarketPhase, Round, SessionId};
use crate::market::ledger::ResourceLedger;
use crate::market::price::PriceTrack;
use crate::market::resolver::{self, RoundOutcome};
use crate::market::scenario::{CatalogDraw, Scenario, ScenarioCatalog, ScenarioSource};
use crate::session::clock::DecisionClock;
use crate::session::events::{EventSink, SessionEvent};
use crate::session::scheduler::{RoundScheduler, SchedulerState};
use crate::session::scoring::{CategoryRatings, ScoreAccumulator};
use crate::session::summary::{award_badges, FinalSummary, SessionSnapshot};

pub struct GameSession {
    id: SessionId,
    config: SessionConfig,
    source: Box<dyn ScenarioSource>,
    scheduler: RoundScheduler,
    clock: DecisionClock,
    ledger: ResourceLedger,
    price: PriceTrack,
    scores: ScoreAccumulator,
    scenario: Option<Scenario>,
    last_outcome: Option<RoundOutcome>,
    summary: Option<FinalSummary>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("id", &self.id)
            .field("state", &self.scheduler.state())
            .field("round", &self.scheduler.round())
            .field("price", &self.price.price())
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Start a match on the built-in catalog. Round 1 opens immediately.
    pub fn start(config: SessionConfig, sink: &mut dyn EventSink) -> Result<Self> {
        Self::with_catalog(config, ScenarioCatalog::builtin(), sink)
    }

    /// Start a match drawing from a custom catalog, seeded from the config
    pub fn with_catalog(
        config: SessionConfig,
        catalog: ScenarioCatalog,
        sink: &mut dyn EventSink,
    ) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_source(config, Box::new(CatalogDraw::new(catalog, rng)), sink)
    }

    /// Start a match with an arbitrary scenario source
    pub fn with_source(
        config: SessionConfig,
        source: Box<dyn ScenarioSource>,
        sink: &mut dyn EventSink,
    ) -> Result<Self> {
        config.validate()?;

        let mut session = Self {
            id: SessionId::new(),
            scheduler: RoundScheduler::new(config.total_rounds, config.rounds_per_phase),
            clock: DecisionClock::new(),
            ledger: ResourceLedger::new(
                config.initial_budget,
                config.initial_greenshoes,
                config.demand_cost,
            ),
            price: PriceTrack::new(
                config.initial_price,
                config.target_price,
                config.price_floor,
                config.price_ceiling,
                config.history_capacity,
            ),
            scores: ScoreAccumulator::new(),
            scenario: None,
            last_outcome: None,
            summary: None,
            source,
            config,
        };

        info!(
            session = %session.id,
            rounds = session.config.total_rounds,
            "Session started"
        );
        sink.emit(SessionEvent::SessionStarted {
            session: session.id,
            total_rounds: session.config.total_rounds,
        });
        session.start_next_round(sink);

        Ok(session)
    }

    // === INPUTS ===

    /// Let `delta_secs` of game time pass, running every transition it covers
    pub fn advance(&mut self, delta_secs: f64, sink: &mut dyn EventSink) {
        let mut remaining = if delta_secs.is_finite() {
            delta_secs.max(0.0)
        } else {
            0.0
        };

        loop {
            match self.scheduler.state() {
                SchedulerState::AwaitingRound => self.start_next_round(sink),

                SchedulerState::PhaseTransition { .. } => match self.scheduler.wait(remaining) {
                    Some(left) => {
                        remaining = left;
                        self.open_decision_window(sink);
                    }
                    None => break,
                },

                SchedulerState::DecisionOpen => {
                    let before = self.clock.remaining();
                    self.clock.tick(remaining);
                    if !self.clock.is_expired() {
                        break;
                    }
                    remaining = (remaining - before).max(0.0);
                    debug!(round = self.scheduler.round(), "Decision window expired");
                    self.resolve_round(Action::DoNothing, true, sink);
                }

                SchedulerState::Feedback { .. } => match self.scheduler.wait(remaining) {
                    Some(left) => {
                        remaining = left;
                        if self.scheduler.state() == SchedulerState::GameOver {
                            self.finish(sink);
                            break;
                        }
                    }
                    None => break,
                },

                SchedulerState::Resolving | SchedulerState::GameOver | SchedulerState::Aborted => {
                    break
                }
            }
        }
    }

    /// Submit the player's action for the open round.
    ///
    /// Returns false and changes nothing when no decision window is open.
    pub fn submit_decision(&mut self, action: Action, sink: &mut dyn EventSink) -> bool {
        if !self.in_decision_mode() {
            debug!(?action, state = ?self.scheduler.state(), "Decision ignored outside window");
            return false;
        }
        self.resolve_round(action, false, sink);
        true
    }

    /// Tear the session down. Pending timers are dropped and no round
    /// resolves afterwards.
    pub fn abort(&mut self, sink: &mut dyn EventSink) {
        if !self.scheduler.abort() {
            return;
        }
        self.clock.cancel();
        warn!(session = %self.id, round = self.scheduler.round(), "Session aborted");
        sink.emit(SessionEvent::SessionAborted {
            session: self.id,
            round: self.scheduler.round(),
        });
    }

    // === LIFECYCLE ===

    fn start_next_round(&mut self, sink: &mut dyn EventSink) {
        let Some(start) = self.scheduler.begin_round(self.config.phase_transition_secs) else {
            return;
        };

        if start.phase_changed {
            debug!(round = start.round, phase = start.phase.name(), "Phase transition");
            sink.emit(SessionEvent::PhaseChanged { phase: start.phase });
        }

        if self.scheduler.in_decision_mode() {
            self.open_decision_window(sink);
        }
    }

    fn open_decision_window(&mut self, sink: &mut dyn EventSink) {
        let phase = self.scheduler.phase();
        let scenario = self.source.next_scenario(phase);
        self.clock.start(self.config.decision_time_limit_secs);

        debug!(
            round = self.scheduler.round(),
            kind = ?scenario.kind,
            move_percent = scenario.price_move_percent,
            "Round started"
        );
        sink.emit(SessionEvent::RoundStarted {
            round: self.scheduler.round(),
            phase,
            scenario: scenario.clone(),
            time_limit_secs: self.config.decision_time_limit_secs,
        });
        self.scenario = Some(scenario);
    }

    fn resolve_round(&mut self, action: Action, timed_out: bool, sink: &mut dyn EventSink) {
        if !self.scheduler.begin_resolving() {
            return;
        }
        self.clock.cancel();

        let flat;
        let scenario = match self.scenario.as_ref() {
            Some(scenario) => scenario,
            None => {
                flat = Scenario::flat();
                &flat
            }
        };

        let outcome = resolver::resolve(
            self.scheduler.round(),
            scenario,
            action,
            &mut self.ledger,
            &mut self.price,
            timed_out,
        );
        self.scores.update(&outcome, self.price.deviation());

        debug!(
            round = outcome.round,
            ?action,
            timed_out,
            classification = ?outcome.classification,
            price = outcome.price_after,
            "Round resolved"
        );

        self.scheduler.enter_feedback(self.config.feedback_secs);
        sink.emit(SessionEvent::RoundResolved {
            outcome: outcome.clone(),
            snapshot: self.snapshot(),
        });
        self.last_outcome = Some(outcome);
    }

    fn finish(&mut self, sink: &mut dyn EventSink) {
        if self.summary.is_some() {
            return;
        }

        let final_price = self.price.price();
        let final_scores = self
            .scores
            .finalize(&self.ledger, final_price, self.price.target());

        let summary = FinalSummary {
            session: self.id,
            total_score: final_scores.total_score,
            rank: final_scores.rank,
            badges: award_badges(
                self.scores.correct_decisions(),
                self.price.deviation(),
                self.ledger.stabilization_budget(),
                self.ledger.greenshoes_remaining(),
            ),
            scores: final_scores.categories,
            ratings: CategoryRatings::from(&final_scores.categories),
            accuracy_bonus: final_scores.accuracy_bonus,
            price_bonus: final_scores.price_bonus,
            price_history: self.price.history_vec(),
            final_price,
            budget_remaining: self.ledger.stabilization_budget(),
            budget_used: self.ledger.budget_used(),
            greenshoes_used: self.ledger.greenshoes_used(),
            correct_decisions: self.scores.correct_decisions(),
            total_decisions: self.scores.total_decisions(),
            timeouts: self.scores.timeouts(),
        };

        info!(
            session = %self.id,
            score = summary.total_score,
            rank = summary.rank.name(),
            "Game over"
        );
        sink.emit(SessionEvent::GameEnded {
            summary: summary.clone(),
        });
        self.summary = Some(summary);
    }

    // === QUERIES ===

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn round(&self) -> Round {
        self.scheduler.round()
    }

    pub fn phase(&self) -> MarketPhase {
        self.scheduler.phase()
    }

    pub fn in_decision_mode(&self) -> bool {
        self.scheduler.in_decision_mode()
    }

    /// The match ended normally or was aborted
    pub fn is_over(&self) -> bool {
        self.scheduler.state().is_terminal()
    }

    pub fn price(&self) -> f64 {
        self.price.price()
    }

    pub fn price_track(&self) -> &PriceTrack {
        &self.price
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    pub fn scores(&self) -> &ScoreAccumulator {
        &self.scores
    }

    /// Scenario of the current or most recent round
    pub fn current_scenario(&self) -> Option<&Scenario> {
        self.scenario.as_ref()
    }

    pub fn last_outcome(&self) -> Option<&RoundOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn summary(&self) -> Option<&FinalSummary> {
        self.summary.as_ref()
    }

    pub fn time_remaining(&self) -> f64 {
        if self.in_decision_mode() {
            self.clock.remaining()
        } else {
            0.0
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session: self.id,
            round: self.scheduler.round(),
            total_rounds: self.scheduler.total_rounds(),
            phase: self.scheduler.phase(),
            price: self.price.price(),
            stabilization_budget: self.ledger.stabilization_budget(),
            greenshoes_remaining: self.ledger.greenshoes_remaining(),
            scores: self.scores.scores(),
            correct_decisions: self.scores.correct_decisions(),
            total_decisions: self.scores.total_decisions(),
            in_decision_mode: self.in_decision_mode(),
            time_remaining_secs: self.time_remaining(),
        }
    }
}
