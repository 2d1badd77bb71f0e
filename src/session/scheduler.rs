//! Round scheduler state machine
//!
//! AwaitingRound -> [PhaseTransition] -> DecisionOpen -> Resolving -> Feedback
//! -> AwaitingRound ... -> GameOver. Aborted is reachable from any
//! non-terminal state when the session is torn down.

use serde::{Deserialize, Serialize};

use crate::core::types::{MarketPhase, Round};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum SchedulerState {
    #[default]
    AwaitingRound,
    PhaseTransition {
        remaining_secs: f64,
    },
    DecisionOpen,
    Resolving,
    Feedback {
        remaining_secs: f64,
    },
    GameOver,
    Aborted,
}

impl SchedulerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::GameOver | Self::Aborted)
    }
}

/// Result of starting a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundStart {
    pub round: Round,
    pub phase: MarketPhase,
    pub phase_changed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundScheduler {
    state: SchedulerState,
    round: Round,
    total_rounds: u32,
    rounds_per_phase: u32,
    phase: Option<MarketPhase>,
}

impl RoundScheduler {
    pub fn new(total_rounds: u32, rounds_per_phase: u32) -> Self {
        Self {
            state: SchedulerState::AwaitingRound,
            round: 0,
            total_rounds: total_rounds.max(1),
            rounds_per_phase: rounds_per_phase.max(1),
            phase: None,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn phase(&self) -> MarketPhase {
        self.phase.unwrap_or_default()
    }

    pub fn in_decision_mode(&self) -> bool {
        matches!(self.state, SchedulerState::DecisionOpen)
    }

    pub fn is_final_round(&self) -> bool {
        self.round >= self.total_rounds
    }

    /// Move to the next round. Only valid from AwaitingRound.
    ///
    /// A phase change parks the scheduler in PhaseTransition for
    /// `transition_secs`; otherwise the decision window opens immediately.
    pub fn begin_round(&mut self, transition_secs: f64) -> Option<RoundStart> {
        if self.state != SchedulerState::AwaitingRound {
            return None;
        }

        self.round += 1;
        let phase = MarketPhase::for_round(self.round, self.rounds_per_phase);
        let phase_changed = self.phase.is_some_and(|previous| previous != phase);
        self.phase = Some(phase);

        self.state = if phase_changed {
            SchedulerState::PhaseTransition {
                remaining_secs: transition_secs.max(0.0),
            }
        } else {
            SchedulerState::DecisionOpen
        };

        Some(RoundStart {
            round: self.round,
            phase,
            phase_changed,
        })
    }

    /// Spend time in a timed state (PhaseTransition or Feedback).
    ///
    /// Returns the unused part of `delta_secs` once the wait completes,
    /// `None` while still waiting or when the state has no timer.
    pub fn wait(&mut self, delta_secs: f64) -> Option<f64> {
        let delta = delta_secs.max(0.0);

        match self.state {
            SchedulerState::PhaseTransition { remaining_secs } => {
                if delta >= remaining_secs {
                    self.state = SchedulerState::DecisionOpen;
                    Some(delta - remaining_secs)
                } else {
                    self.state = SchedulerState::PhaseTransition {
                        remaining_secs: remaining_secs - delta,
                    };
                    None
                }
            }
            SchedulerState::Feedback { remaining_secs } => {
                if delta >= remaining_secs {
                    self.state = if self.is_final_round() {
                        SchedulerState::GameOver
                    } else {
                        SchedulerState::AwaitingRound
                    };
                    Some(delta - remaining_secs)
                } else {
                    self.state = SchedulerState::Feedback {
                        remaining_secs: remaining_secs - delta,
                    };
                    None
                }
            }
            _ => None,
        }
    }

    /// Claim the open decision window for resolution. Returns false if the
    /// window is not open, so a round can never resolve twice.
    pub fn begin_resolving(&mut self) -> bool {
        if self.state != SchedulerState::DecisionOpen {
            return false;
        }
        self.state = SchedulerState::Resolving;
        true
    }

    pub fn enter_feedback(&mut self, feedback_secs: f64) {
        if self.state == SchedulerState::Resolving {
            self.state = SchedulerState::Feedback {
                remaining_secs: feedback_secs.max(0.0),
            };
        }
    }

    /// Tear down. Returns false if the scheduler was already terminal.
    pub fn abort(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = SchedulerState::Aborted;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play_round(scheduler: &mut RoundScheduler) -> RoundStart {
        let start = scheduler.begin_round(2.0).expect("awaiting round");
        if start.phase_changed {
            assert_eq!(scheduler.wait(2.0), Some(0.0));
        }
        assert!(scheduler.in_decision_mode());
        assert!(scheduler.begin_resolving());
        scheduler.enter_feedback(1.5);
        assert_eq!(scheduler.wait(1.0), None);
        assert_eq!(scheduler.wait(1.0), Some(0.5));
        start
    }

    #[test]
    fn test_full_match_walks_every_phase() {
        let mut scheduler = RoundScheduler::new(12, 4);
        let mut changes = Vec::new();

        for _ in 0..12 {
            let start = play_round(&mut scheduler);
            if start.phase_changed {
                changes.push((start.round, start.phase));
            }
        }

        assert_eq!(
            changes,
            vec![(5, MarketPhase::FirstPrint), (9, MarketPhase::AftermarketWave)]
        );
        assert_eq!(scheduler.state(), SchedulerState::GameOver);
        assert_eq!(scheduler.begin_round(2.0), None);
    }

    #[test]
    fn test_first_round_opens_without_transition() {
        let mut scheduler = RoundScheduler::new(12, 4);
        let start = scheduler.begin_round(2.0).expect("first round");
        assert_eq!(start.round, 1);
        assert_eq!(start.phase, MarketPhase::BookbuildingRush);
        assert!(!start.phase_changed);
        assert!(scheduler.in_decision_mode());
    }

    #[test]
    fn test_window_resolves_once() {
        let mut scheduler = RoundScheduler::new(3, 1);
        scheduler.begin_round(0.0);
        assert!(scheduler.begin_resolving());
        assert!(!scheduler.begin_resolving());
    }

    #[test]
    fn test_abort_is_terminal() {
        let mut scheduler = RoundScheduler::new(12, 4);
        scheduler.begin_round(2.0);
        assert!(scheduler.abort());
        assert!(!scheduler.abort());
        assert!(!scheduler.in_decision_mode());
        assert!(!scheduler.begin_resolving());
        assert_eq!(scheduler.begin_round(2.0), None);
    }

    #[test]
    fn test_game_over_only_after_final_feedback() {
        let mut scheduler = RoundScheduler::new(1, 4);
        scheduler.begin_round(0.0);
        scheduler.begin_resolving();
        scheduler.enter_feedback(2.0);
        assert!(matches!(scheduler.state(), SchedulerState::Feedback { .. }));
        scheduler.wait(2.0);
        assert_eq!(scheduler.state(), SchedulerState::GameOver);
        assert_eq!(scheduler.wait(10.0), None);
    }
}
