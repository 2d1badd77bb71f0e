//! Session events and the sinks that receive them
//!
//! The session never calls into presentation code directly. It emits
//! [`SessionEvent`]s into whatever [`EventSink`] the caller hands it.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use crate::core::types::{MarketPhase, Round, SessionId};
use crate::market::resolver::RoundOutcome;
use crate::market::scenario::Scenario;
use crate::session::summary::{FinalSummary, SessionSnapshot};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    SessionStarted {
        session: SessionId,
        total_rounds: u32,
    },
    PhaseChanged {
        phase: MarketPhase,
    },
    RoundStarted {
        round: Round,
        phase: MarketPhase,
        scenario: Scenario,
        time_limit_secs: f64,
    },
    RoundResolved {
        outcome: RoundOutcome,
        snapshot: SessionSnapshot,
    },
    GameEnded {
        summary: FinalSummary,
    },
    /// Torn down before the final round completed
    SessionAborted {
        session: SessionId,
        round: Round,
    },
}

pub trait EventSink {
    fn emit(&mut self, event: SessionEvent);
}

/// Records every event in order
impl EventSink for Vec<SessionEvent> {
    fn emit(&mut self, event: SessionEvent) {
        self.push(event);
    }
}

/// Forwards events to an async consumer. A closed channel drops them.
impl EventSink for UnboundedSender<SessionEvent> {
    fn emit(&mut self, event: SessionEvent) {
        let _ = self.send(event);
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: SessionEvent) {}
}
