//! Real-time session driver on tokio
//!
//! A spawned task owns the [`GameSession`] and advances it on a fixed tick.
//! Decisions arrive over a channel; events leave over another. Before a
//! decision is applied the session is caught up to "now", so a decision that
//! lands after the window expired is ignored rather than resolving twice.

use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::core::config::SessionConfig;
use crate::core::error::Result;
use crate::core::types::{Action, SessionId};
use crate::market::scenario::ScenarioSource;
use crate::session::events::SessionEvent;
use crate::session::game::GameSession;
use crate::session::summary::FinalSummary;

pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

/// Control handle for a running session. Dropping it tears the session down.
#[derive(Debug)]
pub struct SessionHandle {
    id: SessionId,
    decisions: UnboundedSender<Action>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Option<FinalSummary>>,
}

impl SessionHandle {
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Queue a decision for the driver. Returns false once the session task
    /// has exited. Acceptance here does not mean the round accepted it: the
    /// session ignores decisions outside an open window.
    pub fn submit_decision(&self, action: Action) -> bool {
        self.decisions.send(action).is_ok()
    }

    /// Abort the session. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }

    /// Wait for the session to end. `None` if it was aborted.
    pub async fn finished(self) -> Option<FinalSummary> {
        let SessionHandle { task, shutdown, .. } = self;
        let summary = task.await.ok().flatten();
        drop(shutdown);
        summary
    }
}

/// Start a session on the built-in catalog. Must be called inside a tokio runtime.
pub fn start_session(
    config: SessionConfig,
) -> Result<(SessionHandle, UnboundedReceiver<SessionEvent>)> {
    let (mut events, receiver) = mpsc::unbounded_channel();
    let opened = Instant::now();
    let session = GameSession::start(config, &mut events)?;
    Ok((spawn(session, events, opened, DEFAULT_TICK), receiver))
}

/// Start a session that draws scenarios from `source`
pub fn start_session_with_source(
    config: SessionConfig,
    source: Box<dyn ScenarioSource>,
    tick: Duration,
) -> Result<(SessionHandle, UnboundedReceiver<SessionEvent>)> {
    let (mut events, receiver) = mpsc::unbounded_channel();
    let opened = Instant::now();
    let session = GameSession::with_source(config, source, &mut events)?;
    Ok((spawn(session, events, opened, tick), receiver))
}

fn spawn(
    session: GameSession,
    events: UnboundedSender<SessionEvent>,
    opened: Instant,
    tick: Duration,
) -> SessionHandle {
    let (decision_tx, decision_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let id = session.id();

    let task = tokio::spawn(run(session, events, decision_rx, shutdown_rx, opened, tick));

    SessionHandle {
        id,
        decisions: decision_tx,
        shutdown: Some(shutdown_tx),
        task,
    }
}

async fn run(
    mut session: GameSession,
    mut events: UnboundedSender<SessionEvent>,
    mut decisions: UnboundedReceiver<Action>,
    mut shutdown: oneshot::Receiver<()>,
    opened: Instant,
    tick: Duration,
) -> Option<FinalSummary> {
    let mut ticker = interval(tick.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Round 1 opened before the task was spawned; its window counts from then
    let mut last = opened;

    while !session.is_over() {
        tokio::select! {
            // Fires on explicit shutdown and when the handle is dropped
            _ = &mut shutdown => {
                session.abort(&mut events);
                break;
            }
            Some(action) = decisions.recv() => {
                let now = Instant::now();
                session.advance(now.duration_since(last).as_secs_f64(), &mut events);
                last = now;
                session.submit_decision(action, &mut events);
            }
            _ = ticker.tick() => {
                let now = Instant::now();
                session.advance(now.duration_since(last).as_secs_f64(), &mut events);
                last = now;
            }
        }
    }

    session.summary().cloned()
}
