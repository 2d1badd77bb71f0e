//! Session lifecycle integration tests

use std::path::Path;

use greenshoe_sprint::core::config::SessionConfig;
use greenshoe_sprint::core::types::{Action, MarketPhase, ScenarioKind};
use greenshoe_sprint::market::resolver::Classification;
use greenshoe_sprint::market::scenario::{Scenario, ScenarioCatalog, ScriptedScenarios};
use greenshoe_sprint::session::events::{NullSink, SessionEvent};
use greenshoe_sprint::session::game::GameSession;
use greenshoe_sprint::session::scheduler::SchedulerState;
use greenshoe_sprint::session::summary::Badge;

fn scripted(config: SessionConfig, scenarios: Vec<Scenario>) -> (GameSession, Vec<SessionEvent>) {
    let mut events = Vec::new();
    let session = GameSession::with_source(
        config,
        Box::new(ScriptedScenarios::new(scenarios)),
        &mut events,
    )
    .expect("valid config");
    (session, events)
}

/// Answer every open window with `pick`, stepping time in between
fn play_out<F>(session: &mut GameSession, events: &mut Vec<SessionEvent>, mut pick: F)
where
    F: FnMut(&Scenario) -> Action,
{
    let mut guard = 0;
    while !session.is_over() {
        if session.in_decision_mode() {
            let action = session.current_scenario().map(&mut pick).unwrap_or_default();
            assert!(session.submit_decision(action, events));
        } else {
            session.advance(0.5, events);
        }
        guard += 1;
        assert!(guard < 10_000, "session never finished");
    }
}

fn count<F: Fn(&SessionEvent) -> bool>(events: &[SessionEvent], f: F) -> usize {
    events.iter().filter(|e| f(e)).count()
}

fn data_path(relative: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(relative)
}

#[test]
fn test_stable_round_held_correctly() {
    let (mut session, mut events) = scripted(
        SessionConfig::default(),
        vec![Scenario::new(ScenarioKind::Stable, "calm", "", 0.5)],
    );

    assert!(session.submit_decision(Action::DoNothing, &mut events));

    let outcome = session.last_outcome().expect("resolved");
    assert_eq!(outcome.classification, Classification::CorrectNothing);
    assert!((session.price() - 100.5).abs() < 1e-9);
    assert_eq!(session.ledger().stabilization_budget(), 100.0);
    assert_eq!(session.ledger().greenshoes_remaining(), 3);

    let scores = session.scores().scores();
    assert!((scores.stability - 49.6).abs() < 1e-9);
    assert_eq!(scores.efficiency, 15.0);
    assert_eq!(scores.liquidity, 15.0);
    assert_eq!(scores.reputation, 15.0);
    assert_eq!(session.scores().correct_decisions(), 1);

    match events.last() {
        Some(SessionEvent::RoundResolved { snapshot, .. }) => {
            assert_eq!(snapshot.round, 1);
            assert!(!snapshot.in_decision_mode);
            assert_eq!(snapshot.correct_decisions, 1);
        }
        other => panic!("expected RoundResolved, got {:?}", other),
    }
}

#[test]
fn test_full_match_ends_exactly_once() {
    let (mut session, mut events) = scripted(SessionConfig::default(), vec![]);
    play_out(&mut session, &mut events, |s| s.correct_action);

    assert_eq!(session.state(), SchedulerState::GameOver);
    assert_eq!(session.round(), 12);
    assert_eq!(count(&events, |e| matches!(e, SessionEvent::RoundStarted { .. })), 12);
    assert_eq!(count(&events, |e| matches!(e, SessionEvent::RoundResolved { .. })), 12);
    assert_eq!(count(&events, |e| matches!(e, SessionEvent::GameEnded { .. })), 1);

    session.advance(1_000.0, &mut events);
    assert!(!session.submit_decision(Action::AddDemand, &mut events));
    assert_eq!(count(&events, |e| matches!(e, SessionEvent::GameEnded { .. })), 1);
    assert!(matches!(events.last(), Some(SessionEvent::GameEnded { .. })));
}

#[test]
fn test_phase_changes_announced_before_rounds_5_and_9() {
    let (mut session, mut events) = scripted(SessionConfig::default(), vec![]);
    play_out(&mut session, &mut events, |_| Action::DoNothing);

    let phases: Vec<MarketPhase> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::PhaseChanged { phase } => Some(*phase),
            _ => None,
        })
        .collect();
    assert_eq!(phases, vec![MarketPhase::FirstPrint, MarketPhase::AftermarketWave]);

    let round_phases: Vec<(u32, MarketPhase)> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::RoundStarted { round, phase, .. } => Some((*round, *phase)),
            _ => None,
        })
        .collect();
    for (round, phase) in round_phases {
        assert_eq!(phase, MarketPhase::for_round(round, 4), "round {}", round);
    }
}

#[test]
fn test_phase_transition_delays_the_window() {
    let (mut session, mut events) = scripted(SessionConfig::default(), vec![]);

    for _ in 0..4 {
        session.submit_decision(Action::DoNothing, &mut events);
        session.advance(2.0, &mut events);
    }

    assert_eq!(session.round(), 5);
    assert!(!session.in_decision_mode());
    assert!(matches!(session.state(), SchedulerState::PhaseTransition { .. }));

    session.advance(2.0, &mut events);
    assert!(session.in_decision_mode());
    assert!(matches!(
        events.last(),
        Some(SessionEvent::RoundStarted { round: 5, phase: MarketPhase::FirstPrint, .. })
    ));
}

#[test]
fn test_timeouts_carry_time_across_rounds() {
    let (mut session, mut events) = scripted(
        SessionConfig::default(),
        vec![
            Scenario::new(ScenarioKind::Falling, "drop", "", -4.0),
            Scenario::new(ScenarioKind::Rising, "pop", "", 3.0),
        ],
    );

    // 7s window + 2s feedback + 7s window
    session.advance(16.0, &mut events);

    assert_eq!(session.scores().timeouts(), 2);
    assert_eq!(session.round(), 2);
    assert_eq!(session.ledger().stabilization_budget(), 100.0);
    let outcome = session.last_outcome().expect("resolved");
    assert_eq!(outcome.classification, Classification::WrongNothingRising);
    assert!(outcome.timed_out);
}

#[test]
fn test_all_idle_match_keeps_every_resource() {
    let (mut session, mut events) = scripted(SessionConfig::default(), vec![]);
    while !session.is_over() {
        session.advance(1.0, &mut events);
    }

    let summary = session.summary().expect("finished");
    assert_eq!(summary.timeouts, 12);
    assert_eq!(summary.total_decisions, 12);
    // Flat scenarios: every timeout is a lucky hold
    assert_eq!(summary.correct_decisions, 12);
    assert!(summary.has_badge(Badge::SharpInstincts));
    assert!(summary.has_badge(Badge::PriceMaster));
    assert!(summary.has_badge(Badge::BudgetHawk));
    assert!(summary.has_badge(Badge::ReservedPower));
    assert!(summary.total_score <= 1000);
}

#[test]
fn test_exhausted_budget_falls_back_to_natural_moves() {
    let drops = vec![Scenario::new(ScenarioKind::Falling, "drop", "", -2.0); 12];
    let (mut session, mut events) = scripted(SessionConfig::default(), drops);
    play_out(&mut session, &mut events, |_| Action::AddDemand);

    let summary = session.summary().expect("finished");
    assert_eq!(summary.budget_remaining, 10.0);
    assert_eq!(summary.budget_used, 90.0);
    assert_eq!(summary.correct_decisions, 6);

    let no_resource = count(&events, |e| {
        matches!(
            e,
            SessionEvent::RoundResolved { outcome, .. }
                if outcome.classification == Classification::NoResource
        )
    });
    assert_eq!(no_resource, 6);
}

#[test]
fn test_blitz_session_file_plays_six_rounds() {
    let config = SessionConfig::load(&data_path("data/sessions/blitz.toml")).expect("loads");
    assert_eq!(config.total_rounds, 6);
    assert_eq!(config.rounds_per_phase, 2);

    let mut session = GameSession::start(config.with_seed(9), &mut NullSink).expect("valid");
    let mut events = Vec::new();
    play_out(&mut session, &mut events, |s| s.correct_action);

    let summary = session.summary().expect("finished");
    assert_eq!(summary.total_decisions, 6);
    assert_eq!(count(&events, |e| matches!(e, SessionEvent::PhaseChanged { .. })), 2);
}

#[test]
fn test_classic_session_file_matches_defaults() {
    let config = SessionConfig::load(&data_path("data/sessions/classic.toml")).expect("loads");
    assert_eq!(config, SessionConfig::default());
}

#[test]
fn test_aftermarket_catalog_loads_and_drives_a_session() {
    let catalog =
        ScenarioCatalog::load(&data_path("data/scenarios/aftermarket.toml")).expect("loads");
    assert_eq!(catalog.len(), 6);
    assert!(catalog
        .pool_for(MarketPhase::BookbuildingRush)
        .iter()
        .all(|t| t.kind != ScenarioKind::Falling));

    let mut session =
        GameSession::with_catalog(SessionConfig::default().with_seed(1), catalog, &mut NullSink)
            .expect("valid");
    let mut events = Vec::new();
    play_out(&mut session, &mut events, |s| s.correct_action);
    assert!(session.summary().is_some());
}
