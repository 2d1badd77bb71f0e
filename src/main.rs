//! Greenshoe Sprint - Entry Point
//!
//! Plays one match in the terminal. The session runs on a tokio task in
//! real time; keyboard lines are read on a separate thread and forwarded as
//! decisions.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use greenshoe_sprint::core::config::SessionConfig;
use greenshoe_sprint::core::error::Result;
use greenshoe_sprint::core::types::Action;
use greenshoe_sprint::market::scenario::{CatalogDraw, ScenarioCatalog};
use greenshoe_sprint::runtime::driver::{self, DEFAULT_TICK};
use greenshoe_sprint::session::events::SessionEvent;
use greenshoe_sprint::session::summary::FinalSummary;

#[derive(Parser, Debug)]
#[command(name = "greenshoe-sprint")]
#[command(about = "Stabilize a freshly listed stock with your greenshoe option")]
struct Args {
    /// Session config TOML (see data/sessions/)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scenario catalog TOML (see data/scenarios/)
    #[arg(long)]
    scenarios: Option<PathBuf>,

    /// Random seed for a reproducible match
    #[arg(long)]
    seed: Option<u64>,

    /// Print the final summary as JSON instead of the results screen
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    let catalog = match &args.scenarios {
        Some(path) => ScenarioCatalog::load(path)?,
        None => ScenarioCatalog::builtin(),
    };

    print_intro(&config);

    let rt = Runtime::new()?;
    let summary = rt.block_on(play(config, catalog))?;

    match summary {
        Some(summary) if args.json => println!("{}", summary.to_json()?),
        Some(summary) => print_summary(&summary),
        None => println!("\nSession closed before the final bell."),
    }
    Ok(())
}

async fn play(config: SessionConfig, catalog: ScenarioCatalog) -> Result<Option<FinalSummary>> {
    let rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let source = Box::new(CatalogDraw::new(catalog, rng));
    let (mut handle, mut events) = driver::start_session_with_source(config, source, DEFAULT_TICK)?;

    // Blocking stdin lives on its own thread
    let (line_tx, mut lines) = mpsc::unbounded_channel::<String>();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    let done = matches!(
                        event,
                        SessionEvent::GameEnded { .. } | SessionEvent::SessionAborted { .. }
                    );
                    print_event(&event);
                    if done {
                        break;
                    }
                }
                None => break,
            },
            Some(line) = lines.recv() => match parse_key(&line) {
                Some(Key::Decide(action)) => {
                    handle.submit_decision(action);
                }
                Some(Key::Quit) => handle.shutdown(),
                None => println!("  keys: d = add demand, s = add supply, n/enter = hold, q = quit"),
            },
        }
    }

    Ok(handle.finished().await)
}

enum Key {
    Decide(Action),
    Quit,
}

fn parse_key(line: &str) -> Option<Key> {
    match line.trim().to_ascii_lowercase().as_str() {
        "d" => Some(Key::Decide(Action::AddDemand)),
        "s" => Some(Key::Decide(Action::AddSupply)),
        "n" | "" => Some(Key::Decide(Action::DoNothing)),
        "q" | "quit" => Some(Key::Quit),
        _ => None,
    }
}

fn print_intro(config: &SessionConfig) {
    println!("\n=== GREENSHOE SPRINT ===");
    println!("You run the stabilization desk for a fresh IPO. Keep the stock near ${:.0}.", config.target_price);
    println!();
    println!("Each round, read the market and decide within {:.0} seconds:", config.decision_time_limit_secs);
    println!("  d      - Add demand (buy in the market, costs {:.0} budget)", config.demand_cost);
    println!("  s      - Add supply (exercise a greenshoe, {} available)", config.initial_greenshoes);
    println!("  n / ⏎  - Do nothing");
    println!("  q      - Quit");
    println!();
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::SessionStarted { total_rounds, .. } => {
            println!("Opening bell. {} rounds to survive.", total_rounds);
        }
        SessionEvent::PhaseChanged { phase } => {
            println!("\n--- {} ---", phase.name().to_uppercase());
            println!("{}", phase.description());
        }
        SessionEvent::RoundStarted {
            round,
            phase,
            scenario,
            time_limit_secs,
        } => {
            println!();
            println!("[Round {} | {}] {}", round, phase.name(), scenario.title);
            println!("  {}", scenario.description);
            print!("  Your move ({:.0}s) [d/s/n]: ", time_limit_secs);
            let _ = io::stdout().flush();
        }
        SessionEvent::RoundResolved { outcome, snapshot } => {
            println!();
            if outcome.timed_out {
                println!("  Time's up - the desk held.");
            }
            println!(
                "  {}  ${:.2} -> ${:.2} ({:+.1}%)",
                outcome.classification.headline(),
                outcome.price_before,
                outcome.price_after,
                outcome.price_change_percent,
            );
            println!(
                "  Budget {:.0} | Greenshoes {} | Correct {}/{}",
                snapshot.stabilization_budget,
                snapshot.greenshoes_remaining,
                snapshot.correct_decisions,
                snapshot.total_decisions,
            );
        }
        SessionEvent::GameEnded { .. } => {
            println!("\nClosing bell.");
        }
        SessionEvent::SessionAborted { round, .. } => {
            println!("\nDesk closed during round {}.", round);
        }
    }
}

fn print_summary(summary: &FinalSummary) {
    println!("\n=== RESULTS ===");
    println!("{}", summary.headline());
    println!();
    println!(
        "  Stability   {:>5.0}  {:?}",
        summary.scores.stability, summary.ratings.stability
    );
    println!(
        "  Efficiency  {:>5.0}  {:?}",
        summary.scores.efficiency, summary.ratings.efficiency
    );
    println!(
        "  Liquidity   {:>5.0}  {:?}",
        summary.scores.liquidity, summary.ratings.liquidity
    );
    println!(
        "  Reputation  {:>5.0}  {:?}",
        summary.scores.reputation, summary.ratings.reputation
    );
    println!("  Accuracy bonus {:.0}, price bonus {:.0}", summary.accuracy_bonus, summary.price_bonus);
    println!(
        "  Budget used {:.0}, greenshoes used {}, timeouts {}",
        summary.budget_used, summary.greenshoes_used, summary.timeouts
    );

    if !summary.badges.is_empty() {
        println!("\nBadges:");
        for badge in &summary.badges {
            println!("  * {} - {}", badge.name(), badge.description());
        }
    }
}
