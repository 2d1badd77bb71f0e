//! Headless Playtest Runner
//!
//! Plays batches of matches with a scripted strategy and reports score
//! distributions. Used for balancing the scoring constants.

use std::path::PathBuf;

use clap::Parser;
use greenshoe_sprint::core::config::SessionConfig;
use greenshoe_sprint::runtime::autoplay::{reports_to_json, run_batch, BatchReport, Strategy};

/// Headless Playtest Runner - scripted strategies for balancing
#[derive(Parser, Debug)]
#[command(name = "playtest")]
#[command(about = "Play batches of headless matches and report score distributions")]
struct Args {
    /// Strategies to run (repeatable; default runs all)
    #[arg(long, value_enum)]
    strategy: Vec<Strategy>,

    /// Games per strategy
    #[arg(long, default_value_t = 200)]
    games: u32,

    /// Base seed; game i uses seed + i
    #[arg(long)]
    seed: Option<u64>,

    /// Session config TOML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match SessionConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => SessionConfig::default(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    let strategies = if args.strategy.is_empty() {
        vec![
            Strategy::Perfect,
            Strategy::Random,
            Strategy::Idle,
            Strategy::AlwaysDemand,
            Strategy::AlwaysSupply,
        ]
    } else {
        args.strategy.clone()
    };

    let mut reports: Vec<BatchReport> = Vec::with_capacity(strategies.len());
    for strategy in strategies {
        match run_batch(&config, strategy, seed, args.games) {
            Ok(report) => reports.push(report),
            Err(e) => {
                eprintln!("Batch for {:?} failed: {}", strategy, e);
                std::process::exit(1);
            }
        }
    }

    if args.format == "json" {
        match reports_to_json(&reports) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize reports: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        println!("=== Greenshoe Sprint Playtest (seed {}) ===\n", seed);
        for report in &reports {
            println!("{}", report.summary());
            let ranks: Vec<String> = report
                .rank_counts
                .iter()
                .map(|(rank, count)| format!("{} x{}", rank, count))
                .collect();
            println!("  ranks:  {}", ranks.join(", "));
            let badges: Vec<String> = report
                .badge_counts
                .iter()
                .map(|(badge, count)| format!("{} x{}", badge, count))
                .collect();
            if !badges.is_empty() {
                println!("  badges: {}", badges.join(", "));
            }
            println!("  timeouts per game: {:.1}\n", report.mean_timeouts);
        }
    }
}
