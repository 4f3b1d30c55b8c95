//! Headless Battle Runner
//!
//! Plays one battle between two roster files and prints the report.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use skirmish_engine::battle::BattleEvent;
use skirmish_engine::character::load_roster;
use skirmish_engine::core::SinkError;
use skirmish_engine::{BattleConfig, BattleOrchestrator, BattleReport, StatusCatalog};

/// Headless Battle Runner - play two rosters against each other
#[derive(Parser, Debug)]
#[command(name = "battle_runner")]
#[command(about = "Run a turn-based battle between two rosters and print the result")]
struct Args {
    /// Player roster (JSON array of character templates)
    player: PathBuf,

    /// Enemy roster (JSON array of character templates)
    enemy: PathBuf,

    /// Battle configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra status effect definitions (TOML), merged over the built-ins
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Pacing speed multiplier
    #[arg(long)]
    speed: Option<f64>,

    /// Sleep through the scheduled delays instead of skipping them
    #[arg(long)]
    realtime: bool,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,

    /// Stream every event to stderr as it happens
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skirmish_engine=info".into()),
        )
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("battle_runner: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> skirmish_engine::Result<()> {
    let mut config = match &args.config {
        Some(path) => BattleConfig::load(path)?,
        None => BattleConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let seed = config.seed.unwrap_or_else(rand::random);
    config.seed = Some(seed);

    let player = load_roster(&args.player)?;
    let enemy = load_roster(&args.enemy)?;

    let mut battle = BattleOrchestrator::new(config);
    if let Some(path) = &args.catalog {
        battle = battle.with_catalog(StatusCatalog::load(path)?);
    }
    if let Some(speed) = args.speed {
        if !battle.set_speed_multiplier(speed) {
            eprintln!("Warning: ignoring speed multiplier {}", speed);
        }
    }
    if args.verbose {
        battle.subscribe(|event: &BattleEvent| -> Result<(), SinkError> {
            let line = serde_json::to_string(event).map_err(|e| SinkError(e.to_string()))?;
            eprintln!("{}", line);
            Ok(())
        });
    }

    battle.start_battle(&player, &enemy)?;

    if args.realtime {
        while let Some(delay) = battle.time_until_next_step() {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            battle.advance(delay);
        }
    } else {
        battle.run_to_completion();
    }

    let Some(report) = battle.report() else {
        eprintln!("Battle stopped before it was decided");
        return Ok(());
    };

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "text" => print_text(&report, seed),
        other => {
            eprintln!("Unknown format '{}', defaulting to text", other);
            print_text(&report, seed);
        }
    }
    Ok(())
}

fn print_text(report: &BattleReport, seed: u64) {
    for entry in &report.log {
        println!("[{:>3}] {}", entry.turn, entry.text);
    }
    println!();
    println!("Battle Result");
    println!("=============");
    println!("Outcome: {:?} ({:?})", report.outcome, report.reason);
    println!("Turns: {}", report.turns);
    println!("Survivors:");
    for survivor in &report.survivors {
        println!(
            "  {} [{}] {}/{}",
            survivor.name, survivor.team, survivor.current_hp, survivor.max_hp
        );
    }
    println!("Damage dealt:");
    for (id, amount) in &report.damage_dealt {
        println!("  {}: {}", id, amount);
    }
    println!("Seed: {}", seed);
}
