//! Headless Battle Runner
//!
//! Plays a full skirmish with the nearest-enemy AI on both sides and
//! prints the outcome and XP award. The player side goes through the same
//! commands a UI would issue.

use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{info, warn};

use squad_tactics::battle::{
    BattleAI, BattleOutcome, NearestEnemyAi, SquadConfig, TurnScheduler, UnitCatalog,
};
use squad_tactics::core::{BattleConfig, Result, Team};
use squad_tactics::progression::{award_battle_xp, AwardResult, XpTuningConfig};

/// Headless Battle Runner - AI vs AI squad skirmish
#[derive(Parser, Debug)]
#[command(name = "battle_runner")]
#[command(about = "Run a squad skirmish headlessly and report the outcome and XP award")]
struct Args {
    /// Battle config TOML (grid size, timings, seed)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Unit definition catalog
    #[arg(long, default_value = "data/units/default.toml")]
    units: PathBuf,

    /// Squad setup for both sides
    #[arg(long, default_value = "data/squads/skirmish.toml")]
    squads: PathBuf,

    /// XP tuning; a missing file awards zero XP
    #[arg(long, default_value = "data/tuning/default.toml")]
    tuning: PathBuf,

    /// Random seed for deterministic runs (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Turn cap before the battle is called undecided
    #[arg(long, default_value_t = 50)]
    max_turns: u32,

    /// Simulated seconds per frame
    #[arg(long, default_value_t = 0.1)]
    frame: f32,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Print every battle event to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Serialize)]
struct SurvivorReport {
    definition: String,
    team: Team,
    life: i32,
    max_life: i32,
}

/// JSON output structure
#[derive(Serialize)]
struct RunReport {
    outcome: BattleOutcome,
    turns: u32,
    frames: u64,
    seed: u64,
    survivors: Vec<SurvivorReport>,
    award: AwardResult,
}

// Frames per battle before giving up, independent of the turn cap
const MAX_FRAMES: u64 = 200_000;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => BattleConfig::load(path)?,
        None => BattleConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let seed = config.seed;

    let catalog = UnitCatalog::load(&args.units)?;
    let squads = SquadConfig::load(&args.squads)?;
    let tuning = match XpTuningConfig::load(&args.tuning) {
        Ok(tuning) => Some(tuning),
        Err(e) => {
            warn!(path = %args.tuning.display(), error = %e, "Could not load XP tuning");
            None
        }
    };

    let setup = squads.spawn(&catalog)?;
    let mut scheduler = TurnScheduler::new(config)?.with_ai(Box::new(NearestEnemyAi::new()));
    let mut commander = NearestEnemyAi::new();
    scheduler.begin_battle(setup.units.clone());

    let mut turns = scheduler.turn();
    let mut frames: u64 = 0;
    while !scheduler.is_ended() && turns <= args.max_turns && frames < MAX_FRAMES {
        let player_turn = scheduler
            .active_unit()
            .is_some_and(|unit| unit.is_player_controlled());
        if player_turn && !scheduler.is_busy() {
            play_player_step(&mut scheduler, &mut commander);
        }
        scheduler.tick(args.frame);
        frames += 1;
        turns = turns.max(scheduler.turn());

        let events = scheduler.drain_events();
        if args.verbose {
            for event in events {
                eprintln!("  [{}] {:?}: {}", event.turn, event.kind, event.description);
            }
        }
    }

    let outcome = scheduler.outcome();
    if outcome == BattleOutcome::Undecided {
        warn!(turns, frames, "Battle hit the cap without a winner");
    }
    info!(?outcome, turns, frames, "Battle finished");

    let mut battle_squads = setup.squads_after(scheduler.roster(), &catalog)?;
    // Separate stream from the battle's own rng
    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));
    let award = award_battle_xp(tuning.as_ref(), &mut battle_squads, outcome, turns, &mut rng);

    let survivors = scheduler
        .roster()
        .units()
        .iter()
        .filter(|unit| unit.is_alive())
        .map(|unit| SurvivorReport {
            definition: unit.definition.to_string(),
            team: unit.team,
            life: unit.stats.life,
            max_life: unit.stats.max_life,
        })
        .collect();

    let report = RunReport {
        outcome,
        turns,
        frames,
        seed,
        survivors,
        award,
    };

    match args.format.as_str() {
        "text" => print_text(&report),
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        other => {
            eprintln!("Unknown format '{}', defaulting to json", other);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

/// Issue the player side's next command: move, then attack, then end turn
fn play_player_step(scheduler: &mut TurnScheduler, commander: &mut NearestEnemyAi) {
    let resources = scheduler.resources();

    if resources.can_move() {
        let destination = scheduler
            .decision_context()
            .and_then(|context| commander.choose_move(&context));
        if let Some(tile) = destination {
            if scheduler.request_move(tile) {
                return;
            }
        }
    }

    let target = scheduler
        .decision_context()
        .and_then(|context| commander.choose_attack(&context));
    if let Some(tile) = target {
        if scheduler.request_attack(tile) {
            return;
        }
    }

    scheduler.request_end_turn();
}

fn print_text(report: &RunReport) {
    println!("Battle Result");
    println!("=============");
    println!("Outcome: {:?}", report.outcome);
    println!("Turns: {}", report.turns);
    println!("Seed: {}", report.seed);
    println!();
    println!("Survivors:");
    for unit in &report.survivors {
        println!(
            "  {:?} {} ({}/{})",
            unit.team, unit.definition, unit.life, unit.max_life
        );
    }
    println!();
    println!(
        "XP: {} total, {}/{} survivors",
        report.award.total_xp, report.award.alive_count, report.award.total_count
    );
    for unit in &report.award.units {
        println!(
            "  {}: +{} xp, level {} -> {}{}",
            unit.definition,
            unit.xp_awarded,
            unit.level_before,
            unit.level_after,
            if unit.reached_max_level { " (max)" } else { "" }
        );
    }
}
