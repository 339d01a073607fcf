//! Headless simulation runner (default binary).
//!
//! Two modes:
//!
//! - default: a greedy autoplayer runs a whole ladder and prints a summary
//!   (or the final snapshot with `--json`)
//! - `--stdio`: a paced session reading JSON commands from stdin and writing
//!   JSON frames to stdout
//!
//! Every session flag falls back to a `KRUSH_*` environment variable.

use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::Parser;
use tokio::sync::mpsc;

use kombat_krush::autoplay;
use kombat_krush::core::{Encounter, MeterPolicy};
use kombat_krush::engine::{read_commands, run_session, spawn_writer, SessionConfig};
use kombat_krush::types::{Difficulty, PieceKind, ANIMATION_DELAY_MS};

#[derive(Debug, Parser)]
#[command(name = "krush-sim", about = "Headless match-3 combat simulator")]
struct Args {
    /// RNG seed; the same seed replays the same run
    #[arg(long, env = "KRUSH_SEED", default_value_t = 1)]
    seed: u32,

    /// Player character (scorpion, subzero, raiden, reptile, kano, liukang, kitana, mileena, sonya)
    #[arg(long, env = "KRUSH_CHARACTER", default_value = "subzero", value_parser = parse_character)]
    character: PieceKind,

    /// Ladder difficulty: easy | normal | hard
    #[arg(long, env = "KRUSH_DIFFICULTY", default_value = "normal", value_parser = parse_difficulty)]
    difficulty: Difficulty,

    /// Ability meter charging: own | all
    #[arg(long, env = "KRUSH_METER", default_value = "own", value_parser = parse_meter)]
    meter: MeterPolicy,

    /// Pacing unit in milliseconds for --stdio; 0 disables pauses
    #[arg(long, env = "KRUSH_ANIMATION_MS", default_value_t = ANIMATION_DELAY_MS)]
    animation_ms: u32,

    /// Keep the player at 1 health instead of losing
    #[arg(long, env = "KRUSH_NON_LETHAL", value_parser = BoolishValueParser::new())]
    non_lethal: bool,

    /// Stop autoplay after this many actions
    #[arg(long, default_value_t = 500)]
    max_actions: u32,

    /// Print the final snapshot as JSON instead of a summary line
    #[arg(long)]
    json: bool,

    /// Serve a paced JSON-lines session over stdin/stdout
    #[arg(long, conflicts_with = "json")]
    stdio: bool,
}

fn parse_character(s: &str) -> Result<PieceKind, String> {
    PieceKind::from_str(s).ok_or_else(|| format!("unknown character {s:?}"))
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    Difficulty::from_str(s).ok_or_else(|| format!("unknown difficulty {s:?}"))
}

fn parse_meter(s: &str) -> Result<MeterPolicy, String> {
    MeterPolicy::from_str(s).ok_or_else(|| format!("unknown meter policy {s:?}"))
}

impl Args {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            seed: self.seed,
            character: self.character,
            difficulty: self.difficulty,
            animation_ms: self.animation_ms,
            non_lethal: self.non_lethal,
            meter_policy: self.meter,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.stdio {
        serve_stdio(args.session_config()).await
    } else {
        simulate(&args)
    }
}

fn simulate(args: &Args) -> Result<()> {
    let config = args.session_config();
    let mut enc = Encounter::start(config.encounter_config()).context("starting encounter")?;
    let summary = autoplay::run(&mut enc, args.max_actions).context("autoplay")?;

    if args.json {
        let line = serde_json::to_string(&enc.snapshot()).context("encoding snapshot")?;
        println!("{line}");
    } else {
        println!(
            "{} ({}) seed {}: {} after {} actions, {} abilities, {}/{} levels, score {}, max combo x{}",
            config.character.display_name(),
            config.difficulty.as_str(),
            config.seed,
            summary.status.as_str(),
            summary.actions,
            summary.abilities,
            summary.levels_cleared,
            enc.ladder().len(),
            summary.score,
            summary.max_combo,
        );
    }
    Ok(())
}

async fn serve_stdio(config: SessionConfig) -> Result<()> {
    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (frame_tx, frame_rx) = mpsc::channel(256);

    let writer = spawn_writer(tokio::io::stdout(), frame_rx);
    let reader = tokio::spawn(read_commands(tokio::io::stdin(), cmd_tx, frame_tx.clone()));

    let enc = run_session(config, cmd_rx, frame_tx).await?;
    // stdin may still be open; the session is over either way
    reader.abort();
    let lines = writer.await.context("frame writer panicked")??;
    tracing::info!(lines, score = enc.combat().score, "stdio session closed");
    Ok(())
}
