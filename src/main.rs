//! Kaiord - command-line TCX <-> KRD conversion
//!
//! Main entry point for the `kaiord` binary.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use kaiord::config::{self, AppConfig};
use kaiord::krd::structure::{ensure_document_block_ids, flatten_for_display, UuidBlockIdGenerator};
use kaiord::krd::types::{Duration, KrdDocument};
use kaiord::krd::validation::validate_workout;
use kaiord::tcx::{StructuralValidator, TcxReader, TcxWriter};

#[derive(Parser)]
#[command(name = "kaiord")]
#[command(about = "Structured workout conversion between TCX and KRD", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Default log level when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a TCX workout to KRD JSON
    TcxToKrd {
        /// TCX input file
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a KRD JSON document to TCX
    KrdToTcx {
        /// KRD input file
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a TCX file against the workout schema
    Validate {
        /// TCX input file
        input: PathBuf,
    },

    /// Print the flattened step bars of a KRD workout
    Bars {
        /// KRD input file
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    }
    .context("Failed to load configuration")?;

    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    kaiord::logging::init_with_level(level);

    tracing::debug!("Starting kaiord v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::TcxToKrd { input, output } => cmd_tcx_to_krd(&input, output.as_deref(), &config),
        Commands::KrdToTcx { input, output } => {
            cmd_krd_to_tcx(&input, output.as_deref(), &config).await
        }
        Commands::Validate { input } => cmd_validate(&input),
        Commands::Bars { input } => cmd_bars(&input),
    }
}

fn cmd_tcx_to_krd(input: &Path, output: Option<&Path>, config: &AppConfig) -> Result<()> {
    let xml = read_input(input)?;
    let krd = TcxReader::new()
        .read(&xml)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    let json = if config.output.pretty_json {
        serde_json::to_string_pretty(&krd)?
    } else {
        serde_json::to_string(&krd)?
    };

    write_output(output, &json)
}

async fn cmd_krd_to_tcx(input: &Path, output: Option<&Path>, config: &AppConfig) -> Result<()> {
    let krd = load_krd(input)?;

    if let Some(workout) = krd.workout() {
        if let Err(e) = validate_workout(workout) {
            tracing::warn!(error = %e, "Workout is outside the usual bounds");
        }
    }

    let writer = TcxWriter::new(StructuralValidator::new()).with_options(config.output.xml_options());
    let xml = writer
        .write(&krd)
        .await
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    write_output(output, &xml)
}

fn cmd_validate(input: &Path) -> Result<()> {
    let xml = read_input(input)?;
    let outcome = StructuralValidator::new().check(&xml);

    if outcome.valid {
        println!("{}: valid", input.display());
        return Ok(());
    }

    eprintln!("{}: {} issue(s)", input.display(), outcome.errors.len());
    for issue in &outcome.errors {
        eprintln!("  - {}", issue);
    }
    bail!("{} failed validation", input.display())
}

fn cmd_bars(input: &Path) -> Result<()> {
    let krd = ensure_document_block_ids(&load_krd(input)?, &mut UuidBlockIdGenerator);
    let workout = krd
        .workout()
        .context("KRD document does not contain a workout")?;

    for bar in flatten_for_display(workout) {
        let label = bar
            .step
            .name
            .clone()
            .unwrap_or_else(|| format!("Step {}", bar.step.step_index + 1));
        let repeat = bar
            .block
            .map(|occurrence| format!(" [{}/{}]", occurrence.repetition + 1, occurrence.repeat_count))
            .unwrap_or_default();

        println!(
            "{:>3}  {:<20} {:<12} {}{}",
            bar.position + 1,
            label,
            describe_duration(&bar.step.duration),
            bar.step.target.kind(),
            repeat
        );
    }

    Ok(())
}

fn describe_duration(duration: &Duration) -> String {
    match duration {
        Duration::Time { seconds } => format!("{}s", seconds),
        Duration::Distance { meters } => format!("{}m", meters),
        other => other.kind().to_string(),
    }
}

fn load_krd(input: &Path) -> Result<KrdDocument> {
    let json = read_input(input)?;
    serde_json::from_str(&json).with_context(|| format!("Invalid KRD document {}", input.display()))
}

fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "Output written");
        }
        None => println!("{}", content),
    }
    Ok(())
}
