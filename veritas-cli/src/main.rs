//! Veritas CLI
//!
//! Scores products and companies from sparse, weighted signals.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use veritas_core::{AggregationResult, AlphaStrategy, Observation, Signal};
use veritas_runtime::{
    EngineSettings, EntityRequest, InMemoryScoreStore, PersistOutcome, ScoreRecord, TrustEngine,
};

#[derive(Parser)]
#[command(name = "veritas")]
#[command(author, version, long_about = None)]
#[command(about = "Veritas: trust scores from sparse, weighted signals")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (TOML)
    #[arg(short, long, global = true, env = "VERITAS_CONFIG")]
    config: Option<PathBuf>,

    /// Weight profiles file (TOML), overrides the settings file
    #[arg(long, global = true, env = "VERITAS_PROFILES")]
    profiles: Option<PathBuf>,

    /// Verbosity level (0-3)
    #[arg(short, long, global = true, default_value = "1")]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one entity from a JSON file of observations or signals
    Score {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Entity identifier (overrides the input file)
        #[arg(short, long)]
        entity: Option<String>,

        /// Entity vertical, selects the weight profile
        #[arg(long)]
        vertical: Option<String>,

        /// Prior belief used when data is absent
        #[arg(long)]
        prior: Option<f64>,

        /// Alpha strategy: missingSum or fixed
        #[arg(long)]
        alpha_strategy: Option<AlphaStrategy>,

        /// Constant alpha for the fixed strategy
        #[arg(long)]
        alpha_fixed: Option<f64>,

        /// Coverage below which the score is flagged low-confidence
        #[arg(long)]
        min_coverage_warn: Option<f64>,

        /// Half-life in days for time decay of dated observations
        #[arg(long)]
        decay_days: Option<f64>,

        /// Include the full breakdown in the output
        #[arg(long, env = "VERITAS_INCLUDE_DIAGNOSTICS")]
        include_diagnostics: bool,

        /// Attach diagnostics to an in-memory score record
        #[arg(long)]
        persist: bool,
    },

    /// List weight profiles
    Profiles,

    /// Show effective settings
    Config,
}

/// Input file: either profile-keyed observations or a raw signal list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityInput {
    #[serde(default)]
    entity_id: Option<String>,
    #[serde(default)]
    vertical: Option<String>,
    #[serde(default)]
    observations: HashMap<String, Observation>,
    #[serde(default)]
    signals: Option<Vec<Signal>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let mut settings = match &cli.config {
        Some(path) => EngineSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => EngineSettings::default(),
    };
    if cli.profiles.is_some() {
        settings.profiles_path = cli.profiles.clone();
    }

    match cli.command {
        Commands::Score {
            input,
            entity,
            vertical,
            prior,
            alpha_strategy,
            alpha_fixed,
            min_coverage_warn,
            decay_days,
            include_diagnostics,
            persist,
        } => {
            if let Some(prior) = prior {
                settings.aggregator.prior = prior;
            }
            if let Some(strategy) = alpha_strategy {
                settings.aggregator.alpha_strategy = strategy;
            }
            if let Some(alpha) = alpha_fixed {
                settings.aggregator.alpha_fixed = alpha;
            }
            if let Some(threshold) = min_coverage_warn {
                settings.aggregator.min_coverage_warn = threshold;
            }
            if decay_days.is_some() {
                settings.aggregator.time_decay_days = decay_days;
            }
            settings.include_diagnostics |= include_diagnostics;
            settings.persist_diagnostics |= persist;

            run_score(&settings, &input, entity, vertical).await?;
        }
        Commands::Profiles => {
            list_profiles(&settings)?;
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }

    Ok(())
}

async fn run_score(
    settings: &EngineSettings,
    input: &Path,
    entity: Option<String>,
    vertical: Option<String>,
) -> Result<()> {
    let content = fs::read_to_string(input)
        .with_context(|| format!("reading input {}", input.display()))?;
    let parsed: EntityInput = serde_json::from_str(&content)
        .with_context(|| format!("parsing input {}", input.display()))?;

    let entity_id = entity
        .or(parsed.entity_id)
        .unwrap_or_else(|| "anonymous".to_string());
    let vertical = vertical.or(parsed.vertical);

    let store = Arc::new(InMemoryScoreStore::new());
    let engine = TrustEngine::from_settings(settings)?.with_store(store.clone());

    let result = match parsed.signals {
        Some(signals) => {
            let mut options = settings.aggregator.clone();
            if vertical.is_some() {
                options.vertical = vertical;
            }
            engine.aggregate(&signals, &options, chrono::Utc::now())
        }
        None => {
            let mut request = EntityRequest::new(&entity_id);
            request.vertical = vertical;
            request.observations = parsed.observations;
            let computation = engine.score_entity(request);
            info!("Scored '{}' with profile '{}'", entity_id, computation.profile);
            computation.result
        }
    };

    if settings.persist_diagnostics {
        persist_demo(&engine, &store, &entity_id, &result).await;
    }

    let view = result.to_view(settings.include_diagnostics);
    println!("{}", serde_json::to_string_pretty(&view)?);

    Ok(())
}

/// Record the score as the surrounding workflow would, then attach diagnostics
async fn persist_demo(
    engine: &TrustEngine,
    store: &InMemoryScoreStore,
    entity_id: &str,
    result: &AggregationResult,
) {
    store.insert(ScoreRecord::new(entity_id, result.score));

    let Some(handle) = engine.persist(entity_id, result) else {
        return;
    };

    match handle.outcome().await {
        PersistOutcome::Attached { score_id } => {
            info!("Diagnostics attached to score record {}", score_id)
        }
        PersistOutcome::NoScoreRecord => info!("No score record for '{}'", entity_id),
        PersistOutcome::Failed(reason) => info!("Diagnostics not persisted: {}", reason),
    }
}

fn list_profiles(settings: &EngineSettings) -> Result<()> {
    let registry = settings.load_profiles()?;

    let mut profiles = vec![registry.default_profile()];
    profiles.extend(
        registry
            .verticals()
            .into_iter()
            .map(|v| registry.for_vertical(Some(v))),
    );

    for profile in profiles {
        println!("[{}]", profile.name);
        for (key, weight) in &profile.weights {
            println!("  {:<16} {:.2}", key, weight);
        }
    }

    Ok(())
}
