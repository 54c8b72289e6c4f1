//! Slotwise CLI
//!
//! Commands:
//! - `slotwise train` - Fit and persist the model, print the held-out score
//! - `slotwise predict` - Rank candidate slots read as a JSON array
//! - `slotwise record` - Append one rated meeting, retraining on policy
//! - `slotwise status` - Show dataset and model state

pub mod output;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::domain::{CandidateSlot, Observation};
use crate::persistence::{DatasetStore, ModelStore};
use crate::services::{FeedbackRecorder, Predictor, Trainer};
use output::OutputMode;

/// Meeting slot preference predictor
#[derive(Parser, Debug)]
#[command(name = "slotwise")]
#[command(author, version, about = "Rank meeting slots by predicted preference", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory (default.toml plus $SLOTWISE_ENV overrides)
    #[arg(short, long, default_value = "config", global = true)]
    pub config: PathBuf,

    /// Emit JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train on the dataset and replace the model artifact
    Train {
        /// Dataset to train on (default: storage.dataset_path)
        #[arg(short, long)]
        data: Option<PathBuf>,
    },

    /// Rank candidate slots for a user
    Predict {
        /// User the slots are proposed to
        #[arg(short, long)]
        user: String,
        /// JSON array of slots; `-` reads stdin
        #[arg(short, long, default_value = "-")]
        slots: PathBuf,
    },

    /// Record one rated meeting
    Record {
        /// JSON preference record; `-` reads stdin
        #[arg(short, long, default_value = "-")]
        input: PathBuf,
    },

    /// Show dataset and model state
    Status,
}

impl Cli {
    pub fn run(self, config: &AppConfig) -> Result<()> {
        let mode = OutputMode::from_json_flag(self.json);
        match self.command {
            Commands::Train { data } => run_train(config, data, mode),
            Commands::Predict { user, slots } => run_predict(config, &user, &slots, mode),
            Commands::Record { input } => run_record(config, &input, mode),
            Commands::Status => run_status(config, mode),
        }
    }
}

fn run_train(config: &AppConfig, data: Option<PathBuf>, mode: OutputMode) -> Result<()> {
    let dataset = DatasetStore::new(data.unwrap_or_else(|| config.storage.dataset_path.clone()));
    let models = ModelStore::new(&config.storage.model_path);

    let report = Trainer::from_config(config)
        .train(&dataset, &models)
        .with_context(|| format!("training on {} failed", dataset.path().display()))?;

    match mode {
        OutputMode::Json => output::print_item(&report, mode)?,
        OutputMode::Table => {
            println!("{}", report.summary_line());
            output::print_kv("Train rows", &report.n_train.to_string());
            output::print_kv("Held-out rows", &report.n_test.to_string());
            output::print_kv("Model", &report.model_path.display().to_string());
        }
    }
    Ok(())
}

fn run_predict(config: &AppConfig, user: &str, source: &Path, mode: OutputMode) -> Result<()> {
    let raw = read_input(source)?;
    let slots: Vec<CandidateSlot> =
        serde_json::from_str(&raw).context("slots must be a JSON array of slot objects")?;

    let ranked = Predictor::from_config(config).predict(user, slots)?;
    output::print_ranking(&ranked, mode)
}

fn run_record(config: &AppConfig, source: &Path, mode: OutputMode) -> Result<()> {
    let raw = read_input(source)?;
    let observation: Observation =
        serde_json::from_str(&raw).context("input must be a JSON preference record")?;

    let outcome = FeedbackRecorder::from_config(config).record(&observation)?;

    match mode {
        OutputMode::Json => output::print_item(
            &serde_json::json!({ "success": true, "outcome": outcome }),
            mode,
        )?,
        OutputMode::Table => {
            output::print_success(&format!("Recorded ({} rows)", outcome.row_count));
            if let Some(report) = &outcome.retrain {
                println!("{}", report.summary_line());
            }
        }
    }
    Ok(())
}

fn run_status(config: &AppConfig, mode: OutputMode) -> Result<()> {
    let dataset = DatasetStore::new(&config.storage.dataset_path);
    let models = ModelStore::new(&config.storage.model_path);
    let rows = dataset.row_count()?;
    let policy = config.retrain.policy();

    let model = if models.exists() {
        let pipeline = models.load()?;
        Some(serde_json::json!({
            "trained_at": pipeline.metadata.trained_at,
            "n_samples": pipeline.metadata.n_samples,
            "n_trees": pipeline.forest().n_trees(),
            "categories": pipeline.encoder().categories(),
        }))
    } else {
        None
    };

    match mode {
        OutputMode::Json => output::print_item(
            &serde_json::json!({
                "dataset": dataset.path(),
                "rows": rows,
                "model_path": models.path(),
                "model": model,
                "retrain_policy": format!("{policy:?}"),
            }),
            mode,
        )?,
        OutputMode::Table => {
            output::print_kv("Dataset", &dataset.path().display().to_string());
            output::print_kv("Rows", &rows.to_string());
            output::print_kv("Model", &models.path().display().to_string());
            output::print_kv("Retrain policy", &format!("{policy:?}"));
            match model {
                Some(m) => output::print_kv("Model info", &m.to_string()),
                None => output::print_warn("No model trained yet"),
            }
        }
    }
    Ok(())
}

fn read_input(source: &Path) -> Result<String> {
    if source == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(source).with_context(|| format!("failed to read {}", source.display()))
}
