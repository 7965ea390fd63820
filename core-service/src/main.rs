//! Rockfall CLI - dataset generation, training and offline prediction

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};

use rockfall_core::constants::{APP_VERSION, DEFAULT_MINE_ID};
use rockfall_core::logic::config::PipelineConfig;
use rockfall_core::logic::dataset::{generate_dataset, read_csv, relabel, write_csv, LabelDistribution};
use rockfall_core::logic::features::{FeatureVector, FieldPolicy};
use rockfall_core::logic::generator::{SampleGenerator, SamplingProfile};
use rockfall_core::logic::model::{ModelRegistry, RiskClassifier};
use rockfall_core::logic::response::{PredictionResponseBuilder, ResponseProfile};
use rockfall_core::logic::scoring::ScoringPolicy;
use rockfall_core::logic::training::{save_outcome, train_all};

#[derive(Parser)]
#[command(name = "rockfall")]
#[command(about = "Rockfall risk predictor: dataset, training and prediction", long_about = None)]
#[command(version = APP_VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Pipeline config file (JSON); environment variables are used otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a labeled synthetic dataset
    Generate {
        /// Number of samples
        #[arg(short = 'n', long)]
        samples: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,

        /// Scoring policy (initial, rebalanced)
        #[arg(long)]
        policy: Option<String>,

        /// Output CSV path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Relabel an existing dataset without regenerating features
    Rebalance {
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Defaults to overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, default_value = "rebalanced")]
        policy: String,
    },

    /// Train candidates and save the best models
    Train {
        #[arg(short, long)]
        dataset: Option<PathBuf>,

        #[arg(short, long)]
        model_dir: Option<PathBuf>,

        #[arg(long)]
        test_ratio: Option<f64>,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Predict from a JSON payload (inline or @file)
    Predict {
        payload: String,

        #[arg(short, long)]
        model_dir: Option<PathBuf>,

        /// Response profile (conservative, sensitive)
        #[arg(long, default_value = "conservative")]
        profile: String,
    },

    /// Print simulated sensor readings
    Simulate {
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Sampling profile (dataset, live, sensor_feed)
        #[arg(long, default_value = "sensor_feed")]
        profile: String,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, default_value = DEFAULT_MINE_ID)]
        mine_id: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => PipelineConfig::from_env().context("Invalid ROCKFALL_* environment")?,
    };

    log::info!("Rockfall CLI v{}", APP_VERSION);

    match cli.command {
        Commands::Generate { samples, seed, policy, output } => {
            let policy = match policy {
                Some(p) => p.parse::<ScoringPolicy>()?,
                None => config.scoring_policy,
            };
            let output = output.unwrap_or(config.dataset_path);
            let records = generate_dataset(
                samples.unwrap_or(config.samples),
                seed.unwrap_or(config.seed),
                policy,
            )?;
            write_csv(&output, &records)
                .with_context(|| format!("Failed to write dataset to {}", output.display()))?;
            println!("{} samples written to {}", records.len(), output.display());
            println!("{}", LabelDistribution::of(&records));
        }

        Commands::Rebalance { input, output, seed, policy } => {
            let input = input.unwrap_or_else(|| config.dataset_path.clone());
            let output = output.unwrap_or_else(|| input.clone());
            let policy: ScoringPolicy = policy.parse()?;

            let mut records =
                read_csv(&input).with_context(|| format!("Failed to read dataset {}", input.display()))?;
            let before = LabelDistribution::of(&records);
            relabel(&mut records, policy, seed.unwrap_or(config.rebalance_seed))?;
            write_csv(&output, &records)
                .with_context(|| format!("Failed to write dataset to {}", output.display()))?;

            println!("before: {}", before);
            println!("after:  {}", LabelDistribution::of(&records));
        }

        Commands::Train { dataset, model_dir, test_ratio, seed } => {
            let dataset = dataset.unwrap_or(config.dataset_path);
            let model_dir = model_dir.unwrap_or(config.model_dir);
            let mut training = config.training;
            if let Some(ratio) = test_ratio {
                training.test_ratio = ratio;
            }
            if let Some(seed) = seed {
                training.seed = seed;
            }

            let records =
                read_csv(&dataset).with_context(|| format!("Failed to read dataset {}", dataset.display()))?;
            let outcome = train_all(&records, &training)?;
            let saved = save_outcome(&outcome, &model_dir)?;

            for task in [&outcome.report.binary, &outcome.report.multiclass] {
                for c in &task.candidates {
                    println!("[{}] {:<20} accuracy={:.3} auc={:.3}", task.task, c.kind.as_str(), c.accuracy, c.auc);
                }
                println!("[{}] best: {}", task.task, task.best);
            }
            println!("report: {}", saved.report.display());
        }

        Commands::Predict { payload, model_dir, profile } => {
            let profile = ResponseProfile::by_name(&profile)
                .with_context(|| format!("Unknown response profile '{}'", profile))?;
            let model_dir = model_dir.unwrap_or(config.model_dir.clone());

            let map = parse_payload(&payload)?;
            let vector = FeatureVector::from_payload(&map, FieldPolicy::WithDefaults)?;
            log::debug!("Input features: {}", vector.to_log_entry());

            let registry = Arc::new(ModelRegistry::load_from_dir(&model_dir));
            let classifier = RiskClassifier::new(registry).with_override(config.confidence_override());
            let prediction = PredictionResponseBuilder::new(profile)
                .predict(&classifier, &vector)
                .context("Prediction failed")?;

            println!("{}", serde_json::to_string_pretty(&prediction)?);
        }

        Commands::Simulate { count, profile, seed, mine_id } => {
            let profile = SamplingProfile::by_name(&profile)
                .with_context(|| format!("Unknown sampling profile '{}'", profile))?;
            let mut generator = match seed {
                Some(seed) => SampleGenerator::seeded(profile, seed),
                None => SampleGenerator::from_entropy(profile),
            };
            for _ in 0..count {
                println!("{}", serde_json::to_string(&generator.sensor_reading(&mine_id))?);
            }
        }
    }

    Ok(())
}

/// Inline JSON object, or `@path` to read it from a file
fn parse_payload(arg: &str) -> Result<Map<String, Value>> {
    let text = match arg.strip_prefix('@') {
        Some(path) => fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?,
        None => arg.to_string(),
    };
    match serde_json::from_str::<Value>(&text).context("Payload is not valid JSON")? {
        Value::Object(map) if !map.is_empty() => Ok(map),
        Value::Object(_) => bail!("Payload is empty"),
        _ => bail!("Payload must be a JSON object"),
    }
}
