//! Business Risk Prediction - Main Entry Point
//!
//! Loads the trained classifier and regressor, scores an input CSV (or
//! generated sample businesses) and writes a predictions report.

use anyhow::Result;
use business_risk_scoring::{
    config::{AppConfig, LoggingConfig, DEFAULT_CONFIG_PATH},
    pipeline::{self, RunOptions},
    report,
};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "risk-predict")]
#[command(about = "Business default and risk score prediction", long_about = None)]
struct Cli {
    /// Input CSV file with business data
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output CSV file for predictions
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of sample businesses to generate (if no input)
    #[arg(short = 'n', long)]
    samples: Option<usize>,

    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory holding the model artifacts
    #[arg(long)]
    models_dir: Option<String>,

    /// Seed for sample businesses and demo predictions
    #[arg(long)]
    seed: Option<u64>,
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&logging.level))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from_path(&cli.config)?;
    if let Some(dir) = cli.models_dir {
        config.models.models_dir = dir;
    }
    if let Some(seed) = cli.seed {
        config.synthetic.seed = seed;
    }

    init_logging(&config.logging)?;
    info!("Starting Business Risk Prediction");

    let mut options = RunOptions::from_config(&config);
    options.input = cli.input;
    if let Some(output) = cli.output {
        options.output = output;
    }
    if let Some(samples) = cli.samples {
        options.samples = samples;
    }

    let outcome = pipeline::run(&config, &options)?;

    outcome.summary.print_summary();
    report::log_preview(&outcome.batch, &outcome.predictions, options.preview_rows);

    Ok(())
}
