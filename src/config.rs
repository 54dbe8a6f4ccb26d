//! Configuration management for the risk scoring pipeline

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub models: ModelsConfig,
    pub synthetic: SyntheticConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

/// Predictor artifact configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Directory containing the ONNX model files
    pub models_dir: String,
    /// Classifier artifact file name
    pub classifier_file: String,
    /// Regressor artifact file name
    pub regressor_file: String,
    /// Feature schema sidecar file name
    pub schema_file: String,
    /// Number of threads for ONNX inference per model
    pub onnx_threads: usize,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            models_dir: "models".to_string(),
            classifier_file: "xgboost_classifier.onnx".to_string(),
            regressor_file: "xgboost_regressor.onnx".to_string(),
            schema_file: "feature_schema.json".to_string(),
            onnx_threads: 1,
        }
    }
}

/// Synthetic sample generation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Number of businesses generated when no input file is given
    pub default_samples: usize,
    /// Seed for sample and demo prediction generation
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            default_samples: 10,
            seed: 42,
        }
    }
}

/// Report output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output CSV path when none is given on the command line
    pub default_output: String,
    /// Number of rows shown in the preview log
    pub preview_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_output: "predictions.csv".to_string(),
            preview_rows: 5,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific path.
    ///
    /// The file is optional; missing keys take built-in defaults and
    /// `RISK__SECTION__KEY` environment variables override both.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(Environment::with_prefix("RISK").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
