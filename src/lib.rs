//! Business Risk Scoring Library
//!
//! Maps business records onto a fixed feature vector, scores them with a
//! pre-trained default classifier and risk-score regressor, and writes a
//! CSV report with a derived risk band.

pub mod config;
pub mod encoding;
pub mod feature_extractor;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod synthetic;
pub mod types;

pub use config::AppConfig;
pub use feature_extractor::{FeatureExtractor, FeatureMatrix, FeatureSchema, FEATURE_COLUMNS};
pub use models::ScoringEngine;
pub use pipeline::{RunOptions, RunOutcome};
pub use report::RunSummary;
pub use types::{
    prediction::{PredictionResult, PredictionSource, RiskBand},
    record::{BusinessRecord, RecordBatch},
};
