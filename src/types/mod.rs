//! Type definitions for the risk scoring pipeline

pub mod prediction;
pub mod record;

pub use prediction::{PredictionResult, PredictionSource, RiskBand};
pub use record::{BusinessRecord, RecordBatch};
