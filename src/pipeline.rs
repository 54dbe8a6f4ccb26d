//! One scoring run: load records, map features, score, write the report.
//!
//! Everything is read and scored before the output file is created, so a
//! failure anywhere leaves no partial report behind.

use crate::config::AppConfig;
use crate::feature_extractor::FeatureExtractor;
use crate::models::ScoringEngine;
use crate::report::{self, RunSummary};
use crate::synthetic::BusinessGenerator;
use crate::types::prediction::PredictionResult;
use crate::types::record::RecordBatch;
use anyhow::{bail, Result};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Per-run options, typically from the command line
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Input CSV; synthetic businesses are generated when absent
    pub input: Option<PathBuf>,
    /// Output CSV path
    pub output: PathBuf,
    /// Number of synthetic businesses when there is no input
    pub samples: usize,
    /// Seed for synthetic businesses
    pub seed: u64,
    /// Rows shown in the preview log
    pub preview_rows: usize,
}

impl RunOptions {
    /// Options derived from configuration alone
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            input: None,
            output: PathBuf::from(&config.report.default_output),
            samples: config.synthetic.default_samples,
            seed: config.synthetic.seed,
            preview_rows: config.report.preview_rows,
        }
    }
}

/// Result of a completed run
#[derive(Debug)]
pub struct RunOutcome {
    pub batch: RecordBatch,
    pub predictions: Vec<PredictionResult>,
    pub summary: RunSummary,
}

/// Load the input records, or generate synthetic ones
pub fn load_records(options: &RunOptions) -> Result<RecordBatch> {
    match &options.input {
        Some(path) => {
            info!(path = %path.display(), "Loading input data");
            RecordBatch::load_csv(path)
        }
        None => {
            info!(samples = options.samples, seed = options.seed, "Generating sample businesses");
            Ok(BusinessGenerator::new(options.seed).generate_batch(options.samples))
        }
    }
}

/// Run the whole pipeline with predictors loaded per `config`
pub fn run(config: &AppConfig, options: &RunOptions) -> Result<RunOutcome> {
    let mut engine = ScoringEngine::load(config)?;
    run_with_engine(&mut engine, options)
}

/// Run the whole pipeline with an already-built scoring engine
pub fn run_with_engine(engine: &mut ScoringEngine, options: &RunOptions) -> Result<RunOutcome> {
    let start_time = Instant::now();

    let batch = load_records(options)?;
    info!(records = batch.len(), columns = batch.columns.len(), "Records to process");

    let extractor = FeatureExtractor::new();
    let features = extractor.extract_batch(&batch)?;
    info!(
        rows = features.rows(),
        features = features.cols(),
        "Feature matrix built"
    );

    let predictions = engine.score(&features)?;
    if predictions.len() != batch.len() {
        bail!(
            "Scoring produced {} predictions for {} records",
            predictions.len(),
            batch.len()
        );
    }

    report::save_report(&options.output, &batch, &predictions)?;
    info!(
        path = %options.output.display(),
        source = %engine.source(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Predictions saved"
    );

    let summary = RunSummary::from_predictions(&predictions, engine.source());

    Ok(RunOutcome {
        batch,
        predictions,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inference::tests::{StubClassifier, StubRegressor};
    use crate::models::Scorer;
    use crate::types::prediction::{PredictionSource, RiskBand};
    use tempfile::tempdir;

    fn options(dir: &std::path::Path, input: Option<PathBuf>, samples: usize) -> RunOptions {
        RunOptions {
            input,
            output: dir.join("predictions.csv"),
            samples,
            seed: 42,
            preview_rows: 5,
        }
    }

    #[test]
    fn test_end_to_end_with_stub_models() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.csv");
        std::fs::write(
            &input,
            "annual_revenue,profit_margin,industry_sector,region_parish\n1000000,0.25,Retail,Orleans\n",
        )
        .unwrap();

        let mut engine = ScoringEngine::Trained(Scorer::new(
            Box::new(StubClassifier {
                label: 0,
                probability: 0.1,
            }),
            Box::new(StubRegressor(30.0)),
        ));
        let opts = options(dir.path(), Some(input), 0);

        let outcome = run_with_engine(&mut engine, &opts).unwrap();

        assert_eq!(outcome.predictions.len(), 1);
        let p = &outcome.predictions[0];
        assert_eq!(p.default_probability, 0.1);
        assert!(!p.default_flag);
        assert_eq!(p.risk_score, 30.0);
        assert_eq!(p.risk_band, RiskBand::Low);

        let written = RecordBatch::load_csv(&opts.output).unwrap();
        let row = &written.records[0];
        assert_eq!(row.get("annual_revenue"), Some("1000000"));
        assert_eq!(row.get("default_probability"), Some("0.1"));
        assert_eq!(row.get("default_flag"), Some("0"));
        assert_eq!(row.get("risk_score"), Some("30"));
        assert_eq!(row.get("risk_band"), Some("Low"));
        assert_eq!(row.get("prediction_source"), Some("model"));
    }

    #[test]
    fn test_fallback_run_without_artifacts() {
        let dir = tempdir().unwrap();
        let mut config = AppConfig::default();
        config.models.models_dir = dir.path().join("models").to_string_lossy().into_owned();
        let opts = options(dir.path(), None, 5);

        let outcome = run(&config, &opts).unwrap();

        assert_eq!(outcome.summary.source, PredictionSource::Demo);
        let written = RecordBatch::load_csv(&opts.output).unwrap();
        assert_eq!(written.len(), 5);
        for row in &written.records {
            assert!(matches!(row.get("risk_band"), Some("Low" | "Medium" | "High")));
            assert!(matches!(row.get("default_flag"), Some("0" | "1")));
            assert_eq!(row.get("prediction_source"), Some("demo"));
        }
    }

    #[test]
    fn test_malformed_input_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.csv");
        std::fs::write(&input, "annual_revenue,profit_margin\n100,0.1\n200\n").unwrap();

        let mut engine = ScoringEngine::demo(42);
        let opts = options(dir.path(), Some(input), 0);

        assert!(run_with_engine(&mut engine, &opts).is_err());
        assert!(!opts.output.exists());
    }

    #[test]
    fn test_non_numeric_feature_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.csv");
        std::fs::write(&input, "employee_count\nmany\n").unwrap();

        let mut engine = ScoringEngine::demo(42);
        let opts = options(dir.path(), Some(input), 0);

        assert!(run_with_engine(&mut engine, &opts).is_err());
        assert!(!opts.output.exists());
    }
}
