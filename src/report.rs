//! Output report assembly and run summary.

use crate::types::prediction::{PredictionResult, PredictionSource, RiskBand};
use crate::types::record::RecordBatch;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Columns appended to every output row
pub const PREDICTION_COLUMNS: [&str; 5] = [
    "default_probability",
    "default_flag",
    "risk_score",
    "risk_band",
    "prediction_source",
];

/// Output header: input columns (minus derived names) then prediction columns
pub fn output_columns(batch: &RecordBatch) -> Vec<String> {
    batch
        .columns
        .iter()
        .filter(|c| !PREDICTION_COLUMNS.contains(&c.as_str()))
        .cloned()
        .chain(PREDICTION_COLUMNS.iter().map(|c| c.to_string()))
        .collect()
}

/// Shortest text for a derived value.
///
/// Model outputs are single precision; a value that is exactly an `f32` is
/// printed as one so 0.1f32 reads "0.1", not its widened expansion.
pub fn format_value(value: f64) -> String {
    let narrow = value as f32;
    if narrow as f64 == value {
        narrow.to_string()
    } else {
        value.to_string()
    }
}

/// Write the merged records and predictions as CSV to `writer`
pub fn write_report<W: Write>(
    writer: W,
    batch: &RecordBatch,
    predictions: &[PredictionResult],
) -> Result<()> {
    if batch.len() != predictions.len() {
        bail!(
            "Cannot merge {} records with {} predictions",
            batch.len(),
            predictions.len()
        );
    }

    let input_columns: Vec<&String> = batch
        .columns
        .iter()
        .filter(|c| !PREDICTION_COLUMNS.contains(&c.as_str()))
        .collect();

    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(output_columns(batch))?;

    for (record, prediction) in batch.records.iter().zip(predictions) {
        let mut row: Vec<String> = input_columns
            .iter()
            .map(|c| record.get(c).unwrap_or_default().to_string())
            .collect();
        row.push(format_value(prediction.default_probability));
        row.push(prediction.default_flag_value().to_string());
        row.push(format_value(prediction.risk_score));
        row.push(prediction.risk_band.to_string());
        row.push(prediction.source.to_string());
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the report to a file
pub fn save_report<P: AsRef<Path>>(
    path: P,
    batch: &RecordBatch,
    predictions: &[PredictionResult],
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    write_report(file, batch, predictions)
        .with_context(|| format!("Failed to write report: {}", path.display()))
}

/// Aggregate view of one scoring run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub total: usize,
    /// Row counts for Low, Medium, High
    pub band_counts: [usize; 3],
    pub defaults: usize,
    pub non_defaults: usize,
    /// Mean clipped risk score; `None` for an empty run
    pub mean_risk_score: Option<f64>,
    pub source: PredictionSource,
    pub generated_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn from_predictions(predictions: &[PredictionResult], source: PredictionSource) -> Self {
        let mut band_counts = [0usize; 3];
        let mut defaults = 0;
        let mut score_sum = 0.0;

        for prediction in predictions {
            let idx = RiskBand::ALL
                .iter()
                .position(|b| *b == prediction.risk_band)
                .unwrap_or(0);
            band_counts[idx] += 1;
            if prediction.default_flag {
                defaults += 1;
            }
            score_sum += prediction.risk_score;
        }

        let total = predictions.len();
        Self {
            total,
            band_counts,
            defaults,
            non_defaults: total - defaults,
            mean_risk_score: (total > 0).then(|| score_sum / total as f64),
            source,
            generated_at: Utc::now(),
        }
    }

    /// Rows in a band
    pub fn band_count(&self, band: RiskBand) -> usize {
        match band {
            RiskBand::Low => self.band_counts[0],
            RiskBand::Medium => self.band_counts[1],
            RiskBand::High => self.band_counts[2],
        }
    }

    /// Share of rows in a band, in percent
    pub fn band_pct(&self, band: RiskBand) -> f64 {
        if self.total > 0 {
            self.band_count(band) as f64 / self.total as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let title = match self.source {
            PredictionSource::Model => "           BUSINESS RISK PREDICTION - RUN SUMMARY            ",
            PredictionSource::Demo => "     DEMO OUTPUT (NO TRAINED MODELS) - NOT REAL PREDICTIONS   ",
        };

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║{}║", title);
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Total Businesses: {:>8}                                   ║", self.total);
        info!("║ Risk Distribution:                                           ║");
        for band in RiskBand::ALL {
            info!(
                "║   {:8}: {:>6} ({:>5.1}%)                                   ║",
                band.as_str(),
                self.band_count(band),
                self.band_pct(band)
            );
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Default Predictions:                                         ║");
        info!("║   No Default: {:>6}                                         ║", self.non_defaults);
        info!("║   Default:    {:>6}                                         ║", self.defaults);
        info!("╠══════════════════════════════════════════════════════════════╣");
        match self.mean_risk_score {
            Some(mean) => info!("║ Average Risk Score: {:>6.1}                                   ║", mean),
            None => info!("║ Average Risk Score:    n/a                                   ║"),
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
        info!(
            source = %self.source,
            generated_at = %self.generated_at.to_rfc3339(),
            "Run complete"
        );
    }
}

/// Log the first `limit` rows with a readable assessment
pub fn log_preview(batch: &RecordBatch, predictions: &[PredictionResult], limit: usize) {
    if limit == 0 || predictions.is_empty() {
        return;
    }

    info!("Sample predictions (first {}):", limit.min(predictions.len()));
    for (idx, (record, prediction)) in batch
        .records
        .iter()
        .zip(predictions)
        .take(limit)
        .enumerate()
    {
        info!(
            business_id = record.get("business_id").unwrap_or("-"),
            industry_sector = record.get("industry_sector").unwrap_or("-"),
            risk_band = %prediction.risk_band,
            default_flag = prediction.default_flag_value(),
            "{}. {}",
            idx + 1,
            prediction.assessment()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::BusinessRecord;

    fn prediction(score: f64, flag: bool) -> PredictionResult {
        PredictionResult::from_raw(0.2, flag, score, PredictionSource::Model)
    }

    #[test]
    fn test_write_report_appends_prediction_columns() {
        let batch = RecordBatch::read_csv(
            "business_id,annual_revenue,risk_band\nBUS_1,1000,stale\nBUS_2,,stale\n".as_bytes(),
        )
        .unwrap();
        let predictions = vec![prediction(30.0, false), prediction(80.0, true)];

        let mut out = Vec::new();
        write_report(&mut out, &batch, &predictions).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "business_id,annual_revenue,default_probability,default_flag,risk_score,risk_band,prediction_source"
        );
        assert_eq!(lines[1], "BUS_1,1000,0.2,0,30,Low,model");
        assert_eq!(lines[2], "BUS_2,,0.2,1,80,High,model");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.1f32 as f64), "0.1");
        assert_eq!(format_value(0.1), "0.1");
        assert_eq!(format_value(30.0), "30");
        assert_eq!(format_value(0.123456789012), "0.123456789012");
    }

    #[test]
    fn test_write_report_single_precision_outputs() {
        let batch = RecordBatch::from_records(vec![BusinessRecord::new().with("business_id", "B1")]);
        let predictions = vec![PredictionResult::from_raw(
            0.1f32 as f64,
            false,
            42.7f32 as f64,
            PredictionSource::Model,
        )];

        let mut out = Vec::new();
        write_report(&mut out, &batch, &predictions).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text.lines().nth(1), Some("B1,0.1,0,42.7,Medium,model"));
    }

    #[test]
    fn test_write_report_length_mismatch() {
        let batch = RecordBatch::from_records(vec![BusinessRecord::new().with("a", "1")]);
        let mut out = Vec::new();
        assert!(write_report(&mut out, &batch, &[]).is_err());
    }

    #[test]
    fn test_run_summary_counts() {
        let predictions = vec![
            prediction(10.0, false),
            prediction(40.0, false),
            prediction(60.0, true),
            prediction(90.0, true),
        ];

        let summary = RunSummary::from_predictions(&predictions, PredictionSource::Model);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.band_count(RiskBand::Low), 2);
        assert_eq!(summary.band_count(RiskBand::Medium), 1);
        assert_eq!(summary.band_count(RiskBand::High), 1);
        assert_eq!(summary.band_pct(RiskBand::Low), 50.0);
        assert_eq!(summary.defaults, 2);
        assert_eq!(summary.non_defaults, 2);
        assert_eq!(summary.mean_risk_score, Some(50.0));
    }

    #[test]
    fn test_empty_run_summary() {
        let summary = RunSummary::from_predictions(&[], PredictionSource::Demo);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.mean_risk_score, None);
        assert_eq!(summary.band_pct(RiskBand::High), 0.0);
    }
}
