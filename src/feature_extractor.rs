//! Feature extraction for business risk model inference.
//!
//! This module maps business records onto the fixed-order feature vector
//! the classifier and regressor were fitted against.

use crate::encoding::{encode_industry, encode_region};
use crate::types::record::{BusinessRecord, RecordBatch};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Version tag of [`FEATURE_COLUMNS`]. Bump whenever the list changes.
pub const FEATURE_SCHEMA_VERSION: u32 = 1;

/// Raw categorical column holding the industry sector name
pub const INDUSTRY_COLUMN: &str = "industry_sector";
/// Raw categorical column holding the region parish name
pub const REGION_COLUMN: &str = "region_parish";
/// Encoded industry sector feature
pub const INDUSTRY_ENCODED: &str = "industry_sector_encoded";
/// Encoded region parish feature
pub const REGION_ENCODED: &str = "region_parish_encoded";

/// Number of features in the model input vector
pub const FEATURE_COUNT: usize = 40;

/// Model input columns in training order.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    // Financial (13)
    "annual_revenue",
    "revenue_growth_yoy",
    "revenue_volatility",
    "profit_margin",
    "gross_margin",
    "operating_margin",
    "avg_bank_balance",
    "min_bank_balance_last_12m",
    "bank_balance_volatility",
    "cash_inflow_monthly_avg",
    "cash_outflow_monthly_avg",
    "cash_to_monthly_expense_ratio",
    "net_cash_flow_trend",
    // Debt (5)
    "total_debt",
    "debt_to_revenue",
    "debt_service_coverage_ratio",
    "credit_utilization_ratio",
    "loan_payment_to_revenue",
    // Workforce (5)
    "employee_count",
    "payroll_to_revenue",
    "avg_wage_per_employee",
    "employee_growth_rate",
    "payroll_consistency_score",
    // Credit & compliance (8)
    "credit_score_business",
    "credit_score_owner",
    "years_in_business",
    "days_past_due_max_last_12m",
    "num_late_payments_last_12m",
    "num_returned_payments_last_12m",
    "has_tax_lien",
    "bankruptcy_history",
    // Operational (4)
    "missed_payroll_count_last_12m",
    "overdraft_count_last_12m",
    "overdraft_days_last_12m",
    "utilization_rate_card",
    // IGS benchmarks (3)
    "igs_sales_index",
    "igs_employment_index",
    "igs_small_business_index",
    // Encoded categorical (2)
    INDUSTRY_ENCODED,
    REGION_ENCODED,
];

/// Number of plain numeric features (everything except the two encodings)
pub const NUMERIC_FEATURE_COUNT: usize = FEATURE_COUNT - 2;

/// Value substituted for absent numeric fields
pub const DEFAULT_FEATURE_VALUE: f32 = 0.0;

/// Versioned feature layout shared between this crate and the model artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub version: u32,
    pub features: Vec<String>,
}

impl FeatureSchema {
    /// The layout this crate produces
    pub fn current() -> Self {
        Self {
            version: FEATURE_SCHEMA_VERSION,
            features: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Load a schema sidecar written next to the model artifacts
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open feature schema: {}", path.display()))?;
        serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse feature schema: {}", path.display()))
    }

    /// Fail unless `other` describes exactly the same layout as `self`.
    pub fn ensure_matches(&self, other: &FeatureSchema) -> Result<()> {
        if self.version != other.version {
            bail!(
                "Feature schema version mismatch: mapper produces v{}, models expect v{}",
                self.version,
                other.version
            );
        }
        if self.features.len() != other.features.len() {
            bail!(
                "Feature count mismatch: mapper produces {}, models expect {}",
                self.features.len(),
                other.features.len()
            );
        }
        if let Some((idx, (ours, theirs))) = self
            .features
            .iter()
            .zip(&other.features)
            .enumerate()
            .find(|(_, (a, b))| a != b)
        {
            bail!(
                "Feature order mismatch at position {}: mapper has '{}', models expect '{}'",
                idx,
                ours,
                theirs
            );
        }
        Ok(())
    }
}

/// Row-major batch of feature vectors
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Vec<f32>,
    rows: usize,
}

impl FeatureMatrix {
    /// Build a matrix from rows of exactly [`FEATURE_COUNT`] values
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let mut data = Vec::with_capacity(rows.len() * FEATURE_COUNT);
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != FEATURE_COUNT {
                bail!(
                    "Row {} has {} features, expected {}",
                    idx,
                    row.len(),
                    FEATURE_COUNT
                );
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            rows: rows.len(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        FEATURE_COUNT
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Feature vector for one row
    pub fn row(&self, idx: usize) -> &[f32] {
        &self.data[idx * FEATURE_COUNT..(idx + 1) * FEATURE_COUNT]
    }

    /// Flat row-major storage
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Feature extractor that transforms business records into model input features.
///
/// Missing numeric fields become 0 and missing or unknown categories fall
/// back to their table's default code; incompleteness is never an error.
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Create a new feature extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract features from a record.
    ///
    /// Returns a vector of [`FEATURE_COUNT`] values in [`FEATURE_COLUMNS`]
    /// order. The only failure is a present numeric cell that is not a
    /// number, which marks the input file as malformed.
    pub fn extract(&self, record: &BusinessRecord) -> Result<Vec<f32>> {
        let mut features = Vec::with_capacity(FEATURE_COUNT);

        for name in &FEATURE_COLUMNS[..NUMERIC_FEATURE_COUNT] {
            features.push(numeric_field(record, name)?);
        }

        features.push(self.industry_code(record)?);
        features.push(self.region_code(record)?);

        Ok(features)
    }

    /// Extract a whole batch into one matrix.
    pub fn extract_batch(&self, batch: &RecordBatch) -> Result<FeatureMatrix> {
        let rows = batch
            .records
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                self.extract(record)
                    .with_context(|| format!("Invalid value in record {}", idx + 1))
            })
            .collect::<Result<Vec<_>>>()?;
        FeatureMatrix::from_rows(rows)
    }

    /// Raw sector name wins; a pre-encoded column is used only when the raw one is absent.
    fn industry_code(&self, record: &BusinessRecord) -> Result<f32> {
        match record.get(INDUSTRY_COLUMN) {
            Some(name) => Ok(encode_industry(Some(name)) as f32),
            None => match record.get(INDUSTRY_ENCODED) {
                Some(_) => numeric_field(record, INDUSTRY_ENCODED),
                None => Ok(encode_industry(None) as f32),
            },
        }
    }

    fn region_code(&self, record: &BusinessRecord) -> Result<f32> {
        match record.get(REGION_COLUMN) {
            Some(name) => Ok(encode_region(Some(name)) as f32),
            None => match record.get(REGION_ENCODED) {
                Some(_) => numeric_field(record, REGION_ENCODED),
                None => Ok(encode_region(None) as f32),
            },
        }
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    /// Get feature names in model order.
    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_COLUMNS
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a numeric or boolean cell; absent cells yield the default value.
fn numeric_field(record: &BusinessRecord, name: &str) -> Result<f32> {
    let Some(raw) = record.get(name) else {
        return Ok(DEFAULT_FEATURE_VALUE);
    };

    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" => return Ok(1.0),
        "false" | "no" => return Ok(0.0),
        _ => {}
    }

    raw.parse::<f64>()
        .map(|v| v as f32)
        .with_context(|| format!("Column '{}' has non-numeric value '{}'", name, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{IndustrySector, RegionParish};

    fn index_of(name: &str) -> usize {
        FEATURE_COLUMNS.iter().position(|c| *c == name).unwrap()
    }

    #[test]
    fn test_feature_count() {
        let extractor = FeatureExtractor::new();
        assert_eq!(extractor.feature_count(), FEATURE_COUNT);
        assert_eq!(extractor.feature_names().len(), FEATURE_COUNT);
        assert_eq!(FEATURE_COLUMNS[FEATURE_COUNT - 2], INDUSTRY_ENCODED);
        assert_eq!(FEATURE_COLUMNS[FEATURE_COUNT - 1], REGION_ENCODED);
    }

    #[test]
    fn test_feature_names_unique() {
        let mut names = FEATURE_COLUMNS.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_empty_record_yields_defaults() {
        let extractor = FeatureExtractor::new();
        let features = extractor.extract(&BusinessRecord::new()).unwrap();

        assert_eq!(features.len(), FEATURE_COUNT);
        assert!(features[..NUMERIC_FEATURE_COUNT]
            .iter()
            .all(|&v| v == DEFAULT_FEATURE_VALUE));
        assert_eq!(
            features[index_of(INDUSTRY_ENCODED)],
            IndustrySector::Other.code() as f32
        );
        assert_eq!(
            features[index_of(REGION_ENCODED)],
            RegionParish::Ouachita.code() as f32
        );
    }

    #[test]
    fn test_feature_extraction() {
        let extractor = FeatureExtractor::new();
        let record = BusinessRecord::new()
            .with("business_id", "BUS_0001")
            .with("profit_margin", "0.25")
            .with("annual_revenue", "1000000")
            .with(INDUSTRY_COLUMN, "Retail")
            .with(REGION_COLUMN, "Orleans")
            .with("has_tax_lien", "True");

        let features = extractor.extract(&record).unwrap();

        assert_eq!(features[0], 1_000_000.0); // annual_revenue
        assert_eq!(features[3], 0.25); // profit_margin
        assert_eq!(features[index_of("has_tax_lien")], 1.0);
        assert_eq!(features[index_of("gross_margin")], 0.0);
        assert_eq!(features[index_of(INDUSTRY_ENCODED)], 0.0);
        assert_eq!(features[index_of(REGION_ENCODED)], 5.0);
    }

    #[test]
    fn test_unknown_categories_fall_back() {
        let extractor = FeatureExtractor::new();
        let record = BusinessRecord::new()
            .with(INDUSTRY_COLUMN, "Aerospace")
            .with(REGION_COLUMN, "Nowhere");

        let features = extractor.extract(&record).unwrap();

        assert_eq!(features[index_of(INDUSTRY_ENCODED)], 9.0);
        assert_eq!(features[index_of(REGION_ENCODED)], 0.0);
    }

    #[test]
    fn test_pre_encoded_columns_used_when_raw_absent() {
        let extractor = FeatureExtractor::new();
        let record = BusinessRecord::new()
            .with(INDUSTRY_ENCODED, "3")
            .with(REGION_ENCODED, "7");

        let features = extractor.extract(&record).unwrap();

        assert_eq!(features[index_of(INDUSTRY_ENCODED)], 3.0);
        assert_eq!(features[index_of(REGION_ENCODED)], 7.0);
    }

    #[test]
    fn test_non_numeric_cell_is_rejected() {
        let extractor = FeatureExtractor::new();
        let record = BusinessRecord::new().with("employee_count", "lots");

        let err = extractor.extract(&record).unwrap_err();
        assert!(err.to_string().contains("employee_count"));
    }

    #[test]
    fn test_extract_batch() {
        let extractor = FeatureExtractor::new();
        let batch = RecordBatch::from_records(vec![
            BusinessRecord::new().with("annual_revenue", "10"),
            BusinessRecord::new().with("annual_revenue", "20"),
        ]);

        let matrix = extractor.extract_batch(&batch).unwrap();

        assert_eq!(matrix.rows(), 2);
        assert_eq!(matrix.cols(), FEATURE_COUNT);
        assert_eq!(matrix.row(1)[0], 20.0);
        assert_eq!(matrix.as_slice().len(), 2 * FEATURE_COUNT);
    }

    #[test]
    fn test_matrix_rejects_short_rows() {
        assert!(FeatureMatrix::from_rows(vec![vec![0.0; 3]]).is_err());
    }

    #[test]
    fn test_schema_matching() {
        let current = FeatureSchema::current();
        assert!(current.ensure_matches(&FeatureSchema::current()).is_ok());

        let mut reordered = FeatureSchema::current();
        reordered.features.swap(0, 1);
        let err = current.ensure_matches(&reordered).unwrap_err();
        assert!(err.to_string().contains("position 0"));

        let mut bumped = FeatureSchema::current();
        bumped.version += 1;
        assert!(current.ensure_matches(&bumped).is_err());
    }
}
