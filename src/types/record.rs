//! Business record data structures and delimited-file loading

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::path::Path;

/// A single business record: named attributes in input column order.
///
/// Values are kept as raw text so that pass-through columns (ids, names)
/// reach the report untouched. Any subset of fields may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BusinessRecord {
    fields: Vec<(String, String)>,
}

impl BusinessRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any existing value for the same name
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    /// Builder-style [`BusinessRecord::set`]
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Raw value of a field. Empty (or whitespace-only) cells count as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Field names in insertion order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Number of fields present (including empty cells)
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// An in-memory table of business records sharing one column list.
#[derive(Debug, Clone, Default)]
pub struct RecordBatch {
    /// Column names in first-seen order
    pub columns: Vec<String>,
    /// Records, in input order
    pub records: Vec<BusinessRecord>,
}

impl RecordBatch {
    /// Build a batch from records, collecting the union of their columns.
    pub fn from_records(records: Vec<BusinessRecord>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for name in record.field_names() {
                if !columns.iter().any(|c| c == name) {
                    columns.push(name.to_string());
                }
            }
        }
        Self { columns, records }
    }

    /// Load a batch from a delimited text file with a header row.
    ///
    /// Column order is irrelevant to scoring and missing columns are
    /// tolerated. A file that cannot be parsed fails as a whole.
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open input file: {}", path.display()))?;
        Self::read_csv(file).with_context(|| format!("Malformed input file: {}", path.display()))
    }

    /// Parse a batch from any reader producing CSV with a header row.
    pub fn read_csv<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = reader
            .headers()
            .context("Failed to read header row")?
            .iter()
            .map(str::to_string)
            .collect();

        for (idx, name) in columns.iter().enumerate() {
            if columns[..idx].contains(name) {
                bail!("Duplicate column '{}'", name);
            }
        }

        let mut records = Vec::new();
        for (idx, row) in reader.records().enumerate() {
            // Header is line 1, so data rows start at line 2.
            let row = row.with_context(|| format!("Failed to parse row {}", idx + 2))?;
            let fields = columns
                .iter()
                .cloned()
                .zip(row.iter().map(str::to_string))
                .collect();
            records.push(BusinessRecord { fields });
        }

        Ok(Self { columns, records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
