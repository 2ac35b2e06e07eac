//! Vehicle vocabulary built from the reference dataset.
//!
//! The index is built once at startup and never mutated afterwards, so it can
//! be shared behind an `Arc` by every request without locking. Insertion
//! order is preserved (first appearance in the dataset) because fuzzy
//! matching breaks score ties by vocabulary order.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

const REQUIRED_COLUMNS: [&str; 3] = ["make", "model", "trim"];

/// One row of the reference dataset
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VehicleRecord {
    pub make: String,
    pub model: String,
    pub trim: String,
}

impl VehicleRecord {
    pub fn new(make: impl Into<String>, model: impl Into<String>, trim: impl Into<String>) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            trim: trim.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("failed to open dataset '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read dataset headers: {0}")]
    Headers(#[source] csv::Error),

    #[error("dataset is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("malformed dataset row at line {line}: {source}")]
    Row {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("dataset contains no usable vehicle records")]
    Empty,
}

/// Counts reported after building an index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VocabularyStats {
    pub makes: usize,
    pub models: usize,
    pub trims: usize,
}

/// Valid makes, models per make and trims per (make, model)
#[derive(Debug, Default, Clone)]
pub struct VocabularyIndex {
    makes: Vec<String>,
    models_by_make: HashMap<String, Vec<String>>,
    trims_by_model: HashMap<String, HashMap<String, Vec<String>>>,
}

impl VocabularyIndex {
    /// Group records by make, then by (make, model).
    ///
    /// Records with a blank make or model are ignored. A blank trim still
    /// registers its make and model.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = VehicleRecord>,
    {
        let mut index = Self::default();
        for record in records {
            index.insert(record);
        }
        index
    }

    /// Load the index from a CSV file with `make`, `model` and `trim` columns
    pub fn load_csv(path: impl AsRef<Path>) -> Result<Self, VocabularyError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| VocabularyError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(path = %path.display(), "Loading reference dataset");
        Self::from_csv_reader(file)
    }

    /// Load the index from any CSV source
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, VocabularyError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers().map_err(VocabularyError::Headers)?.clone();
        // First occurrence wins when a header is repeated
        let mut header_map: HashMap<String, usize> = HashMap::new();
        for (idx, name) in headers.iter().enumerate() {
            header_map.entry(normalize_header_name(name)).or_insert(idx);
        }

        let mut columns = [0usize; 3];
        for (slot, name) in columns.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = *header_map
                .get(name)
                .ok_or(VocabularyError::MissingColumn(name))?;
        }
        let [make_col, model_col, trim_col] = columns;

        let mut index = Self::default();
        let mut rows_read = 0usize;
        let mut rows_skipped = 0usize;

        for result in reader.records() {
            let record = result.map_err(|source| VocabularyError::Row {
                line: source.position().map(|p| p.line()).unwrap_or(0),
                source,
            })?;
            rows_read += 1;

            let field = |idx: usize| record.get(idx).unwrap_or("").to_string();
            let vehicle = VehicleRecord::new(field(make_col), field(model_col), field(trim_col));
            if !index.insert(vehicle) {
                rows_skipped += 1;
            }
        }

        if index.is_empty() {
            return Err(VocabularyError::Empty);
        }

        let stats = index.stats();
        tracing::info!(
            rows_read,
            rows_skipped,
            makes = stats.makes,
            models = stats.models,
            trims = stats.trims,
            "Vocabulary index built"
        );

        Ok(index)
    }

    /// Returns false when the record was skipped
    fn insert(&mut self, record: VehicleRecord) -> bool {
        let VehicleRecord { make, model, trim } = record;
        let (make, model, trim) = (make.trim(), model.trim(), trim.trim());
        if make.is_empty() || model.is_empty() {
            return false;
        }

        if !self.models_by_make.contains_key(make) {
            self.makes.push(make.to_string());
        }
        let models = self.models_by_make.entry(make.to_string()).or_default();
        push_unique(models, model);

        let trims = self
            .trims_by_model
            .entry(make.to_string())
            .or_default()
            .entry(model.to_string())
            .or_default();
        if !trim.is_empty() {
            push_unique(trims, trim);
        }

        true
    }

    pub fn is_empty(&self) -> bool {
        self.makes.is_empty()
    }

    pub fn makes(&self) -> &[String] {
        &self.makes
    }

    /// Models known for `make`; empty when the make is unknown
    pub fn models_for(&self, make: &str) -> &[String] {
        self.models_by_make
            .get(make)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Trims known for the (make, model) pair; empty when the pair is unknown
    pub fn trims_for(&self, make: &str, model: &str) -> &[String] {
        self.trims_by_model
            .get(make)
            .and_then(|models| models.get(model))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn stats(&self) -> VocabularyStats {
        VocabularyStats {
            makes: self.makes.len(),
            models: self.models_by_make.values().map(Vec::len).sum(),
            trims: self
                .trims_by_model
                .values()
                .flat_map(HashMap::values)
                .map(Vec::len)
                .sum(),
        }
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> VocabularyIndex {
        VocabularyIndex::from_records(vec![
            VehicleRecord::new("Toyota", "Sienna", "LE"),
            VehicleRecord::new("Toyota", "Sienna", "XLE"),
            VehicleRecord::new("Toyota", "Sienna", "LE"),
            VehicleRecord::new("Toyota", "Camry", "SE"),
            VehicleRecord::new("Honda", "Civic", "EX"),
        ])
    }

    #[test]
    fn test_groups_by_make_and_model() {
        let index = sample_index();
        assert_eq!(index.makes(), &["Toyota", "Honda"]);
        assert_eq!(index.models_for("Toyota"), &["Sienna", "Camry"]);
        assert_eq!(index.trims_for("Toyota", "Sienna"), &["LE", "XLE"]);
        assert_eq!(index.trims_for("Honda", "Civic"), &["EX"]);
    }

    #[test]
    fn test_unknown_keys_yield_empty_slices() {
        let index = sample_index();
        assert!(index.models_for("Ford").is_empty());
        assert!(index.trims_for("Toyota", "Corolla").is_empty());
        assert!(index.trims_for("Ford", "Sienna").is_empty());
    }

    #[test]
    fn test_stats_count_distinct_values() {
        let stats = sample_index().stats();
        assert_eq!(
            stats,
            VocabularyStats {
                makes: 2,
                models: 3,
                trims: 4
            }
        );
    }

    #[test]
    fn test_blank_make_or_model_is_skipped() {
        let index = VocabularyIndex::from_records(vec![
            VehicleRecord::new("", "Sienna", "LE"),
            VehicleRecord::new("Toyota", "  ", "LE"),
            VehicleRecord::new("Toyota", "Tacoma", ""),
        ]);
        assert_eq!(index.makes(), &["Toyota"]);
        assert_eq!(index.models_for("Toyota"), &["Tacoma"]);
        assert!(index.trims_for("Toyota", "Tacoma").is_empty());
    }

    #[test]
    fn test_csv_columns_found_by_header_name() {
        let data = "\u{feff}Year,Trim,MAKE,model,price\n\
                    2020,LE,Toyota,Sienna,30000\n\
                    2019, XLE ,Toyota,Sienna,28000\n\
                    2018,,Honda,Civic,15000\n";
        let index = VocabularyIndex::from_csv_reader(data.as_bytes()).unwrap();
        assert_eq!(index.makes(), &["Toyota", "Honda"]);
        assert_eq!(index.trims_for("Toyota", "Sienna"), &["LE", "XLE"]);
        assert!(index.trims_for("Honda", "Civic").is_empty());
    }

    #[test]
    fn test_csv_missing_column_is_fatal() {
        let data = "make,model\nToyota,Sienna\n";
        let err = VocabularyIndex::from_csv_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, VocabularyError::MissingColumn("trim")));
    }

    #[test]
    fn test_csv_ragged_row_is_fatal() {
        let data = "make,model,trim\n\
                    Toyota,Sienna,LE\n\
                    Toyota,Camry,SE,EXTRA,MORE\n";
        let err = VocabularyIndex::from_csv_reader(data.as_bytes()).unwrap_err();
        match err {
            VocabularyError::Row { line, .. } => assert_eq!(line, 3),
            other => panic!("Expected row error, got {:?}", other),
        }
    }

    #[test]
    fn test_csv_short_row_is_fatal() {
        let data = "make,model,trim\nToyota,Sienna,LE\nHonda\n";
        let err = VocabularyIndex::from_csv_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, VocabularyError::Row { .. }));
    }

    #[test]
    fn test_csv_duplicate_header_uses_first_column() {
        let data = "make,model,trim,make\nToyota,Sienna,LE,Junk\n";
        let index = VocabularyIndex::from_csv_reader(data.as_bytes()).unwrap();
        assert_eq!(index.makes(), &["Toyota"]);
        assert_eq!(index.trims_for("Toyota", "Sienna"), &["LE"]);
    }

    #[test]
    fn test_csv_without_rows_is_fatal() {
        let data = "make,model,trim\n";
        let err = VocabularyIndex::from_csv_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, VocabularyError::Empty));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = VocabularyIndex::load_csv("/nonexistent/vehicles.csv").unwrap_err();
        assert!(matches!(err, VocabularyError::Open { .. }));
        assert!(err.to_string().contains("/nonexistent/vehicles.csv"));
    }
}
