//! Data source module - Abstraction for acquiring student observation records
//!
//! This module provides a trait-based abstraction for reading raw records
//! from multiple sources (CSV export, mock data) and the loader that turns
//! them into dated, cutoff-filtered records.

use crate::{Config, Error, Result};
use std::path::PathBuf;

pub mod csv_file;
pub mod loader;
pub mod mock;
pub mod models;

use crate::cli::RecordSourceType;
pub use loader::load_records;
pub use models::{LoadParams, RawRecord, Record, StudentId};

/// Record source trait
///
/// Implementations provide different backends for raw observation rows:
/// - `CsvRecordSource`: reads a CSV export
/// - `MockRecordSource`: provides a hardcoded sample cohort
pub trait RecordSource {
    /// Fetch every raw record the source holds
    fn fetch_records(&self) -> Result<Vec<RawRecord>>;
}

/// Create a record source instance based on type and configuration
///
/// `input` overrides the configured CSV path.
pub fn create_record_source(
    source_type: RecordSourceType,
    config: &Config,
    input: Option<PathBuf>,
) -> Result<Box<dyn RecordSource>> {
    match source_type {
        RecordSourceType::Mock => Ok(Box::new(mock::MockRecordSource::new())),
        RecordSourceType::Csv => {
            let path = input.or_else(|| config.input.path.clone()).ok_or_else(|| {
                Error::config("no input file: pass --input or set input.path in the config")
            })?;
            Ok(Box::new(csv_file::CsvRecordSource::new(
                path,
                csv_file::CsvColumns::from(&config.input),
            )))
        }
    }
}

/// Fetch from a source and run the loader with the configured cutoff
pub fn fetch_and_load(source: &dyn RecordSource, params: &LoadParams) -> Result<Vec<Record>> {
    let raw = source.fetch_records()?;
    tracing::debug!("Fetched {} raw records", raw.len());
    load_records(raw, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_source_requires_path() {
        let result = create_record_source(RecordSourceType::Csv, &Config::default(), None);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_mock_source_with_cutoff() {
        let source =
            create_record_source(RecordSourceType::Mock, &Config::default(), None).unwrap();
        let all = fetch_and_load(source.as_ref(), &LoadParams::default()).unwrap();
        let cut = fetch_and_load(source.as_ref(), &LoadParams::default().max_year(2015)).unwrap();

        assert_eq!(all.len(), 15);
        assert_eq!(cut.len(), 14);
        assert!(cut.iter().all(|r| r.student_id != "S006"));
    }

    #[test]
    fn test_load_reports_source_row() {
        let source = mock::MockRecordSource::with_records(vec![
            RawRecord::new("S1", "Enrolled | 2-Year College", Some(2.0), "2014-06-13").at_row(4),
            RawRecord::new("S2", "Enrolled | 2-Year College", Some(2.0), "13/13/2014").at_row(9),
        ]);
        let err = fetch_and_load(&source, &LoadParams::default()).unwrap_err();
        assert!(matches!(err, Error::DataFormat { row: Some(9), .. }));
    }
}
