//! CSV record source
//!
//! Reads a header-first CSV export and picks the four columns the pipeline
//! needs by name. Any other columns are ignored.

use super::{RawRecord, RecordSource};
use crate::config::InputConfig;
use crate::{Error, Result};
use std::io::Read;
use std::path::PathBuf;

/// Column names to read
#[derive(Debug, Clone)]
pub struct CsvColumns {
    pub id: String,
    pub group: String,
    pub offset: String,
    pub date: String,
}

impl Default for CsvColumns {
    fn default() -> Self {
        Self::from(&InputConfig::default())
    }
}

impl From<&InputConfig> for CsvColumns {
    fn from(input: &InputConfig) -> Self {
        Self {
            id: input.id_column.clone(),
            group: input.group_column.clone(),
            offset: input.offset_column.clone(),
            date: input.date_column.clone(),
        }
    }
}

/// Data source backed by a CSV file on disk
pub struct CsvRecordSource {
    path: PathBuf,
    columns: CsvColumns,
}

impl CsvRecordSource {
    pub fn new(path: impl Into<PathBuf>, columns: CsvColumns) -> Self {
        Self {
            path: path.into(),
            columns,
        }
    }
}

impl RecordSource for CsvRecordSource {
    fn fetch_records(&self) -> Result<Vec<RawRecord>> {
        tracing::info!("Reading records from {:?}", self.path);
        let file = std::fs::File::open(&self.path)?;
        read_records(file, &self.columns)
    }
}

/// Read raw records from any CSV reader
pub fn read_records(reader: impl Read, columns: &CsvColumns) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let position = |name: &str| {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            Error::data_format(None, format!("missing column '{}' in CSV header", name))
        })
    };
    let id_idx = position(&columns.id)?;
    let group_idx = position(&columns.group)?;
    let offset_idx = position(&columns.offset)?;
    let date_idx = position(&columns.date)?;

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row?;
        let line = idx + 1;
        let field = |i: usize| row.get(i).unwrap_or("").to_string();

        let offset_text = field(offset_idx);
        let time_offset = parse_offset(&offset_text);
        if time_offset.is_none() && !is_missing(&offset_text) {
            tracing::debug!("Row {}: treating offset '{}' as missing", line, offset_text);
        }

        records.push(
            RawRecord::new(
                field(id_idx),
                field(group_idx),
                time_offset,
                field(date_idx),
            )
            .at_row(line),
        );
    }

    tracing::debug!("Read {} CSV rows", records.len());
    Ok(records)
}

fn is_missing(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "" | "na" | "nan" | "null" | "none"
    )
}

/// Lenient numeric parse: blanks, NA markers and garbage become `None`
fn parse_offset(value: &str) -> Option<f64> {
    if is_missing(value) {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
ID,GradEnrollGroups,TIME_FROM_HSGRAD,HIGH_SCHOOL_GRAD_DATE,SCHOOL
101,Enrolled | 4-Year College,3,2013-06-10,Aptos
101,Graduated | 4-Year College,17,2013-06-10,Aptos
102,No College Record Found,NA,2014-06-12,Soquel
103,Enrolled | 2-Year College,soon,2014-06-12,Soquel
";

    #[test]
    fn test_read_records() {
        let records = read_records(SAMPLE.as_bytes(), &CsvColumns::default()).unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].student_id, "101");
        assert_eq!(records[0].group_label, "Enrolled | 4-Year College");
        assert_eq!(records[0].time_offset, Some(3.0));
        assert_eq!(records[0].row, Some(1));
        assert_eq!(records[1].time_offset, Some(17.0));
        assert_eq!(records[2].time_offset, None);
        assert_eq!(records[3].time_offset, None);
        assert_eq!(records[3].reference_date, "2014-06-12");
    }

    #[test]
    fn test_missing_column() {
        let columns = CsvColumns {
            date: "GRAD_DATE".to_string(),
            ..CsvColumns::default()
        };
        let err = read_records(SAMPLE.as_bytes(), &columns).unwrap_err();
        assert!(err.to_string().contains("GRAD_DATE"));
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("-2"), Some(-2.0));
        assert_eq!(parse_offset("4.5"), Some(4.5));
        assert_eq!(parse_offset("nan"), None);
        assert_eq!(parse_offset("inf"), None);
        assert_eq!(parse_offset(""), None);
    }
}
