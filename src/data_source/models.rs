//! Core data models for student observation records
//!
//! A `RawRecord` is what a source hands over (dates still as text); a `Record`
//! is what the loader keeps after parsing and filtering.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Opaque student identifier as it appears in the dataset
pub type StudentId = String;

/// One unparsed observation row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub student_id: StudentId,

    /// Free-text enrollment/graduation group, e.g. `Enrolled | 4-Year College`
    pub group_label: String,

    /// Signed offset from high-school graduation in native time units
    pub time_offset: Option<f64>,

    /// Calendar date used only for the year cutoff
    pub reference_date: String,

    /// 1-based data row number in the source, when known
    #[serde(default)]
    pub row: Option<usize>,
}

impl RawRecord {
    pub fn new(
        student_id: impl Into<StudentId>,
        group_label: impl Into<String>,
        time_offset: Option<f64>,
        reference_date: impl Into<String>,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            group_label: group_label.into(),
            time_offset,
            reference_date: reference_date.into(),
            row: None,
        }
    }

    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}

/// A loaded observation with its reference date parsed
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub student_id: StudentId,
    pub group_label: String,
    pub time_offset: Option<f64>,
    pub reference_date: NaiveDate,
}

impl Record {
    pub fn year(&self) -> i32 {
        self.reference_date.year()
    }
}

/// Loader parameters
#[derive(Debug, Clone, Default)]
pub struct LoadParams {
    /// Exclusive upper bound on the reference year
    pub max_year: Option<i32>,

    /// chrono formats tried in order; empty means the loader defaults
    pub date_formats: Vec<String>,
}

impl LoadParams {
    pub fn max_year(mut self, year: i32) -> Self {
        self.max_year = Some(year);
        self
    }

    pub fn date_formats(mut self, formats: Vec<String>) -> Self {
        self.date_formats = formats;
        self
    }
}
