//! Record loader
//!
//! Parses reference dates and applies the coarse year cutoff. No other rows
//! are filtered out here.

use super::models::{LoadParams, RawRecord, Record};
use crate::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};

const FALLBACK_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse and filter raw records
///
/// Fails on the first row whose date cannot be parsed or whose identifier or
/// group label is blank.
pub fn load_records(
    raw: impl IntoIterator<Item = RawRecord>,
    params: &LoadParams,
) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let mut dropped = 0usize;

    for (idx, raw) in raw.into_iter().enumerate() {
        let row = raw.row.unwrap_or(idx + 1);

        if raw.student_id.trim().is_empty() {
            return Err(Error::data_format(Some(row), "missing student id"));
        }
        if raw.group_label.trim().is_empty() {
            return Err(Error::data_format(
                Some(row),
                format!("missing group label for student {}", raw.student_id),
            ));
        }

        let reference_date =
            parse_date(&raw.reference_date, &params.date_formats).ok_or_else(|| {
                Error::data_format(
                    Some(row),
                    format!("cannot parse reference date '{}'", raw.reference_date),
                )
            })?;

        let record = Record {
            student_id: raw.student_id,
            group_label: raw.group_label,
            time_offset: raw.time_offset,
            reference_date,
        };

        if let Some(max_year) = params.max_year
            && record.year() >= max_year
        {
            dropped += 1;
            continue;
        }

        records.push(record);
    }

    tracing::info!("Loaded {} records ({} excluded by year cutoff)", records.len(), dropped);
    Ok(records)
}

/// Try each format as a date, then as a date-time
fn parse_date(value: &str, formats: &[String]) -> Option<NaiveDate> {
    let value = value.trim();
    let fallback: Vec<String>;
    let formats = if formats.is_empty() {
        fallback = FALLBACK_DATE_FORMATS.iter().map(|f| f.to_string()).collect();
        &fallback[..]
    } else {
        formats
    };

    for format in formats {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }
    None
}
