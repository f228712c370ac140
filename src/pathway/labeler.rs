//! State labeler
//!
//! Maps a loaded record to a time bucket and a normalized state token, then
//! groups the labels into one timeline per student.

use super::token::StateToken;
use crate::data_source::{Record, StudentId};
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Native time units per bucket in the reference dataset (quarters per year)
pub const DEFAULT_BUCKET_UNITS: u32 = 4;

/// Last bucket a pathway may reach; every step up to it is synthesized
pub const MAX_BUCKET: u32 = 1024;

/// Literal rewrites applied in order to a group label
const LABEL_REWRITES: &[(&str, &str)] = &[
    (" ", ""),
    ("|", ""),
    ("-", ""),
    ("College", ""),
    ("Enrolled", "enr"),
    ("Graduated", "grad"),
    ("LessThan", "<"),
];

/// Bucket for a native offset
///
/// Bucket 0 belongs to the synthetic graduation node, so missing offsets and
/// anything at or before graduation land in bucket 1.
pub fn time_bucket(time_offset: Option<f64>, bucket_units: u32) -> u32 {
    let units = f64::from(bucket_units.max(1));
    match time_offset {
        Some(offset) if offset.is_finite() => {
            let bucket = (offset / units).ceil();
            if bucket < 1.0 {
                1
            } else if bucket >= f64::from(u32::MAX) {
                u32::MAX
            } else {
                bucket as u32
            }
        }
        _ => 1,
    }
}

/// Normalize a free-text group label into a state token
///
/// `Enrolled | 2-Year College` becomes `enr2year`,
/// `Graduated | Less Than 2 Years` becomes `grad<2years`.
pub fn state_token(group_label: &str) -> StateToken {
    let mut token = group_label.to_string();
    for (from, to) in LABEL_REWRITES {
        token = token.replace(from, to);
    }
    StateToken::new(token.to_lowercase())
}

/// Bucket and token for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub student_id: StudentId,
    pub bucket: u32,
    pub token: StateToken,
}

pub fn label_record(record: &Record, bucket_units: u32) -> Label {
    Label {
        student_id: record.student_id.clone(),
        bucket: time_bucket(record.time_offset, bucket_units),
        token: state_token(&record.group_label),
    }
}

/// Observed tokens of one student, keyed by bucket
///
/// Bucket 0 is the graduation bucket and stays empty for observed data.
/// Tokens within a bucket keep their first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentTimeline {
    pub student_id: StudentId,
    buckets: BTreeMap<u32, Vec<StateToken>>,
}

impl StudentTimeline {
    pub fn new(student_id: impl Into<StudentId>) -> Self {
        Self {
            student_id: student_id.into(),
            buckets: BTreeMap::new(),
        }
    }

    /// Record a token; a token already present in the bucket is ignored
    pub fn observe(&mut self, bucket: u32, token: StateToken) {
        let slot = self.slot_mut(bucket);
        if !slot.contains(&token) {
            slot.push(token);
        }
    }

    /// Replace whatever is in the bucket
    pub fn set(&mut self, bucket: u32, tokens: Vec<StateToken>) {
        *self.slot_mut(bucket) = tokens;
    }

    pub fn tokens_at(&self, bucket: u32) -> &[StateToken] {
        self.buckets.get(&bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Highest bucket holding at least one token
    pub fn max_bucket(&self) -> Option<u32> {
        self.buckets
            .iter()
            .rev()
            .find(|(_, slot)| !slot.is_empty())
            .map(|(bucket, _)| *bucket)
    }

    fn slot_mut(&mut self, bucket: u32) -> &mut Vec<StateToken> {
        self.buckets.entry(bucket).or_default()
    }
}

/// Label every record and group by student
///
/// Labels are ordered by bucket (stable, so input order is kept within a
/// bucket) before grouping; repeated `(student, token, bucket)` triples keep
/// only their first occurrence. Fails on an offset past [`MAX_BUCKET`].
pub fn build_timelines(
    records: &[Record],
    bucket_units: u32,
) -> Result<BTreeMap<StudentId, StudentTimeline>> {
    let mut labels = Vec::with_capacity(records.len());
    for record in records {
        let label = label_record(record, bucket_units);
        if label.bucket > MAX_BUCKET {
            return Err(Error::data_format(
                None,
                format!(
                    "time offset {:?} of student {} falls in bucket {}, past the last bucket {}",
                    record.time_offset, record.student_id, label.bucket, MAX_BUCKET
                ),
            ));
        }
        labels.push(label);
    }
    labels.sort_by_key(|label| label.bucket);

    let mut timelines: BTreeMap<StudentId, StudentTimeline> = BTreeMap::new();
    for label in labels {
        timelines
            .entry(label.student_id.clone())
            .or_insert_with(|| StudentTimeline::new(label.student_id.clone()))
            .observe(label.bucket, label.token);
    }

    tracing::debug!(
        "Labeled {} records into {} student timelines",
        records.len(),
        timelines.len()
    );
    Ok(timelines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: &str, group: &str, offset: Option<f64>) -> Record {
        Record {
            student_id: id.to_string(),
            group_label: group.to_string(),
            time_offset: offset,
            reference_date: NaiveDate::from_ymd_opt(2013, 6, 14).unwrap(),
        }
    }

    #[test]
    fn test_time_bucket() {
        assert_eq!(time_bucket(Some(1.0), 4), 1);
        assert_eq!(time_bucket(Some(4.0), 4), 1);
        assert_eq!(time_bucket(Some(5.0), 4), 2);
        assert_eq!(time_bucket(Some(17.0), 4), 5);
        assert_eq!(time_bucket(Some(3.0), 1), 3);
    }

    #[test]
    fn test_time_bucket_never_zero() {
        assert_eq!(time_bucket(Some(0.0), 4), 1);
        assert_eq!(time_bucket(Some(-2.0), 4), 1);
        assert_eq!(time_bucket(Some(-9.0), 4), 1);
        assert_eq!(time_bucket(None, 4), 1);
        assert_eq!(time_bucket(Some(f64::NAN), 4), 1);
    }

    #[test]
    fn test_state_token_vocabulary() {
        let cases = [
            ("Enrolled | 2-Year College", "enr2year"),
            ("Enrolled | 4-Year College", "enr4year"),
            ("Enrolled | Less Than 2 Years", "enr<2years"),
            ("Graduated | 2-Year College", "grad2year"),
            ("Graduated | 4-Year College", "grad4year"),
            ("Graduated | Less Than 2 Years", "grad<2years"),
            ("No College Record Found", "norecordfound"),
        ];
        for (label, expected) in cases {
            assert_eq!(state_token(label).as_str(), expected, "label {label:?}");
        }
    }

    #[test]
    fn test_build_timelines_dedups_and_orders() {
        let records = vec![
            record("A", "Graduated | 4-Year College", Some(7.0)),
            record("A", "Enrolled | 4-Year College", Some(1.0)),
            record("A", "Enrolled | 4-Year College", Some(2.0)),
            record("A", "Enrolled | 2-Year College", Some(3.0)),
            record("B", "No College Record Found", None),
        ];
        let timelines = build_timelines(&records, 4).unwrap();

        let a = &timelines["A"];
        assert_eq!(
            a.tokens_at(1),
            &[StateToken::new("enr4year"), StateToken::new("enr2year")]
        );
        assert_eq!(a.tokens_at(2), &[StateToken::new("grad4year")]);
        assert!(a.tokens_at(0).is_empty());
        assert!(a.tokens_at(9).is_empty());
        assert_eq!(a.max_bucket(), Some(2));

        assert_eq!(timelines["B"].tokens_at(1), &[StateToken::no_record()]);
    }

    #[test]
    fn test_sparse_buckets() {
        let mut timeline = StudentTimeline::new("A");
        timeline.observe(MAX_BUCKET, StateToken::new("enr4year"));
        timeline.set(3, Vec::new());

        assert_eq!(timeline.tokens_at(MAX_BUCKET), &[StateToken::new("enr4year")]);
        assert!(timeline.tokens_at(3).is_empty());
        assert!(timeline.tokens_at(4).is_empty());
        assert_eq!(timeline.max_bucket(), Some(MAX_BUCKET));
        assert_eq!(StudentTimeline::new("B").max_bucket(), None);
    }

    #[test]
    fn test_offset_past_last_bucket_fails() {
        let records = vec![
            record("A", "Enrolled | 4-Year College", Some(4.0)),
            record("B", "Enrolled | 2-Year College", Some(4.0e9)),
        ];
        let err = build_timelines(&records, 4).unwrap_err();
        match err {
            Error::DataFormat { message, .. } => {
                assert!(message.contains("student B"));
                assert!(message.contains("1000000000"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let edge = vec![record("A", "Enrolled | 4-Year College", Some(4096.0))];
        assert!(build_timelines(&edge, 4).is_ok());
    }
}
