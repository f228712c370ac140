//! Mock data source for testing and development
//!
//! Provides a small cohort covering the common pathways: straight through a
//! 4-year college, a 2-year start with a transfer, concurrent enrollment, a
//! late starter and a student with no college record.

use super::{RawRecord, RecordSource};
use crate::Result;

/// Mock data source providing hardcoded sample records
pub struct MockRecordSource {
    records: Vec<RawRecord>,
}

impl Default for MockRecordSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRecordSource {
    pub fn new() -> Self {
        let rows: &[(&str, &str, Option<f64>, &str)] = &[
            ("S001", "Enrolled | 4-Year College", Some(1.0), "2013-06-14"),
            ("S001", "Enrolled | 4-Year College", Some(5.0), "2013-06-14"),
            ("S001", "Enrolled | 4-Year College", Some(9.0), "2013-06-14"),
            ("S001", "Graduated | 4-Year College", Some(15.0), "2013-06-14"),
            ("S002", "Enrolled | 2-Year College", Some(2.0), "2013-06-14"),
            ("S002", "Enrolled | 2-Year College", Some(6.0), "2013-06-14"),
            ("S002", "Graduated | 2-Year College", Some(8.0), "2013-06-14"),
            ("S002", "Enrolled | 4-Year College", Some(10.0), "2013-06-14"),
            ("S003", "Enrolled | 2-Year College", Some(1.0), "2014-06-13"),
            ("S003", "Enrolled | 4-Year College", Some(2.0), "2014-06-13"),
            ("S003", "Enrolled | 4-Year College", Some(6.0), "2014-06-13"),
            ("S004", "Enrolled | Less Than 2 Years", None, "2014-06-13"),
            ("S004", "Enrolled | 2-Year College", Some(11.0), "2014-06-13"),
            ("S005", "No College Record Found", None, "2014-06-13"),
            ("S006", "Enrolled | 4-Year College", Some(3.0), "2016-06-10"),
        ];

        let records = rows
            .iter()
            .enumerate()
            .map(|(idx, (id, group, offset, date))| {
                RawRecord::new(*id, *group, *offset, *date).at_row(idx + 1)
            })
            .collect();

        Self { records }
    }

    pub fn with_records(records: Vec<RawRecord>) -> Self {
        Self { records }
    }
}

impl RecordSource for MockRecordSource {
    fn fetch_records(&self) -> Result<Vec<RawRecord>> {
        Ok(self.records.clone())
    }
}
