//! State metadata table
//!
//! Display name, sort order and color for every state the pipeline can
//! produce, keyed by the node's lookup key (`enr4year`, `enr2year,enr4year`).
//! Built once at start-up and read-only afterwards. Lookups never fall back to
//! a default: a missing key means the token vocabulary and this table have
//! drifted apart.

use super::token::NodeKey;
use crate::config::StateEntry;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Descriptive attributes attached to a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMetadata {
    pub long_name: String,
    pub sort_order: u32,
    pub color: String,
}

impl StateMetadata {
    pub fn new(long_name: &str, sort_order: u32, color: &str) -> Self {
        Self {
            long_name: long_name.to_string(),
            sort_order,
            color: color.to_string(),
        }
    }
}

/// Reference vocabulary: lookup key, long name, sort order, color
const REFERENCE_STATES: &[(&str, &str, u32, &str)] = &[
    ("hsgrad", "Graduated | High School", 0, "#636363"),
    ("enr<2years", "Enrolled | Less Than 2 Years", 1, "#c6dbef"),
    ("enr2year", "Enrolled | 2-Year College", 2, "#9ecae1"),
    ("enr2year,enr<2years", "Enrolled | 2-Year & Less Than 2 Years", 3, "#6baed6"),
    ("enr4year", "Enrolled | 4-Year College", 4, "#4292c6"),
    ("enr4year,enr<2years", "Enrolled | 4-Year & Less Than 2 Years", 5, "#2171b5"),
    ("enr2year,enr4year", "Enrolled | 2-Year & 4-Year", 6, "#08519c"),
    (
        "enr2year,enr4year,enr<2years",
        "Enrolled | 2-Year, 4-Year & Less Than 2 Years",
        7,
        "#08306b",
    ),
    ("grad<2years", "Graduated | Less Than 2 Years", 8, "#c7e9c0"),
    ("grad2year", "Graduated | 2-Year College", 9, "#74c476"),
    ("grad4year", "Graduated | 4-Year College", 10, "#238b45"),
    ("grad2year,grad4year", "Graduated | 2-Year & 4-Year", 11, "#00441b"),
    ("norecordfound", "No College Record Found", 12, "#bdbdbd"),
];

/// Immutable lookup from state key to metadata
#[derive(Debug, Clone)]
pub struct MetadataTable {
    entries: HashMap<String, StateMetadata>,
}

impl Default for MetadataTable {
    fn default() -> Self {
        Self::reference()
    }
}

impl MetadataTable {
    /// The table matching the reference token vocabulary
    pub fn reference() -> Self {
        let entries = REFERENCE_STATES
            .iter()
            .map(|(key, long_name, sort_order, color)| {
                (
                    key.to_string(),
                    StateMetadata::new(long_name, *sort_order, color),
                )
            })
            .collect();
        Self { entries }
    }

    /// Reference table with configured entries added or replaced
    pub fn with_entries(mut self, entries: &[StateEntry]) -> Self {
        for entry in entries {
            self.entries.insert(entry.key.clone(), entry.metadata());
        }
        self
    }

    pub fn get(&self, lookup_key: &str) -> Option<&StateMetadata> {
        self.entries.get(lookup_key)
    }

    pub fn contains(&self, lookup_key: &str) -> bool {
        self.entries.contains_key(lookup_key)
    }

    /// Metadata for a node, or `UnknownState`
    pub fn resolve(&self, node: &NodeKey) -> Result<&StateMetadata> {
        let lookup_key = node.lookup_key();
        self.entries
            .get(&lookup_key)
            .ok_or_else(|| Error::UnknownState {
                node: node.to_string(),
                lookup_key,
            })
    }

    /// Entries ordered by sort order, then key
    pub fn sorted(&self) -> Vec<(&str, &StateMetadata)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(key, meta)| (key.as_str(), meta))
            .collect();
        entries.sort_by(|a, b| a.1.sort_order.cmp(&b.1.sort_order).then(a.0.cmp(b.0)));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
