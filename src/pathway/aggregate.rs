//! Edge aggregator
//!
//! Groups transitions by `(source, target)` and counts distinct students.

use super::sequence::TransitionRecord;
use super::token::NodeKey;
use crate::data_source::StudentId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Students moving along one `(source, target)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedEdge {
    /// `None` collects transitions whose source was empty
    pub source: Option<NodeKey>,
    pub target: NodeKey,

    /// First bucket of the step, needed to place an empty source
    pub time: u32,

    /// Distinct contributing students, in first-seen order
    pub ids: Vec<StudentId>,
}

impl AggregatedEdge {
    pub fn count(&self) -> usize {
        self.ids.len()
    }
}

/// Aggregate transitions into one edge per distinct pair
///
/// Output is ordered by `(source, target)`; an empty source sorts first.
pub fn aggregate(transitions: &[TransitionRecord]) -> Vec<AggregatedEdge> {
    let mut groups: BTreeMap<(Option<&NodeKey>, &NodeKey), (u32, Vec<StudentId>, HashSet<&str>)> =
        BTreeMap::new();

    for transition in transitions {
        let (_, ids, seen) = groups
            .entry((transition.source.as_ref(), &transition.target))
            .or_insert_with(|| (transition.time, Vec::new(), HashSet::new()));
        if seen.insert(transition.student_id.as_str()) {
            ids.push(transition.student_id.clone());
        }
    }

    let edges: Vec<AggregatedEdge> = groups
        .into_iter()
        .map(|((source, target), (time, ids, _))| AggregatedEdge {
            source: source.cloned(),
            target: target.clone(),
            time,
            ids,
        })
        .collect();

    tracing::debug!(
        "Aggregated {} transitions into {} edges",
        transitions.len(),
        edges.len()
    );
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition(id: &str, time: u32, source: Option<&str>, target: &str) -> TransitionRecord {
        TransitionRecord {
            student_id: id.to_string(),
            time,
            source: source.map(|s| s.parse().unwrap()),
            target: target.parse().unwrap(),
        }
    }

    #[test]
    fn test_counts_distinct_students() {
        let transitions = vec![
            transition("A", 0, Some("hsgrad-0"), "enr4year-1"),
            transition("B", 0, Some("hsgrad-0"), "enr4year-1"),
            transition("A", 0, Some("hsgrad-0"), "enr4year-1"),
            transition("C", 0, Some("hsgrad-0"), "enr2year-1"),
        ];
        let edges = aggregate(&transitions);

        assert_eq!(edges.len(), 2);
        let four_year = edges
            .iter()
            .find(|e| e.target.to_string() == "enr4year-1")
            .unwrap();
        assert_eq!(four_year.count(), 2);
        assert_eq!(four_year.ids, vec!["A".to_string(), "B".to_string()]);

        for edge in &edges {
            let unique: HashSet<_> = edge.ids.iter().collect();
            assert_eq!(unique.len(), edge.count());
        }
    }

    #[test]
    fn test_empty_source_grouped_separately() {
        let transitions = vec![
            transition("A", 2, None, "enr2year-3"),
            transition("B", 2, Some("enr2year-2"), "enr2year-3"),
        ];
        let edges = aggregate(&transitions);

        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].source, None);
        assert_eq!(edges[0].time, 2);
        assert_eq!(edges[0].ids, vec!["A".to_string()]);
    }
}
