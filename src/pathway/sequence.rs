//! Sequence synthesizer
//!
//! Walks each student's timeline from bucket 0 to `time_max` and emits one
//! transition per step. Every pathway starts at `hsgrad-0`. A bucket with no
//! observation takes the previous state forward, and the synthesized state is
//! written back into the timeline so the next step reads it as its source.

use super::labeler::StudentTimeline;
use super::reducer::reduce;
use super::token::NodeKey;
use crate::data_source::StudentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One student's move between consecutive buckets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub student_id: StudentId,

    /// Bucket of the source side; the target sits at `time + 1`
    pub time: u32,

    /// `None` when the student had no state at `time`
    pub source: Option<NodeKey>,

    pub target: NodeKey,
}

/// Non-fatal: a student had no state to start a step from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapWarning {
    pub student_id: StudentId,
    pub time: u32,
}

impl fmt::Display for GapWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "student {} has no state at bucket {}",
            self.student_id, self.time
        )
    }
}

/// Transitions plus the gaps met while producing them
#[derive(Debug, Clone, Default)]
pub struct Synthesis {
    pub transitions: Vec<TransitionRecord>,
    pub warnings: Vec<GapWarning>,
}

/// Largest observed bucket across all timelines (0 when there is no data)
pub fn observed_time_max<'a>(timelines: impl IntoIterator<Item = &'a StudentTimeline>) -> u32 {
    timelines
        .into_iter()
        .filter_map(StudentTimeline::max_bucket)
        .max()
        .unwrap_or(0)
}

/// Produce the transition from `time` to `time + 1` for one student
///
/// Mutates `timeline` when the target has to be synthesized. Returns the
/// transition and, if the source was empty, the warning to surface.
pub fn synthesize_step(
    timeline: &mut StudentTimeline,
    time: u32,
) -> (TransitionRecord, Option<GapWarning>) {
    let source = if time == 0 {
        Some(NodeKey::origin())
    } else {
        reduce(timeline.tokens_at(time)).map(|state| state.at(time))
    };

    let warning = if source.is_none() {
        tracing::warn!(
            student = %timeline.student_id,
            time,
            "No state observed or carried forward; emitting transition with empty source"
        );
        Some(GapWarning {
            student_id: timeline.student_id.clone(),
            time,
        })
    } else {
        None
    };

    let next = time + 1;
    let target = match (reduce(timeline.tokens_at(next)), &source) {
        (Some(state), _) => state.at(next),
        (None, Some(source)) => {
            let carried = source.persisted_to(next);
            timeline.set(next, carried.state.tokens().to_vec());
            carried
        }
        (None, None) => NodeKey::no_record(next),
    };

    let transition = TransitionRecord {
        student_id: timeline.student_id.clone(),
        time,
        source,
        target,
    };
    (transition, warning)
}

/// Synthesize every student's full pathway
///
/// `time_max` defaults to the largest observed bucket. Timelines are consumed
/// because synthesized states are written into them.
pub fn synthesize(
    timelines: BTreeMap<StudentId, StudentTimeline>,
    time_max: Option<u32>,
) -> Synthesis {
    let time_max = time_max.unwrap_or_else(|| observed_time_max(timelines.values()));
    tracing::info!(
        "Synthesizing pathways for {} students over {} steps",
        timelines.len(),
        time_max
    );

    let mut synthesis = Synthesis::default();
    for (_, mut timeline) in timelines {
        for time in 0..time_max {
            let (transition, warning) = synthesize_step(&mut timeline, time);
            synthesis.transitions.push(transition);
            synthesis.warnings.extend(warning);
        }
    }

    if !synthesis.warnings.is_empty() {
        tracing::warn!(
            "{} transitions have an empty source",
            synthesis.warnings.len()
        );
    }
    synthesis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathway::token::StateToken;

    fn timeline(id: &str, observations: &[(u32, &str)]) -> StudentTimeline {
        let mut timeline = StudentTimeline::new(id);
        for (bucket, token) in observations {
            timeline.observe(*bucket, StateToken::new(*token));
        }
        timeline
    }

    fn keys(synthesis: &Synthesis, id: &str) -> Vec<(String, String)> {
        synthesis
            .transitions
            .iter()
            .filter(|t| t.student_id == id)
            .map(|t| {
                (
                    t.source.as_ref().map(ToString::to_string).unwrap_or_default(),
                    t.target.to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn test_every_path_starts_at_hsgrad() {
        let mut timelines = BTreeMap::new();
        timelines.insert("A".to_string(), timeline("A", &[(1, "enr4year")]));
        timelines.insert("B".to_string(), timeline("B", &[(3, "grad2year")]));

        let synthesis = synthesize(timelines, None);
        for t in synthesis.transitions.iter().filter(|t| t.time == 0) {
            assert_eq!(t.source, Some(NodeKey::origin()));
        }
        assert!(synthesis.warnings.is_empty());
    }

    #[test]
    fn test_gap_carries_state_forward() {
        let mut timelines = BTreeMap::new();
        timelines.insert(
            "A".to_string(),
            timeline("A", &[(1, "enr2year"), (4, "grad2year")]),
        );

        let synthesis = synthesize(timelines, None);
        assert_eq!(
            keys(&synthesis, "A"),
            vec![
                ("hsgrad-0".to_string(), "enr2year-1".to_string()),
                ("enr2year-1".to_string(), "enr2year-2".to_string()),
                ("enr2year-2".to_string(), "enr2year-3".to_string()),
                ("enr2year-3".to_string(), "grad2year-4".to_string()),
            ]
        );
    }

    #[test]
    fn test_late_start_persists_hsgrad() {
        let mut timelines = BTreeMap::new();
        timelines.insert("A".to_string(), timeline("A", &[(2, "enr4year")]));

        let synthesis = synthesize(timelines, None);
        assert_eq!(
            keys(&synthesis, "A"),
            vec![
                ("hsgrad-0".to_string(), "hsgrad-1".to_string()),
                ("hsgrad-1".to_string(), "enr4year-2".to_string()),
            ]
        );
    }

    #[test]
    fn test_composite_is_carried_forward() {
        let mut timelines = BTreeMap::new();
        timelines.insert(
            "A".to_string(),
            timeline("A", &[(1, "enr4year"), (1, "enr2year"), (3, "grad4year")]),
        );

        let synthesis = synthesize(timelines, None);
        let pairs = keys(&synthesis, "A");
        assert_eq!(pairs[0].1, "enr2year,enr4year-1");
        assert_eq!(
            pairs[1],
            (
                "enr2year,enr4year-1".to_string(),
                "enr2year,enr4year-2".to_string()
            )
        );
    }

    #[test]
    fn test_explicit_time_max() {
        let mut timelines = BTreeMap::new();
        timelines.insert("A".to_string(), timeline("A", &[(1, "enr4year"), (5, "grad4year")]));

        let short = synthesize(timelines.clone(), Some(2));
        assert_eq!(short.transitions.len(), 2);

        let long = synthesize(timelines, Some(7));
        assert_eq!(long.transitions.len(), 7);
        assert_eq!(long.transitions[6].target.to_string(), "grad4year-7");
    }

    #[test]
    fn test_empty_source_warns_and_keeps_transition() {
        let mut tl = timeline("A", &[(3, "enr2year")]);

        let (transition, warning) = synthesize_step(&mut tl, 1);
        assert_eq!(transition.source, None);
        assert_eq!(transition.target.to_string(), "norecordfound-2");
        assert_eq!(
            warning,
            Some(GapWarning {
                student_id: "A".to_string(),
                time: 1
            })
        );
        assert!(tl.tokens_at(2).is_empty());

        let (transition, warning) = synthesize_step(&mut tl, 2);
        assert_eq!(transition.source, None);
        assert_eq!(transition.target.to_string(), "enr2year-3");
        assert!(warning.is_some());
    }

    #[test]
    fn test_no_data_no_transitions() {
        let synthesis = synthesize(BTreeMap::new(), None);
        assert!(synthesis.transitions.is_empty());
    }
}
