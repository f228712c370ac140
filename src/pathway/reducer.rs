//! State reducer
//!
//! Collapses the tokens a student holds at one bucket into a single state.
//! Priority, in order:
//! 1. a lone token is returned as is
//! 2. graduation tokens win; the last one in input order is kept
//! 3. enrollment tokens next; several become a sorted composite
//! 4. several tokens with neither kind reduce to nothing, so the bucket is
//!    treated as a gap

use super::token::{NodeState, StateToken};

/// Reduce a bucket's tokens; `None` when the bucket is empty
pub fn reduce(tokens: &[StateToken]) -> Option<NodeState> {
    match tokens {
        [] => None,
        [only] => Some(NodeState::single(only.clone())),
        _ => {
            if let Some(last_grad) = tokens.iter().rev().find(|t| t.is_graduation()) {
                return Some(NodeState::single(last_grad.clone()));
            }

            let enrolled: Vec<StateToken> = tokens
                .iter()
                .filter(|t| t.is_enrollment())
                .cloned()
                .collect();
            NodeState::composite(enrolled)
        }
    }
}
