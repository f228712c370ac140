//! Node key grammar
//!
//! A node key is `state-bucket`, where `state` is one normalized token or a
//! comma-joined, sorted list of tokens for concurrent enrollments:
//!
//! ```text
//! enr4year-2
//! enr2year,enr4year-1
//! ```
//!
//! Keys are parsed once into [`NodeKey`] and carried structurally afterwards.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Token of the synthetic high-school graduation origin
pub const HS_GRAD: &str = "hsgrad";

/// Token used where a student has no observation to show
pub const NO_RECORD: &str = "norecordfound";

/// One normalized state token, e.g. `enr2year` or `grad<2years`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateToken(String);

impl StateToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn hs_grad() -> Self {
        Self::new(HS_GRAD)
    }

    pub fn no_record() -> Self {
        Self::new(NO_RECORD)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_graduation(&self) -> bool {
        self.0.contains("grad")
    }

    pub fn is_enrollment(&self) -> bool {
        self.0.contains("enr")
    }
}

impl fmt::Display for StateToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The state part of a node key: a single token or a sorted composite
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeState {
    tokens: Vec<StateToken>,
}

impl NodeState {
    pub fn single(token: StateToken) -> Self {
        Self {
            tokens: vec![token],
        }
    }

    /// Build a composite state; tokens are sorted and de-duplicated.
    /// Returns `None` for an empty list.
    pub fn composite(mut tokens: Vec<StateToken>) -> Option<Self> {
        if tokens.is_empty() {
            return None;
        }
        tokens.sort();
        tokens.dedup();
        Some(Self { tokens })
    }

    pub fn tokens(&self) -> &[StateToken] {
        &self.tokens
    }

    pub fn is_composite(&self) -> bool {
        self.tokens.len() > 1
    }

    /// Key into the state metadata table (`enr2year,enr4year`)
    pub fn lookup_key(&self) -> String {
        self.tokens
            .iter()
            .map(StateToken::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn at(&self, bucket: u32) -> NodeKey {
        NodeKey {
            state: self.clone(),
            bucket,
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.lookup_key())
    }
}

/// A state at a time bucket; the identity of a graph node
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeKey {
    pub state: NodeState,
    pub bucket: u32,
}

impl NodeKey {
    pub fn new(state: NodeState, bucket: u32) -> Self {
        Self { state, bucket }
    }

    /// `hsgrad-0`, the origin of every pathway
    pub fn origin() -> Self {
        NodeState::single(StateToken::hs_grad()).at(0)
    }

    pub fn no_record(bucket: u32) -> Self {
        NodeState::single(StateToken::no_record()).at(bucket)
    }

    /// Same state carried to another bucket
    pub fn persisted_to(&self, bucket: u32) -> Self {
        self.state.at(bucket)
    }

    pub fn lookup_key(&self) -> String {
        self.state.lookup_key()
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.state, self.bucket)
    }
}

impl FromStr for NodeKey {
    type Err = Error;

    /// Accepts `a,b-3` and the per-token spelling `a-3,b-3`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidNodeKey(s.to_string());

        let (state, bucket) = s.rsplit_once('-').ok_or_else(invalid)?;
        let bucket: u32 = bucket.parse().map_err(|_| invalid())?;

        let tokens = state
            .split(',')
            .map(|part| {
                let token = match part.rsplit_once('-') {
                    Some((token, digits))
                        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) =>
                    {
                        token
                    }
                    _ => part,
                };
                if token.is_empty() || token.contains('-') {
                    Err(invalid())
                } else {
                    Ok(StateToken::new(token))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let state = NodeState::composite(tokens).ok_or_else(invalid)?;
        Ok(NodeKey { state, bucket })
    }
}

impl Serialize for NodeKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeKey {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
