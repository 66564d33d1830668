use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Identifier for a cast member.
///
/// The character roster itself is external reference data; within a season a
/// character is addressed only by this id. Ids remain addressable after
/// elimination for history and statistics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CastId(String);

impl CastId {
    /// Create a cast id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CastId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// The season's roster: an ordered set of cast ids, fixed at season creation.
///
/// Cast order is load-bearing: every deterministic tie-break in the engine
/// (leading candidate, trial winners, award ties) resolves by the lowest
/// cast-order index, never by map-iteration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cast {
    members: Vec<CastId>,
}

impl Cast {
    /// Build a roster from an ordered list of ids. Duplicates are rejected.
    pub fn new(members: impl IntoIterator<Item = CastId>) -> CoreResult<Self> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for id in members {
            if !seen.insert(id.clone()) {
                return Err(CoreError::DuplicateCastMember(id));
            }
            out.push(id);
        }
        Ok(Self { members: out })
    }

    /// The cast-order index of `id`, if it is on the roster.
    pub fn index_of(&self, id: &CastId) -> Option<usize> {
        self.members.iter().position(|m| m == id)
    }

    /// Whether `id` is on the roster.
    pub fn contains(&self, id: &CastId) -> bool {
        self.members.contains(id)
    }

    /// The member at a cast-order index.
    pub fn get(&self, index: usize) -> Option<&CastId> {
        self.members.get(index)
    }

    /// All members in cast order.
    pub fn ids(&self) -> &[CastId] {
        &self.members
    }

    /// Iterate members in cast order.
    pub fn iter(&self) -> impl Iterator<Item = &CastId> {
        self.members.iter()
    }

    /// Roster size.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<'a> IntoIterator for &'a Cast {
    type Item = &'a CastId;
    type IntoIter = std::slice::Iter<'a, CastId>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}
