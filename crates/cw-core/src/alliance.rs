use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cast::CastId;
use crate::error::{CoreError, CoreResult};

/// Unique identifier for an alliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AllianceId(pub Uuid);

impl AllianceId {
    /// Generate a new random alliance identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AllianceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AllianceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// A voting bloc of two or more cast members.
///
/// Strength is informational: it scales the layout engine's spring force
/// and flavors narration, but is never validated against voting behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alliance {
    /// Unique identifier for this alliance.
    pub id: AllianceId,
    /// The member ids. Always at least two.
    pub members: BTreeSet<CastId>,
    /// Cohesion in [0, 1].
    pub strength: f32,
}

impl Alliance {
    /// Build an alliance. Rejects fewer than two members; clamps strength.
    pub fn new(members: impl IntoIterator<Item = CastId>, strength: f32) -> CoreResult<Self> {
        let members: BTreeSet<CastId> = members.into_iter().collect();
        if members.len() < 2 {
            return Err(CoreError::TooFewMembers(members.len()));
        }
        Ok(Self {
            id: AllianceId::new(),
            members,
            strength: strength.clamp(0.0, 1.0),
        })
    }

    /// Whether `id` is a member.
    pub fn contains(&self, id: &CastId) -> bool {
        self.members.contains(id)
    }

    /// Every unordered member pair, for edge construction.
    pub fn member_pairs(&self) -> Vec<(CastId, CastId)> {
        let members: Vec<&CastId> = self.members.iter().collect();
        let mut pairs = Vec::new();
        for i in 0..members.len() {
            for j in (i + 1)..members.len() {
                pairs.push((members[i].clone(), members[j].clone()));
            }
        }
        pairs
    }

    /// Member count.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Alliances always have members; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
