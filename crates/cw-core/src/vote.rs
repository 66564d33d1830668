//! Votes and pure tally functions.
//!
//! Tabulation is deliberately side-effect free: the season engine owns when
//! a ballot set becomes authoritative, and the reveal sequencer exposes
//! prefixes of it, but counting is the same pure function everywhere.
//! Ties never resolve by map-iteration order — the documented rule is
//! lowest cast-order index.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cast::{Cast, CastId};

/// A single ballot. Immutable once cast.
///
/// Self-votes are rejected upstream by the season engine when ballots are
/// computed; tally code does not special-case them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Who cast the ballot.
    pub voter: CastId,
    /// Who the ballot names.
    pub target: CastId,
    /// Optional in-fiction reasoning attached to the ballot.
    pub reasoning: Option<String>,
}

impl Vote {
    /// Create a ballot with no attached reasoning.
    pub fn new(voter: impl Into<CastId>, target: impl Into<CastId>) -> Self {
        Self {
            voter: voter.into(),
            target: target.into(),
            reasoning: None,
        }
    }

    /// Attach in-fiction reasoning to the ballot.
    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }
}

/// The leading candidate of a tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leading {
    /// The candidate with the greatest count.
    pub id: CastId,
    /// How many ballots named them.
    pub count: u32,
}

/// Count ballots per target. The sum of all counts equals `votes.len()`.
pub fn tally_votes(votes: &[Vote]) -> BTreeMap<CastId, u32> {
    let mut counts = BTreeMap::new();
    for vote in votes {
        *counts.entry(vote.target.clone()).or_insert(0) += 1;
    }
    counts
}

/// The entry with the strictly greatest count, or `None` for an empty tally.
///
/// Tie-break rule: among candidates sharing the maximum count, the one with
/// the lowest cast-order index wins the leading slot. Candidates absent from
/// the roster sort after every roster member.
pub fn leading_candidate(counts: &BTreeMap<CastId, u32>, cast: &Cast) -> Option<Leading> {
    let max = *counts.values().max()?;
    counts
        .iter()
        .filter(|(_, c)| **c == max)
        .min_by_key(|(id, _)| cast.index_of(id).unwrap_or(usize::MAX))
        .map(|(id, count)| Leading {
            id: id.clone(),
            count: *count,
        })
}

/// Every candidate sharing the maximum count, in cast order.
///
/// The elimination tie-break path consumes this: a single entry means a
/// clean elimination, more than one triggers the forced tie-break.
pub fn top_candidates(counts: &BTreeMap<CastId, u32>, cast: &Cast) -> Vec<CastId> {
    let Some(max) = counts.values().max().copied() else {
        return Vec::new();
    };
    let mut top: Vec<CastId> = counts
        .iter()
        .filter(|(_, c)| **c == max)
        .map(|(id, _)| id.clone())
        .collect();
    top.sort_by_key(|id| cast.index_of(id).unwrap_or(usize::MAX));
    top
}
