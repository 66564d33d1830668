//! Tribunal vote-intent computation.
//!
//! Intent is advisory: it records who a character plans to vote for going
//! into the ceremony, and the final ballot may diverge once advantages are
//! resolved (the divergence is what post-season "biggest flip" detection
//! reads). The rules here are pure over dossier snapshots — no randomness.

use std::collections::{BTreeMap, BTreeSet};

use cw_core::{Cast, CastId};

/// A candidate a voter could target, with the social state that drives the
/// choice.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentCandidate {
    /// The candidate's id.
    pub id: CastId,
    /// How much the group currently suspects the candidate.
    pub suspicion: f32,
}

/// Compute a voter's advisory vote intent.
///
/// The voter targets the active, non-immune candidate they trust least;
/// rivals count as near-zero trust. Ties break by higher suspicion, then
/// lowest cast-order index. Returns `None` only when no candidate is
/// eligible (e.g. everyone else is immune).
pub fn compute_vote_intent(
    voter: &CastId,
    trust: &BTreeMap<CastId, f32>,
    rivalries: &BTreeSet<CastId>,
    candidates: &[IntentCandidate],
    immune: &BTreeSet<CastId>,
    cast: &Cast,
) -> Option<CastId> {
    candidates
        .iter()
        .filter(|c| c.id != *voter && !immune.contains(&c.id))
        .min_by(|a, b| {
            let ta = effective_trust(trust, rivalries, &a.id);
            let tb = effective_trust(trust, rivalries, &b.id);
            ta.total_cmp(&tb)
                .then_with(|| b.suspicion.total_cmp(&a.suspicion))
                .then_with(|| {
                    let ia = cast.index_of(&a.id).unwrap_or(usize::MAX);
                    let ib = cast.index_of(&b.id).unwrap_or(usize::MAX);
                    ia.cmp(&ib)
                })
        })
        .map(|c| c.id.clone())
}

/// Trust toward a candidate with rivalry discounting applied.
fn effective_trust(
    trust: &BTreeMap<CastId, f32>,
    rivalries: &BTreeSet<CastId>,
    candidate: &CastId,
) -> f32 {
    let base = trust.get(candidate).copied().unwrap_or(0.5);
    if rivalries.contains(candidate) {
        base * 0.25
    } else {
        base
    }
}

/// The plurality intent within an alliance, used for influence adoption.
///
/// Counts members' intents and returns the target with the most backers;
/// ties break by lowest cast-order index of the target. `None` when no
/// member has an intent yet.
pub fn alliance_plurality(
    member_intents: &[(CastId, Option<CastId>)],
    cast: &Cast,
) -> Option<CastId> {
    let mut counts: BTreeMap<CastId, u32> = BTreeMap::new();
    for (_, intent) in member_intents {
        if let Some(target) = intent {
            *counts.entry(target.clone()).or_insert(0) += 1;
        }
    }
    let max = counts.values().max().copied()?;
    counts
        .iter()
        .filter(|(_, c)| **c == max)
        .min_by_key(|(id, _)| cast.index_of(id).unwrap_or(usize::MAX))
        .map(|(id, _)| id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(names: &[&str]) -> Cast {
        Cast::new(names.iter().map(|n| CastId::new(*n))).unwrap()
    }

    fn candidates(entries: &[(&str, f32)]) -> Vec<IntentCandidate> {
        entries
            .iter()
            .map(|(n, s)| IntentCandidate {
                id: CastId::new(*n),
                suspicion: *s,
            })
            .collect()
    }

    #[test]
    fn targets_lowest_trust() {
        let cast = roster(&["me", "liked", "disliked"]);
        let mut trust = BTreeMap::new();
        trust.insert(CastId::new("liked"), 0.9);
        trust.insert(CastId::new("disliked"), 0.2);
        let intent = compute_vote_intent(
            &CastId::new("me"),
            &trust,
            &BTreeSet::new(),
            &candidates(&[("liked", 0.1), ("disliked", 0.1)]),
            &BTreeSet::new(),
            &cast,
        );
        assert_eq!(intent, Some(CastId::new("disliked")));
    }

    #[test]
    fn never_targets_self() {
        let cast = roster(&["me", "other"]);
        let intent = compute_vote_intent(
            &CastId::new("me"),
            &BTreeMap::new(),
            &BTreeSet::new(),
            &candidates(&[("me", 0.9), ("other", 0.0)]),
            &BTreeSet::new(),
            &cast,
        );
        assert_eq!(intent, Some(CastId::new("other")));
    }

    #[test]
    fn immune_candidates_excluded() {
        let cast = roster(&["me", "a", "b"]);
        let mut trust = BTreeMap::new();
        trust.insert(CastId::new("a"), 0.1);
        trust.insert(CastId::new("b"), 0.8);
        let immune: BTreeSet<CastId> = [CastId::new("a")].into_iter().collect();
        let intent = compute_vote_intent(
            &CastId::new("me"),
            &trust,
            &BTreeSet::new(),
            &candidates(&[("a", 0.5), ("b", 0.5)]),
            &immune,
            &cast,
        );
        assert_eq!(intent, Some(CastId::new("b")));
    }

    #[test]
    fn none_when_everyone_immune() {
        let cast = roster(&["me", "a"]);
        let immune: BTreeSet<CastId> = [CastId::new("a")].into_iter().collect();
        let intent = compute_vote_intent(
            &CastId::new("me"),
            &BTreeMap::new(),
            &BTreeSet::new(),
            &candidates(&[("a", 0.5)]),
            &immune,
            &cast,
        );
        assert_eq!(intent, None);
    }

    #[test]
    fn rivalry_discounts_trust() {
        let cast = roster(&["me", "rival", "neutral"]);
        let mut trust = BTreeMap::new();
        // Raw trust would favor targeting "neutral"; the rivalry discount
        // (0.6 * 0.25 = 0.15) pulls "rival" below 0.4.
        trust.insert(CastId::new("rival"), 0.6);
        trust.insert(CastId::new("neutral"), 0.4);
        let rivalries: BTreeSet<CastId> = [CastId::new("rival")].into_iter().collect();
        let intent = compute_vote_intent(
            &CastId::new("me"),
            &trust,
            &rivalries,
            &candidates(&[("rival", 0.2), ("neutral", 0.2)]),
            &BTreeSet::new(),
            &cast,
        );
        assert_eq!(intent, Some(CastId::new("rival")));
    }

    #[test]
    fn trust_tie_breaks_by_suspicion_then_cast_order() {
        let cast = roster(&["me", "a", "b", "c"]);
        // Equal trust all around; "b" is more suspected.
        let intent = compute_vote_intent(
            &CastId::new("me"),
            &BTreeMap::new(),
            &BTreeSet::new(),
            &candidates(&[("a", 0.2), ("b", 0.7), ("c", 0.2)]),
            &BTreeSet::new(),
            &cast,
        );
        assert_eq!(intent, Some(CastId::new("b")));

        // Fully tied: earliest cast-order index.
        let intent = compute_vote_intent(
            &CastId::new("me"),
            &BTreeMap::new(),
            &BTreeSet::new(),
            &candidates(&[("c", 0.2), ("a", 0.2), ("b", 0.2)]),
            &BTreeSet::new(),
            &cast,
        );
        assert_eq!(intent, Some(CastId::new("a")));
    }

    #[test]
    fn plurality_counts_intents() {
        let cast = roster(&["a", "b", "c", "d"]);
        let intents = vec![
            (CastId::new("a"), Some(CastId::new("d"))),
            (CastId::new("b"), Some(CastId::new("d"))),
            (CastId::new("c"), Some(CastId::new("a"))),
        ];
        assert_eq!(alliance_plurality(&intents, &cast), Some(CastId::new("d")));
    }

    #[test]
    fn plurality_tie_breaks_by_cast_order() {
        let cast = roster(&["a", "b", "c", "d"]);
        let intents = vec![
            (CastId::new("a"), Some(CastId::new("d"))),
            (CastId::new("b"), Some(CastId::new("c"))),
        ];
        assert_eq!(alliance_plurality(&intents, &cast), Some(CastId::new("c")));
    }

    #[test]
    fn plurality_none_without_intents() {
        let cast = roster(&["a", "b"]);
        let intents = vec![(CastId::new("a"), None), (CastId::new("b"), None)];
        assert_eq!(alliance_plurality(&intents, &cast), None);
    }
}
