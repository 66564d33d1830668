//! Advantages and their resolution against pending ballots.
//!
//! An advantage is a one-time mechanical effect held by a character and
//! resolved during the advantage-play phase, after intents are locked but
//! before ballots are finalized. Resolution happens in a fixed order
//! (blocks, then extra votes, then immunity discards) so a given set of
//! plays always produces the same ballot set.

use std::fmt;

use serde::{Deserialize, Serialize};

use cw_core::{CastId, Vote};

/// A one-time mechanical effect a character can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advantage {
    /// Protects a target from elimination this round; ballots naming the
    /// protected target are discarded.
    ImmunityIdol,
    /// The holder casts one additional ballot.
    ExtraVote,
    /// Nullifies one target character's ballot.
    BlockVote,
}

impl fmt::Display for Advantage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImmunityIdol => write!(f, "immunity idol"),
            Self::ExtraVote => write!(f, "extra vote"),
            Self::BlockVote => write!(f, "block vote"),
        }
    }
}

/// A declared play of an advantage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvantagePlay {
    /// Who plays the advantage.
    pub holder: CastId,
    /// Which advantage is played.
    pub advantage: Advantage,
    /// The play's target: the protected character for an idol (defaults to
    /// the holder), the silenced voter for a block. Ignored for extra
    /// votes.
    pub target: Option<CastId>,
}

impl AdvantagePlay {
    /// Play an idol on the holder themselves.
    pub fn idol(holder: impl Into<CastId>) -> Self {
        Self {
            holder: holder.into(),
            advantage: Advantage::ImmunityIdol,
            target: None,
        }
    }

    /// Play an idol on someone else.
    pub fn idol_on(holder: impl Into<CastId>, target: impl Into<CastId>) -> Self {
        Self {
            holder: holder.into(),
            advantage: Advantage::ImmunityIdol,
            target: Some(target.into()),
        }
    }

    /// Cast an extra ballot.
    pub fn extra_vote(holder: impl Into<CastId>) -> Self {
        Self {
            holder: holder.into(),
            advantage: Advantage::ExtraVote,
            target: None,
        }
    }

    /// Nullify a voter's ballot.
    pub fn block(holder: impl Into<CastId>, target: impl Into<CastId>) -> Self {
        Self {
            holder: holder.into(),
            advantage: Advantage::BlockVote,
            target: Some(target.into()),
        }
    }
}

/// What a resolution pass did to the pending ballots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Characters protected from elimination this round.
    pub protected: Vec<CastId>,
    /// Voters whose ballots were nullified.
    pub blocked_voters: Vec<CastId>,
    /// Ballots added by extra votes.
    pub extra_ballots: u32,
    /// Ballots discarded because they named a protected character.
    pub discarded: u32,
}

/// Resolve `plays` against `pending`, mutating the ballot set in place.
///
/// Fixed order: every block first (a blocked voter's ballot is removed),
/// then extra votes (the holder's surviving ballot is duplicated), then
/// idol discards (ballots naming a protected character are dropped).
pub fn resolve(pending: &mut Vec<Vote>, plays: &[AdvantagePlay]) -> Resolution {
    let mut resolution = Resolution::default();

    // Blocks.
    for play in plays {
        if play.advantage == Advantage::BlockVote
            && let Some(target) = &play.target
        {
            let before = pending.len();
            pending.retain(|v| v.voter != *target);
            if pending.len() < before {
                resolution.blocked_voters.push(target.clone());
            }
        }
    }

    // Extra votes duplicate the holder's surviving ballot.
    for play in plays {
        if play.advantage == Advantage::ExtraVote
            && let Some(own) = pending.iter().find(|v| v.voter == play.holder).cloned()
        {
            pending.push(own);
            resolution.extra_ballots += 1;
        }
    }

    // Idols: collect the protected set, then discard ballots naming them.
    for play in plays {
        if play.advantage == Advantage::ImmunityIdol {
            let protected = play.target.clone().unwrap_or_else(|| play.holder.clone());
            if !resolution.protected.contains(&protected) {
                resolution.protected.push(protected);
            }
        }
    }
    if !resolution.protected.is_empty() {
        let before = pending.len();
        pending.retain(|v| !resolution.protected.contains(&v.target));
        resolution.discarded = (before - pending.len()) as u32;
    }

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ballots(pairs: &[(&str, &str)]) -> Vec<Vote> {
        pairs.iter().map(|(v, t)| Vote::new(*v, *t)).collect()
    }

    #[test]
    fn no_plays_leaves_ballots_alone() {
        let mut pending = ballots(&[("a", "b"), ("c", "b")]);
        let resolution = resolve(&mut pending, &[]);
        assert_eq!(pending.len(), 2);
        assert_eq!(resolution, Resolution::default());
    }

    #[test]
    fn block_removes_target_voters_ballot() {
        let mut pending = ballots(&[("a", "b"), ("c", "b")]);
        let resolution = resolve(&mut pending, &[AdvantagePlay::block("b", "c")]);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].voter, CastId::new("a"));
        assert_eq!(resolution.blocked_voters, vec![CastId::new("c")]);
    }

    #[test]
    fn extra_vote_duplicates_holders_ballot() {
        let mut pending = ballots(&[("a", "b"), ("c", "b")]);
        let resolution = resolve(&mut pending, &[AdvantagePlay::extra_vote("a")]);
        assert_eq!(pending.len(), 3);
        assert_eq!(resolution.extra_ballots, 1);
        let from_a = pending.iter().filter(|v| v.voter == CastId::new("a")).count();
        assert_eq!(from_a, 2);
    }

    #[test]
    fn idol_discards_ballots_against_protected() {
        let mut pending = ballots(&[("a", "b"), ("c", "b"), ("b", "a")]);
        let resolution = resolve(&mut pending, &[AdvantagePlay::idol("b")]);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].target, CastId::new("a"));
        assert_eq!(resolution.protected, vec![CastId::new("b")]);
        assert_eq!(resolution.discarded, 2);
    }

    #[test]
    fn idol_on_someone_else() {
        let mut pending = ballots(&[("a", "b"), ("b", "a")]);
        let resolution = resolve(&mut pending, &[AdvantagePlay::idol_on("c", "b")]);
        assert_eq!(resolution.protected, vec![CastId::new("b")]);
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn block_then_extra_ordering() {
        // "a" is blocked before their extra vote could duplicate anything.
        let mut pending = ballots(&[("a", "b"), ("c", "b")]);
        let plays = vec![
            AdvantagePlay::extra_vote("a"),
            AdvantagePlay::block("b", "a"),
        ];
        let resolution = resolve(&mut pending, &plays);
        assert_eq!(resolution.extra_ballots, 0);
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn combined_accounting_is_consistent() {
        let mut pending = ballots(&[("a", "d"), ("b", "d"), ("c", "a"), ("d", "a")]);
        let plays = vec![
            AdvantagePlay::block("x", "c"),
            AdvantagePlay::extra_vote("a"),
            AdvantagePlay::idol("d"),
        ];
        let before = 4_i64;
        let resolution = resolve(&mut pending, &plays);
        let expected = before - resolution.blocked_voters.len() as i64
            + i64::from(resolution.extra_ballots)
            - i64::from(resolution.discarded);
        assert_eq!(pending.len() as i64, expected);
    }
}
