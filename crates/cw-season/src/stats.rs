//! Post-season derived awards.
//!
//! Computed once from the finished season's round history and dossiers;
//! never incrementally maintained, and never fed back into simulation
//! mechanics. Ties inside each award resolve by cast order.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use cw_core::{CastId, tally_votes};

use crate::season::Season;
use crate::tribunal::alliance_plurality;

/// The most loyal player: their ballots matched their own bloc's target
/// most consistently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyAward {
    /// The awardee.
    pub id: CastId,
    /// Rounds where their ballot matched the bloc.
    pub matched: u32,
    /// Rounds where they voted while in a bloc.
    pub total: u32,
}

/// The most dramatic divergence between a stated intent and the ballot
/// actually cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlipAward {
    /// The flipper.
    pub id: CastId,
    /// The round it happened.
    pub round: u32,
    /// Who they told the camp they would vote for.
    pub intended: CastId,
    /// Who they actually voted for.
    pub actual: CastId,
    /// Ballots the actual target drew that round (the flip's weight).
    pub margin: u32,
}

/// Member of the most distinct alliances across the season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButterflyAward {
    /// The awardee.
    pub id: CastId,
    /// Distinct alliance member-groups they belonged to.
    pub alliance_count: u32,
}

/// Survived the longest after first being targeted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnderdogAward {
    /// The awardee.
    pub id: CastId,
    /// The round they first drew a vote without going home.
    pub first_targeted_round: u32,
    /// Rounds survived from that point.
    pub rounds_survived: u32,
}

/// Awards derived from a completed season.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostSeasonStats {
    /// Most consistent alliance voter.
    pub most_loyal: Option<LoyaltyAward>,
    /// Biggest intent-to-ballot flip.
    pub biggest_flip: Option<FlipAward>,
    /// Most distinct alliances.
    pub social_butterfly: Option<ButterflyAward>,
    /// Targeted early, eliminated late (or never).
    pub underdog: Option<UnderdogAward>,
}

impl PostSeasonStats {
    /// Compute all awards from the season's history.
    pub fn compute(season: &Season) -> Self {
        Self {
            most_loyal: most_loyal(season),
            biggest_flip: biggest_flip(season),
            social_butterfly: social_butterfly(season),
            underdog: underdog(season),
        }
    }
}

fn most_loyal(season: &Season) -> Option<LoyaltyAward> {
    let cast = season.cast();
    let mut tallies: BTreeMap<CastId, (u32, u32)> = BTreeMap::new();

    for summary in season.rounds() {
        for vote in &summary.votes {
            let Some(dossier) = season.dossier(&vote.voter) else {
                continue;
            };
            let Some(record) = dossier.round(summary.round_number) else {
                continue;
            };
            // The voter's bloc target: the plurality ballot among their
            // alliance mates this round.
            let mut bloc_target = None;
            for group in &record.alliances {
                let mate_votes: Vec<(CastId, Option<CastId>)> = summary
                    .votes
                    .iter()
                    .filter(|v| v.voter != vote.voter && group.contains(&v.voter))
                    .map(|v| (v.voter.clone(), Some(v.target.clone())))
                    .collect();
                if let Some(target) = alliance_plurality(&mate_votes, cast) {
                    bloc_target = Some(target);
                    break;
                }
            }
            let Some(target) = bloc_target else { continue };
            let entry = tallies.entry(vote.voter.clone()).or_insert((0, 0));
            entry.1 += 1;
            if vote.target == target {
                entry.0 += 1;
            }
        }
    }

    tallies
        .iter()
        .filter(|(_, (_, total))| *total > 0)
        .max_by(|(a, (ma, ta)), (b, (mb, tb))| {
            let ra = f64::from(*ma) / f64::from(*ta);
            let rb = f64::from(*mb) / f64::from(*tb);
            let ia = cast.index_of(a).unwrap_or(usize::MAX);
            let ib = cast.index_of(b).unwrap_or(usize::MAX);
            ra.total_cmp(&rb).then_with(|| ib.cmp(&ia))
        })
        .map(|(id, (matched, total))| LoyaltyAward {
            id: id.clone(),
            matched: *matched,
            total: *total,
        })
}

fn biggest_flip(season: &Season) -> Option<FlipAward> {
    let cast = season.cast();
    let mut best: Option<FlipAward> = None;

    for summary in season.rounds() {
        let counts = tally_votes(&summary.votes);
        for vote in &summary.votes {
            let intent = season
                .dossier(&vote.voter)
                .and_then(|d| d.round(summary.round_number))
                .and_then(|r| r.vote_intent.clone());
            let Some(intended) = intent else { continue };
            if intended == vote.target {
                continue;
            }
            let margin = counts.get(&vote.target).copied().unwrap_or(0);
            let candidate = FlipAward {
                id: vote.voter.clone(),
                round: summary.round_number,
                intended,
                actual: vote.target.clone(),
                margin,
            };
            let better = match &best {
                None => true,
                Some(current) => {
                    candidate.margin > current.margin
                        || (candidate.margin == current.margin
                            && (candidate.round < current.round
                                || (candidate.round == current.round
                                    && cast.index_of(&candidate.id).unwrap_or(usize::MAX)
                                        < cast.index_of(&current.id).unwrap_or(usize::MAX))))
                }
            };
            if better {
                best = Some(candidate);
            }
        }
    }
    best
}

fn social_butterfly(season: &Season) -> Option<ButterflyAward> {
    let cast = season.cast();
    let mut counts: BTreeMap<CastId, u32> = BTreeMap::new();

    for (id, dossier) in season.dossiers() {
        let mut groups: BTreeSet<Vec<CastId>> = BTreeSet::new();
        for (_, record) in dossier.rounds() {
            for group in &record.alliances {
                let mut sorted = group.clone();
                sorted.sort();
                groups.insert(sorted);
            }
        }
        if !groups.is_empty() {
            counts.insert(id.clone(), groups.len() as u32);
        }
    }

    counts
        .iter()
        .max_by(|(a, ca), (b, cb)| {
            let ia = cast.index_of(a).unwrap_or(usize::MAX);
            let ib = cast.index_of(b).unwrap_or(usize::MAX);
            ca.cmp(cb).then_with(|| ib.cmp(&ia))
        })
        .map(|(id, count)| ButterflyAward {
            id: id.clone(),
            alliance_count: *count,
        })
}

fn underdog(season: &Season) -> Option<UnderdogAward> {
    let cast = season.cast();
    let last_round = season.rounds().len() as u32;
    let mut best: Option<UnderdogAward> = None;

    for id in cast.iter() {
        let Some(dossier) = season.dossier(id) else {
            continue;
        };
        // First round they drew a vote but stayed in the game.
        let first_targeted = season
            .rounds()
            .iter()
            .find(|s| s.eliminated != *id && s.votes.iter().any(|v| v.target == *id))
            .map(|s| s.round_number);
        let Some(first) = first_targeted else { continue };
        let out = dossier.eliminated_round().unwrap_or(last_round + 1);
        if out <= first {
            continue;
        }
        let survived = out - first;
        let better = match &best {
            None => true,
            Some(current) => {
                survived > current.rounds_survived
                    || (survived == current.rounds_survived
                        && cast.index_of(id).unwrap_or(usize::MAX)
                            < cast.index_of(&current.id).unwrap_or(usize::MAX))
            }
        };
        if better {
            best = Some(UnderdogAward {
                id: id.clone(),
                first_targeted_round: first,
                rounds_survived: survived,
            });
        }
    }
    best
}
