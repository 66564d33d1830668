//! Per-character season dossiers.
//!
//! A dossier is created for every cast member at season setup and lives for
//! the whole season. Round logic appends one [`RoundRecord`] snapshot per
//! round the character remains active; snapshots are never retroactively
//! altered, so the dossier doubles as the season's social audit trail.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cast::CastId;
use crate::error::{CoreError, CoreResult};

/// Lower bound for a base trait roll.
pub const TRAIT_MIN: u8 = 1;
/// Upper bound for a base trait roll.
pub const TRAIT_MAX: u8 = 10;

/// A character's strategic archetype.
///
/// Read by downstream prompt construction; carries no mechanical weight in
/// the simulation itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    /// Plays the long game, votes with the numbers.
    Strategist,
    /// Builds wide, shallow bonds.
    SocialButterfly,
    /// Unpredictable by design.
    Wildcard,
    /// Sticks with the first alliance that will have them.
    Loyalist,
    /// Targeted early, hard to finish off.
    Underdog,
}

impl Archetype {
    /// All archetypes in a fixed order.
    pub fn all() -> &'static [Self] {
        &[
            Self::Strategist,
            Self::SocialButterfly,
            Self::Wildcard,
            Self::Loyalist,
            Self::Underdog,
        ]
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strategist => write!(f, "Strategist"),
            Self::SocialButterfly => write!(f, "Social Butterfly"),
            Self::Wildcard => write!(f, "Wildcard"),
            Self::Loyalist => write!(f, "Loyalist"),
            Self::Underdog => write!(f, "Underdog"),
        }
    }
}

/// One of the five named trait affinities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitKind {
    /// Puzzle and memory challenges.
    Logic,
    /// Physical stamina challenges.
    Endurance,
    /// Social maneuvering.
    Persuasion,
    /// Thriving in disorder.
    Chaos,
    /// Craft and improvisation.
    Creative,
}

impl TraitKind {
    /// All trait kinds in a fixed order.
    pub fn all() -> &'static [Self] {
        &[
            Self::Logic,
            Self::Endurance,
            Self::Persuasion,
            Self::Chaos,
            Self::Creative,
        ]
    }
}

impl fmt::Display for TraitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logic => write!(f, "logic"),
            Self::Endurance => write!(f, "endurance"),
            Self::Persuasion => write!(f, "persuasion"),
            Self::Chaos => write!(f, "chaos"),
            Self::Creative => write!(f, "creative"),
        }
    }
}

/// The five base affinities, fixed at dossier creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseTraits {
    /// Puzzle and memory affinity.
    pub logic: u8,
    /// Stamina affinity.
    pub endurance: u8,
    /// Social maneuvering affinity.
    pub persuasion: u8,
    /// Disorder affinity.
    pub chaos: u8,
    /// Craft affinity.
    pub creative: u8,
}

impl BaseTraits {
    /// Build a trait block, clamping each value to the valid range.
    pub fn new(logic: u8, endurance: u8, persuasion: u8, chaos: u8, creative: u8) -> Self {
        let c = |v: u8| v.clamp(TRAIT_MIN, TRAIT_MAX);
        Self {
            logic: c(logic),
            endurance: c(endurance),
            persuasion: c(persuasion),
            chaos: c(chaos),
            creative: c(creative),
        }
    }

    /// Look up a trait value by kind.
    pub fn get(&self, kind: TraitKind) -> u8 {
        match kind {
            TraitKind::Logic => self.logic,
            TraitKind::Endurance => self.endurance,
            TraitKind::Persuasion => self.persuasion,
            TraitKind::Chaos => self.chaos,
            TraitKind::Creative => self.creative,
        }
    }
}

impl Default for BaseTraits {
    fn default() -> Self {
        Self::new(5, 5, 5, 5, 5)
    }
}

/// One round's snapshot of a character's social state.
///
/// Written once when the round's camp phase runs; never altered afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Trust toward each other active character, in [0, 1].
    pub trust: BTreeMap<CastId, f32>,
    /// Alliance member groups this character belonged to during the round.
    pub alliances: Vec<Vec<CastId>>,
    /// How suspicious the group is of this character, in [0, 1].
    pub suspicion: f32,
    /// Whether this character held immunity for the round.
    pub immunity: bool,
    /// Advisory vote target computed at tribunal; may differ from the final
    /// cast ballot if an advantage altered the outcome.
    pub vote_intent: Option<CastId>,
    /// Characters whose lobbying shifted this character's intent.
    pub influenced_by: Vec<CastId>,
    /// Free-form markers set by round events.
    pub flags: Vec<String>,
}

/// Per-character, per-season record of social and strategic state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dossier {
    /// Strategic archetype, fixed at creation.
    pub archetype: Archetype,
    /// The five base affinities, fixed at creation.
    pub base_traits: BaseTraits,
    /// Characters this one is antagonistic toward.
    pub rivalries: BTreeSet<CastId>,
    /// Append-only per-round audit trail, keyed by round number.
    rounds: BTreeMap<u32, RoundRecord>,
    /// The round this character was voted out, if any. Set at most once.
    eliminated_round: Option<u32>,
}

impl Dossier {
    /// Create a fresh dossier for an active character.
    pub fn new(archetype: Archetype, base_traits: BaseTraits) -> Self {
        Self {
            archetype,
            base_traits,
            rivalries: BTreeSet::new(),
            rounds: BTreeMap::new(),
            eliminated_round: None,
        }
    }

    /// Append the snapshot for `round`. Rejects overwriting an existing one.
    pub fn record_round(&mut self, round: u32, record: RoundRecord) -> CoreResult<()> {
        if self.rounds.contains_key(&round) {
            return Err(CoreError::RoundAlreadyRecorded(round));
        }
        self.rounds.insert(round, record);
        Ok(())
    }

    /// The snapshot for `round`, if one was recorded.
    pub fn round(&self, round: u32) -> Option<&RoundRecord> {
        self.rounds.get(&round)
    }

    /// Mutable access to the snapshot for `round`, for in-round updates
    /// (tribunal intent, immunity) before the round closes.
    pub fn round_mut(&mut self, round: u32) -> Option<&mut RoundRecord> {
        self.rounds.get_mut(&round)
    }

    /// The most recent recorded snapshot.
    pub fn latest_round(&self) -> Option<(u32, &RoundRecord)> {
        self.rounds.iter().next_back().map(|(r, rec)| (*r, rec))
    }

    /// All recorded snapshots in round order.
    pub fn rounds(&self) -> impl Iterator<Item = (u32, &RoundRecord)> {
        self.rounds.iter().map(|(r, rec)| (*r, rec))
    }

    /// Mark this character eliminated in `round`. Fails if already set.
    pub fn mark_eliminated(&mut self, round: u32) -> CoreResult<()> {
        if let Some(prior) = self.eliminated_round {
            return Err(CoreError::AlreadyEliminated(prior));
        }
        self.eliminated_round = Some(round);
        Ok(())
    }

    /// The elimination round, if this character has been voted out.
    pub fn eliminated_round(&self) -> Option<u32> {
        self.eliminated_round
    }

    /// Whether the character is still in the game.
    pub fn is_active(&self) -> bool {
        self.eliminated_round.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dossier() -> Dossier {
        Dossier::new(Archetype::Strategist, BaseTraits::default())
    }

    #[test]
    fn traits_clamped_on_creation() {
        let t = BaseTraits::new(0, 11, 5, 200, 1);
        assert_eq!(t.logic, TRAIT_MIN);
        assert_eq!(t.endurance, TRAIT_MAX);
        assert_eq!(t.persuasion, 5);
        assert_eq!(t.chaos, TRAIT_MAX);
        assert_eq!(t.creative, 1);
    }

    #[test]
    fn trait_lookup_by_kind() {
        let t = BaseTraits::new(1, 2, 3, 4, 5);
        assert_eq!(t.get(TraitKind::Logic), 1);
        assert_eq!(t.get(TraitKind::Creative), 5);
        for kind in TraitKind::all() {
            assert!(t.get(*kind) >= TRAIT_MIN);
        }
    }

    #[test]
    fn new_dossier_is_active() {
        let d = dossier();
        assert!(d.is_active());
        assert!(d.eliminated_round().is_none());
        assert!(d.latest_round().is_none());
    }

    #[test]
    fn record_round_is_append_only() {
        let mut d = dossier();
        d.record_round(1, RoundRecord::default()).unwrap();
        let result = d.record_round(1, RoundRecord::default());
        assert!(matches!(result, Err(CoreError::RoundAlreadyRecorded(1))));
    }

    #[test]
    fn latest_round_is_highest() {
        let mut d = dossier();
        d.record_round(1, RoundRecord::default()).unwrap();
        d.record_round(3, RoundRecord::default()).unwrap();
        let (round, _) = d.latest_round().unwrap();
        assert_eq!(round, 3);
    }

    #[test]
    fn eliminated_exactly_once() {
        let mut d = dossier();
        d.mark_eliminated(4).unwrap();
        assert!(!d.is_active());
        assert_eq!(d.eliminated_round(), Some(4));
        let result = d.mark_eliminated(5);
        assert!(matches!(result, Err(CoreError::AlreadyEliminated(4))));
        // First value survives the failed second attempt.
        assert_eq!(d.eliminated_round(), Some(4));
    }

    #[test]
    fn round_mut_updates_in_place() {
        let mut d = dossier();
        d.record_round(1, RoundRecord::default()).unwrap();
        d.round_mut(1).unwrap().immunity = true;
        assert!(d.round(1).unwrap().immunity);
    }

    #[test]
    fn rivalries_are_a_set() {
        let mut d = dossier();
        d.rivalries.insert(CastId::new("grace"));
        d.rivalries.insert(CastId::new("grace"));
        assert_eq!(d.rivalries.len(), 1);
    }

    #[test]
    fn archetype_display() {
        assert_eq!(Archetype::SocialButterfly.to_string(), "Social Butterfly");
        assert_eq!(Archetype::Wildcard.to_string(), "Wildcard");
    }

    #[test]
    fn serde_roundtrip() {
        let mut d = dossier();
        let mut rec = RoundRecord::default();
        rec.trust.insert(CastId::new("grace"), 0.7);
        rec.vote_intent = Some(CastId::new("alan"));
        d.record_round(1, rec).unwrap();
        d.mark_eliminated(2).unwrap();

        let json = serde_json::to_string(&d).unwrap();
        let d2: Dossier = serde_json::from_str(&json).unwrap();
        assert_eq!(d, d2);
    }
}
