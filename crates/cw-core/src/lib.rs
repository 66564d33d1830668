//! Core types for Castaway: the cast roster, per-character dossiers, votes,
//! alliances, and immutable round records.
//!
//! This crate defines the data model that the season engine mutates. It is
//! independent of the simulation — you can construct and inspect every type
//! here without running a season, or deserialize them from JSON.

/// Alliance groups connecting cast members.
pub mod alliance;
/// Cast roster and identifiers, including cast-order indexing.
pub mod cast;
/// Per-character dossiers: traits, rivalries, and round snapshots.
pub mod dossier;
/// Error types used throughout the crate.
pub mod error;
/// Immutable per-round records: trial results and round summaries.
pub mod round;
/// Votes and pure tally functions.
pub mod vote;

/// Re-export alliance types.
pub use alliance::{Alliance, AllianceId};
/// Re-export roster types.
pub use cast::{Cast, CastId};
/// Re-export dossier types.
pub use dossier::{Archetype, BaseTraits, Dossier, RoundRecord, TraitKind};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export round record types.
pub use round::{RoundSummary, TrialResult};
/// Re-export vote and tally types.
pub use vote::{Leading, Vote, leading_candidate, tally_votes, top_candidates};
