//! Season engine for Castaway.
//!
//! Drives a deterministic Survivor-style elimination season: a phase
//! state machine (trial, camp, tribunal, advantage play, vote,
//! elimination, finale arc), seeded so an entire season is reproducible
//! from its seed string. Narrative content comes from an external
//! [`narrator::Narrator`] collaborator behind a retry-then-fallback
//! policy; mechanical outcomes never depend on it.

/// Advantages and their resolution against pending ballots.
pub mod advantage;
/// Season configuration.
pub mod config;
/// Error types for the season engine.
pub mod error;
/// Season event log and bookmarks.
pub mod event;
/// Narrative content boundary: trait, prompts, fallback templates.
pub mod narrator;
/// The phase state machine's states.
pub mod phase;
/// The pausable, speed-controlled vote reveal sequencer.
pub mod reveal;
/// Seed-string folding and deterministic RNG stream derivation.
pub mod rng;
/// The season aggregate and state machine.
pub mod season;
/// Post-season derived awards.
pub mod stats;
/// Season persistence boundary.
pub mod store;
/// Trial catalog and race simulation.
pub mod trial;
/// Tribunal vote-intent computation.
pub mod tribunal;

/// Re-export advantage types.
pub use advantage::{Advantage, AdvantagePlay};
/// Re-export configuration.
pub use config::SeasonConfig;
/// Re-export error types.
pub use error::{SeasonError, SeasonResult};
/// Re-export narrator types.
pub use narrator::{ContentPrompt, Narrator, NarratorError, TemplateNarrator};
/// Re-export phase states.
pub use phase::Phase;
/// Re-export the reveal sequencer.
pub use reveal::{RevealConfig, RevealSequencer, RevealSpeed};
/// Re-export the season aggregate.
pub use season::Season;
/// Re-export post-season stats.
pub use stats::PostSeasonStats;
/// Re-export the persistence boundary.
pub use store::{MemoryStore, SeasonStore};
