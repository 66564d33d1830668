//! Error types for the season engine.

use cw_core::{CastId, CoreError};
use thiserror::Error;

use crate::advantage::Advantage;

/// Result type for season operations.
pub type SeasonResult<T> = Result<T, SeasonError>;

/// Errors that can occur while running a season.
#[derive(Debug, Error)]
pub enum SeasonError {
    /// The roster is too small to play out a season.
    #[error("cast too small: need at least {min} members, got {got}")]
    CastTooSmall {
        /// Minimum roster size for the configured finale threshold.
        min: usize,
        /// Actual roster size supplied.
        got: usize,
    },

    /// `advance` was called on a finished season.
    #[error("season already finished")]
    AlreadyFinished,

    /// The id is not on the season's roster.
    #[error("unknown cast member: {0}")]
    UnknownCastMember(CastId),

    /// A ballot targeting its own voter was produced.
    #[error("self-vote rejected for {0}")]
    SelfVote(CastId),

    /// An advantage play names an advantage its holder does not have.
    #[error("{holder} does not hold {advantage}")]
    AdvantageNotHeld {
        /// The would-be player.
        holder: CastId,
        /// The advantage they tried to play.
        advantage: Advantage,
    },

    /// The champion slot is set exactly once.
    #[error("champion already crowned: {0}")]
    ChampionAlreadySet(CastId),

    /// A state invariant the simulation depends on was broken.
    ///
    /// Downstream statistics and elimination correctness depend on these;
    /// the season surfaces the violation rather than proceeding with
    /// inconsistent state, since a corrupted season cannot be replayed
    /// from its seed.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Core data model error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Aggregate (de)serialization failure at the store boundary.
    #[error("serialization: {0}")]
    Serde(#[from] serde_json::Error),
}
