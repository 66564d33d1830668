use crate::cast::CastId;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when constructing or mutating core records.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The same id appears twice in a roster.
    #[error("duplicate cast member: {0}")]
    DuplicateCastMember(CastId),

    /// The id is not on the season's roster.
    #[error("unknown cast member: {0}")]
    UnknownCastMember(CastId),

    /// A round snapshot for this round number was already written.
    #[error("round {0} already recorded in dossier")]
    RoundAlreadyRecorded(u32),

    /// The dossier was already marked eliminated.
    #[error("already eliminated in round {0}")]
    AlreadyEliminated(u32),

    /// An alliance needs at least two members.
    #[error("alliance needs at least 2 members, got {0}")]
    TooFewMembers(usize),

    /// A generic validation error with a descriptive message.
    #[error("validation error: {0}")]
    Validation(String),
}
