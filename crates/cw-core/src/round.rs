use serde::{Deserialize, Serialize};

use crate::cast::CastId;
use crate::dossier::TraitKind;
use crate::vote::Vote;

/// The outcome of one round's trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Display name of the trial.
    pub name: String,
    /// Category label (e.g. "puzzle", "endurance").
    pub category: String,
    /// The trait the trial primarily tests.
    pub primary_trait: TraitKind,
    /// The winner(s). Usually one; team trials may name several.
    pub winners: Vec<CastId>,
}

/// The immutable record of one completed round.
///
/// Appended to the season history at elimination reveal and never altered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    /// The round this summary records.
    pub round_number: u32,
    /// The round's trial outcome.
    pub trial: TrialResult,
    /// Who was voted out.
    pub eliminated: CastId,
    /// The authoritative ballot set for the round.
    pub votes: Vec<Vote>,
    /// Whether the elimination went through the forced tie-break path.
    pub forced_tie_break: bool,
}
