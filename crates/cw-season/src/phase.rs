//! The season state machine's states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One state of the season state machine.
///
/// Forward order is the typical flow; the loop from
/// [`Phase::EliminationReveal`] back to [`Phase::HostRoundIntro`] repeats
/// until the active cast reaches the finale threshold, after which the
/// finale arc runs exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Allocate dossiers and roll traits from the seed.
    Setup,
    /// Host opens the round.
    HostRoundIntro,
    /// Select the round's trial.
    Trial,
    /// Host introduces the trial.
    HostTrialIntro,
    /// Run the trial race.
    TrialInProgress,
    /// Host wraps the trial.
    TrialEnd,
    /// Update trust, suspicion, and alliances for the round.
    Camp,
    /// Debate and advisory vote intents.
    Tribunal,
    /// Resolve declared advantages against pending ballots.
    AdvantagePlay,
    /// The ceremony walk-up; ballots are staged.
    VotingCeremony,
    /// Finalize pending ballots into the authoritative set.
    Vote,
    /// Tally and pick who leaves.
    Elimination,
    /// Host sends off the eliminated player.
    HostEliminationSendoff,
    /// Append the round summary and mark the elimination.
    EliminationReveal,
    /// Host opens the finale.
    HostFinaleOpen,
    /// Finalists make opening statements.
    FinaleOpeningStatements,
    /// Jurors question the finalists.
    JuryQuestions,
    /// Finalists make closing statements.
    FinaleClosingStatements,
    /// Jurors cast their ballots.
    JuryVoting,
    /// Jury ballots are staged for reveal.
    JuryVoteReveal,
    /// Tally the jury and crown the champion.
    Finale,
    /// Terminal state.
    Finished,
}

impl Phase {
    /// All phases in typical forward order.
    pub fn all() -> &'static [Self] {
        &[
            Self::Setup,
            Self::HostRoundIntro,
            Self::Trial,
            Self::HostTrialIntro,
            Self::TrialInProgress,
            Self::TrialEnd,
            Self::Camp,
            Self::Tribunal,
            Self::AdvantagePlay,
            Self::VotingCeremony,
            Self::Vote,
            Self::Elimination,
            Self::HostEliminationSendoff,
            Self::EliminationReveal,
            Self::HostFinaleOpen,
            Self::FinaleOpeningStatements,
            Self::JuryQuestions,
            Self::FinaleClosingStatements,
            Self::JuryVoting,
            Self::JuryVoteReveal,
            Self::Finale,
            Self::Finished,
        ]
    }

    /// Whether this phase belongs to the finale arc.
    pub fn is_finale_arc(self) -> bool {
        matches!(
            self,
            Self::HostFinaleOpen
                | Self::FinaleOpeningStatements
                | Self::JuryQuestions
                | Self::FinaleClosingStatements
                | Self::JuryVoting
                | Self::JuryVoteReveal
                | Self::Finale
        )
    }

    /// Whether this phase only produces host narration (its mechanical
    /// effect is the transition itself).
    pub fn is_host_beat(self) -> bool {
        matches!(
            self,
            Self::HostRoundIntro
                | Self::HostTrialIntro
                | Self::TrialEnd
                | Self::HostEliminationSendoff
                | Self::HostFinaleOpen
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Setup => "setup",
            Self::HostRoundIntro => "host round intro",
            Self::Trial => "trial",
            Self::HostTrialIntro => "host trial intro",
            Self::TrialInProgress => "trial in progress",
            Self::TrialEnd => "trial end",
            Self::Camp => "camp",
            Self::Tribunal => "tribunal",
            Self::AdvantagePlay => "advantage play",
            Self::VotingCeremony => "voting ceremony",
            Self::Vote => "vote",
            Self::Elimination => "elimination",
            Self::HostEliminationSendoff => "host elimination sendoff",
            Self::EliminationReveal => "elimination reveal",
            Self::HostFinaleOpen => "host finale open",
            Self::FinaleOpeningStatements => "finale opening statements",
            Self::JuryQuestions => "jury questions",
            Self::FinaleClosingStatements => "finale closing statements",
            Self::JuryVoting => "jury voting",
            Self::JuryVoteReveal => "jury vote reveal",
            Self::Finale => "finale",
            Self::Finished => "finished",
        };
        write!(f, "{name}")
    }
}
