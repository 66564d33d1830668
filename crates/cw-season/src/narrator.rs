//! Narrative content boundary.
//!
//! The engine delegates all prose (host beats, debate lines, sendoffs)
//! to an external generator behind the [`Narrator`] trait. Calls go
//! through a retry-then-fallback policy: a bounded number of attempts,
//! then a deterministic templated line. Mechanical outcomes (trials,
//! votes, eliminations) never depend on generation succeeding.

use thiserror::Error;

use cw_core::CastId;

use crate::phase::Phase;

/// A structured request for narrative content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPrompt {
    /// The phase the content narrates.
    pub phase: Phase,
    /// The current round.
    pub round: u32,
    /// Characters the content should feature.
    pub participants: Vec<CastId>,
    /// Prior-context lines (trial name, standing tensions, etc.).
    pub context: Vec<String>,
}

impl ContentPrompt {
    /// Build a prompt for a phase and round with no participants.
    pub fn new(phase: Phase, round: u32) -> Self {
        Self {
            phase,
            round,
            participants: Vec::new(),
            context: Vec::new(),
        }
    }

    /// Feature these characters.
    pub fn with_participants(mut self, participants: Vec<CastId>) -> Self {
        self.participants = participants;
        self
    }

    /// Attach a context line.
    pub fn with_context(mut self, line: impl Into<String>) -> Self {
        self.context.push(line.into());
        self
    }
}

/// Ways a content generation call can fail.
#[derive(Debug, Error)]
pub enum NarratorError {
    /// The generator could not be reached or timed out.
    #[error("narrator unavailable: {0}")]
    Unavailable(String),
    /// The generator answered with something unusable.
    #[error("malformed narrator response: {0}")]
    Malformed(String),
}

/// The external content-generation collaborator.
///
/// Implementations may fail or return malformed output; callers apply the
/// retry-then-fallback policy via [`generate_with_fallback`].
pub trait Narrator {
    /// Produce a line of narration for the prompt.
    fn generate(&mut self, prompt: &ContentPrompt) -> Result<String, NarratorError>;
}

/// A deterministic, always-succeeding narrator built from fixed templates.
///
/// Doubles as the fallback content source when a real generator fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNarrator;

impl TemplateNarrator {
    /// Render the template line for a prompt.
    pub fn render(prompt: &ContentPrompt) -> String {
        let who = if prompt.participants.is_empty() {
            "the tribe".to_string()
        } else {
            prompt
                .participants
                .iter()
                .map(CastId::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        };
        match prompt.phase {
            Phase::HostRoundIntro => {
                format!("Round {} begins. The camp stirs.", prompt.round)
            }
            Phase::HostTrialIntro => match prompt.context.first() {
                Some(trial) => format!("Today's trial: {trial}. Take your places."),
                None => "Take your places for today's trial.".to_string(),
            },
            Phase::TrialEnd => match prompt.context.first() {
                Some(winner) => format!("{winner} takes the trial."),
                None => "The trial is decided.".to_string(),
            },
            Phase::Tribunal => format!("{who} trade looks across the fire."),
            Phase::VotingCeremony => "One by one, the tribe votes.".to_string(),
            Phase::HostEliminationSendoff => match prompt.participants.first() {
                Some(out) => format!("{out}, the tribe has spoken."),
                None => "The tribe has spoken.".to_string(),
            },
            Phase::HostFinaleOpen => "The final council convenes.".to_string(),
            Phase::FinaleOpeningStatements => {
                format!("{who} make their case to the jury.")
            }
            Phase::JuryQuestions => format!("The jury presses {who}."),
            Phase::FinaleClosingStatements => {
                format!("{who} offer their final words.")
            }
            Phase::JuryVoteReveal => "The jury's ballots are read.".to_string(),
            _ => format!("Round {}: the game goes on.", prompt.round),
        }
    }
}

impl Narrator for TemplateNarrator {
    fn generate(&mut self, prompt: &ContentPrompt) -> Result<String, NarratorError> {
        Ok(Self::render(prompt))
    }
}

/// The result of a guarded generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedLine {
    /// The content line.
    pub text: String,
    /// Whether the deterministic fallback produced it.
    pub fell_back: bool,
}

/// Call `narrator` up to `attempts` times, treating empty or whitespace
/// responses as malformed, then fall back to the template line.
pub fn generate_with_fallback(
    narrator: &mut dyn Narrator,
    prompt: &ContentPrompt,
    attempts: u32,
) -> GeneratedLine {
    for _ in 0..attempts.max(1) {
        match narrator.generate(prompt) {
            Ok(text) if !text.trim().is_empty() => {
                return GeneratedLine {
                    text,
                    fell_back: false,
                };
            }
            Ok(_) | Err(_) => {}
        }
    }
    GeneratedLine {
        text: TemplateNarrator::render(prompt),
        fell_back: true,
    }
}
