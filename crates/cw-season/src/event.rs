//! Season event log and bookmarks.
//!
//! Every consequential moment of a season is recorded as a typed event
//! (a tagged union, not a free-form payload) so observers can filter
//! without string matching. The log is append-only with an optional cap;
//! bookmarks are append-only markers into it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cw_core::{AllianceId, CastId};

use crate::advantage::Advantage;
use crate::phase::Phase;

/// What kind of season event occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SeasonEventKind {
    /// The state machine entered a phase.
    PhaseEntered {
        /// The phase entered.
        phase: Phase,
    },
    /// A trial was decided.
    TrialWon {
        /// Trial display name.
        trial: String,
        /// The winner.
        winner: CastId,
    },
    /// An alliance formed.
    AllianceFormed {
        /// The alliance's id.
        id: AllianceId,
        /// Its members.
        members: Vec<CastId>,
    },
    /// An alliance dissolved.
    AllianceDissolved {
        /// The alliance's id.
        id: AllianceId,
    },
    /// A finalized ballot.
    VoteCast {
        /// Who voted.
        voter: CastId,
        /// Who they named.
        target: CastId,
    },
    /// An advantage was played.
    AdvantagePlayed {
        /// Who played it.
        holder: CastId,
        /// Which advantage.
        advantage: Advantage,
    },
    /// A character was voted out.
    Eliminated {
        /// Who left.
        target: CastId,
    },
    /// Elimination went through the forced tie-break path.
    TieBreakForced {
        /// The candidates who tied.
        tied: Vec<CastId>,
    },
    /// A juror's ballot.
    JuryVoteCast {
        /// The juror.
        juror: CastId,
        /// The finalist they backed.
        finalist: CastId,
    },
    /// The season's winner was set.
    ChampionCrowned {
        /// The champion.
        champion: CastId,
    },
    /// A narrator line was produced; the line is the event description.
    NarratorLine {
        /// The phase it narrates.
        phase: Phase,
    },
    /// The narrator failed and the deterministic fallback was used.
    NarratorFallback {
        /// The phase it narrates.
        phase: Phase,
    },
}

impl SeasonEventKind {
    /// Check whether a given character is involved in this event.
    pub fn involves(&self, id: &CastId) -> bool {
        match self {
            Self::TrialWon { winner, .. } => winner == id,
            Self::AllianceFormed { members, .. } => members.contains(id),
            Self::VoteCast { voter, target } => voter == id || target == id,
            Self::AdvantagePlayed { holder, .. } => holder == id,
            Self::Eliminated { target } => target == id,
            Self::TieBreakForced { tied } => tied.contains(id),
            Self::JuryVoteCast { juror, finalist } => juror == id || finalist == id,
            Self::ChampionCrowned { champion } => champion == id,
            Self::PhaseEntered { .. }
            | Self::AllianceDissolved { .. }
            | Self::NarratorLine { .. }
            | Self::NarratorFallback { .. } => false,
        }
    }
}

/// A record of something that happened during a season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonEvent {
    /// The round when the event occurred.
    pub round: u32,
    /// The specific kind of event.
    pub kind: SeasonEventKind,
    /// A human-readable description.
    pub description: String,
}

impl SeasonEvent {
    /// Create an event record.
    pub fn new(round: u32, kind: SeasonEventKind, description: impl Into<String>) -> Self {
        Self {
            round,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events during a season run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonLog {
    events: Vec<SeasonEvent>,
    max_events: usize,
}

impl SeasonLog {
    /// Create a log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest if the log exceeds capacity.
    pub fn push(&mut self, event: SeasonEvent) {
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain = self.events.len() - self.max_events;
            self.events.drain(..drain);
        }
    }

    /// All recorded events.
    pub fn events(&self) -> &[SeasonEvent] {
        &self.events
    }

    /// Events from a given round.
    pub fn events_in_round(&self, round: u32) -> Vec<&SeasonEvent> {
        self.events.iter().filter(|e| e.round == round).collect()
    }

    /// Events involving a given character.
    pub fn events_for(&self, id: &CastId) -> Vec<&SeasonEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// A marker into the season log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    /// User- or system-supplied label.
    pub label: String,
    /// Round at bookmark creation.
    pub round: u32,
    /// Phase at bookmark creation.
    pub phase: Phase,
    /// Index into the log at creation time.
    pub event_index: usize,
    /// Wall-clock creation time.
    pub created_at: DateTime<Utc>,
}
