//! Configuration for a season run.

use serde::{Deserialize, Serialize};

/// Configuration for a season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonConfig {
    /// Active cast size at which the finale arc begins.
    pub finalist_threshold: usize,
    /// Eliminated players join the jury once active cast size is at or
    /// below this value.
    pub jury_window: usize,
    /// Maximum simulated ticks for a trial race before it is called on
    /// progress.
    pub trial_tick_budget: u32,
    /// Attempts against the narrator before falling back to a template.
    pub max_content_attempts: u32,
    /// Maximum event log size (oldest events dropped when exceeded).
    /// 0 = unlimited.
    pub max_events: usize,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            finalist_threshold: 2,
            jury_window: 7,
            trial_tick_budget: 60,
            max_content_attempts: 2,
            max_events: 0,
        }
    }
}

impl SeasonConfig {
    /// Set the active cast size that triggers the finale arc.
    pub fn with_finalist_threshold(mut self, threshold: usize) -> Self {
        self.finalist_threshold = threshold.max(2);
        self
    }

    /// Set the jury window.
    pub fn with_jury_window(mut self, window: usize) -> Self {
        self.jury_window = window;
        self
    }

    /// Set the trial tick budget.
    pub fn with_trial_tick_budget(mut self, budget: u32) -> Self {
        self.trial_tick_budget = budget.max(1);
        self
    }

    /// Set the narrator attempt budget (at least 1).
    pub fn with_max_content_attempts(mut self, attempts: u32) -> Self {
        self.max_content_attempts = attempts.max(1);
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }
}
