//! The vote reveal sequencer.
//!
//! Drives an index cursor from "not started" up to the final vote,
//! exposing a growing prefix of an ordered ballot list at a cadence set by
//! a speed multiplier. The sequencer owns no timers: the host calls
//! [`RevealSequencer::tick`] once per animation frame with the current
//! time, and tearing the sequencer down tears down all of its activity.
//! Keeping at most one sequencer per ballot list is the host's
//! cancel-before-reschedule discipline — re-arming replaces the old state
//! rather than running two cursors.

use serde::{Deserialize, Serialize};

/// Reveal cadence speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RevealSpeed {
    /// Interval divided by this positive factor.
    Multiplier(f32),
    /// Near-instant: a fixed fast floor per card, preserving a minimal
    /// animation rather than collapsing to zero.
    Instant,
}

impl Default for RevealSpeed {
    fn default() -> Self {
        Self::Multiplier(1.0)
    }
}

/// Timing configuration for the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealConfig {
    /// Interval between reveals at 1x speed.
    pub base_interval_ms: u64,
    /// Lower bound for the effective interval at any finite speed.
    pub min_interval_ms: u64,
    /// Fixed interval at [`RevealSpeed::Instant`].
    pub instant_floor_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: 2000,
            min_interval_ms: 150,
            instant_floor_ms: 50,
        }
    }
}

impl RevealConfig {
    /// Set the 1x interval.
    pub fn with_base_interval_ms(mut self, ms: u64) -> Self {
        self.base_interval_ms = ms;
        self
    }
}

/// What a [`RevealSequencer::tick`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing happened (paused, suspended, mid-interval, or done).
    Idle,
    /// The cursor advanced to this index.
    Advanced(usize),
    /// The cursor advanced to the final index; fires exactly once.
    Completed(usize),
}

/// A manual control input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealControl {
    /// Right arrow / enter: advance one card.
    StepForward,
    /// Left arrow: retreat one card.
    StepBack,
    /// Space: request a pause toggle. The pause flag is owned by the
    /// caller; the sequencer only reports the request.
    TogglePause,
    /// `s`: jump to the final card.
    SkipToEnd,
}

/// What a control input did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    /// Input ignored (focus was in a text field, or at an edge).
    Ignored,
    /// Cursor moved to this index.
    Moved(usize),
    /// Cursor moved back; `None` means back to "not started".
    MovedBack(Option<usize>),
    /// Caller should toggle its pause flag and mirror it via
    /// [`RevealSequencer::set_paused`].
    PauseToggleRequested,
    /// Jump or step reached the final index; fires exactly once.
    Completed(usize),
}

/// Pausable, speed-controlled step-through of an ordered ballot list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealSequencer {
    total: usize,
    index: i64,
    speed: RevealSpeed,
    paused: bool,
    autoplay: bool,
    config: RevealConfig,
    anchor_ms: Option<u64>,
    completion_fired: bool,
}

impl RevealSequencer {
    /// Create a sequencer over `total` ballots, not yet started.
    pub fn new(total: usize, config: RevealConfig) -> Self {
        Self {
            total,
            index: -1,
            speed: RevealSpeed::default(),
            paused: false,
            autoplay: true,
            config,
            anchor_ms: None,
            completion_fired: false,
        }
    }

    /// Re-arm over a new ballot list, resetting cursor, anchor, and the
    /// completion latch.
    pub fn reset(&mut self, total: usize) {
        self.total = total;
        self.index = -1;
        self.anchor_ms = None;
        self.completion_fired = false;
    }

    /// Ballot count.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Current cursor, `None` before the first reveal.
    pub fn current_index(&self) -> Option<usize> {
        usize::try_from(self.index).ok()
    }

    /// How many ballots are revealed — the length of the visible prefix.
    pub fn revealed(&self) -> usize {
        usize::try_from(self.index + 1).unwrap_or(0)
    }

    /// Whether the final ballot is revealed.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.index == self.total as i64 - 1
    }

    /// Set the cadence speed.
    pub fn set_speed(&mut self, speed: RevealSpeed) {
        self.speed = speed;
    }

    /// Mirror the caller-owned pause flag.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Enable or disable autoplay. While disabled the sequencer suspends
    /// without losing its place.
    pub fn set_autoplay(&mut self, autoplay: bool) {
        self.autoplay = autoplay;
    }

    /// The effective interval between automatic reveals.
    pub fn effective_interval_ms(&self) -> u64 {
        match self.speed {
            RevealSpeed::Instant => self.config.instant_floor_ms,
            RevealSpeed::Multiplier(m) => {
                let m = if m > 0.0 { m } else { 1.0 };
                let scaled = (self.config.base_interval_ms as f64 / f64::from(m)) as u64;
                scaled.max(self.config.min_interval_ms)
            }
        }
    }

    /// Advance time to `now_ms`. Advances the cursor by at most one step.
    ///
    /// The cursor moves only when unpaused, autoplaying, not at the end,
    /// and the elapsed time since the last advance (or since the first
    /// tick) covers the effective interval. The first tick after a reset
    /// only anchors the clock.
    pub fn tick(&mut self, now_ms: u64) -> TickOutcome {
        if self.paused || !self.autoplay || self.index >= self.total as i64 - 1 {
            return TickOutcome::Idle;
        }
        let Some(anchor) = self.anchor_ms else {
            self.anchor_ms = Some(now_ms);
            return TickOutcome::Idle;
        };
        if now_ms.saturating_sub(anchor) < self.effective_interval_ms() {
            return TickOutcome::Idle;
        }
        self.index += 1;
        self.anchor_ms = Some(now_ms);
        self.finish_or_advance()
    }

    /// Apply a manual control. All manual input is suppressed while the
    /// host's focus is inside a text input.
    pub fn control(&mut self, control: RevealControl, in_text_input: bool) -> ControlOutcome {
        if in_text_input {
            return ControlOutcome::Ignored;
        }
        match control {
            RevealControl::StepForward => {
                if self.index >= self.total as i64 - 1 {
                    return ControlOutcome::Ignored;
                }
                self.index += 1;
                match self.finish_or_advance() {
                    TickOutcome::Completed(i) => ControlOutcome::Completed(i),
                    _ => ControlOutcome::Moved(self.index as usize),
                }
            }
            RevealControl::StepBack => {
                if self.index < 0 {
                    return ControlOutcome::Ignored;
                }
                self.index -= 1;
                ControlOutcome::MovedBack(self.current_index())
            }
            RevealControl::TogglePause => ControlOutcome::PauseToggleRequested,
            RevealControl::SkipToEnd => {
                if self.total == 0 || self.index == self.total as i64 - 1 {
                    return ControlOutcome::Ignored;
                }
                self.index = self.total as i64 - 1;
                match self.finish_or_advance() {
                    TickOutcome::Completed(i) => ControlOutcome::Completed(i),
                    _ => ControlOutcome::Moved(self.index as usize),
                }
            }
        }
    }

    /// After an advance, decide between a plain move and the single
    /// completion signal.
    fn finish_or_advance(&mut self) -> TickOutcome {
        let index = self.index as usize;
        if self.is_complete() && !self.completion_fired {
            self.completion_fired = true;
            TickOutcome::Completed(index)
        } else {
            TickOutcome::Advanced(index)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequencer(total: usize) -> RevealSequencer {
        RevealSequencer::new(total, RevealConfig::default())
    }

    #[test]
    fn starts_unrevealed() {
        let seq = sequencer(5);
        assert_eq!(seq.current_index(), None);
        assert_eq!(seq.revealed(), 0);
        assert!(!seq.is_complete());
    }

    #[test]
    fn ten_intervals_advance_exactly_ten() {
        let mut seq = sequencer(20);
        let mut advances = 0;
        // Eleven ticks 2000ms apart: the first only anchors the clock.
        for t in 0..=10_u64 {
            match seq.tick(t * 2000) {
                TickOutcome::Advanced(_) | TickOutcome::Completed(_) => advances += 1,
                TickOutcome::Idle => {}
            }
        }
        assert_eq!(advances, 10);
        assert_eq!(seq.revealed(), 10);
    }

    #[test]
    fn sub_interval_ticks_do_not_advance() {
        let mut seq = sequencer(5);
        seq.tick(0);
        assert_eq!(seq.tick(500), TickOutcome::Idle);
        assert_eq!(seq.tick(1999), TickOutcome::Idle);
        assert_eq!(seq.tick(2000), TickOutcome::Advanced(0));
    }

    #[test]
    fn speed_divides_interval_with_floor() {
        let mut seq = sequencer(5);
        seq.set_speed(RevealSpeed::Multiplier(2.0));
        assert_eq!(seq.effective_interval_ms(), 1000);
        seq.set_speed(RevealSpeed::Multiplier(100.0));
        assert_eq!(seq.effective_interval_ms(), 150);
        seq.set_speed(RevealSpeed::Instant);
        assert_eq!(seq.effective_interval_ms(), 50);
    }

    #[test]
    fn instant_speed_completes_in_bounded_ticks() {
        let mut seq = sequencer(5);
        seq.set_speed(RevealSpeed::Instant);
        let mut completed = 0;
        let mut ticks = 0;
        let mut t = 0;
        seq.tick(t); // anchor
        while !seq.is_complete() && ticks < 10 {
            t += 50;
            ticks += 1;
            if let TickOutcome::Completed(i) = seq.tick(t) {
                assert_eq!(i, 4);
                completed += 1;
            }
        }
        assert!(ticks <= 5, "took {ticks} floor ticks");
        assert_eq!(completed, 1);
    }

    #[test]
    fn completion_fires_exactly_once() {
        let mut seq = sequencer(2);
        seq.tick(0);
        assert_eq!(seq.tick(2000), TickOutcome::Advanced(0));
        assert_eq!(seq.tick(4000), TickOutcome::Completed(1));
        // Further ticks at the same index never re-fire.
        assert_eq!(seq.tick(6000), TickOutcome::Idle);
        assert_eq!(seq.tick(8000), TickOutcome::Idle);
    }

    #[test]
    fn completion_does_not_refire_after_step_back() {
        let mut seq = sequencer(2);
        seq.tick(0);
        seq.tick(2000);
        assert_eq!(seq.tick(4000), TickOutcome::Completed(1));
        seq.control(RevealControl::StepBack, false);
        match seq.control(RevealControl::StepForward, false) {
            ControlOutcome::Moved(1) => {}
            other => panic!("expected plain move, got {other:?}"),
        }
    }

    #[test]
    fn pause_suspends_without_losing_place() {
        let mut seq = sequencer(5);
        seq.tick(0);
        seq.tick(2000);
        assert_eq!(seq.revealed(), 1);
        seq.set_paused(true);
        assert_eq!(seq.tick(4000), TickOutcome::Idle);
        assert_eq!(seq.tick(6000), TickOutcome::Idle);
        seq.set_paused(false);
        assert_eq!(seq.tick(8000), TickOutcome::Advanced(1));
    }

    #[test]
    fn autoplay_off_suspends() {
        let mut seq = sequencer(5);
        seq.set_autoplay(false);
        seq.tick(0);
        assert_eq!(seq.tick(2000), TickOutcome::Idle);
        seq.set_autoplay(true);
        seq.tick(4000); // anchor was never set while suspended
        assert_eq!(seq.tick(6000), TickOutcome::Advanced(0));
    }

    #[test]
    fn manual_steps_respect_bounds() {
        let mut seq = sequencer(2);
        assert_eq!(
            seq.control(RevealControl::StepBack, false),
            ControlOutcome::Ignored
        );
        assert_eq!(
            seq.control(RevealControl::StepForward, false),
            ControlOutcome::Moved(0)
        );
        assert_eq!(
            seq.control(RevealControl::StepForward, false),
            ControlOutcome::Completed(1)
        );
        assert_eq!(
            seq.control(RevealControl::StepForward, false),
            ControlOutcome::Ignored
        );
        assert_eq!(
            seq.control(RevealControl::StepBack, false),
            ControlOutcome::MovedBack(Some(0))
        );
        assert_eq!(
            seq.control(RevealControl::StepBack, false),
            ControlOutcome::MovedBack(None)
        );
    }

    #[test]
    fn skip_to_end_completes_once() {
        let mut seq = sequencer(5);
        assert_eq!(
            seq.control(RevealControl::SkipToEnd, false),
            ControlOutcome::Completed(4)
        );
        assert_eq!(
            seq.control(RevealControl::SkipToEnd, false),
            ControlOutcome::Ignored
        );
    }

    #[test]
    fn text_input_suppresses_controls() {
        let mut seq = sequencer(5);
        assert_eq!(
            seq.control(RevealControl::StepForward, true),
            ControlOutcome::Ignored
        );
        assert_eq!(
            seq.control(RevealControl::TogglePause, true),
            ControlOutcome::Ignored
        );
        assert_eq!(seq.revealed(), 0);
    }

    #[test]
    fn pause_toggle_is_signaled_not_owned() {
        let mut seq = sequencer(5);
        assert_eq!(
            seq.control(RevealControl::TogglePause, false),
            ControlOutcome::PauseToggleRequested
        );
        // The sequencer did not pause itself.
        seq.tick(0);
        assert_eq!(seq.tick(2000), TickOutcome::Advanced(0));
    }

    #[test]
    fn zero_votes_never_completes() {
        let mut seq = sequencer(0);
        seq.tick(0);
        assert_eq!(seq.tick(5000), TickOutcome::Idle);
        assert!(!seq.is_complete());
        assert_eq!(
            seq.control(RevealControl::SkipToEnd, false),
            ControlOutcome::Ignored
        );
    }

    #[test]
    fn reset_rearms_the_latch() {
        let mut seq = sequencer(1);
        assert_eq!(
            seq.control(RevealControl::StepForward, false),
            ControlOutcome::Completed(0)
        );
        seq.reset(3);
        assert_eq!(seq.revealed(), 0);
        assert_eq!(
            seq.control(RevealControl::SkipToEnd, false),
            ControlOutcome::Completed(2)
        );
    }

    #[test]
    fn index_monotonic_while_playing_forward() {
        let mut seq = sequencer(8);
        seq.set_speed(RevealSpeed::Multiplier(4.0));
        let mut last = 0;
        for t in (0..20_000_u64).step_by(250) {
            seq.tick(t);
            let revealed = seq.revealed();
            assert!(revealed >= last);
            assert!(revealed <= 8);
            last = revealed;
        }
        assert!(seq.is_complete());
    }
}
