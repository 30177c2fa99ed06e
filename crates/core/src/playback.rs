//! Playback-progress state machine for the lecture currently open.
//!
//! Consumes normalized player positions (fractions of total duration in
//! `[0, 1]`), enforces the monotonic "furthest point reached" frontier, and
//! surfaces a once-per-open completion signal when the lecture finishes.

//
// ─── CONSTANTS ─────────────────────────────────────────────────────────────────
//

/// Fraction at which a lecture counts as complete.
///
/// Players with keyframe-granular or rounded reporting often never emit
/// exactly 1.0, so completion triggers just below it.
pub const COMPLETION_THRESHOLD: f64 = 0.99;

//
// ─── UPDATE RESULT ─────────────────────────────────────────────────────────────
//

/// What the player should do after a progress report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackDirective {
    /// Keep playing; the report was accepted as-is.
    Continue,
    /// Seeking past the watched frontier was rejected; the player must jump
    /// back to the contained fraction.
    ForceSeek,
    /// The lecture just completed; pause.
    Pause,
}

/// Outcome of a single `on_progress` call.
///
/// `progress_value` is the value reported outward on every update; the
/// store adapter persists it only when it reaches 1.0, partial values are
/// observational.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackUpdate {
    /// The effective playback position after anti-skip enforcement.
    pub effective_fraction: f64,
    pub directive: PlaybackDirective,
    /// True exactly once per lecture-open, on the report that crossed the
    /// completion threshold.
    pub completed_now: bool,
    pub progress_value: f64,
}

//
// ─── TRACKER ───────────────────────────────────────────────────────────────────
//

/// Per-open-lecture playback state. Ephemeral, never persisted.
///
/// Created fresh (or `reset`) whenever a different lecture is opened,
/// including "watch again" on the same lecture.
///
/// # Examples
///
/// ```
/// use course_core::playback::{PlaybackDirective, PlaybackTracker};
///
/// let mut tracker = PlaybackTracker::new();
/// let update = tracker.on_progress(0.25, false);
/// assert_eq!(update.directive, PlaybackDirective::Continue);
///
/// // Seeking ahead of the frontier is rejected.
/// let update = tracker.on_progress(0.9, true);
/// assert_eq!(update.directive, PlaybackDirective::ForceSeek);
/// assert_eq!(update.effective_fraction, 0.25);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackTracker {
    max_fraction: f64,
    current_fraction: f64,
    completed: bool,
    playing: bool,
}

impl Default for PlaybackTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_fraction: 0.0,
            current_fraction: 0.0,
            completed: false,
            playing: true,
        }
    }

    /// Furthest fraction ever reached this open. Non-decreasing until `reset`.
    #[must_use]
    pub fn max_fraction(&self) -> f64 {
        self.max_fraction
    }

    #[must_use]
    pub fn current_fraction(&self) -> f64 {
        self.current_fraction
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Feed one player progress report.
    ///
    /// `seeking` is true while the user is actively dragging a seek control;
    /// the event source distinguishes dragging from natural playback.
    ///
    /// Rules, in order:
    /// - the fraction is clamped to `[0, 1]`; out-of-range input never errors
    /// - rewinding (fraction at or below the frontier) is always accepted
    /// - seeking forward past the frontier is rejected with `ForceSeek`
    /// - natural playback past the frontier advances it
    /// - crossing [`COMPLETION_THRESHOLD`] pauses playback and reports
    ///   `completed_now` exactly once per open
    pub fn on_progress(&mut self, fraction: f64, seeking: bool) -> PlaybackUpdate {
        let fraction = clamp_fraction(fraction);

        if fraction > self.max_fraction {
            if seeking {
                // Forward seek past the watched frontier: hold the line.
                self.current_fraction = self.max_fraction;
                return PlaybackUpdate {
                    effective_fraction: self.max_fraction,
                    directive: PlaybackDirective::ForceSeek,
                    completed_now: false,
                    progress_value: self.progress_value(),
                };
            }
            self.max_fraction = fraction;
        }
        self.current_fraction = fraction;

        if fraction >= COMPLETION_THRESHOLD && !self.completed {
            self.completed = true;
            self.playing = false;
            return PlaybackUpdate {
                effective_fraction: fraction,
                directive: PlaybackDirective::Pause,
                completed_now: true,
                progress_value: 1.0,
            };
        }

        PlaybackUpdate {
            effective_fraction: fraction,
            directive: PlaybackDirective::Continue,
            completed_now: false,
            progress_value: self.progress_value(),
        }
    }

    /// Restart for "watch again": zero both fractions, clear the completion
    /// flag, resume playback.
    pub fn reset(&mut self) {
        self.max_fraction = 0.0;
        self.current_fraction = 0.0;
        self.completed = false;
        self.playing = true;
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    fn progress_value(&self) -> f64 {
        if self.completed {
            1.0
        } else {
            self.current_fraction
        }
    }
}

fn clamp_fraction(fraction: f64) -> f64 {
    if fraction.is_nan() {
        return 0.0;
    }
    fraction.clamp(0.0, 1.0)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_fraction_is_monotonic_over_any_sequence() {
        let mut tracker = PlaybackTracker::new();
        let reports = [0.1, 0.3, 0.2, 0.5, 0.05, 0.4, 0.6];
        let mut previous_max = 0.0;
        for fraction in reports {
            tracker.on_progress(fraction, false);
            assert!(tracker.max_fraction() >= previous_max);
            previous_max = tracker.max_fraction();
        }
        assert_eq!(tracker.max_fraction(), 0.6);
    }

    #[test]
    fn rewind_is_accepted_without_moving_the_frontier() {
        let mut tracker = PlaybackTracker::new();
        tracker.on_progress(0.5, false);
        let update = tracker.on_progress(0.2, false);
        assert_eq!(update.directive, PlaybackDirective::Continue);
        assert_eq!(update.effective_fraction, 0.2);
        assert_eq!(tracker.max_fraction(), 0.5);
    }

    #[test]
    fn forward_seek_past_frontier_is_forced_back() {
        let mut tracker = PlaybackTracker::new();
        tracker.on_progress(0.3, false);
        let update = tracker.on_progress(0.8, true);
        assert_eq!(update.directive, PlaybackDirective::ForceSeek);
        assert_eq!(update.effective_fraction, 0.3);
        assert_eq!(tracker.max_fraction(), 0.3);
        assert_eq!(tracker.current_fraction(), 0.3);
    }

    #[test]
    fn backward_seek_within_watched_range_is_allowed() {
        let mut tracker = PlaybackTracker::new();
        tracker.on_progress(0.6, false);
        let update = tracker.on_progress(0.1, true);
        assert_eq!(update.directive, PlaybackDirective::Continue);
        assert_eq!(update.effective_fraction, 0.1);
    }

    #[test]
    fn completion_fires_exactly_once_per_open() {
        let mut tracker = PlaybackTracker::new();
        let update = tracker.on_progress(0.995, false);
        assert!(update.completed_now);
        assert_eq!(update.directive, PlaybackDirective::Pause);
        assert_eq!(update.progress_value, 1.0);
        assert!(!tracker.is_playing());

        // Players keep reporting after the pause; nothing re-fires.
        for _ in 0..3 {
            let update = tracker.on_progress(1.0, false);
            assert!(!update.completed_now);
            assert_eq!(update.progress_value, 1.0);
        }
    }

    #[test]
    fn threshold_boundary_completes_at_exactly_099() {
        let mut tracker = PlaybackTracker::new();
        assert!(!tracker.on_progress(0.989, false).completed_now);
        assert!(tracker.on_progress(0.99, false).completed_now);
    }

    #[test]
    fn out_of_range_fractions_are_clamped_never_errors() {
        let mut tracker = PlaybackTracker::new();
        let update = tracker.on_progress(-0.5, false);
        assert_eq!(update.effective_fraction, 0.0);
        let update = tracker.on_progress(17.0, false);
        // Clamped to 1.0, which also completes the lecture.
        assert_eq!(update.effective_fraction, 1.0);
        assert!(update.completed_now);
        let update = tracker.on_progress(f64::NAN, false);
        assert_eq!(update.effective_fraction, 0.0);
    }

    #[test]
    fn reset_clears_frontier_completion_and_resumes() {
        let mut tracker = PlaybackTracker::new();
        tracker.on_progress(1.0, false);
        assert!(tracker.is_completed());

        tracker.reset();
        assert_eq!(tracker.max_fraction(), 0.0);
        assert_eq!(tracker.current_fraction(), 0.0);
        assert!(!tracker.is_completed());
        assert!(tracker.is_playing());

        // The completion event can fire again after a reset.
        assert!(tracker.on_progress(0.99, false).completed_now);
    }
}
