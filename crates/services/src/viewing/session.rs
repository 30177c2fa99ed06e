use chrono::{DateTime, Utc};

use course_core::model::{CourseDetails, CourseId, Lecture, LectureId, ProgressSet, StudentId};
use course_core::playback::{PlaybackTracker, PlaybackUpdate};

use crate::error::ViewingError;

//
// ─── SESSION STATE ─────────────────────────────────────────────────────────────
//

/// Lifecycle state of a viewing session.
///
/// `Locked` and `Loading` carry no lecture: there is nothing to play.
/// `Active` names the lecture whose tracker is live. `CourseComplete` is
/// left only through [`ViewingSession::watch_lecture`] or a progress reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Locked,
    Loading,
    Active(LectureId),
    CourseComplete,
}

//
// ─── VIEWING SESSION ───────────────────────────────────────────────────────────
//

/// In-memory viewing session for one (student, course) pair.
///
/// Holds the fetched course details, the student's progress records, and
/// the per-open playback tracker. The tracker is reset every time a
/// different lecture becomes active, and on "watch again" for the same
/// lecture.
pub struct ViewingSession {
    student_id: StudentId,
    course_id: CourseId,
    details: Option<CourseDetails>,
    progress: ProgressSet,
    state: SessionState,
    tracker: PlaybackTracker,
}

impl ViewingSession {
    /// Create a locked session for a student without an entitlement.
    ///
    /// Locked sessions never expose curriculum content; `details` stays
    /// empty until an entitlement check passes and the session is rebuilt.
    #[must_use]
    pub fn locked(student_id: StudentId, course_id: CourseId) -> Self {
        Self {
            student_id,
            course_id,
            details: None,
            progress: ProgressSet::new(),
            state: SessionState::Locked,
            tracker: PlaybackTracker::new(),
        }
    }

    /// Start a session from fetched course details and progress records.
    ///
    /// The initial state is derived from the data: `CourseComplete` when
    /// every lecture is viewed (or the curriculum is empty), otherwise
    /// `Active` on the resume target.
    #[must_use]
    pub fn start(
        student_id: StudentId,
        course_id: CourseId,
        details: CourseDetails,
        progress: ProgressSet,
    ) -> Self {
        let state = derive_state(&details, &progress);
        Self {
            student_id,
            course_id,
            details: Some(details),
            progress,
            state,
            tracker: PlaybackTracker::new(),
        }
    }

    #[must_use]
    pub fn student_id(&self) -> StudentId {
        self.student_id
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.state == SessionState::Locked
    }

    /// Course details, if the session has been loaded with them.
    #[must_use]
    pub fn details(&self) -> Option<&CourseDetails> {
        self.details.as_ref()
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressSet {
        &self.progress
    }

    #[must_use]
    pub fn tracker(&self) -> &PlaybackTracker {
        &self.tracker
    }

    /// The lecture currently playing, when the session is `Active`.
    #[must_use]
    pub fn current_lecture(&self) -> Option<&Lecture> {
        let SessionState::Active(lecture_id) = self.state else {
            return None;
        };
        self.details
            .as_ref()
            .and_then(|details| details.curriculum.lecture(lecture_id))
    }

    /// Activate a specific lecture, resetting the tracker.
    ///
    /// Also the way out of `CourseComplete` for re-watching a single
    /// lecture without destroying stored progress.
    ///
    /// # Errors
    ///
    /// Returns `ViewingError::Locked` on a locked session and
    /// `ViewingError::UnknownLecture` when the lecture is not part of the
    /// course curriculum.
    pub fn watch_lecture(&mut self, lecture_id: LectureId) -> Result<(), ViewingError> {
        let details = self.details.as_ref().ok_or(ViewingError::Locked)?;
        if details.curriculum.lecture(lecture_id).is_none() {
            return Err(ViewingError::UnknownLecture(lecture_id));
        }
        self.state = SessionState::Active(lecture_id);
        self.tracker.reset();
        Ok(())
    }

    /// Re-arm the tracker for the active lecture ("watch again").
    ///
    /// # Errors
    ///
    /// Returns `ViewingError::NotActive` unless a lecture is active.
    pub fn watch_again(&mut self) -> Result<(), ViewingError> {
        match self.state {
            SessionState::Active(_) => {
                self.tracker.reset();
                Ok(())
            }
            _ => Err(ViewingError::NotActive),
        }
    }

    /// Feed a playback position report into the active tracker.
    ///
    /// # Errors
    ///
    /// Returns `ViewingError::NotActive` unless a lecture is active.
    pub fn track(&mut self, fraction: f64, seeking: bool) -> Result<PlaybackUpdate, ViewingError> {
        match self.state {
            SessionState::Active(_) => Ok(self.tracker.on_progress(fraction, seeking)),
            _ => Err(ViewingError::NotActive),
        }
    }

    /// Apply a viewed mark to the in-memory progress set.
    ///
    /// Returns whether the set changed; the caller is responsible for the
    /// durable write and for rolling back via [`Self::rollback_mark`] when
    /// that write fails.
    pub(crate) fn apply_mark(&mut self, lecture_id: LectureId, at: DateTime<Utc>) -> bool {
        self.progress.mark_viewed(lecture_id, at)
    }

    pub(crate) fn rollback_mark(&mut self, lecture_id: LectureId) {
        self.progress.clear_viewed(lecture_id);
    }

    /// Re-derive the session state after the given lecture was marked viewed.
    ///
    /// Moves to `CourseComplete` when every lecture is viewed, otherwise to
    /// the lecture after `lecture_id` with a fresh tracker. At the end of
    /// an incomplete curriculum the session stays on `lecture_id`.
    pub(crate) fn advance_past(&mut self, lecture_id: LectureId) {
        let Some(details) = self.details.as_ref() else {
            return;
        };
        if details.curriculum.is_complete(&self.progress) {
            self.state = SessionState::CourseComplete;
            return;
        }
        if let Some(next) = details.curriculum.next_after(lecture_id) {
            self.state = SessionState::Active(next.id());
            self.tracker.reset();
        }
    }

    pub(crate) fn set_loading(&mut self) {
        self.state = SessionState::Loading;
    }

    pub(crate) fn replace_progress(&mut self, progress: ProgressSet) {
        self.progress = progress;
        let Some(details) = self.details.as_ref() else {
            self.state = SessionState::Locked;
            return;
        };
        self.state = derive_state(details, &self.progress);
        self.tracker.reset();
    }
}

fn derive_state(details: &CourseDetails, progress: &ProgressSet) -> SessionState {
    if details.curriculum.is_complete(progress) {
        return SessionState::CourseComplete;
    }
    match details.curriculum.resume_lecture(progress) {
        Some(lecture) => SessionState::Active(lecture.id()),
        // Unreachable for a non-empty, incomplete curriculum; empty
        // curricula are complete by the branch above.
        None => SessionState::CourseComplete,
    }
}
