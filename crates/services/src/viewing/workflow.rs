use std::sync::Arc;

use course_core::model::{CourseId, ProgressSet, StudentId};
use course_core::playback::PlaybackUpdate;
use storage::repository::{CourseRepository, EntitlementRepository, ProgressRepository, Storage};

use crate::Clock;
use crate::error::ViewingError;
use super::session::{SessionState, ViewingSession};

/// Result of feeding one playback report through the session.
///
/// `marked` is `Some` when the report crossed the completion threshold and
/// a durable viewed-mark was attempted; `Some(false)` means the write
/// failed and the in-memory mark was rolled back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressOutcome {
    pub update: PlaybackUpdate,
    pub marked: Option<bool>,
}

/// Orchestrates session loading, progress persistence, and resets.
#[derive(Clone)]
pub struct ViewingService {
    clock: Clock,
    courses: Arc<dyn CourseRepository>,
    progress: Arc<dyn ProgressRepository>,
    entitlements: Arc<dyn EntitlementRepository>,
}

impl ViewingService {
    #[must_use]
    pub fn new(
        clock: Clock,
        courses: Arc<dyn CourseRepository>,
        progress: Arc<dyn ProgressRepository>,
        entitlements: Arc<dyn EntitlementRepository>,
    ) -> Self {
        Self {
            clock,
            courses,
            progress,
            entitlements,
        }
    }

    #[must_use]
    pub fn from_storage(clock: Clock, storage: &Storage) -> Self {
        Self::new(
            clock,
            Arc::clone(&storage.courses),
            Arc::clone(&storage.progress),
            Arc::clone(&storage.entitlements),
        )
    }

    /// Load a viewing session for a student and course.
    ///
    /// Without an entitlement the session comes back locked and no course
    /// content is fetched. Otherwise the course details and progress
    /// records are fetched and the session state derived from them.
    ///
    /// # Errors
    ///
    /// Returns `ViewingError::Storage` on repository failures.
    pub async fn load(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<ViewingSession, ViewingError> {
        if !self.entitlements.is_purchased(student_id, course_id).await? {
            tracing::debug!(%student_id, %course_id, "session locked, no entitlement");
            return Ok(ViewingSession::locked(student_id, course_id));
        }
        let details = self.courses.get_course(course_id).await?;
        let records = self.progress.progress_for(student_id, course_id).await?;
        let progress = ProgressSet::from_records(records);
        let session = ViewingSession::start(student_id, course_id, details, progress);
        tracing::debug!(%student_id, %course_id, state = ?session.state(), "session loaded");
        Ok(session)
    }

    /// Feed a playback position report through the active lecture.
    ///
    /// When the report completes the lecture, the viewed-mark is persisted
    /// and the session advances (next lecture, or `CourseComplete`). A
    /// failed durable write rolls the mark back and leaves the session on
    /// the same lecture so the report can be retried.
    ///
    /// # Errors
    ///
    /// Returns `ViewingError::NotActive` unless a lecture is active. A
    /// failed mark write is not an error; it surfaces as `marked: Some(false)`.
    pub async fn report_progress(
        &self,
        session: &mut ViewingSession,
        fraction: f64,
        seeking: bool,
    ) -> Result<ProgressOutcome, ViewingError> {
        let update = session.track(fraction, seeking)?;
        let marked = if update.completed_now {
            Some(self.complete_current(session).await?)
        } else {
            None
        };
        Ok(ProgressOutcome { update, marked })
    }

    /// Mark the active lecture viewed and advance the session.
    ///
    /// The in-memory mark is applied first; if the durable write fails the
    /// mark is rolled back and `Ok(false)` is returned, leaving stored and
    /// in-memory state consistent. Already-viewed lectures return `Ok(true)`
    /// without touching storage.
    ///
    /// # Errors
    ///
    /// Returns `ViewingError::NotActive` unless a lecture is active.
    pub async fn complete_current(
        &self,
        session: &mut ViewingSession,
    ) -> Result<bool, ViewingError> {
        let SessionState::Active(lecture_id) = session.state() else {
            return Err(ViewingError::NotActive);
        };
        if session.progress().is_viewed(lecture_id) {
            session.advance_past(lecture_id);
            return Ok(true);
        }

        let viewed_at = self.clock.now();
        session.apply_mark(lecture_id, viewed_at);
        let write = self
            .progress
            .mark_viewed(session.student_id(), session.course_id(), lecture_id, viewed_at)
            .await;
        match write {
            Ok(()) => {
                session.advance_past(lecture_id);
                tracing::debug!(%lecture_id, state = ?session.state(), "lecture marked viewed");
                Ok(true)
            }
            Err(err) => {
                session.rollback_mark(lecture_id);
                tracing::warn!(%lecture_id, error = %err, "viewed-mark write failed, rolled back");
                Ok(false)
            }
        }
    }

    /// Reset all stored progress for the session's course and re-fetch.
    ///
    /// The session passes through `Loading` while the delete and re-fetch
    /// run; afterwards it is active on the first lecture with a fresh
    /// tracker. Used to escape `CourseComplete` and watch the course again.
    ///
    /// # Errors
    ///
    /// Returns `ViewingError::Locked` on a locked session and
    /// `ViewingError::Storage` on repository failures. On a failed re-fetch
    /// the session is left in `Loading`; a subsequent `load` recovers it.
    pub async fn reset(&self, session: &mut ViewingSession) -> Result<(), ViewingError> {
        if session.is_locked() {
            return Err(ViewingError::Locked);
        }
        let (student_id, course_id) = (session.student_id(), session.course_id());
        session.set_loading();
        self.progress.reset(student_id, course_id).await?;
        // Re-fetch rather than trusting the local delete.
        let records = self.progress.progress_for(student_id, course_id).await?;
        session.replace_progress(ProgressSet::from_records(records));
        tracing::debug!(%student_id, %course_id, "progress reset");
        Ok(())
    }

    /// Convenience wrapper for a retryable mark after a transient failure.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::complete_current`].
    pub async fn retry_mark(&self, session: &mut ViewingSession) -> Result<bool, ViewingError> {
        self.complete_current(session).await
    }
}
