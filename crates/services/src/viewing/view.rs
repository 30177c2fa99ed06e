use chrono::{DateTime, Utc};

use course_core::model::{CourseDetails, LectureId, ProgressSet};

use super::session::{SessionState, ViewingSession};

/// Presentation-agnostic row for one curriculum entry.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings
/// - no localization assumptions
///
/// The UI may render viewed state (checkmarks, dimming) as needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LectureStatus {
    pub lecture_id: LectureId,
    pub title: String,
    pub free_preview: bool,
    pub viewed: bool,
    pub viewed_at: Option<DateTime<Utc>>,
    pub active: bool,
}

/// Snapshot of a session for display: curriculum rows plus aggregates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseProgressView {
    pub course_title: String,
    pub lectures: Vec<LectureStatus>,
    pub viewed_count: usize,
    pub course_complete: bool,
}

impl CourseProgressView {
    /// Project a loaded session; `None` while locked or loading.
    #[must_use]
    pub fn from_session(session: &ViewingSession) -> Option<Self> {
        let details = session.details()?;
        let active_id = match session.state() {
            SessionState::Active(id) => Some(id),
            SessionState::Locked | SessionState::Loading => return None,
            SessionState::CourseComplete => None,
        };
        Some(Self::project(details, session.progress(), active_id))
    }

    fn project(
        details: &CourseDetails,
        progress: &ProgressSet,
        active_id: Option<LectureId>,
    ) -> Self {
        let lectures: Vec<LectureStatus> = details
            .curriculum
            .iter()
            .map(|lecture| LectureStatus {
                lecture_id: lecture.id(),
                title: lecture.title().to_string(),
                free_preview: lecture.free_preview(),
                viewed: progress.is_viewed(lecture.id()),
                viewed_at: progress
                    .get(lecture.id())
                    .and_then(|record| record.viewed_at),
                active: active_id == Some(lecture.id()),
            })
            .collect();
        let viewed_count = lectures.iter().filter(|status| status.viewed).count();
        Self {
            course_title: details.course.title().to_string(),
            lectures,
            viewed_count,
            course_complete: details.curriculum.is_complete(progress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::{Course, CourseId, Curriculum, Lecture, StudentId, VideoUri};
    use course_core::time::fixed_now;

    fn session(viewed: &[u64]) -> ViewingSession {
        let course = Course::new(CourseId::new(7), "Knots and Lines", None).unwrap();
        let lectures = (1..=3u64)
            .map(|id| {
                let uri =
                    VideoUri::parse(format!("https://media.example.com/videos/{id}.mp4")).unwrap();
                Lecture::new(LectureId::new(id), format!("Lecture {id}"), uri, id == 1).unwrap()
            })
            .collect();
        let details = CourseDetails::new(course, Curriculum::new(lectures).unwrap());
        let mut progress = ProgressSet::new();
        for &id in viewed {
            progress.mark_viewed(LectureId::new(id), fixed_now());
        }
        ViewingSession::start(StudentId::new(1), CourseId::new(7), details, progress)
    }

    #[test]
    fn view_flags_viewed_and_active_rows() {
        let view = CourseProgressView::from_session(&session(&[1])).unwrap();
        assert_eq!(view.course_title, "Knots and Lines");
        assert_eq!(view.viewed_count, 1);
        assert!(!view.course_complete);
        assert!(view.lectures[0].viewed);
        assert_eq!(view.lectures[0].viewed_at, Some(fixed_now()));
        assert!(view.lectures[0].free_preview);
        assert!(view.lectures[1].active);
        assert!(!view.lectures[2].active);
    }

    #[test]
    fn completed_course_has_no_active_row() {
        let view = CourseProgressView::from_session(&session(&[1, 2, 3])).unwrap();
        assert!(view.course_complete);
        assert!(view.lectures.iter().all(|status| !status.active));
    }

    #[test]
    fn locked_session_projects_nothing() {
        let session = ViewingSession::locked(StudentId::new(1), CourseId::new(7));
        assert!(CourseProgressView::from_session(&session).is_none());
    }
}
