use thiserror::Error;

use crate::model::ids::LectureId;
use crate::model::lecture::Lecture;
use crate::model::progress::ProgressSet;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CurriculumError {
    #[error("duplicate lecture id in curriculum: {id}")]
    DuplicateLecture { id: LectureId },
}

//
// ─── CURRICULUM ────────────────────────────────────────────────────────────────
//

/// The ordered list of lectures for a course.
///
/// Order is significant: it defines navigation and completion enumeration.
/// The curriculum is owned by the course catalog and read-only to the
/// progress core; navigation and completion are derived from it plus a
/// `ProgressSet`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Curriculum {
    lectures: Vec<Lecture>,
}

impl Curriculum {
    /// Build a curriculum, rejecting duplicate lecture ids.
    ///
    /// An empty curriculum is permitted; callers are expected to
    /// special-case it upstream since it is vacuously complete.
    ///
    /// # Errors
    ///
    /// Returns `CurriculumError::DuplicateLecture` if two lectures share an id.
    pub fn new(lectures: Vec<Lecture>) -> Result<Self, CurriculumError> {
        for (i, lecture) in lectures.iter().enumerate() {
            if lectures[..i].iter().any(|seen| seen.id() == lecture.id()) {
                return Err(CurriculumError::DuplicateLecture { id: lecture.id() });
            }
        }
        Ok(Self { lectures })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lectures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lectures.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Lecture> {
        self.lectures.get(index)
    }

    #[must_use]
    pub fn first(&self) -> Option<&Lecture> {
        self.lectures.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lecture> {
        self.lectures.iter()
    }

    #[must_use]
    pub fn position_of(&self, lecture_id: LectureId) -> Option<usize> {
        self.lectures
            .iter()
            .position(|lecture| lecture.id() == lecture_id)
    }

    #[must_use]
    pub fn lecture(&self, lecture_id: LectureId) -> Option<&Lecture> {
        self.lectures
            .iter()
            .find(|lecture| lecture.id() == lecture_id)
    }

    // ─── NAVIGATION ────────────────────────────────────────────────────────

    /// The lecture immediately following `lecture_id` in curriculum order.
    ///
    /// Returns `None` when `lecture_id` is the last lecture (the caller
    /// reads this as "course finished" rather than navigating) or unknown.
    #[must_use]
    pub fn next_after(&self, lecture_id: LectureId) -> Option<&Lecture> {
        let index = self.position_of(lecture_id)?;
        self.lectures.get(index + 1)
    }

    /// Index of the lecture a returning student should be shown.
    ///
    /// Scans for the highest viewed index `i` and resumes at `i + 1`,
    /// clamped to the last index. Nothing viewed resumes at 0. The
    /// highest-viewed rule (rather than first-unviewed) tolerates
    /// out-of-order viewing of free-preview lectures.
    #[must_use]
    pub fn resume_index(&self, progress: &ProgressSet) -> usize {
        let last_viewed = self
            .lectures
            .iter()
            .rposition(|lecture| progress.is_viewed(lecture.id()));

        match last_viewed {
            Some(i) => (i + 1).min(self.lectures.len().saturating_sub(1)),
            None => 0,
        }
    }

    /// The resume target itself; `None` only for an empty curriculum.
    #[must_use]
    pub fn resume_lecture(&self, progress: &ProgressSet) -> Option<&Lecture> {
        self.lectures.get(self.resume_index(progress))
    }

    // ─── COMPLETION ────────────────────────────────────────────────────────

    /// True iff every lecture in the curriculum is marked viewed.
    ///
    /// Pure predicate, recomputed after every mark; never cached across
    /// mutations. An empty curriculum is vacuously complete.
    #[must_use]
    pub fn is_complete(&self, progress: &ProgressSet) -> bool {
        self.lectures
            .iter()
            .all(|lecture| progress.is_viewed(lecture.id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::lecture::VideoUri;
    use crate::time::fixed_now;

    fn lecture(id: u64, title: &str) -> Lecture {
        let uri = VideoUri::parse(format!("https://media.example.com/v/{id}")).unwrap();
        Lecture::new(LectureId::new(id), title, uri, false).unwrap()
    }

    fn abc() -> Curriculum {
        Curriculum::new(vec![lecture(1, "A"), lecture(2, "B"), lecture(3, "C")]).unwrap()
    }

    #[test]
    fn rejects_duplicate_lecture_ids() {
        let err = Curriculum::new(vec![lecture(1, "A"), lecture(1, "A again")]).unwrap_err();
        assert_eq!(
            err,
            CurriculumError::DuplicateLecture {
                id: LectureId::new(1)
            }
        );
    }

    #[test]
    fn resume_with_no_progress_is_first_lecture() {
        let curriculum = abc();
        let progress = ProgressSet::new();
        assert_eq!(curriculum.resume_index(&progress), 0);
        assert_eq!(
            curriculum.resume_lecture(&progress).unwrap().id(),
            LectureId::new(1)
        );
    }

    #[test]
    fn resume_after_first_viewed_is_second() {
        let curriculum = abc();
        let mut progress = ProgressSet::new();
        progress.mark_viewed(LectureId::new(1), fixed_now());
        assert_eq!(
            curriculum.resume_lecture(&progress).unwrap().id(),
            LectureId::new(2)
        );
    }

    #[test]
    fn resume_clamps_when_highest_viewed_is_last() {
        // Out-of-order viewing: A and C viewed, B skipped. Highest viewed
        // index is 2 (C); 2 + 1 clamps back to the last index.
        let curriculum = abc();
        let mut progress = ProgressSet::new();
        progress.mark_viewed(LectureId::new(1), fixed_now());
        progress.mark_viewed(LectureId::new(3), fixed_now());
        assert_eq!(curriculum.resume_index(&progress), 2);
        assert_eq!(
            curriculum.resume_lecture(&progress).unwrap().id(),
            LectureId::new(3)
        );
    }

    #[test]
    fn next_after_walks_in_order_and_ends_with_none() {
        let curriculum = abc();
        assert_eq!(
            curriculum.next_after(LectureId::new(1)).unwrap().id(),
            LectureId::new(2)
        );
        assert!(curriculum.next_after(LectureId::new(3)).is_none());
        assert!(curriculum.next_after(LectureId::new(42)).is_none());
    }

    #[test]
    fn completion_requires_every_lecture() {
        let curriculum =
            Curriculum::new(vec![lecture(1, "A"), lecture(2, "B")]).unwrap();
        let mut progress = ProgressSet::new();
        progress.mark_viewed(LectureId::new(1), fixed_now());
        assert!(!curriculum.is_complete(&progress));
        progress.mark_viewed(LectureId::new(2), fixed_now());
        assert!(curriculum.is_complete(&progress));
    }

    #[test]
    fn stray_progress_records_are_tolerated() {
        let curriculum = abc();
        let mut progress = ProgressSet::new();
        // Record for a lecture that is not in this curriculum.
        progress.mark_viewed(LectureId::new(999), fixed_now());
        assert!(!curriculum.is_complete(&progress));
        assert_eq!(curriculum.resume_index(&progress), 0);
    }

    #[test]
    fn empty_curriculum_is_vacuously_complete() {
        let curriculum = Curriculum::new(Vec::new()).unwrap();
        let progress = ProgressSet::new();
        assert!(curriculum.is_complete(&progress));
        assert!(curriculum.resume_lecture(&progress).is_none());
    }
}
