use async_trait::async_trait;
use chrono::{DateTime, Utc};
use course_core::model::{Course, CourseDetails, CourseId, LectureId, ProgressRecord, StudentId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for the course catalog.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Persist or update a course together with its ordered curriculum.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the course cannot be stored.
    async fn upsert_course(&self, details: &CourseDetails) -> Result<(), StorageError>;

    /// Fetch a course and its curriculum by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_course(&self, id: CourseId) -> Result<CourseDetails, StorageError>;

    /// All courses in the catalog, without curricula, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or mapping failures.
    async fn list_courses(&self) -> Result<Vec<Course>, StorageError>;
}

/// Repository contract for per-lecture viewing progress.
///
/// `viewed` is monotonic per (student, course, lecture): once true it stays
/// true until a whole-course `reset`. Re-marking an already viewed lecture
/// must be an acknowledged no-op, so late duplicate writes are harmless.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// All progress records for the (student, course) pair, possibly empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or mapping failures.
    async fn progress_for(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Vec<ProgressRecord>, StorageError>;

    /// Durably mark one lecture viewed. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails; callers treat that as a
    /// transient failure and roll back their optimistic state.
    async fn mark_viewed(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        lecture_id: LectureId,
        viewed_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Clear every record for the (student, course) pair.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn reset(&self, student_id: StudentId, course_id: CourseId)
    -> Result<(), StorageError>;
}

/// Repository contract for course entitlements (purchases).
#[async_trait]
pub trait EntitlementRepository: Send + Sync {
    /// Whether the student is entitled to view the course.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection failures.
    async fn is_purchased(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<bool, StorageError>;

    /// Record an entitlement. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn grant(&self, student_id: StudentId, course_id: CourseId) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    courses: Arc<Mutex<HashMap<CourseId, CourseDetails>>>,
    progress: Arc<Mutex<HashMap<(StudentId, CourseId, LectureId), ProgressRecord>>>,
    purchases: Arc<Mutex<HashSet<(StudentId, CourseId)>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseRepository for InMemoryRepository {
    async fn upsert_course(&self, details: &CourseDetails) -> Result<(), StorageError> {
        let mut guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(details.course.id(), details.clone());
        Ok(())
    }

    async fn get_course(&self, id: CourseId) -> Result<CourseDetails, StorageError> {
        let guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        let guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut courses: Vec<Course> = guard
            .values()
            .map(|details| details.course.clone())
            .collect();
        courses.sort_by_key(Course::id);
        Ok(courses)
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn progress_for(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .filter(|((student, course, _), _)| *student == student_id && *course == course_id)
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn mark_viewed(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        lecture_id: LectureId,
        viewed_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .entry((student_id, course_id, lecture_id))
            .and_modify(|record| {
                if !record.viewed {
                    record.viewed = true;
                    record.viewed_at = Some(viewed_at);
                }
            })
            .or_insert_with(|| ProgressRecord::viewed(lecture_id, viewed_at));
        Ok(())
    }

    async fn reset(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.retain(|(student, course, _), _| *student != student_id || *course != course_id);
        Ok(())
    }
}

#[async_trait]
impl EntitlementRepository for InMemoryRepository {
    async fn is_purchased(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<bool, StorageError> {
        let guard = self
            .purchases
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.contains(&(student_id, course_id)))
    }

    async fn grant(&self, student_id: StudentId, course_id: CourseId) -> Result<(), StorageError> {
        let mut guard = self
            .purchases
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert((student_id, course_id));
        Ok(())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub courses: Arc<dyn CourseRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub entitlements: Arc<dyn EntitlementRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let courses: Arc<dyn CourseRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let entitlements: Arc<dyn EntitlementRepository> = Arc::new(repo);
        Self {
            courses,
            progress,
            entitlements,
        }
    }
}
