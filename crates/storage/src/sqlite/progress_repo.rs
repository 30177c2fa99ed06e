use chrono::{DateTime, Utc};
use course_core::model::{CourseId, LectureId, ProgressRecord, StudentId};

use super::{
    SqliteRepository,
    mapping::{course_id_to_i64, lecture_id_to_i64, map_progress_row, student_id_to_i64},
};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn progress_for(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT lecture_id, viewed, viewed_at
            FROM lecture_progress
            WHERE student_id = ?1 AND course_id = ?2
            ",
        )
        .bind(student_id_to_i64(student_id)?)
        .bind(course_id_to_i64(course_id)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(map_progress_row(&row)?);
        }
        Ok(records)
    }

    async fn mark_viewed(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        lecture_id: LectureId,
        viewed_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        // viewed is monotonic: a re-mark keeps the original viewed_at so
        // late duplicate acknowledgements cannot move history.
        sqlx::query(
            r"
            INSERT INTO lecture_progress (student_id, course_id, lecture_id, viewed, viewed_at)
            VALUES (?1, ?2, ?3, 1, ?4)
            ON CONFLICT(student_id, course_id, lecture_id) DO UPDATE SET
                viewed = 1,
                viewed_at = COALESCE(lecture_progress.viewed_at, excluded.viewed_at)
            ",
        )
        .bind(student_id_to_i64(student_id)?)
        .bind(course_id_to_i64(course_id)?)
        .bind(lecture_id_to_i64(lecture_id)?)
        .bind(viewed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn reset(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            DELETE FROM lecture_progress
            WHERE student_id = ?1 AND course_id = ?2
            ",
        )
        .bind(student_id_to_i64(student_id)?)
        .bind(course_id_to_i64(course_id)?)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}
