use chrono::Utc;
use course_core::model::{CourseId, StudentId};

use super::{
    SqliteRepository,
    mapping::{course_id_to_i64, student_id_to_i64},
};
use crate::repository::{EntitlementRepository, StorageError};

#[async_trait::async_trait]
impl EntitlementRepository for SqliteRepository {
    async fn is_purchased(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<bool, StorageError> {
        let row = sqlx::query(
            r"
            SELECT 1 FROM purchases
            WHERE student_id = ?1 AND course_id = ?2
            ",
        )
        .bind(student_id_to_i64(student_id)?)
        .bind(course_id_to_i64(course_id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(row.is_some())
    }

    async fn grant(&self, student_id: StudentId, course_id: CourseId) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO purchases (student_id, course_id, purchased_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(student_id, course_id) DO NOTHING
            ",
        )
        .bind(student_id_to_i64(student_id)?)
        .bind(course_id_to_i64(course_id)?)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}
