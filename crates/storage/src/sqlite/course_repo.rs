use course_core::model::{Course, CourseDetails, CourseId, Curriculum};

use super::{
    SqliteRepository,
    mapping::{course_id_from_i64, course_id_to_i64, lecture_id_to_i64, map_lecture_row},
};
use crate::repository::{CourseRepository, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[async_trait::async_trait]
impl CourseRepository for SqliteRepository {
    async fn upsert_course(&self, details: &CourseDetails) -> Result<(), StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        sqlx::query(
            r"
            INSERT INTO courses (id, title, description)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description
            ",
        )
        .bind(course_id_to_i64(details.course.id())?)
        .bind(details.course.title().to_owned())
        .bind(details.course.description().map(str::to_owned))
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        // The curriculum is replaced wholesale; position is the only source
        // of lecture ordering.
        sqlx::query("DELETE FROM lectures WHERE course_id = ?1")
            .bind(course_id_to_i64(details.course.id())?)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        for (position, lecture) in details.curriculum.iter().enumerate() {
            let position = i64::try_from(position)
                .map_err(|_| StorageError::Serialization("position overflow".into()))?;
            sqlx::query(
                r"
                INSERT INTO lectures (
                    id, course_id, position, title, video_uri, free_preview, media_public_id
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ",
            )
            .bind(lecture_id_to_i64(lecture.id())?)
            .bind(course_id_to_i64(details.course.id())?)
            .bind(position)
            .bind(lecture.title().to_owned())
            .bind(lecture.video_uri().as_str().to_owned())
            .bind(i64::from(lecture.free_preview()))
            .bind(lecture.media_public_id().map(str::to_owned))
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn get_course(&self, id: CourseId) -> Result<CourseDetails, StorageError> {
        let course_row = sqlx::query("SELECT id, title, description FROM courses WHERE id = ?1")
            .bind(course_id_to_i64(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .ok_or(StorageError::NotFound)?;

        use sqlx::Row;
        let course = Course::new(
            course_id_from_i64(course_row.try_get::<i64, _>("id").map_err(ser)?)?,
            course_row.try_get::<String, _>("title").map_err(ser)?,
            course_row
                .try_get::<Option<String>, _>("description")
                .map_err(ser)?,
        )
        .map_err(ser)?;

        let rows = sqlx::query(
            r"
            SELECT id, title, video_uri, free_preview, media_public_id
            FROM lectures
            WHERE course_id = ?1
            ORDER BY position ASC
            ",
        )
        .bind(course_id_to_i64(id)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut lectures = Vec::with_capacity(rows.len());
        for row in rows {
            lectures.push(map_lecture_row(&row)?);
        }
        let curriculum = Curriculum::new(lectures).map_err(ser)?;

        Ok(CourseDetails::new(course, curriculum))
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        use sqlx::Row;
        let rows = sqlx::query("SELECT id, title, description FROM courses ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut courses = Vec::with_capacity(rows.len());
        for row in rows {
            let course = Course::new(
                course_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
                row.try_get::<String, _>("title").map_err(ser)?,
                row.try_get::<Option<String>, _>("description").map_err(ser)?,
            )
            .map_err(ser)?;
            courses.push(course);
        }
        Ok(courses)
    }
}
