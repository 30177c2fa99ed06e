use course_core::model::{CourseId, Lecture, LectureId, ProgressRecord, StudentId, VideoUri};
use sqlx::Row;

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn course_id_from_i64(v: i64) -> Result<CourseId, StorageError> {
    Ok(CourseId::new(i64_to_u64("course_id", v)?))
}

pub(crate) fn lecture_id_from_i64(v: i64) -> Result<LectureId, StorageError> {
    Ok(LectureId::new(i64_to_u64("lecture_id", v)?))
}

pub(crate) fn course_id_to_i64(id: CourseId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("course_id overflow".into()))
}

pub(crate) fn lecture_id_to_i64(id: LectureId) -> Result<i64, StorageError> {
    i64::try_from(id.value())
        .map_err(|_| StorageError::Serialization("lecture_id overflow".into()))
}

pub(crate) fn student_id_to_i64(id: StudentId) -> Result<i64, StorageError> {
    i64::try_from(id.value())
        .map_err(|_| StorageError::Serialization("student_id overflow".into()))
}

pub(crate) fn map_lecture_row(row: &sqlx::sqlite::SqliteRow) -> Result<Lecture, StorageError> {
    let id = lecture_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let title: String = row.try_get("title").map_err(ser)?;
    let uri_raw: String = row.try_get("video_uri").map_err(ser)?;
    let video_uri = VideoUri::parse(&uri_raw).map_err(ser)?;
    let free_preview: i64 = row.try_get("free_preview").map_err(ser)?;
    let media_public_id: Option<String> = row.try_get("media_public_id").map_err(ser)?;

    let mut lecture = Lecture::new(id, title, video_uri, free_preview != 0).map_err(ser)?;
    if let Some(public_id) = media_public_id {
        lecture = lecture.with_media_public_id(public_id);
    }
    Ok(lecture)
}

pub(crate) fn map_progress_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<ProgressRecord, StorageError> {
    let viewed: i64 = row.try_get("viewed").map_err(ser)?;
    Ok(ProgressRecord {
        lecture_id: lecture_id_from_i64(row.try_get::<i64, _>("lecture_id").map_err(ser)?)?,
        viewed: viewed != 0,
        viewed_at: row.try_get("viewed_at").map_err(ser)?,
    })
}
