//! Shared error types for the services crate.

use thiserror::Error;

use course_core::model::LectureId;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ViewingService` and `ViewingSession`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ViewingError {
    #[error("course is locked for this student")]
    Locked,
    #[error("lecture {0} is not part of this course")]
    UnknownLecture(LectureId),
    #[error("no lecture is currently active")]
    NotActive,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `MediaService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MediaError {
    #[error("media service is not configured")]
    Disabled,
    #[error("media host returned an empty response")]
    EmptyResponse,
    #[error("media request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
