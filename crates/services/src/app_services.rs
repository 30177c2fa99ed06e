use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::media::MediaService;
use crate::viewing::ViewingService;

/// Assembles the app-facing services over a chosen storage backend.
#[derive(Clone)]
pub struct AppServices {
    viewing: Arc<ViewingService>,
    media: Arc<MediaService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(clock, &storage))
    }

    /// Build services over in-memory repositories, for tests and demos.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(clock, &Storage::in_memory())
    }

    #[must_use]
    pub fn from_storage(clock: Clock, storage: &Storage) -> Self {
        Self {
            viewing: Arc::new(ViewingService::from_storage(clock, storage)),
            media: Arc::new(MediaService::from_env()),
        }
    }

    #[must_use]
    pub fn viewing(&self) -> &ViewingService {
        &self.viewing
    }

    #[must_use]
    pub fn media(&self) -> &MediaService {
        &self.media
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::{Course, CourseDetails, CourseId, Curriculum, StudentId};
    use course_core::time::fixed_clock;
    use crate::viewing::SessionState;

    #[tokio::test]
    async fn wired_services_share_the_storage_backend() {
        let storage = Storage::in_memory();
        let course = Course::new(CourseId::new(1), "Docking", None).unwrap();
        let details = CourseDetails::new(course, Curriculum::new(Vec::new()).unwrap());
        storage.courses.upsert_course(&details).await.unwrap();
        storage
            .entitlements
            .grant(StudentId::new(1), CourseId::new(1))
            .await
            .unwrap();

        let services = AppServices::from_storage(fixed_clock(), &storage);
        let session = services
            .viewing()
            .load(StudentId::new(1), CourseId::new(1))
            .await
            .unwrap();
        // Empty curriculum is vacuously complete.
        assert_eq!(session.state(), SessionState::CourseComplete);
    }
}
