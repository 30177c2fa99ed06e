#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod media;
pub mod viewing;

pub use course_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, MediaError, ViewingError};
pub use media::{MediaConfig, MediaService, MediaUpload};
pub use viewing::{
    CourseProgressView, LectureStatus, ProgressOutcome, SessionState, ViewingService,
    ViewingSession,
};
