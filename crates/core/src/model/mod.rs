mod course;
mod curriculum;
mod ids;
mod lecture;
mod progress;

pub use course::{Course, CourseDetails, CourseError};
pub use curriculum::{Curriculum, CurriculumError};
pub use ids::{CourseId, LectureId, ParseIdError, StudentId};
pub use lecture::{Lecture, LectureError, VideoUri};
pub use progress::{ProgressRecord, ProgressSet};
