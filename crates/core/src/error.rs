use thiserror::Error;

use crate::model::{CourseError, CurriculumError, LectureError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Curriculum(#[from] CurriculumError),
    #[error(transparent)]
    Lecture(#[from] LectureError),
}
