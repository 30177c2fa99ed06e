use thiserror::Error;

use crate::model::curriculum::Curriculum;
use crate::model::ids::CourseId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CourseError {
    #[error("Course title cannot be empty.")]
    EmptyTitle,
}

/// A course as the catalog describes it, minus its curriculum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    title: String,
    description: Option<String>,
}

impl Course {
    /// # Errors
    ///
    /// Returns `CourseError::EmptyTitle` if the title is blank.
    pub fn new(
        id: CourseId,
        title: impl Into<String>,
        description: Option<String>,
    ) -> Result<Self, CourseError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CourseError::EmptyTitle);
        }
        Ok(Self {
            id,
            title,
            description,
        })
    }

    #[must_use]
    pub fn id(&self) -> CourseId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Course plus its ordered curriculum, as released to a purchased viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDetails {
    pub course: Course,
    pub curriculum: Curriculum,
}

impl CourseDetails {
    #[must_use]
    pub fn new(course: Course, curriculum: Curriculum) -> Self {
        Self { course, curriculum }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_rejects_empty_title() {
        let err = Course::new(CourseId::new(1), "", None).unwrap_err();
        assert_eq!(err, CourseError::EmptyTitle);
    }

    #[test]
    fn course_keeps_description() {
        let course = Course::new(CourseId::new(1), "Rust 101", Some("Basics".into())).unwrap();
        assert_eq!(course.description(), Some("Basics"));
    }
}
