use crate::model::ids::LectureId;
use thiserror::Error;
use url::Url;

//
// ─── ERRORS (domain validation) ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LectureError {
    #[error("Lecture title cannot be empty.")]
    EmptyTitle,

    #[error("Lecture video URI is not a valid URL: {raw}")]
    InvalidVideoUri { raw: String },
}

//
// ─── VIDEO URI ─────────────────────────────────────────────────────────────────
//

/// Location of the lecture video on the media host.
///
/// The platform never stores video bytes itself; it only keeps the URL the
/// media host handed back at upload time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoUri(Url);

impl VideoUri {
    /// Parse and validate a video URL.
    ///
    /// # Errors
    ///
    /// Returns `LectureError::InvalidVideoUri` if the string is empty or not
    /// a parseable URL.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, LectureError> {
        let s = raw.as_ref().trim();
        if s.is_empty() {
            return Err(LectureError::InvalidVideoUri { raw: s.to_string() });
        }
        let url = Url::parse(s).map_err(|_| LectureError::InvalidVideoUri { raw: s.to_string() })?;
        Ok(Self(url))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[must_use]
    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

//
// ─── LECTURE ───────────────────────────────────────────────────────────────────
//

/// A single video unit within a course curriculum.
///
/// Immutable once loaded for a session; order within the course is owned by
/// the `Curriculum`, not the lecture itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lecture {
    id: LectureId,
    title: String,
    video_uri: VideoUri,
    free_preview: bool,
    media_public_id: Option<String>,
}

impl Lecture {
    /// Create a lecture with a validated title and video location.
    ///
    /// # Errors
    ///
    /// Returns `LectureError::EmptyTitle` if the title is blank.
    pub fn new(
        id: LectureId,
        title: impl Into<String>,
        video_uri: VideoUri,
        free_preview: bool,
    ) -> Result<Self, LectureError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(LectureError::EmptyTitle);
        }
        Ok(Self {
            id,
            title,
            video_uri,
            free_preview,
            media_public_id: None,
        })
    }

    /// Attach the media host's opaque handle for later deletion.
    #[must_use]
    pub fn with_media_public_id(mut self, public_id: impl Into<String>) -> Self {
        self.media_public_id = Some(public_id.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> LectureId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn video_uri(&self) -> &VideoUri {
        &self.video_uri
    }

    #[must_use]
    pub fn free_preview(&self) -> bool {
        self.free_preview
    }

    #[must_use]
    pub fn media_public_id(&self) -> Option<&str> {
        self.media_public_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video() -> VideoUri {
        VideoUri::parse("https://media.example.com/v/abc123").unwrap()
    }

    #[test]
    fn lecture_rejects_empty_title() {
        let err = Lecture::new(LectureId::new(1), "   ", video(), false).unwrap_err();
        assert_eq!(err, LectureError::EmptyTitle);
    }

    #[test]
    fn video_uri_rejects_garbage() {
        assert!(VideoUri::parse("").is_err());
        assert!(VideoUri::parse("not a url").is_err());
    }

    #[test]
    fn lecture_carries_public_id() {
        let lecture = Lecture::new(LectureId::new(1), "Intro", video(), true)
            .unwrap()
            .with_media_public_id("host/abc123");
        assert_eq!(lecture.media_public_id(), Some("host/abc123"));
        assert!(lecture.free_preview());
    }
}
