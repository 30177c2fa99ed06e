//! Viewing-session state machine and its orchestration.

mod session;
mod view;
mod workflow;

pub use session::{SessionState, ViewingSession};
pub use view::{CourseProgressView, LectureStatus};
pub use workflow::{ProgressOutcome, ViewingService};
