use course_core::model::{
    Course, CourseDetails, CourseId, Curriculum, Lecture, LectureId, StudentId, VideoUri,
};
use course_core::playback::PlaybackDirective;
use course_core::time::fixed_now;
use services::{Clock, CourseProgressView, SessionState, ViewingError, ViewingService};
use storage::repository::Storage;

fn sample_details() -> CourseDetails {
    let course = Course::new(
        CourseId::new(301),
        "Coastal Sailing",
        Some("From dock lines to anchoring.".to_string()),
    )
    .unwrap();
    let lectures = (1..=3u64)
        .map(|id| {
            let uri = VideoUri::parse(format!("https://media.example.com/videos/{id}.mp4")).unwrap();
            Lecture::new(LectureId::new(id), format!("Lecture {id}"), uri, id == 1)
                .unwrap()
                .with_media_public_id(format!("courses/301/{id}"))
        })
        .collect();
    CourseDetails::new(course, Curriculum::new(lectures).unwrap())
}

async fn seeded(db: &str) -> (ViewingService, StudentId, CourseId) {
    let storage = Storage::sqlite(db).await.expect("connect sqlite");
    let student = StudentId::new(42);
    let course = CourseId::new(301);
    storage
        .courses
        .upsert_course(&sample_details())
        .await
        .expect("seed course");
    storage
        .entitlements
        .grant(student, course)
        .await
        .expect("grant purchase");
    let service = ViewingService::from_storage(Clock::fixed(fixed_now()), &storage);
    (service, student, course)
}

#[tokio::test]
async fn locked_until_purchased() {
    let storage = Storage::sqlite("sqlite:file:memdb_viewing_locked?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    storage
        .courses
        .upsert_course(&sample_details())
        .await
        .expect("seed course");
    let service = ViewingService::from_storage(Clock::fixed(fixed_now()), &storage);

    let mut session = service
        .load(StudentId::new(42), CourseId::new(301))
        .await
        .expect("load");
    assert!(session.is_locked());
    assert!(matches!(
        service.reset(&mut session).await,
        Err(ViewingError::Locked)
    ));

    storage
        .entitlements
        .grant(StudentId::new(42), CourseId::new(301))
        .await
        .expect("grant purchase");
    let session = service
        .load(StudentId::new(42), CourseId::new(301))
        .await
        .expect("load");
    assert_eq!(session.state(), SessionState::Active(LectureId::new(1)));
}

#[tokio::test]
async fn full_course_walkthrough_to_completion_and_reset() {
    let (service, student, course) =
        seeded("sqlite:file:memdb_viewing_walkthrough?mode=memory&cache=shared").await;
    let mut session = service.load(student, course).await.expect("load");
    assert_eq!(session.state(), SessionState::Active(LectureId::new(1)));

    // Midway through lecture 1: a skip ahead is forced back.
    let outcome = service
        .report_progress(&mut session, 0.3, false)
        .await
        .expect("report");
    assert_eq!(outcome.update.directive, PlaybackDirective::Continue);
    let outcome = service
        .report_progress(&mut session, 0.95, true)
        .await
        .expect("report");
    assert_eq!(outcome.update.directive, PlaybackDirective::ForceSeek);
    assert_eq!(outcome.update.effective_fraction, 0.3);
    assert_eq!(outcome.marked, None);

    // Watch each lecture to the end.
    for expected in [
        SessionState::Active(LectureId::new(2)),
        SessionState::Active(LectureId::new(3)),
        SessionState::CourseComplete,
    ] {
        let outcome = service
            .report_progress(&mut session, 1.0, false)
            .await
            .expect("report");
        assert_eq!(outcome.marked, Some(true));
        assert_eq!(outcome.update.directive, PlaybackDirective::Pause);
        assert_eq!(session.state(), expected);
    }

    // Completion survives a reload and shows in the projection.
    let reloaded = service.load(student, course).await.expect("reload");
    assert_eq!(reloaded.state(), SessionState::CourseComplete);
    let view = CourseProgressView::from_session(&reloaded).expect("view");
    assert!(view.course_complete);
    assert_eq!(view.viewed_count, 3);

    // Watch again from scratch.
    let mut session = reloaded;
    service.reset(&mut session).await.expect("reset");
    assert_eq!(session.state(), SessionState::Active(LectureId::new(1)));
    assert!(session.progress().is_empty());
    let reloaded = service.load(student, course).await.expect("reload");
    assert_eq!(reloaded.state(), SessionState::Active(LectureId::new(1)));
}

#[tokio::test]
async fn resume_lands_after_highest_viewed_lecture() {
    let (service, student, course) =
        seeded("sqlite:file:memdb_viewing_resume?mode=memory&cache=shared").await;

    let mut session = service.load(student, course).await.expect("load");
    // Jump straight to lecture 2 and finish it, leaving lecture 1 unviewed.
    session.watch_lecture(LectureId::new(2)).expect("select");
    let outcome = service
        .report_progress(&mut session, 1.0, false)
        .await
        .expect("report");
    assert_eq!(outcome.marked, Some(true));
    assert_eq!(session.state(), SessionState::Active(LectureId::new(3)));

    // A fresh load resumes after the highest viewed index.
    let reloaded = service.load(student, course).await.expect("reload");
    assert_eq!(reloaded.state(), SessionState::Active(LectureId::new(3)));
}

#[tokio::test]
async fn rewatching_a_viewed_lecture_keeps_progress() {
    let (service, student, course) =
        seeded("sqlite:file:memdb_viewing_rewatch?mode=memory&cache=shared").await;
    let mut session = service.load(student, course).await.expect("load");
    service
        .report_progress(&mut session, 1.0, false)
        .await
        .expect("report");
    assert_eq!(session.state(), SessionState::Active(LectureId::new(2)));

    // Go back to lecture 1; completing it again writes nothing new and
    // advances past it without losing the stored mark.
    session.watch_lecture(LectureId::new(1)).expect("select");
    let outcome = service
        .report_progress(&mut session, 1.0, false)
        .await
        .expect("report");
    assert_eq!(outcome.marked, Some(true));
    assert_eq!(session.state(), SessionState::Active(LectureId::new(2)));
    assert_eq!(session.progress().viewed_count(), 1);
}
