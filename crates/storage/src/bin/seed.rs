use std::fmt;

use chrono::{DateTime, Utc};
use course_core::model::{
    Course, CourseDetails, CourseId, Curriculum, Lecture, LectureId, StudentId, VideoUri,
};
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    course_id: CourseId,
    course_title: String,
    course_desc: Option<String>,
    student_id: StudentId,
    lectures: u32,
    viewed: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidCourseId { raw: String },
    InvalidStudentId { raw: String },
    InvalidLectures { raw: String },
    InvalidViewed { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCourseId { raw } => write!(f, "invalid --course-id value: {raw}"),
            ArgsError::InvalidStudentId { raw } => write!(f, "invalid --student-id value: {raw}"),
            ArgsError::InvalidLectures { raw } => write!(f, "invalid --lectures value: {raw}"),
            ArgsError::InvalidViewed { raw } => write!(f, "invalid --viewed value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("COURSE_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut course_id = std::env::var("COURSE_SEED_COURSE_ID")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map_or_else(|| CourseId::new(1), CourseId::new);
        let mut course_title =
            std::env::var("COURSE_SEED_TITLE").unwrap_or_else(|_| "Rust from Scratch".into());
        let mut course_desc = std::env::var("COURSE_SEED_DESC").ok();
        let mut student_id = std::env::var("COURSE_SEED_STUDENT_ID")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map_or_else(|| StudentId::new(1), StudentId::new);
        let mut lectures = std::env::var("COURSE_SEED_LECTURES")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(5);
        let mut viewed = std::env::var("COURSE_SEED_VIEWED")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(0);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--course-id" => {
                    let value = require_value(&mut args, "--course-id")?;
                    course_id = value
                        .parse::<u64>()
                        .map(CourseId::new)
                        .map_err(|_| ArgsError::InvalidCourseId { raw: value })?;
                }
                "--title" => {
                    course_title = require_value(&mut args, "--title")?;
                }
                "--desc" => {
                    course_desc = Some(require_value(&mut args, "--desc")?);
                }
                "--student-id" => {
                    let value = require_value(&mut args, "--student-id")?;
                    student_id = value
                        .parse::<u64>()
                        .map(StudentId::new)
                        .map_err(|_| ArgsError::InvalidStudentId { raw: value })?;
                }
                "--lectures" => {
                    let value = require_value(&mut args, "--lectures")?;
                    lectures = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidLectures { raw: value })?;
                }
                "--viewed" => {
                    let value = require_value(&mut args, "--viewed")?;
                    viewed = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidViewed { raw: value })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    now = Some(
                        DateTime::parse_from_rfc3339(&value)
                            .map(|t| t.with_timezone(&Utc))
                            .map_err(|_| ArgsError::InvalidNow { raw: value })?,
                    );
                }
                "-h" | "--help" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            course_id,
            course_title,
            course_desc,
            student_id,
            lectures,
            viewed,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --course-id <id>          Course id to upsert (default: 1)");
    eprintln!("  --title <name>            Course title (default: Rust from Scratch)");
    eprintln!("  --desc <text>             Optional course description");
    eprintln!("  --student-id <id>         Student granted the course (default: 1)");
    eprintln!("  --lectures <n>            Number of lectures to seed (default: 5)");
    eprintln!("  --viewed <n>              Lectures pre-marked viewed, from the start (default: 0)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!(
        "  COURSE_DB_URL, COURSE_SEED_COURSE_ID, COURSE_SEED_TITLE, COURSE_SEED_DESC, COURSE_SEED_STUDENT_ID, COURSE_SEED_LECTURES, COURSE_SEED_VIEWED"
    );
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let titles = [
        "Getting started",
        "Ownership and borrowing",
        "Structs and enums",
        "Error handling",
        "Traits and generics",
    ];
    let mut lectures = Vec::with_capacity(args.lectures as usize);
    for i in 0..args.lectures {
        let idx = (i as usize) % titles.len();
        let uri = VideoUri::parse(format!(
            "https://media.example.com/courses/{}/lecture-{}.mp4",
            args.course_id.value(),
            i + 1
        ))?;
        let lecture = Lecture::new(
            LectureId::new(u64::from(i + 1)),
            format!("{}. {}", i + 1, titles[idx]),
            uri,
            i == 0,
        )?
        .with_media_public_id(format!("courses/{}/lecture-{}", args.course_id.value(), i + 1));
        lectures.push(lecture);
    }

    let details = CourseDetails::new(
        Course::new(args.course_id, args.course_title.clone(), args.course_desc.clone())?,
        Curriculum::new(lectures)?,
    );
    storage.courses.upsert_course(&details).await?;
    storage.entitlements.grant(args.student_id, args.course_id).await?;

    let viewed = args.viewed.min(args.lectures);
    for i in 0..viewed {
        storage
            .progress
            .mark_viewed(
                args.student_id,
                args.course_id,
                LectureId::new(u64::from(i + 1)),
                now,
            )
            .await?;
    }

    println!(
        "Seeded course {} ({} lectures, {} viewed) for student {} into {}",
        args.course_id.value(),
        args.lectures,
        viewed,
        args.student_id.value(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
