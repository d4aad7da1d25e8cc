// src/models/enrollment.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Represents the 'enrollments' table. Unique per (user, course).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Enrollment {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    /// Percentage of the course's contents completed, 0-100.
    pub progress: i64,
    pub enrolled_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Entry of the "my courses" page.
#[derive(Debug, Serialize, FromRow)]
pub struct MyCourseEntry {
    pub course_id: i64,
    pub title: String,
    pub image_url: String,
    pub progress: i64,
    pub enrolled_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Represents the 'course_progress' table. Unique per (user, content).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseProgress {
    pub id: i64,
    pub user_id: i64,
    pub content_id: i64,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Whole-number completion percentage; a course without contents stays at 0.
pub fn progress_percent(completed: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (completed.clamp(0, total) * 100) / total
}

/// Completion time for a given progress: kept once set, cleared below 100.
pub fn completion_time(
    progress: i64,
    previous: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if progress == 100 {
        previous.or(Some(now))
    } else {
        None
    }
}
