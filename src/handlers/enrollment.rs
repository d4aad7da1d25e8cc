// src/handlers/enrollment.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    error::{AppError, is_unique_violation},
    handlers::course::fetch_course,
    models::enrollment::{
        CourseProgress, Enrollment, MyCourseEntry, completion_time, progress_percent,
    },
    utils::jwt::CurrentUser,
};

const ENROLLMENT_COLUMNS: &str = "id, user_id, course_id, progress, enrolled_at, completed_at";

/// Returns the caller's enrollment in a course, or 403 if there is none.
pub(crate) async fn require_enrollment(
    conn: &mut SqliteConnection,
    user_id: i64,
    course_id: i64,
) -> Result<Enrollment, AppError> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE user_id = ? AND course_id = ?"
    ))
    .bind(user_id)
    .bind(course_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(AppError::Forbidden(
        "You are not enrolled in this course.".to_string(),
    ))
}

/// Recomputes progress for every enrollment in a course after its contents changed.
pub(crate) async fn refresh_course_progress(
    conn: &mut SqliteConnection,
    course_id: i64,
) -> Result<(), AppError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM course_contents WHERE course_id = ?")
        .bind(course_id)
        .fetch_one(&mut *conn)
        .await?;

    let rows: Vec<(i64, i64, Option<DateTime<Utc>>)> = sqlx::query_as(
        r#"
        SELECT
            e.id,
            (
                SELECT COUNT(*)
                FROM course_progress p
                JOIN course_contents c ON c.id = p.content_id
                WHERE p.user_id = e.user_id AND c.course_id = e.course_id AND p.completed = 1
            ),
            e.completed_at
        FROM enrollments e
        WHERE e.course_id = ?
        "#,
    )
    .bind(course_id)
    .fetch_all(&mut *conn)
    .await?;

    let now = Utc::now();
    for (enrollment_id, completed, previous) in rows {
        let progress = progress_percent(completed, total);
        sqlx::query("UPDATE enrollments SET progress = ?, completed_at = ? WHERE id = ?")
            .bind(progress)
            .bind(completion_time(progress, previous, now))
            .bind(enrollment_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// Enrolls the caller in a course. A second enrollment in the same course is a 409.
pub async fn enroll_course(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let course = fetch_course(&pool, course_id).await?;

    let enrollment = sqlx::query_as::<_, Enrollment>(&format!(
        r#"
        INSERT INTO enrollments (user_id, course_id, progress, enrolled_at)
        VALUES (?, ?, 0, ?)
        RETURNING {ENROLLMENT_COLUMNS}
        "#
    ))
    .bind(user.id)
    .bind(course_id)
    .bind(Utc::now())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Already enrolled in this course".to_string())
        } else {
            tracing::error!("Failed to enroll: {:?}", e);
            AppError::from(e)
        }
    })?;

    tracing::info!(user_id = user.id, course_id, "user enrolled");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("You have successfully enrolled in course {}!", course.title),
            "redirect": "/my-courses/",
            "enrollment": enrollment,
        })),
    ))
}

/// Lists the caller's enrollments with their progress.
pub async fn my_courses(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let entries = sqlx::query_as::<_, MyCourseEntry>(
        r#"
        SELECT
            c.id AS course_id, c.title, c.image_url,
            e.progress, e.enrolled_at, e.completed_at
        FROM enrollments e
        JOIN courses c ON c.id = e.course_id
        WHERE e.user_id = ?
        ORDER BY e.enrolled_at DESC, e.id DESC
        "#,
    )
    .bind(user.id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(entries))
}

/// Marks one content item as completed and recomputes the enrollment's progress.
///
/// Repeating the call is harmless: the first completion time is kept.
pub async fn complete_content(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Path((course_id, content_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = pool.begin().await?;

    let belongs: Option<i64> =
        sqlx::query_scalar("SELECT id FROM course_contents WHERE id = ? AND course_id = ?")
            .bind(content_id)
            .bind(course_id)
            .fetch_optional(&mut *tx)
            .await?;
    if belongs.is_none() {
        return Err(AppError::NotFound("Content not found in this course".to_string()));
    }

    let enrollment = require_enrollment(&mut tx, user.id, course_id).await?;
    let now = Utc::now();

    let content_progress = sqlx::query_as::<_, CourseProgress>(
        r#"
        INSERT INTO course_progress (user_id, content_id, completed, completed_at)
        VALUES (?, ?, 1, ?)
        ON CONFLICT (user_id, content_id) DO UPDATE SET
            completed = 1,
            completed_at = COALESCE(course_progress.completed_at, excluded.completed_at)
        RETURNING id, user_id, content_id, completed, completed_at
        "#,
    )
    .bind(user.id)
    .bind(content_id)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    let completed: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM course_progress p
        JOIN course_contents c ON c.id = p.content_id
        WHERE p.user_id = ? AND c.course_id = ? AND p.completed = 1
        "#,
    )
    .bind(user.id)
    .bind(course_id)
    .fetch_one(&mut *tx)
    .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM course_contents WHERE course_id = ?")
        .bind(course_id)
        .fetch_one(&mut *tx)
        .await?;

    let progress = progress_percent(completed, total);
    let completed_at = completion_time(progress, enrollment.completed_at, now);

    let enrollment = sqlx::query_as::<_, Enrollment>(&format!(
        "UPDATE enrollments SET progress = ?, completed_at = ? WHERE id = ? RETURNING {ENROLLMENT_COLUMNS}"
    ))
    .bind(progress)
    .bind(completed_at)
    .bind(enrollment.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(user_id = user.id, course_id, content_id, progress, "content completed");

    Ok(Json(json!({
        "content": content_progress,
        "completed_contents": completed,
        "total_contents": total,
        "enrollment": enrollment,
    })))
}
