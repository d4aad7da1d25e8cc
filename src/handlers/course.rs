// src/handlers/course.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::enrollment::refresh_course_progress,
    models::{
        course::{
            Course, CourseContent, CourseDetail, CourseSummary, CreateContentRequest,
            CreateCourseRequest,
        },
        user::Role,
    },
    utils::{html::clean_html, jwt::CurrentUser},
};

const COURSE_COLUMNS: &str = "id, title, description, image_url, created_by, created_at, updated_at";
const CONTENT_COLUMNS: &str = "id, course_id, title, content_type, video_url, pdf_url, \
     text_content, test_link, external_link, position";

/// Loads a course or fails with 404.
pub(crate) async fn fetch_course(pool: &SqlitePool, course_id: i64) -> Result<Course, AppError> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?"))
        .bind(course_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))
}

/// Only the course's creator or a staff admin may change it.
pub(crate) fn ensure_can_manage(user: &CurrentUser, course: &Course) -> Result<(), AppError> {
    if (user.role == Role::Admin && user.is_staff) || course.created_by == Some(user.id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the course creator or an admin can modify this course.".to_string(),
        ))
    }
}

/// Lists every course, newest first, with the caller's enrollment flag.
pub async fn list_courses(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let courses = sqlx::query_as::<_, CourseSummary>(
        r#"
        SELECT
            c.id, c.title, c.description, c.image_url,
            u.full_name AS creator_name,
            (SELECT COUNT(*) FROM course_contents cc WHERE cc.course_id = c.id) AS content_count,
            EXISTS (
                SELECT 1 FROM enrollments e WHERE e.course_id = c.id AND e.user_id = ?
            ) AS is_enrolled,
            c.created_at
        FROM courses c
        LEFT JOIN users u ON u.id = c.created_by
        ORDER BY c.created_at DESC, c.id DESC
        "#,
    )
    .bind(user.id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list courses: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(courses))
}

/// Creates a course owned by the caller. Instructors and admins only.
pub async fn create_course(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !user.role.can_author_courses() {
        return Err(AppError::Forbidden(
            "Only instructors and admins can create courses.".to_string(),
        ));
    }
    payload.validate()?;

    let now = Utc::now();
    let course = sqlx::query_as::<_, Course>(&format!(
        r#"
        INSERT INTO courses (title, description, image_url, created_by, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING {COURSE_COLUMNS}
        "#
    ))
    .bind(payload.title.trim())
    .bind(clean_html(&payload.description))
    .bind(payload.image_url.unwrap_or_default())
    .bind(user.id)
    .bind(now)
    .bind(now)
    .fetch_one(&pool)
    .await?;

    tracing::info!(course_id = course.id, user_id = user.id, "course created");

    Ok((StatusCode::CREATED, Json(course)))
}

/// Course page with ordered contents.
pub async fn get_course(
    State(pool): State<SqlitePool>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let course = fetch_course(&pool, course_id).await?;

    let contents = sqlx::query_as::<_, CourseContent>(&format!(
        "SELECT {CONTENT_COLUMNS} FROM course_contents WHERE course_id = ? ORDER BY position, id"
    ))
    .bind(course_id)
    .fetch_all(&pool)
    .await?;

    let question_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM quiz_questions WHERE course_id = ?")
            .bind(course_id)
            .fetch_one(&pool)
            .await?;

    Ok(Json(CourseDetail {
        course,
        contents,
        question_count,
    }))
}

/// Deletes a course together with its contents, questions, enrollments and attempts.
pub async fn delete_course(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let course = fetch_course(&pool, course_id).await?;
    ensure_can_manage(&user, &course)?;

    sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(course_id)
        .execute(&pool)
        .await?;

    tracing::info!(course_id, user_id = user.id, "course deleted");

    Ok(Json(json!({
        "message": format!("Course '{}' deleted.", course.title),
        "redirect": "/courses/",
    })))
}

/// Adds a content item to a course. Enrollments are re-scored in the same transaction.
pub async fn add_content(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Path(course_id): Path<i64>,
    Json(payload): Json<CreateContentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let course = fetch_course(&pool, course_id).await?;
    ensure_can_manage(&user, &course)?;

    payload.validate()?;
    payload.check_payload().map_err(AppError::BadRequest)?;

    let mut tx = pool.begin().await?;

    let position = match payload.position {
        Some(p) => p,
        None => {
            sqlx::query_scalar::<_, i64>(
                "SELECT COALESCE(MAX(position), 0) + 1 FROM course_contents WHERE course_id = ?",
            )
            .bind(course_id)
            .fetch_one(&mut *tx)
            .await?
        }
    };

    let content = sqlx::query_as::<_, CourseContent>(&format!(
        r#"
        INSERT INTO course_contents
            (course_id, title, content_type, video_url, pdf_url, text_content, test_link, external_link, position)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {CONTENT_COLUMNS}
        "#
    ))
    .bind(course_id)
    .bind(payload.title.trim())
    .bind(payload.content_type)
    .bind(&payload.video_url)
    .bind(&payload.pdf_url)
    .bind(payload.text_content.as_deref().map(clean_html))
    .bind(&payload.test_link)
    .bind(&payload.external_link)
    .bind(position)
    .fetch_one(&mut *tx)
    .await?;

    refresh_course_progress(&mut tx, course_id).await?;
    tx.commit().await?;

    tracing::info!(course_id, content_id = content.id, "course content added");

    Ok((StatusCode::CREATED, Json(content)))
}
