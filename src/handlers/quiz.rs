// src/handlers/quiz.rs

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
    error::{AppError, is_unique_violation},
    handlers::{
        course::{ensure_can_manage, fetch_course},
        enrollment::require_enrollment,
    },
    models::quiz::{
        AttemptRequest, CreateQuestionRequest, PublicQuizQuestion, QuizAttempt, QuizQuestion,
        QuizResults,
    },
    utils::jwt::CurrentUser,
};

const QUESTION_COLUMNS: &str = "id, course_id, question_text, option_1, option_2, option_3, \
     option_4, correct_option, created_at";
const ATTEMPT_COLUMNS: &str =
    "id, user_id, course_id, question_id, selected_option, is_correct, attempted_at";

/// Adds a quiz question to a course. Creator or admin only.
pub async fn add_question(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Path(course_id): Path<i64>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let course = fetch_course(&pool, course_id).await?;
    ensure_can_manage(&user, &course)?;

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let question = sqlx::query_as::<_, QuizQuestion>(&format!(
        r#"
        INSERT INTO quiz_questions
            (course_id, question_text, option_1, option_2, option_3, option_4, correct_option, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {QUESTION_COLUMNS}
        "#
    ))
    .bind(course_id)
    .bind(&payload.question_text)
    .bind(&payload.option_1)
    .bind(&payload.option_2)
    .bind(&payload.option_3)
    .bind(&payload.option_4)
    .bind(payload.correct_option)
    .bind(Utc::now())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create question: {:?}", e);
        AppError::from(e)
    })?;

    Ok((StatusCode::CREATED, Json(question)))
}

/// Lists a course's questions without their answers.
pub async fn list_questions(
    State(pool): State<SqlitePool>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    fetch_course(&pool, course_id).await?;

    let questions = sqlx::query_as::<_, QuizQuestion>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM quiz_questions WHERE course_id = ? ORDER BY id"
    ))
    .bind(course_id)
    .fetch_all(&pool)
    .await?;

    let questions: Vec<PublicQuizQuestion> = questions.into_iter().map(Into::into).collect();
    Ok(Json(questions))
}

/// Records the caller's answer to one question.
///
/// Each user gets exactly one attempt per question; a repeat is a 409.
pub async fn submit_attempt(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Path((course_id, question_id)): Path<(i64, i64)>,
    Json(payload): Json<AttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut conn = pool.acquire().await?;

    let question = sqlx::query_as::<_, QuizQuestion>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM quiz_questions WHERE id = ? AND course_id = ?"
    ))
    .bind(question_id)
    .bind(course_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(AppError::NotFound("Question not found in this course".to_string()))?;

    require_enrollment(&mut conn, user.id, course_id).await?;

    let is_correct = payload.selected_option == question.correct_option;

    let attempt = sqlx::query_as::<_, QuizAttempt>(&format!(
        r#"
        INSERT INTO quiz_attempts (user_id, course_id, question_id, selected_option, is_correct, attempted_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING {ATTEMPT_COLUMNS}
        "#
    ))
    .bind(user.id)
    .bind(course_id)
    .bind(question_id)
    .bind(payload.selected_option)
    .bind(is_correct)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("You have already answered this question.".to_string())
        } else {
            tracing::error!("Failed to record attempt: {:?}", e);
            AppError::from(e)
        }
    })?;

    tracing::info!(user_id = user.id, question_id, is_correct, "quiz attempt recorded");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "is_correct": is_correct,
            "attempt": attempt,
        })),
    ))
}

/// The caller's attempts and score for a course.
pub async fn quiz_results(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    fetch_course(&pool, course_id).await?;

    let attempts = sqlx::query_as::<_, QuizAttempt>(&format!(
        "SELECT {ATTEMPT_COLUMNS} FROM quiz_attempts WHERE user_id = ? AND course_id = ? ORDER BY question_id"
    ))
    .bind(user.id)
    .bind(course_id)
    .fetch_all(&pool)
    .await?;

    let total_questions: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM quiz_questions WHERE course_id = ?")
            .bind(course_id)
            .fetch_one(&pool)
            .await?;

    Ok(Json(QuizResults {
        course_id,
        total_questions,
        answered: attempts.len(),
        correct: attempts.iter().filter(|a| a.is_correct).count(),
        attempts,
    }))
}
