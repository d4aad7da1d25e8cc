// src/handlers/profile.rs

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::{AppError, is_foreign_key_violation},
    models::{
        profile::{
            Achievement, CreateAchievementRequest, CreateSecurityQuestionRequest,
            EditProfileRequest, Profile, ProfileResponse, SecurityQuestion,
        },
        role_detail::{
            AdminDetail, InstructorDetail, RoleDetail, RoleDetailRequest, StudentDetail,
        },
        user::{Role, USER_COLUMNS, User},
    },
    utils::{
        hash::{hash_password, normalize_answer},
        jwt::CurrentUser,
    },
};

const ACHIEVEMENT_COLUMNS: &str =
    "id, user_id, record_type, course_id, title, description, created_at";

/// Loads the role-detail record matching the user's role, if one was filled in.
async fn fetch_role_detail(
    pool: &SqlitePool,
    user_id: i64,
    role: Role,
) -> Result<Option<RoleDetail>, AppError> {
    let detail = match role {
        Role::Student => sqlx::query_as::<_, StudentDetail>(
            "SELECT department, year_of_study, course_interests FROM student_details WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .map(RoleDetail::Student),
        Role::Instructor => sqlx::query_as::<_, InstructorDetail>(
            "SELECT qualification, expertise FROM instructor_details WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .map(RoleDetail::Instructor),
        Role::Admin => sqlx::query_as::<_, AdminDetail>(
            "SELECT admin_code FROM admin_details WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .map(RoleDetail::Admin),
    };
    Ok(detail)
}

/// Get current user's profile, role details, course counts and achievements.
pub async fn get_profile(
    State(pool): State<SqlitePool>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(current.id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let profile = sqlx::query_as::<_, Profile>(
        "SELECT profile_picture, phone_number, updated_at FROM profiles WHERE user_id = ?",
    )
    .bind(user.id)
    .fetch_optional(&pool)
    .await?;

    let role_detail = fetch_role_detail(&pool, user.id, user.role).await?;

    let (enrolled_courses, completed_courses): (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COALESCE(SUM(CASE WHEN completed_at IS NOT NULL THEN 1 ELSE 0 END), 0)
        FROM enrollments
        WHERE user_id = ?
        "#,
    )
    .bind(user.id)
    .fetch_one(&pool)
    .await?;

    let achievements = sqlx::query_as::<_, Achievement>(&format!(
        "SELECT {ACHIEVEMENT_COLUMNS} FROM achievements WHERE user_id = ? ORDER BY created_at DESC, id DESC"
    ))
    .bind(user.id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(ProfileResponse {
        user,
        profile,
        role_detail,
        enrolled_courses,
        completed_courses,
        achievements,
    }))
}

/// Creates or updates the caller's profile picture and phone number.
pub async fn edit_profile(
    State(pool): State<SqlitePool>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<EditProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let profile = sqlx::query_as::<_, Profile>(
        r#"
        INSERT INTO profiles (user_id, profile_picture, phone_number, updated_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (user_id) DO UPDATE SET
            profile_picture = excluded.profile_picture,
            phone_number = excluded.phone_number,
            updated_at = excluded.updated_at
        RETURNING profile_picture, phone_number, updated_at
        "#,
    )
    .bind(current.id)
    .bind(&payload.profile_picture)
    .bind(&payload.phone_number)
    .bind(Utc::now())
    .fetch_one(&pool)
    .await?;

    Ok(Json(json!({
        "message": "Profile updated.",
        "redirect": "/profile/",
        "profile": profile,
    })))
}

/// Creates or updates the role-specific record. Its role must be the caller's role.
pub async fn update_role_details(
    State(pool): State<SqlitePool>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<RoleDetailRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.role() != current.role {
        return Err(AppError::Forbidden(format!(
            "{} details cannot be attached to a {} account.",
            payload.role(),
            current.role
        )));
    }
    payload.validate()?;

    match &payload {
        RoleDetailRequest::Student(d) => {
            sqlx::query(
                r#"
                INSERT INTO student_details (user_id, department, year_of_study, course_interests)
                VALUES (?, ?, ?, ?)
                ON CONFLICT (user_id) DO UPDATE SET
                    department = excluded.department,
                    year_of_study = excluded.year_of_study,
                    course_interests = excluded.course_interests
                "#,
            )
            .bind(current.id)
            .bind(&d.department)
            .bind(d.year_of_study)
            .bind(&d.course_interests)
            .execute(&pool)
            .await?;
        }
        RoleDetailRequest::Instructor(d) => {
            sqlx::query(
                r#"
                INSERT INTO instructor_details (user_id, qualification, expertise)
                VALUES (?, ?, ?)
                ON CONFLICT (user_id) DO UPDATE SET
                    qualification = excluded.qualification,
                    expertise = excluded.expertise
                "#,
            )
            .bind(current.id)
            .bind(&d.qualification)
            .bind(&d.expertise)
            .execute(&pool)
            .await?;
        }
        RoleDetailRequest::Admin(d) => {
            sqlx::query(
                r#"
                INSERT INTO admin_details (user_id, admin_code)
                VALUES (?, ?)
                ON CONFLICT (user_id) DO UPDATE SET admin_code = excluded.admin_code
                "#,
            )
            .bind(current.id)
            .bind(&d.admin_code)
            .execute(&pool)
            .await?;
        }
    }

    let detail = fetch_role_detail(&pool, current.id, current.role).await?;
    Ok(Json(detail))
}

/// Records an achievement owned by the caller.
pub async fn add_achievement(
    State(pool): State<SqlitePool>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateAchievementRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let achievement = sqlx::query_as::<_, Achievement>(&format!(
        r#"
        INSERT INTO achievements (user_id, record_type, course_id, title, description, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING {ACHIEVEMENT_COLUMNS}
        "#
    ))
    .bind(current.id)
    .bind(payload.record_type)
    .bind(payload.course)
    .bind(payload.title.trim())
    .bind(payload.description.as_deref().unwrap_or_default())
    .bind(Utc::now())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            AppError::NotFound("Course not found".to_string())
        } else {
            AppError::from(e)
        }
    })?;

    tracing::info!(user_id = current.id, achievement_id = achievement.id, "achievement added");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Achievement added.",
            "redirect": "/profile/",
            "achievement": achievement,
        })),
    ))
}

/// Lists the caller's security questions (never the answers).
pub async fn list_security_questions(
    State(pool): State<SqlitePool>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let questions = sqlx::query_as::<_, SecurityQuestion>(
        "SELECT id, question, answer_hash FROM security_questions WHERE user_id = ? ORDER BY id",
    )
    .bind(current.id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(questions))
}

/// Adds a security question; the answer is stored only as an Argon2 hash.
pub async fn add_security_question(
    State(pool): State<SqlitePool>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateSecurityQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let answer_hash = hash_password(&normalize_answer(&payload.answer))?;

    let question = sqlx::query_as::<_, SecurityQuestion>(
        r#"
        INSERT INTO security_questions (user_id, question, answer_hash)
        VALUES (?, ?, ?)
        RETURNING id, question, answer_hash
        "#,
    )
    .bind(current.id)
    .bind(payload.question.trim())
    .bind(answer_hash)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(question)))
}
