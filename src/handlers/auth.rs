// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, is_unique_violation},
    models::user::{LoginRequest, SignupRequest, USER_COLUMNS, User},
    utils::{
        hash::{hash_password, verify_password},
        jwt::{CurrentUser, now_unix, sign_jwt},
        validation::normalize_email,
    },
};

const INVALID_CREDENTIALS: &str = "Invalid email or password.";
const ROLE_MISMATCH: &str = "Role mismatch! Please choose the correct role.";

/// Creates a new account.
///
/// Only the `users` row is written; role-specific details are filled in
/// later through `PUT /profile/details/`.
pub async fn signup(
    State(pool): State<SqlitePool>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    // Checked first so a mismatch is always reported, whatever else is wrong.
    if !payload.passwords_match() {
        return Err(AppError::BadRequest("Passwords do not match".to_string()));
    }

    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let email = normalize_email(&payload.email);
    let hashed_password = hash_password(&payload.password)?;
    let now = Utc::now();

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (email, full_name, username, phone, dob, gender, password, role, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&email)
    .bind(&payload.full_name)
    .bind(&payload.username)
    .bind(&payload.phone)
    .bind(payload.dob)
    .bind(payload.gender)
    .bind(hashed_password)
    .bind(payload.role)
    .bind(now)
    .bind(now)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("An account with email '{}' already exists", email))
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?;

    tracing::info!(user_id = user.id, role = %user.role, "user signed up");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Your account has been created successfully! Please login.",
            "redirect": "/login/",
            "user": user,
        })),
    ))
}

/// Authenticates a user for the role they claim and opens a session.
///
/// Unknown email and wrong password share one generic 401; a correct
/// password with the wrong role is a distinct 403 and creates no session.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let email = normalize_email(&payload.email);

    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
    ))
    .bind(&email)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let Some(user) = user else {
        tracing::warn!(%email, "login rejected: unknown email");
        return Err(AppError::AuthError(INVALID_CREDENTIALS.to_string()));
    };

    if !verify_password(&payload.password, &user.password)? || !user.is_active {
        tracing::warn!(user_id = user.id, "login rejected: bad password or inactive");
        return Err(AppError::AuthError(INVALID_CREDENTIALS.to_string()));
    }

    if user.role != payload.role {
        tracing::warn!(
            user_id = user.id,
            stored = %user.role,
            claimed = %payload.role,
            "login rejected: role mismatch"
        );
        return Err(AppError::Forbidden(ROLE_MISMATCH.to_string()));
    }

    let lifetime = if payload.remember_me {
        config.remember_me_expiration
    } else {
        config.jwt_expiration
    };

    let now = now_unix()? as i64;
    sqlx::query("DELETE FROM sessions WHERE user_id = ? AND expires_at <= ?")
        .bind(user.id)
        .bind(now)
        .execute(&pool)
        .await?;

    let session_id = uuid::Uuid::new_v4().to_string();
    let expires_at = now + lifetime as i64;

    sqlx::query("INSERT INTO sessions (id, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
        .bind(&session_id)
        .bind(user.id)
        .bind(Utc::now())
        .bind(expires_at)
        .execute(&pool)
        .await?;

    let token = sign_jwt(user.id, user.role, &session_id, &config.jwt_secret, lifetime)?;

    tracing::info!(user_id = user.id, role = %user.role, "user logged in");

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "expires_in": lifetime,
        "message": "Login successful",
        "redirect": "/courses/",
        "user": user,
    })))
}

/// Ends the caller's session. The token stops working immediately.
pub async fn logout(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(&user.session_id)
        .execute(&pool)
        .await?;

    tracing::info!(user_id = user.id, "user logged out");

    Ok(Json(json!({
        "message": "You have been logged out.",
        "redirect": "/login/",
    })))
}
