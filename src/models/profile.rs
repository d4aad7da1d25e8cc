// src/models/profile.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{role_detail::RoleDetail, user::User};
use crate::utils::validation::{validate_phone, validate_url_string};

/// Represents the 'profiles' table (one per user).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub profile_picture: Option<String>,
    pub phone_number: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EditProfileRequest {
    #[validate(custom(function = validate_url_string))]
    pub profile_picture: Option<String>,
    #[validate(custom(function = validate_phone))]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum AchievementType {
    Certificate,
    Award,
    Course,
    Other,
}

/// Represents the 'achievements' table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Achievement {
    pub id: i64,
    pub user_id: i64,
    pub record_type: AchievementType,
    /// Related course, if any. NULL once that course is deleted.
    pub course_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAchievementRequest {
    pub record_type: AchievementType,
    pub course: Option<i64>,
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// Represents the 'security_questions' table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SecurityQuestion {
    pub id: i64,
    pub question: String,
    #[serde(skip)]
    pub answer_hash: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSecurityQuestionRequest {
    #[validate(length(min = 1, max = 255))]
    pub question: String,
    #[validate(length(min = 1, max = 255))]
    pub answer: String,
}

/// Aggregated profile page for the current user.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
    pub profile: Option<Profile>,
    pub role_detail: Option<RoleDetail>,
    pub enrolled_courses: i64,
    pub completed_courses: i64,
    pub achievements: Vec<Achievement>,
}
