// src/models/user.rs

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::validation::validate_phone;

/// Role chosen at signup. It never changes afterwards and gates login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Role {
    Student,
    Instructor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Instructor => "Instructor",
            Role::Admin => "Admin",
        }
    }

    /// Instructors and admins author courses.
    pub fn can_author_courses(&self) -> bool {
        matches!(self, Role::Instructor | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Column list matching `User`, for `SELECT`s and `RETURNING` clauses.
pub const USER_COLUMNS: &str = "id, email, full_name, username, phone, dob, gender, password, \
     role, is_active, is_staff, created_at, updated_at";

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,

    /// Unique, normalized email. Used as the login identifier.
    pub email: String,

    pub full_name: String,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<Gender>,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub role: Role,
    pub is_active: bool,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new account.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Full name must be between 1 and 100 characters."
    ))]
    pub full_name: String,

    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254)
    )]
    pub email: String,

    #[validate(length(max = 50))]
    pub username: Option<String>,

    #[validate(custom(function = validate_phone))]
    pub phone: Option<String>,

    pub dob: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub role: Role,

    #[validate(length(
        min = 1,
        max = 128,
        message = "Password length must be between 1 and 128 characters."
    ))]
    pub password: String,

    pub confirm_password: String,
}

impl SignupRequest {
    pub fn passwords_match(&self) -> bool {
        self.password == self.confirm_password
    }
}

/// DTO for user login. The role must match the stored one.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub remember_me: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(password: &str, confirm: &str) -> SignupRequest {
        SignupRequest {
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            username: None,
            phone: Some("+441234567".to_string()),
            dob: None,
            gender: Some(Gender::Female),
            role: Role::Student,
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn role_names_match_storage() {
        assert_eq!(Role::Instructor.to_string(), "Instructor");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"Admin\"");
        assert!(serde_json::from_str::<Role>("\"Teacher\"").is_err());
    }

    #[test]
    fn only_instructors_and_admins_author() {
        assert!(!Role::Student.can_author_courses());
        assert!(Role::Instructor.can_author_courses());
        assert!(Role::Admin.can_author_courses());
    }

    #[test]
    fn signup_validation() {
        let ok = signup("p1", "p1");
        assert!(ok.passwords_match());
        assert!(ok.validate().is_ok());

        assert!(!signup("p1", "p2").passwords_match());

        let mut bad_email = signup("p1", "p1");
        bad_email.email = "not-an-email".to_string();
        assert!(bad_email.validate().is_err());

        let mut bad_phone = signup("p1", "p1");
        bad_phone.phone = Some("call me".to_string());
        assert!(bad_phone.validate().is_err());
    }
}
