// src/models/role_detail.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationErrors};

use super::user::Role;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentDetail {
    pub department: String,
    pub year_of_study: Option<i64>,
    pub course_interests: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InstructorDetail {
    pub qualification: String,
    pub expertise: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdminDetail {
    pub admin_code: String,
}

/// The one role-specific record a user may own, tagged with its role.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "role")]
pub enum RoleDetail {
    Student(StudentDetail),
    Instructor(InstructorDetail),
    Admin(AdminDetail),
}

#[derive(Debug, Deserialize, Validate)]
pub struct StudentDetailRequest {
    #[validate(length(max = 50))]
    #[serde(default)]
    pub department: String,
    #[validate(range(min = 1, max = 10))]
    pub year_of_study: Option<i64>,
    #[validate(length(max = 255))]
    #[serde(default)]
    pub course_interests: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct InstructorDetailRequest {
    #[validate(length(max = 100))]
    #[serde(default)]
    pub qualification: String,
    #[validate(length(max = 255))]
    #[serde(default)]
    pub expertise: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AdminDetailRequest {
    #[validate(length(max = 50))]
    #[serde(default)]
    pub admin_code: String,
}

/// Body of `PUT /profile/details/`. The `role` tag must equal the caller's role.
#[derive(Debug, Deserialize)]
#[serde(tag = "role")]
pub enum RoleDetailRequest {
    Student(StudentDetailRequest),
    Instructor(InstructorDetailRequest),
    Admin(AdminDetailRequest),
}

impl RoleDetailRequest {
    pub fn role(&self) -> Role {
        match self {
            RoleDetailRequest::Student(_) => Role::Student,
            RoleDetailRequest::Instructor(_) => Role::Instructor,
            RoleDetailRequest::Admin(_) => Role::Admin,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            RoleDetailRequest::Student(r) => r.validate(),
            RoleDetailRequest::Instructor(r) => r.validate(),
            RoleDetailRequest::Admin(r) => r.validate(),
        }
    }
}
