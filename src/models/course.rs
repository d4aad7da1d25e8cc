// src/models/course.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::validation::validate_url_string;

/// Represents the 'courses' table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    /// Sanitized HTML.
    pub description: String,
    pub image_url: String,
    /// NULL once the creating user has been deleted.
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of the course catalog as seen by one user.
#[derive(Debug, Serialize, FromRow)]
pub struct CourseSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub creator_name: Option<String>,
    pub content_count: i64,
    pub is_enrolled: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum ContentType {
    Video,
    #[serde(rename = "PDF")]
    #[sqlx(rename = "PDF")]
    Pdf,
    Text,
    Test,
    Link,
}

/// Represents the 'course_contents' table. Listed by ascending `position`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseContent {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub content_type: ContentType,
    pub video_url: Option<String>,
    pub pdf_url: Option<String>,
    pub text_content: Option<String>,
    pub test_link: Option<String>,
    pub external_link: Option<String>,
    pub position: i64,
}

/// Course page: the course, its ordered contents and how many quiz questions it has.
#[derive(Debug, Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub contents: Vec<CourseContent>,
    pub question_count: i64,
}

/// DTO for creating a course.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(min = 1, max = 20000))]
    pub description: String,
    #[validate(custom(function = validate_url_string))]
    pub image_url: Option<String>,
}

/// DTO for adding a content item to a course.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContentRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    pub content_type: ContentType,
    #[validate(custom(function = validate_url_string))]
    pub video_url: Option<String>,
    #[validate(custom(function = validate_url_string))]
    pub pdf_url: Option<String>,
    #[validate(length(min = 1, max = 50000))]
    pub text_content: Option<String>,
    #[validate(custom(function = validate_url_string))]
    pub test_link: Option<String>,
    #[validate(custom(function = validate_url_string))]
    pub external_link: Option<String>,
    /// Defaults to one past the current last position.
    #[validate(range(min = 1))]
    pub position: Option<i64>,
}

impl CreateContentRequest {
    /// The payload field that carries this content type's material must be present.
    pub fn check_payload(&self) -> Result<(), String> {
        let (present, field) = match self.content_type {
            ContentType::Video => (self.video_url.is_some(), "video_url"),
            ContentType::Pdf => (self.pdf_url.is_some(), "pdf_url"),
            ContentType::Text => (self.text_content.is_some(), "text_content"),
            ContentType::Test => (self.test_link.is_some(), "test_link"),
            ContentType::Link => (self.external_link.is_some(), "external_link"),
        };
        if present {
            Ok(())
        } else {
            Err(format!("{} is required for this content type", field))
        }
    }
}
