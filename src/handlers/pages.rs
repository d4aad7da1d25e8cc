// src/handlers/pages.rs

use axum::{Json, response::IntoResponse};
use serde_json::json;

/// Public "about" page.
pub async fn about() -> impl IntoResponse {
    Json(json!({
        "page": "about",
        "title": "About LearnHub",
        "body": "LearnHub brings students and instructors together: browse courses, \
                 work through lessons at your own pace and check your understanding with quizzes.",
    }))
}

/// Public "contact" page.
pub async fn contact() -> impl IntoResponse {
    Json(json!({
        "page": "contact",
        "title": "Contact us",
        "body": "Questions about a course or your account? Reach out and we will get back to you.",
    }))
}
