// src/models/quiz.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'quiz_questions' table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizQuestion {
    pub id: i64,
    pub course_id: i64,
    pub question_text: String,
    pub option_1: String,
    pub option_2: String,
    pub option_3: String,
    pub option_4: String,
    /// 1-based index of the correct option.
    pub correct_option: i64,
    pub created_at: DateTime<Utc>,
}

/// DTO for sending a question to a learner (excludes the correct option).
#[derive(Debug, Serialize)]
pub struct PublicQuizQuestion {
    pub id: i64,
    pub question_text: String,
    pub options: [String; 4],
}

impl From<QuizQuestion> for PublicQuizQuestion {
    fn from(q: QuizQuestion) -> Self {
        Self {
            id: q.id,
            question_text: q.question_text,
            options: [q.option_1, q.option_2, q.option_3, q.option_4],
        }
    }
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    pub question_text: String,
    #[validate(length(min = 1, max = 200))]
    pub option_1: String,
    #[validate(length(min = 1, max = 200))]
    pub option_2: String,
    #[validate(length(min = 1, max = 200))]
    pub option_3: String,
    #[validate(length(min = 1, max = 200))]
    pub option_4: String,
    #[validate(range(min = 1, max = 4, message = "correct_option must be between 1 and 4."))]
    pub correct_option: i64,
}

/// Represents the 'quiz_attempts' table. At most one row per (user, question).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizAttempt {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    pub question_id: i64,
    pub selected_option: i64,
    pub is_correct: bool,
    pub attempted_at: DateTime<Utc>,
}

/// DTO for answering one question.
#[derive(Debug, Deserialize, Validate)]
pub struct AttemptRequest {
    #[validate(range(min = 1, max = 4, message = "selected_option must be between 1 and 4."))]
    pub selected_option: i64,
}

/// A learner's results for one course.
#[derive(Debug, Serialize)]
pub struct QuizResults {
    pub course_id: i64,
    pub total_questions: i64,
    pub answered: usize,
    pub correct: usize,
    pub attempts: Vec<QuizAttempt>,
}
