// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'questions' table: a live-code exercise inside a material.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub material_id: i64,
    pub title: String,

    /// Exercise prompt shown to the student.
    pub description: String,

    /// Language the submission is judged in (e.g. 'python').
    pub language: String,

    /// Currently only 'live_code'.
    pub question_type: String,

    pub order_number: i64,
    pub active: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    pub material_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 40))]
    pub language: Option<String>,
    #[validate(range(min = 0))]
    pub order_number: Option<i64>,
}

/// DTO for updating a question. Fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateQuestionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub order_number: Option<i64>,
    pub active: Option<bool>,
}
