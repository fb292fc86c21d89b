// src/models/student_score.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'student_scores' table: one row per (student, question).
///
/// Created on the first attempt with `trial_status = true` and updated on
/// every attempt after that. `completion_status` flips to true the first
/// time an attempt passes and is never revoked; `compile_count` is the
/// total number of attempts, 1-based and never reset.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StudentScore {
    pub id: i64,
    pub user_id: i64,
    pub question_id: i64,

    /// Best score achieved so far, 0-100.
    pub score: i64,

    /// Accumulated coding time in seconds, as reported by the client.
    pub coding_time: i64,

    pub completion_status: bool,
    pub trial_status: bool,
    pub compile_count: i64,

    /// The execution result that first satisfied completion.
    pub completed_execution_result_id: Option<i64>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}
