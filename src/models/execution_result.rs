// src/models/execution_result.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Outcome of judging one attempt.
///
/// `Error` means the judging service itself failed (timeout, 5xx); the
/// attempt is still recorded and still counts toward `compile_count`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompileStatus {
    Passed,
    Failed,
    Error,
}

impl CompileStatus {
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for CompileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompileStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passed" => Ok(Self::Passed),
            "failed" => Ok(Self::Failed),
            "error" => Ok(Self::Error),
            other => Err(format!("invalid compile status '{}'", other)),
        }
    }
}

/// Represents the 'execution_results' table: the append-only attempt log.
/// Rows are immutable once created - each attempt is a new record.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub id: i64,
    pub student_score_id: i64,

    /// Submitted source code.
    pub code: String,

    /// Ordinal of this attempt, 1-based.
    pub compile_count: i64,

    /// 'passed', 'failed' or 'error'.
    pub compile_status: String,

    pub output_image: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for submitting an attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct RecordAttemptRequest {
    #[validate(length(min = 1, max = 65536, message = "Code must not be empty."))]
    pub code: String,

    /// Seconds spent in the editor since the previous attempt.
    #[validate(range(min = 0, max = 86400))]
    pub coding_time: Option<i64>,
}

/// Response to a recorded attempt: the immutable result row, the score
/// state after this attempt, and the hidden cases revealed so far.
#[derive(Debug, Serialize)]
pub struct AttemptResponse {
    pub attempt: ExecutionResult,
    pub completion_status: bool,
    pub score: i64,
    pub compile_count: i64,
    pub revealed_test_cases: Vec<crate::models::test_case::PublicTestCase>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_status_roundtrip() {
        for status in [
            CompileStatus::Passed,
            CompileStatus::Failed,
            CompileStatus::Error,
        ] {
            assert_eq!(status.as_str().parse::<CompileStatus>().unwrap(), status);
        }
        assert!("pending".parse::<CompileStatus>().is_err());
    }

    #[test]
    fn compile_status_json_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&CompileStatus::Passed).unwrap(),
            "\"passed\""
        );
    }
}
