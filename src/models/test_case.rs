// src/models/test_case.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'test_cases' table in the database.
///
/// Test cases are never deleted automatically; retiring one is done by
/// clearing the `active` flag. Hidden cases become visible to a student
/// only through the revelation policy.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TestCase {
    pub id: i64,
    pub question_id: i64,
    pub description: String,

    /// Sample code / stimulus the submission is judged against.
    pub input: String,

    pub language: String,
    pub hidden: bool,
    pub active: bool,
    pub expected_output_file: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for sending a test case to a student. Never includes the
/// expected-output reference.
#[derive(Debug, Serialize)]
pub struct PublicTestCase {
    pub id: i64,
    pub description: String,
    pub input: String,
    pub language: String,
    pub hidden: bool,
}

impl From<TestCase> for PublicTestCase {
    fn from(tc: TestCase) -> Self {
        Self {
            id: tc.id,
            description: tc.description,
            input: tc.input,
            language: tc.language,
            hidden: tc.hidden,
        }
    }
}

/// What a student sees for a question: the always-visible cases plus the
/// hidden cases revealed so far, and how many remain locked.
#[derive(Debug, Serialize)]
pub struct TestCaseListResponse {
    pub visible: Vec<PublicTestCase>,
    pub revealed_hidden: Vec<PublicTestCase>,
    pub hidden_remaining: usize,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTestCaseRequest {
    pub question_id: i64,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 20000))]
    pub input: String,
    #[validate(length(min = 1, max = 40))]
    pub language: Option<String>,
    pub hidden: Option<bool>,
    pub expected_output_file: Option<String>,
}

/// Update intents for a test case. Each variant carries only its own
/// fields and is validated on its own; the handler resolves the variant
/// with a `match`.
#[derive(Debug, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum UpdateTestCaseRequest {
    /// Edit the case's content fields.
    Edit {
        description: Option<String>,
        input: Option<String>,
        language: Option<String>,
        expected_output_file: Option<String>,
    },
    /// Flip the hidden flag.
    SetVisibility { hidden: bool },
    /// Activate or retire the case.
    SetActive { active: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_intent_is_tag_dispatched() {
        let req: UpdateTestCaseRequest =
            serde_json::from_str(r#"{"intent": "set_visibility", "hidden": false}"#).unwrap();
        assert!(matches!(
            req,
            UpdateTestCaseRequest::SetVisibility { hidden: false }
        ));

        let req: UpdateTestCaseRequest =
            serde_json::from_str(r#"{"intent": "edit", "input": "print(1)"}"#).unwrap();
        match req {
            UpdateTestCaseRequest::Edit { input, .. } => {
                assert_eq!(input.as_deref(), Some("print(1)"))
            }
            _ => panic!("expected edit intent"),
        }
    }

    #[test]
    fn unknown_intent_is_rejected() {
        let res = serde_json::from_str::<UpdateTestCaseRequest>(r#"{"intent": "promote"}"#);
        assert!(res.is_err());
    }
}
