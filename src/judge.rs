// src/judge.rs

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::execution_result::CompileStatus;

const JUDGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the external code-execution (judging) service.
///
/// The service consumes the submitted code plus the inputs of every active
/// test case and returns a compile status with per-test pass counts. It is
/// consumed as-is; nothing in this crate executes student code.
#[derive(Clone)]
pub struct JudgeClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ExecuteRequest<'a> {
    code: &'a str,
    language: &'a str,
    test_case_inputs: &'a [String],
}

/// Verdict returned by the judge for one submission.
#[derive(Debug, Deserialize)]
pub struct JudgeVerdict {
    pub compile_status: CompileStatus,
    #[serde(default)]
    pub tests_passed: i64,
    #[serde(default)]
    pub tests_total: i64,
    #[serde(default)]
    pub output_image: Option<String>,
}

/// The judging service was unreachable or returned a non-success status.
/// Callers record the attempt with an 'error' compile status instead of
/// dropping it.
#[derive(Debug)]
pub struct JudgeError(pub String);

impl fmt::Display for JudgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "judge service error: {}", self.0)
    }
}

impl std::error::Error for JudgeError {}

impl JudgeClient {
    pub fn new(base_url: String) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(JUDGE_TIMEOUT).build()?;
        Ok(Self { client, base_url })
    }

    /// Runs the submission against the given test case inputs.
    pub async fn execute(
        &self,
        code: &str,
        language: &str,
        test_case_inputs: &[String],
    ) -> Result<JudgeVerdict, JudgeError> {
        let url = format!("{}/execute", self.base_url);
        let req = ExecuteRequest {
            code,
            language,
            test_case_inputs,
        };

        let res = self
            .client
            .post(&url)
            .json(&req)
            .send()
            .await
            .map_err(|e| JudgeError(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(JudgeError(format!("HTTP {}: {}", status, body)));
        }

        res.json::<JudgeVerdict>()
            .await
            .map_err(|e| JudgeError(e.to_string()))
    }
}

/// Derives the 0-100 score for an attempt from the judge's pass counts.
///
/// A pass with no per-test detail counts as a full score; a fail or error
/// with no detail counts as zero.
pub fn score_from_verdict(verdict: &JudgeVerdict) -> i64 {
    if verdict.tests_total > 0 {
        let ratio = verdict.tests_passed as f64 / verdict.tests_total as f64;
        (ratio * 100.0).round().clamp(0.0, 100.0) as i64
    } else if verdict.compile_status.is_passed() {
        100
    } else {
        0
    }
}
