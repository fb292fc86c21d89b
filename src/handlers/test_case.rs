// src/handlers/test_case.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    config::Config,
    error::AppError,
    models::test_case::{PublicTestCase, TestCase, TestCaseListResponse},
    revelation,
    utils::jwt::Claims,
};

/// Attempt state that the revelation policy is evaluated against.
#[derive(sqlx::FromRow)]
struct RevealContext {
    compile_count: i64,
    completion_status: bool,
    /// compile_count of the attempt that completed the question, if any.
    completed_compile_count: Option<i64>,
}

/// The hidden test cases of a question currently revealed to a student.
///
/// Derived entirely from the attempt log: no reveal state is written
/// anywhere, so calling this any number of times between attempts returns
/// the same set. Once the question is solved the count is frozen at the
/// completing attempt's ordinal, so solved questions never leak further
/// cases.
pub(crate) async fn revealed_for(
    pool: &PgPool,
    user_id: i64,
    question_id: i64,
    threshold: u32,
) -> Result<(Vec<PublicTestCase>, usize), AppError> {
    let hidden = sqlx::query_as::<_, TestCase>(
        r#"
        SELECT id, question_id, description, input, language, hidden, active,
               expected_output_file, created_at
        FROM test_cases
        WHERE question_id = $1 AND hidden = TRUE AND active = TRUE
        ORDER BY id
        "#,
    )
    .bind(question_id)
    .fetch_all(pool)
    .await?;

    if hidden.is_empty() {
        return Ok((Vec::new(), 0));
    }

    let ctx = sqlx::query_as::<_, RevealContext>(
        r#"
        SELECT s.compile_count, s.completion_status,
               er.compile_count AS completed_compile_count
        FROM student_scores s
        LEFT JOIN execution_results er ON er.id = s.completed_execution_result_id
        WHERE s.user_id = $1 AND s.question_id = $2
        "#,
    )
    .bind(user_id)
    .bind(question_id)
    .fetch_optional(pool)
    .await?;

    let effective_count = match &ctx {
        Some(c) if c.completion_status => c.completed_compile_count.unwrap_or(c.compile_count),
        Some(c) => c.compile_count,
        None => 0,
    };

    let total_hidden = hidden.len();
    let n = revelation::revealed_hidden_count(effective_count, total_hidden, threshold);

    let revealed: Vec<PublicTestCase> = hidden
        .into_iter()
        .take(n)
        .map(PublicTestCase::from)
        .collect();

    Ok((revealed, total_hidden - n))
}

/// Lists a question's test cases as seen by the calling student: the
/// always-visible ones plus whatever the revelation policy has unlocked.
pub async fn list_question_test_cases(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Path(question_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let _question = sqlx::query("SELECT id FROM questions WHERE id = $1 AND active = TRUE")
        .bind(question_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    let visible = sqlx::query_as::<_, TestCase>(
        r#"
        SELECT id, question_id, description, input, language, hidden, active,
               expected_output_file, created_at
        FROM test_cases
        WHERE question_id = $1 AND hidden = FALSE AND active = TRUE
        ORDER BY id
        "#,
    )
    .bind(question_id)
    .fetch_all(&pool)
    .await?;

    let (revealed_hidden, hidden_remaining) = revealed_for(
        &pool,
        claims.user_id(),
        question_id,
        config.reveal_threshold,
    )
    .await?;

    Ok(Json(TestCaseListResponse {
        visible: visible.into_iter().map(PublicTestCase::from).collect(),
        revealed_hidden,
        hidden_remaining,
    }))
}
