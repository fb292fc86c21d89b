// src/handlers/attempt.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    judge::{JudgeClient, score_from_verdict},
    models::execution_result::{
        AttemptResponse, CompileStatus, ExecutionResult, RecordAttemptRequest,
    },
    utils::jwt::Claims,
};

use super::test_case::revealed_for;

#[derive(sqlx::FromRow)]
struct QuestionRow {
    language: String,
    active: bool,
}

#[derive(sqlx::FromRow)]
struct TestCaseInput {
    input: String,
    hidden: bool,
}

/// Score row as seen at the start of an attempt, locked for the rest of
/// the transaction.
#[derive(sqlx::FromRow)]
struct LockedScore {
    id: i64,
    score: i64,
    compile_count: i64,
    completion_status: bool,
}

/// Records one code submission for a question.
///
/// The external judge is consulted first; the attempt is then persisted in
/// a single transaction that locks the student's score row, so two
/// concurrent submissions by the same student serialize and compile_count
/// stays strictly increasing. A judge outage is recorded as an
/// 'error'-status attempt rather than dropped - the attempt count advances
/// either way.
pub async fn record_attempt(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    State(judge): State<JudgeClient>,
    Extension(claims): Extension<Claims>,
    Path(question_id): Path<i64>,
    Json(payload): Json<RecordAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id();

    let question = sqlx::query_as::<_, QuestionRow>(
        "SELECT language, active FROM questions WHERE id = $1",
    )
    .bind(question_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Question not found".to_string()))?;

    if !question.active {
        return Err(AppError::BadRequest(
            "Question is not active".to_string(),
        ));
    }

    let test_cases = sqlx::query_as::<_, TestCaseInput>(
        r#"
        SELECT input, hidden
        FROM test_cases
        WHERE question_id = $1 AND active = TRUE
        ORDER BY id
        "#,
    )
    .bind(question_id)
    .fetch_all(&pool)
    .await?;

    // A question with no visible test case is misconfigured, not failing.
    if !test_cases.iter().any(|tc| !tc.hidden) {
        return Err(AppError::Conflict(
            "Question has no visible test cases and cannot be attempted".to_string(),
        ));
    }

    // Judging runs against every active case, hidden included; hiding
    // affects display only.
    let inputs: Vec<String> = test_cases.into_iter().map(|tc| tc.input).collect();

    let (status, score, output_image) = match judge
        .execute(&payload.code, &question.language, &inputs)
        .await
    {
        Ok(verdict) => {
            let score = score_from_verdict(&verdict);
            (verdict.compile_status, score, verdict.output_image)
        }
        Err(e) => {
            tracing::warn!(question_id, user_id, "judge call failed: {}", e);
            (CompileStatus::Error, 0, None)
        }
    };

    let coding_time = payload.coding_time.unwrap_or(0);

    let mut tx = pool.begin().await?;

    // Insert-or-lock: the ON CONFLICT update takes the row lock, so a
    // concurrent attempt by the same student waits here and then observes
    // this attempt's increment.
    let locked = sqlx::query_as::<_, LockedScore>(
        r#"
        INSERT INTO student_scores (user_id, question_id, trial_status)
        VALUES ($1, $2, TRUE)
        ON CONFLICT (user_id, question_id)
        DO UPDATE SET trial_status = TRUE
        RETURNING id, score, compile_count, completion_status
        "#,
    )
    .bind(user_id)
    .bind(question_id)
    .fetch_one(&mut *tx)
    .await?;

    let next_count = locked.compile_count + 1;

    let attempt = sqlx::query_as::<_, ExecutionResult>(
        r#"
        INSERT INTO execution_results
            (student_score_id, code, compile_count, compile_status, output_image)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, student_score_id, code, compile_count, compile_status,
                  output_image, created_at
        "#,
    )
    .bind(locked.id)
    .bind(&payload.code)
    .bind(next_count)
    .bind(status.as_str())
    .bind(&output_image)
    .fetch_one(&mut *tx)
    .await?;

    // Completion, once achieved, is never revoked by later failures.
    let completed_now = status.is_passed() && !locked.completion_status;

    sqlx::query(
        r#"
        UPDATE student_scores
        SET compile_count = $2,
            coding_time = coding_time + $3,
            score = GREATEST(score, $4),
            completion_status = completion_status OR $5,
            completed_execution_result_id = CASE
                WHEN $6 THEN $7
                ELSE completed_execution_result_id
            END,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(locked.id)
    .bind(next_count)
    .bind(coding_time)
    .bind(score)
    .bind(status.is_passed())
    .bind(completed_now)
    .bind(attempt.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let (revealed_test_cases, _) =
        revealed_for(&pool, user_id, question_id, config.reveal_threshold).await?;

    Ok((
        StatusCode::CREATED,
        Json(AttemptResponse {
            attempt,
            completion_status: locked.completion_status || status.is_passed(),
            score: locked.score.max(score),
            compile_count: next_count,
            revealed_test_cases,
        }),
    ))
}

/// Lists the calling student's attempts on a question, oldest first.
pub async fn list_attempts(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(question_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = sqlx::query_as::<_, ExecutionResult>(
        r#"
        SELECT er.id, er.student_score_id, er.code, er.compile_count,
               er.compile_status, er.output_image, er.created_at
        FROM execution_results er
        JOIN student_scores s ON s.id = er.student_score_id
        WHERE s.user_id = $1 AND s.question_id = $2
        ORDER BY er.compile_count
        "#,
    )
    .bind(claims.user_id())
    .bind(question_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(attempts))
}
