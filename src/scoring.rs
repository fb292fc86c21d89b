// src/scoring.rs

//! Score aggregation: the projection of a student's per-question effort in
//! a course into the payload sent to the external classification service.
//!
//! Aggregation is a pure read. It never mutates score rows, and its output
//! is deterministic for a given database state, so running it twice with
//! no intervening attempts yields identical payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::error::AppError;

/// Per-question effort record handed to the classifier.
///
/// A question the student never attempted contributes a zero-effort record
/// with `trial_status = false` - "not attempted" stays distinguishable
/// from "attempted but failed".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionEffort {
    pub question_id: i64,
    pub trial_status: bool,
    pub completion_status: bool,
    pub score: i64,
    pub coding_time: i64,
    pub compile_count: i64,
}

/// Mapping from material id to that material's per-question efforts,
/// ordered by the questions' order numbers. BTreeMap keeps the payload
/// deterministic.
pub type ClassificationInput = BTreeMap<i64, Vec<QuestionEffort>>;

/// One row of the aggregation join: every active question of the course,
/// with the student's score columns when a score row exists.
#[derive(Debug, FromRow)]
pub struct EffortRow {
    pub material_id: i64,
    pub question_id: i64,
    pub trial_status: Option<bool>,
    pub completion_status: Option<bool>,
    pub score: Option<i64>,
    pub coding_time: Option<i64>,
    pub compile_count: Option<i64>,
}

/// Folds the joined rows into the classification payload.
pub fn build_input(rows: Vec<EffortRow>) -> ClassificationInput {
    let mut input = ClassificationInput::new();
    for row in rows {
        let effort = QuestionEffort {
            question_id: row.question_id,
            trial_status: row.trial_status.unwrap_or(false),
            completion_status: row.completion_status.unwrap_or(false),
            score: row.score.unwrap_or(0),
            coding_time: row.coding_time.unwrap_or(0),
            compile_count: row.compile_count.unwrap_or(0),
        };
        input.entry(row.material_id).or_default().push(effort);
    }
    input
}

/// True if the student has attempted at least one question in the payload.
/// An empty or never-attempted payload is "insufficient data" for
/// classification, not an error.
pub fn has_attempted(input: &ClassificationInput) -> bool {
    input
        .values()
        .flatten()
        .any(|effort| effort.trial_status)
}

/// Projects the student's effort across all active materials and questions
/// of a course.
pub async fn aggregate_course_input(
    pool: &PgPool,
    user_id: i64,
    course_id: i64,
) -> Result<ClassificationInput, AppError> {
    let rows = sqlx::query_as::<_, EffortRow>(
        r#"
        SELECT
            m.id AS material_id,
            q.id AS question_id,
            s.trial_status,
            s.completion_status,
            s.score,
            s.coding_time,
            s.compile_count
        FROM materials m
        JOIN questions q ON q.material_id = m.id AND q.active = TRUE
        LEFT JOIN student_scores s ON s.question_id = q.id AND s.user_id = $2
        WHERE m.course_id = $1 AND m.active = TRUE
        ORDER BY m.order_number, m.id, q.order_number, q.id
        "#,
    )
    .bind(course_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(build_input(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempted(material_id: i64, question_id: i64, score: i64, completed: bool) -> EffortRow {
        EffortRow {
            material_id,
            question_id,
            trial_status: Some(true),
            completion_status: Some(completed),
            score: Some(score),
            coding_time: Some(120),
            compile_count: Some(2),
        }
    }

    fn untouched(material_id: i64, question_id: i64) -> EffortRow {
        EffortRow {
            material_id,
            question_id,
            trial_status: None,
            completion_status: None,
            score: None,
            coding_time: None,
            compile_count: None,
        }
    }

    #[test]
    fn unattempted_questions_become_zero_effort_records() {
        let input = build_input(vec![attempted(1, 10, 67, false), untouched(1, 11)]);

        let efforts = &input[&1];
        assert_eq!(efforts.len(), 2);
        assert!(efforts[0].trial_status);
        assert!(!efforts[1].trial_status);
        assert_eq!(efforts[1].score, 0);
        assert_eq!(efforts[1].compile_count, 0);
    }

    #[test]
    fn questions_group_under_their_material() {
        let input = build_input(vec![
            attempted(1, 10, 100, true),
            untouched(2, 20),
            untouched(2, 21),
        ]);

        assert_eq!(input.len(), 2);
        assert_eq!(input[&1].len(), 1);
        assert_eq!(input[&2].len(), 2);
    }

    #[test]
    fn empty_course_yields_empty_input() {
        let input = build_input(vec![]);
        assert!(input.is_empty());
        assert!(!has_attempted(&input));
    }

    #[test]
    fn zero_effort_only_payload_counts_as_unattempted() {
        let input = build_input(vec![untouched(1, 10), untouched(1, 11)]);
        assert!(!has_attempted(&input));

        let input = build_input(vec![untouched(1, 10), attempted(1, 11, 0, false)]);
        assert!(has_attempted(&input));
    }

    #[test]
    fn aggregation_is_deterministic() {
        let rows = || vec![attempted(2, 20, 50, false), untouched(1, 10)];
        let a = serde_json::to_string(&build_input(rows())).unwrap();
        let b = serde_json::to_string(&build_input(rows())).unwrap();
        assert_eq!(a, b);
    }
}
