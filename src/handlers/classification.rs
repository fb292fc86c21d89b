// src/handlers/classification.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    classifier::ClassifierClient,
    error::AppError,
    models::classification::{
        ClassificationHistoryEntry, ClassificationQuery, ClassificationType,
        CognitiveClassification, GenerateClassificationRequest,
    },
    scoring,
    utils::jwt::Claims,
};

fn parse_type(raw: &str) -> Result<ClassificationType, AppError> {
    raw.parse::<ClassificationType>()
        .map_err(AppError::BadRequest)
}

async fn ensure_course(pool: &PgPool, course_id: i64) -> Result<(), AppError> {
    sqlx::query("SELECT id FROM courses WHERE id = $1 AND active = TRUE")
        .bind(course_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))?;
    Ok(())
}

/// Regenerates the calling student's classification snapshot for a course.
///
/// Aggregates effort, short-circuits with 422 when nothing was attempted
/// (the external classifier is never called with an empty payload), and
/// on success replaces the snapshot for (student, course, type) and logs
/// the date. A classifier failure leaves the previous snapshot untouched.
pub async fn generate_classification(
    State(pool): State<PgPool>,
    State(classifier): State<ClassifierClient>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
    Json(payload): Json<GenerateClassificationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let classification_type = parse_type(&payload.classification_type)?;
    let user_id = claims.user_id();

    ensure_course(&pool, course_id).await?;

    let input = scoring::aggregate_course_input(&pool, user_id, course_id).await?;

    if !scoring::has_attempted(&input) {
        return Err(AppError::InsufficientData(
            "No attempted questions in this course yet".to_string(),
        ));
    }

    let outcome = classifier
        .classify(classification_type, &input)
        .await
        .map_err(|e| AppError::ClassificationUnavailable(e.to_string()))?;

    let snapshot = sqlx::query_as::<_, CognitiveClassification>(
        r#"
        INSERT INTO student_course_cognitive_classifications
            (user_id, course_id, classification_type, classification_level,
             classification_score, raw_data, classified_at)
        VALUES ($1, $2, $3, $4, $5, $6, NOW())
        ON CONFLICT (user_id, course_id, classification_type)
        DO UPDATE SET
            classification_level = EXCLUDED.classification_level,
            classification_score = EXCLUDED.classification_score,
            raw_data = EXCLUDED.raw_data,
            classified_at = EXCLUDED.classified_at
        RETURNING id, user_id, course_id, classification_type,
                  classification_level, classification_score, raw_data,
                  classified_at
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .bind(classification_type.as_str())
    .bind(&outcome.classification_level)
    .bind(outcome.classification_score)
    .bind(&outcome.raw_data)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to upsert classification snapshot: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    sqlx::query(
        r#"
        INSERT INTO classification_history
            (user_id, course_id, classification_type, classified_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .bind(classification_type.as_str())
    .bind(snapshot.classified_at)
    .execute(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// Latest classification snapshot for the calling student.
pub async fn get_classification(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
    Query(params): Query<ClassificationQuery>,
) -> Result<impl IntoResponse, AppError> {
    let classification_type = parse_type(&params.classification_type)?;

    let snapshot = sqlx::query_as::<_, CognitiveClassification>(
        r#"
        SELECT id, user_id, course_id, classification_type,
               classification_level, classification_score, raw_data,
               classified_at
        FROM student_course_cognitive_classifications
        WHERE user_id = $1 AND course_id = $2 AND classification_type = $3
        "#,
    )
    .bind(claims.user_id())
    .bind(course_id)
    .bind(classification_type.as_str())
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound(
        "No classification generated for this course yet".to_string(),
    ))?;

    Ok(Json(snapshot))
}

/// Dates at which the calling student's classification was regenerated,
/// newest first. Feeds the classification-date selector.
pub async fn list_classification_history(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
    Query(params): Query<ClassificationQuery>,
) -> Result<impl IntoResponse, AppError> {
    let classification_type = parse_type(&params.classification_type)?;

    let dates = sqlx::query_as::<_, ClassificationHistoryEntry>(
        r#"
        SELECT classified_at
        FROM classification_history
        WHERE user_id = $1 AND course_id = $2 AND classification_type = $3
        ORDER BY classified_at DESC
        "#,
    )
    .bind(claims.user_id())
    .bind(course_id)
    .bind(classification_type.as_str())
    .fetch_all(&pool)
    .await?;

    Ok(Json(dates))
}
