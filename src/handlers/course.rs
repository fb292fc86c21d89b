// src/handlers/course.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        course::{Course, Material},
        question::Question,
    },
};

/// Lists all active courses.
pub async fn list_courses(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let courses = sqlx::query_as::<_, Course>(
        r#"
        SELECT id, name, description, active, created_at
        FROM courses
        WHERE active = TRUE
        ORDER BY id
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list courses: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(courses))
}

/// Lists the active materials of a course, in order.
pub async fn list_course_materials(
    State(pool): State<PgPool>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let _course = sqlx::query("SELECT id FROM courses WHERE id = $1 AND active = TRUE")
        .bind(course_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))?;

    let materials = sqlx::query_as::<_, Material>(
        r#"
        SELECT id, course_id, title, order_number, active, created_at
        FROM materials
        WHERE course_id = $1 AND active = TRUE
        ORDER BY order_number, id
        "#,
    )
    .bind(course_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(materials))
}

/// Lists the active questions of a material, in order.
pub async fn list_material_questions(
    State(pool): State<PgPool>,
    Path(material_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let _material = sqlx::query("SELECT id FROM materials WHERE id = $1 AND active = TRUE")
        .bind(material_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Material not found".to_string()))?;

    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, material_id, title, description, language, question_type,
               order_number, active, created_at
        FROM questions
        WHERE material_id = $1 AND active = TRUE
        ORDER BY order_number, id
        "#,
    )
    .bind(material_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(questions))
}
