// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        course::{CreateCourseRequest, CreateMaterialRequest, UpdateCourseRequest, UpdateMaterialRequest},
        question::{CreateQuestionRequest, UpdateQuestionRequest},
        test_case::{CreateTestCaseRequest, TestCase, UpdateTestCaseRequest},
        user::{AdminCreateUserRequest, AdminUpdateUserRequest, User, validate_role},
    },
    utils::{hash::hash_password, jwt::Claims},
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Lists all users in the system.
/// Admin only.
pub async fn list_users(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password, role, created_at
        FROM users
        ORDER BY id DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(users))
}

/// Creates a new user with a specific role.
/// Admin only.
pub async fn create_user(
    State(pool): State<PgPool>,
    Json(payload): Json<AdminCreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let hashed_password = hash_password(&payload.password)?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO users (username, password, role)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(&payload.username)
    .bind(&hashed_password)
    .bind(&payload.role)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("unique constraint") || e.to_string().contains("23505") {
            AppError::Conflict(format!("Username '{}' already exists", payload.username))
        } else {
            tracing::error!("Failed to create user: {:?}", e);
            AppError::InternalServerError(e.to_string())
        }
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Updates user information.
/// Admin only.
pub async fn update_user(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<AdminUpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    // Check existence
    let _exists = sqlx::query("SELECT id FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    if let Some(ref role) = payload.role
        && validate_role(role).is_err()
    {
        return Err(AppError::BadRequest("Invalid role".to_string()));
    }

    // Perform updates sequentially if fields are present
    if let Some(new_username) = payload.username {
        sqlx::query("UPDATE users SET username = $1 WHERE id = $2")
            .bind(new_username)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    if let Some(new_role) = payload.role {
        sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
            .bind(new_role)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    if let Some(new_password) = payload.password {
        let hashed = hash_password(&new_password)?;
        sqlx::query("UPDATE users SET password = $1 WHERE id = $2")
            .bind(hashed)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    Ok(StatusCode::OK)
}

/// Deletes a user by ID.
/// Admin only. Prevents deleting self.
pub async fn delete_user(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    // Prevent self-deletion
    if id == claims.user_id() {
        return Err(AppError::BadRequest("Cannot delete yourself".to_string()));
    }

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete user: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

/// Creates a new course.
/// Admin only.
pub async fn create_course(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO courses (name, description)
        VALUES ($1, $2)
        RETURNING id
        "#,
    )
    .bind(&payload.name)
    .bind(payload.description.as_deref().unwrap_or(""))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create course: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Updates a course by ID.
/// Admin only.
pub async fn update_course(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.is_none() && payload.description.is_none() && payload.active.is_none() {
        return Ok(StatusCode::OK);
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE courses SET ");
    let mut separated = builder.separated(", ");

    if let Some(name) = payload.name {
        separated.push("name = ");
        separated.push_bind_unseparated(name);
    }

    if let Some(description) = payload.description {
        separated.push("description = ");
        separated.push_bind_unseparated(description);
    }

    if let Some(active) = payload.active {
        separated.push("active = ");
        separated.push_bind_unseparated(active);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update course: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes a course by ID (cascades to materials, questions, test cases).
/// Admin only.
pub async fn delete_course(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM courses WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Materials
// ---------------------------------------------------------------------------

/// Creates a new material under a course.
/// Admin only.
pub async fn create_material(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateMaterialRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let _course = sqlx::query("SELECT id FROM courses WHERE id = $1")
        .bind(payload.course_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO materials (course_id, title, order_number)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(payload.course_id)
    .bind(&payload.title)
    .bind(payload.order_number.unwrap_or(0))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create material: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Updates a material by ID.
/// Admin only.
pub async fn update_material(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateMaterialRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.title.is_none() && payload.order_number.is_none() && payload.active.is_none() {
        return Ok(StatusCode::OK);
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE materials SET ");
    let mut separated = builder.separated(", ");

    if let Some(title) = payload.title {
        separated.push("title = ");
        separated.push_bind_unseparated(title);
    }

    if let Some(order_number) = payload.order_number {
        separated.push("order_number = ");
        separated.push_bind_unseparated(order_number);
    }

    if let Some(active) = payload.active {
        separated.push("active = ");
        separated.push_bind_unseparated(active);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update material: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Material not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes a material by ID.
/// Admin only.
pub async fn delete_material(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM materials WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Material not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// Creates a new live-code question under a material.
/// Admin only.
pub async fn create_question(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let _material = sqlx::query("SELECT id FROM materials WHERE id = $1")
        .bind(payload.material_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Material not found".to_string()))?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO questions (material_id, title, description, language, order_number)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(payload.material_id)
    .bind(&payload.title)
    .bind(payload.description.as_deref().unwrap_or(""))
    .bind(payload.language.as_deref().unwrap_or("python"))
    .bind(payload.order_number.unwrap_or(0))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Updates a question by ID.
/// Admin only.
pub async fn update_question(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.title.is_none()
        && payload.description.is_none()
        && payload.language.is_none()
        && payload.order_number.is_none()
        && payload.active.is_none()
    {
        return Ok(StatusCode::OK);
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE questions SET ");
    let mut separated = builder.separated(", ");

    if let Some(title) = payload.title {
        separated.push("title = ");
        separated.push_bind_unseparated(title);
    }

    if let Some(description) = payload.description {
        separated.push("description = ");
        separated.push_bind_unseparated(description);
    }

    if let Some(language) = payload.language {
        separated.push("language = ");
        separated.push_bind_unseparated(language);
    }

    if let Some(order_number) = payload.order_number {
        separated.push("order_number = ");
        separated.push_bind_unseparated(order_number);
    }

    if let Some(active) = payload.active {
        separated.push("active = ");
        separated.push_bind_unseparated(active);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes a question by ID (cascades to its test cases and scores).
/// Admin only.
pub async fn delete_question(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Test cases
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct TestCaseListQuery {
    pub question_id: i64,
}

/// Lists every test case of a question, hidden and inactive included.
/// Admin only.
pub async fn list_test_cases(
    State(pool): State<PgPool>,
    Query(params): Query<TestCaseListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let test_cases = sqlx::query_as::<_, TestCase>(
        r#"
        SELECT id, question_id, description, input, language, hidden, active,
               expected_output_file, created_at
        FROM test_cases
        WHERE question_id = $1
        ORDER BY id
        "#,
    )
    .bind(params.question_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(test_cases))
}

/// Creates a new test case under a question.
/// Admin only.
pub async fn create_test_case(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateTestCaseRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let question_language: String =
        sqlx::query_scalar("SELECT language FROM questions WHERE id = $1")
            .bind(payload.question_id)
            .fetch_optional(&pool)
            .await?
            .ok_or(AppError::NotFound("Question not found".to_string()))?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO test_cases
            (question_id, description, input, language, hidden, expected_output_file)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(payload.question_id)
    .bind(payload.description.as_deref().unwrap_or(""))
    .bind(&payload.input)
    .bind(payload.language.as_deref().unwrap_or(&question_language))
    .bind(payload.hidden.unwrap_or(false))
    .bind(&payload.expected_output_file)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create test case: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Updates a test case. The request carries an explicit intent tag and is
/// resolved by matching on the variant; each variant validates only its
/// own fields.
/// Admin only.
pub async fn update_test_case(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTestCaseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let _exists = sqlx::query("SELECT id FROM test_cases WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Test case not found".to_string()))?;

    match payload {
        UpdateTestCaseRequest::Edit {
            description,
            input,
            language,
            expected_output_file,
        } => {
            if let Some(ref input) = input
                && input.is_empty()
            {
                return Err(AppError::BadRequest(
                    "Test case input must not be empty".to_string(),
                ));
            }

            if description.is_none()
                && input.is_none()
                && language.is_none()
                && expected_output_file.is_none()
            {
                return Ok(StatusCode::OK);
            }

            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE test_cases SET ");
            let mut separated = builder.separated(", ");

            if let Some(description) = description {
                separated.push("description = ");
                separated.push_bind_unseparated(description);
            }

            if let Some(input) = input {
                separated.push("input = ");
                separated.push_bind_unseparated(input);
            }

            if let Some(language) = language {
                separated.push("language = ");
                separated.push_bind_unseparated(language);
            }

            if let Some(expected_output_file) = expected_output_file {
                separated.push("expected_output_file = ");
                separated.push_bind_unseparated(expected_output_file);
            }

            builder.push(" WHERE id = ");
            builder.push_bind(id);

            builder.build().execute(&pool).await.map_err(|e| {
                tracing::error!("Failed to update test case: {:?}", e);
                AppError::InternalServerError(e.to_string())
            })?;
        }
        UpdateTestCaseRequest::SetVisibility { hidden } => {
            sqlx::query("UPDATE test_cases SET hidden = $1 WHERE id = $2")
                .bind(hidden)
                .bind(id)
                .execute(&pool)
                .await?;
        }
        UpdateTestCaseRequest::SetActive { active } => {
            sqlx::query("UPDATE test_cases SET active = $1 WHERE id = $2")
                .bind(active)
                .bind(id)
                .execute(&pool)
                .await?;
        }
    }

    Ok(StatusCode::OK)
}

/// Deletes a test case by ID. Retiring a case without losing it is done
/// through the set_active intent instead.
/// Admin only.
pub async fn delete_test_case(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM test_cases WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Test case not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
