// src/seed.rs

use sqlx::PgPool;

use crate::config::Config;
use crate::error::AppError;
use crate::models::user::ROLE_ADMIN;
use crate::utils::hash::hash_password;

/// Explicit seeding options, materialized once at startup. The seed
/// routine never reads the process environment itself.
#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub demo_data: bool,
}

impl SeedOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            admin_username: config.admin_username.clone(),
            admin_password: config.admin_password.clone(),
            demo_data: config.seed_demo_data,
        }
    }
}

/// Seeds the admin account and, when asked, a demo course with one
/// live-code question (one visible and two hidden test cases).
pub async fn run(pool: &PgPool, opts: &SeedOptions) -> Result<(), AppError> {
    if let (Some(username), Some(password)) = (&opts.admin_username, &opts.admin_password) {
        let exists = sqlx::query("SELECT id FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await?;

        if exists.is_none() {
            tracing::info!("Seeding admin user: {}", username);
            let hashed_password = hash_password(password)?;

            sqlx::query("INSERT INTO users (username, password, role) VALUES ($1, $2, $3)")
                .bind(username)
                .bind(&hashed_password)
                .bind(ROLE_ADMIN)
                .execute(pool)
                .await?;
            tracing::info!("Admin user created successfully.");
        }
    }

    if opts.demo_data {
        seed_demo_course(pool).await?;
    }

    Ok(())
}

async fn seed_demo_course(pool: &PgPool) -> Result<(), AppError> {
    let has_courses = sqlx::query("SELECT id FROM courses LIMIT 1")
        .fetch_optional(pool)
        .await?;
    if has_courses.is_some() {
        return Ok(());
    }

    tracing::info!("Seeding demo course");

    let course_id: i64 = sqlx::query_scalar(
        "INSERT INTO courses (name, description) VALUES ($1, $2) RETURNING id",
    )
    .bind("Introduction to Python")
    .bind("Variables, control flow and the basics of data handling.")
    .fetch_one(pool)
    .await?;

    let material_id: i64 = sqlx::query_scalar(
        "INSERT INTO materials (course_id, title, order_number) VALUES ($1, $2, 1) RETURNING id",
    )
    .bind(course_id)
    .bind("Getting started")
    .fetch_one(pool)
    .await?;

    let question_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO questions (material_id, title, description, language, order_number)
        VALUES ($1, $2, $3, 'python', 1)
        RETURNING id
        "#,
    )
    .bind(material_id)
    .bind("Hello, variables")
    .bind("Assign the number 42 to a variable named answer and print it.")
    .fetch_one(pool)
    .await?;

    let cases: [(&str, &str, bool); 3] = [
        ("Prints the answer", "print(answer)", false),
        ("Answer is an integer", "print(type(answer).__name__)", true),
        ("Answer has the right value", "print(answer == 42)", true),
    ];

    for (description, input, hidden) in cases {
        sqlx::query(
            r#"
            INSERT INTO test_cases (question_id, description, input, language, hidden)
            VALUES ($1, $2, $3, 'python', $4)
            "#,
        )
        .bind(question_id)
        .bind(description)
        .bind(input)
        .bind(hidden)
        .execute(pool)
        .await?;
    }

    Ok(())
}
