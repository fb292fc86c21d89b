// tests/api_tests.rs

use codeasy_backend::{config::Config, routes, state::AppState};
use codeasy_backend::{classifier::ClassifierClient, judge::JudgeClient};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
///
/// External service URLs point at a closed port; the tests in this file
/// never reach the judge or the classifier.
async fn spawn_app() -> String {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        judge_url: "http://127.0.0.1:9".to_string(),
        classifier_url: "http://127.0.0.1:9".to_string(),
        reveal_threshold: 3,
        admin_username: None,
        admin_password: None,
        seed_demo_data: false,
    };

    let judge = JudgeClient::new(config.judge_url.clone()).unwrap();
    let classifier = ClassifierClient::new(config.classifier_url.clone()).unwrap();

    let state = AppState {
        pool,
        config,
        judge,
        classifier,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    address
}

fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_works() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let username = unique_name("u");

    // Act
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": username,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["role"], "student");
}

#[tokio::test]
async fn register_fails_validation() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act: Send a username that is too short
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": "yo",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let username = unique_name("u");

    for expected_status in [201, 409] {
        let response = client
            .post(format!("{}/api/auth/register", address))
            .json(&serde_json::json!({
                "username": username,
                "password": "password123"
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status().as_u16(), expected_status);
    }
}

#[tokio::test]
async fn student_routes_require_auth() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/courses", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn admin_routes_reject_students() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let username = unique_name("u");

    client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": username,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Register failed");

    let login: serde_json::Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "username": username,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Login failed")
        .json()
        .await
        .expect("Failed to parse login json");

    let token = login["token"].as_str().expect("Token not found");

    let response = client
        .get(format!("{}/api/admin/users", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn admin_can_manage_course_content() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to test DB");

    // Seed an admin account directly.
    let admin_name = unique_name("adm");
    let hashed = codeasy_backend::utils::hash::hash_password("password123").unwrap();
    sqlx::query("INSERT INTO users (username, password, role) VALUES ($1, $2, 'admin')")
        .bind(&admin_name)
        .bind(&hashed)
        .execute(&pool)
        .await
        .unwrap();

    let login: serde_json::Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "username": admin_name,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Login failed")
        .json()
        .await
        .unwrap();
    let token = login["token"].as_str().unwrap().to_string();

    // Course -> material -> question -> test case
    let course: serde_json::Value = client
        .post(format!("{}/api/admin/courses", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({"name": unique_name("course")}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let course_id = course["id"].as_i64().unwrap();

    let material: serde_json::Value = client
        .post(format!("{}/api/admin/materials", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({"course_id": course_id, "title": "Basics"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let material_id = material["id"].as_i64().unwrap();

    let question: serde_json::Value = client
        .post(format!("{}/api/admin/questions", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({"material_id": material_id, "title": "Print 42"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let question_id = question["id"].as_i64().unwrap();

    let test_case: serde_json::Value = client
        .post(format!("{}/api/admin/test-cases", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "question_id": question_id,
            "input": "print(answer)",
            "hidden": true
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let test_case_id = test_case["id"].as_i64().unwrap();

    // Intent-tagged update: unhide the case.
    let response = client
        .put(format!("{}/api/admin/test-cases/{}", address, test_case_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({"intent": "set_visibility", "hidden": false}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    // Unknown intents are rejected at deserialization.
    let response = client
        .put(format!("{}/api/admin/test-cases/{}", address, test_case_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({"intent": "promote"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 422);

    // The case is now visible to students.
    let list: Vec<serde_json::Value> = client
        .get(format!(
            "{}/api/admin/test-cases?question_id={}",
            address, question_id
        ))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["hidden"], false);
}
