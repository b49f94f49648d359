use crate::common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use serde_json::{Value, json};
use serial_test::serial;
use tower::ServiceExt;
use uuid::Uuid;

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn register(app: &Router, email: &str) -> Value {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/auth/register",
            json!({
                "email": email,
                "password": "Secret1!",
                "displayName": "Binge Watcher",
                "acceptedTerms": true
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn refresh(app: &Router, token: &str) -> Response {
    app.clone()
        .oneshot(post_json(
            "/api/v1/auth/refresh",
            json!({ "refreshToken": token }),
        ))
        .await
        .unwrap()
}

#[tokio::test]
#[serial]
async fn test_register_returns_user_and_tokens() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;

    let app = showtracker_auth::presentation::router::app(common::create_test_app_state(
        pool.clone(),
    ))
    .unwrap();

    let json = register(&app, "viewer@example.com").await;

    assert_eq!(json["data"]["type"], "users");
    assert!(Uuid::parse_str(json["data"]["id"].as_str().unwrap()).is_ok());
    let attributes = &json["data"]["attributes"];
    assert_eq!(attributes["email"], "viewer@example.com");
    assert_eq!(attributes["displayName"], "Binge Watcher");
    assert!(attributes["accessToken"].is_string());
    assert_eq!(attributes["refreshToken"].as_str().unwrap().len(), 88);
    assert_eq!(attributes["tokenType"], "Bearer");
    assert_eq!(attributes["expiresIn"], 900);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_register_duplicate_is_bad_request() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;

    let app = showtracker_auth::presentation::router::app(common::create_test_app_state(
        pool.clone(),
    ))
    .unwrap();
    register(&app, "viewer@example.com").await;

    let response = app
        .oneshot(post_json(
            "/api/v1/auth/register",
            json!({
                "email": "viewer@example.com",
                "password": "Secret1!",
                "displayName": "Someone Else"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["errors"][0]["code"], "registration_failed");

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_register_invalid_email_is_unprocessable() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;

    let app = showtracker_auth::presentation::router::app(common::create_test_app_state(
        pool.clone(),
    ))
    .unwrap();

    let response = app
        .oneshot(post_json(
            "/api/v1/auth/register",
            json!({
                "email": "not-an-email",
                "password": "Secret1!",
                "displayName": "Binge Watcher"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_login_success_and_failure() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;

    let app = showtracker_auth::presentation::router::app(common::create_test_app_state(
        pool.clone(),
    ))
    .unwrap();
    register(&app, "viewer@example.com").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/auth/login",
            json!({ "email": "viewer@example.com", "password": "Secret1!" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["type"], "auth-tokens");
    assert!(json["data"]["attributes"]["refreshToken"].is_string());

    let response = app
        .oneshot(post_json(
            "/api/v1/auth/login",
            json!({ "email": "viewer@example.com", "password": "Wrong1!!" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["errors"][0]["code"], "invalid_credentials");

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_refresh_rotation_and_reuse_over_http() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;

    let app = showtracker_auth::presentation::router::app(common::create_test_app_state(
        pool.clone(),
    ))
    .unwrap();
    let registered = register(&app, "viewer@example.com").await;
    let first = registered["data"]["attributes"]["refreshToken"]
        .as_str()
        .unwrap()
        .to_string();

    let response = refresh(&app, &first).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let second = json["data"]["attributes"]["refreshToken"]
        .as_str()
        .unwrap()
        .to_string();
    assert_ne!(first, second);

    let response = refresh(&app, &first).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["errors"][0]["code"], "refresh_token_reused");
    assert_eq!(
        json["errors"][0]["detail"],
        showtracker_auth::shared::error::REUSE_DETECTED_DETAIL
    );

    let response = refresh(&app, &second).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["errors"][0]["code"], "invalid_refresh_token");

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_refresh_missing_token_is_unprocessable() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;

    let app = showtracker_auth::presentation::router::app(common::create_test_app_state(
        pool.clone(),
    ))
    .unwrap();

    let response = refresh(&app, "").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_logout_always_no_content() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;

    let app = showtracker_auth::presentation::router::app(common::create_test_app_state(
        pool.clone(),
    ))
    .unwrap();
    let registered = register(&app, "viewer@example.com").await;
    let token = registered["data"]["attributes"]["refreshToken"]
        .as_str()
        .unwrap()
        .to_string();

    for body in [
        json!({ "refreshToken": token }),
        json!({ "refreshToken": token }),
        json!({ "refreshToken": "unknown" }),
    ] {
        let response = app
            .clone()
            .oneshot(post_json("/api/v1/auth/logout", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    for raw in ["", "{}", "{"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/auth/logout")
                    .method("POST")
                    .header("content-type", "application/json")
                    .body(Body::from(raw))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT, "body {:?}", raw);
    }

    let response = refresh(&app, &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["errors"][0]["code"], "invalid_refresh_token");

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_me_requires_valid_access_token() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;

    let app = showtracker_auth::presentation::router::app(common::create_test_app_state(
        pool.clone(),
    ))
    .unwrap();
    let registered = register(&app, "viewer@example.com").await;
    let access_token = registered["data"]["attributes"]["accessToken"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .header("Authorization", format!("Bearer {}", access_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], registered["data"]["id"]);
    assert_eq!(json["data"]["attributes"]["email"], "viewer@example.com");
    assert_eq!(json["data"]["attributes"]["roles"], json!(["user"]));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Well-signed token for a user that does not exist
    let ghost = common::generate_test_token(Uuid::new_v4(), vec!["user".to_string()]);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .header("Authorization", format!("Bearer {}", ghost))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    common::cleanup_test_db(&pool).await;
}
