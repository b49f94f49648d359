use crate::common;
use crate::setup_test_db_or_skip;
use crate::support::registration;
use showtracker_auth::application::auth::login::LoginRequest;
use showtracker_auth::domain::auth::{AuthService, RefreshTokenRepository};
use showtracker_auth::infrastructure::repositories::refresh_tokens::PostgresRefreshTokenRepository;
use showtracker_auth::shared::error::AppError;
use serial_test::serial;
use time::OffsetDateTime;

fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
#[serial]
async fn test_login_issues_additional_session() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;

    let service = common::create_test_app_state(pool.clone()).session_service();
    let registered = service.register(registration("viewer@example.com")).await.unwrap();

    let pair = service
        .login(login("Viewer@Example.com", "Secret1!"))
        .await
        .unwrap();

    assert_eq!(pair.token_type, "Bearer");
    assert_eq!(pair.expires_in, 900);
    assert_ne!(pair.refresh_token, registered.tokens.refresh_token);

    let claims = common::create_test_auth_service()
        .validate_access_token(&pair.access_token)
        .unwrap();
    assert_eq!(claims.user_id().unwrap(), registered.user.id);
    assert_eq!(claims.iss, "showtracker");
    assert_eq!(claims.aud, "showtracker-clients");

    // Both sessions stay usable
    let tokens = PostgresRefreshTokenRepository::new(pool.clone());
    let active = tokens
        .find_active_by_user_id(registered.user.id, OffsetDateTime::now_utc())
        .await
        .unwrap();
    assert_eq!(active.len(), 2);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_login_wrong_password() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;

    let service = common::create_test_app_state(pool.clone()).session_service();
    service.register(registration("viewer@example.com")).await.unwrap();

    let result = service.login(login("viewer@example.com", "Secret2!")).await;
    assert!(matches!(result, Err(AppError::InvalidCredentials)));

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_login_unknown_user() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;

    let service = common::create_test_app_state(pool.clone()).session_service();

    let result = service.login(login("ghost@example.com", "Secret1!")).await;
    assert!(matches!(result, Err(AppError::InvalidCredentials)));

    common::cleanup_test_db(&pool).await;
}
