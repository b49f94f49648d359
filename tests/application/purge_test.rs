use crate::common;
use crate::setup_test_db_or_skip;
use crate::support::registration;
use showtracker_auth::application::auth::purge::PurgeExpiredTokensUseCase;
use showtracker_auth::domain::auth::{NewRefreshToken, RefreshTokenRepository};
use showtracker_auth::infrastructure::repositories::refresh_tokens::PostgresRefreshTokenRepository;
use serial_test::serial;
use std::sync::Arc;
use time::{Duration, OffsetDateTime};

#[tokio::test]
#[serial]
async fn test_purge_keeps_rows_inside_retention() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;

    let service = common::create_test_app_state(pool.clone()).session_service();
    let registered = service.register(registration("viewer@example.com")).await.unwrap();

    let repo = Arc::new(PostgresRefreshTokenRepository::new(pool.clone()));
    let now = OffsetDateTime::now_utc();
    for (token, expires_at) in [
        ("ancient", now - Duration::days(45)),
        ("recent", now - Duration::days(3)),
    ] {
        repo.create(NewRefreshToken {
            user_id: registered.user.id,
            token: token.to_string(),
            expires_at,
        })
        .await
        .unwrap();
    }

    let use_case = PurgeExpiredTokensUseCase::new(repo.clone(), 30);
    assert_eq!(use_case.execute(now).await.unwrap(), 1);

    assert!(repo.find_by_token("ancient").await.unwrap().is_none());
    assert!(repo.find_by_token("recent").await.unwrap().is_some());
    assert!(
        repo.find_by_token(&registered.tokens.refresh_token)
            .await
            .unwrap()
            .is_some()
    );

    common::cleanup_test_db(&pool).await;
}
