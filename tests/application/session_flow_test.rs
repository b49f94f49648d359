use crate::support::{in_memory_session, registration};
use showtracker_auth::application::auth::login::LoginRequest;
use showtracker_auth::application::auth::logout::LogoutRequest;
use showtracker_auth::application::auth::refresh::{RefreshTokenRequest, RotationResult};
use showtracker_auth::domain::auth::{AuthService, RefreshTokenRepository};
use showtracker_auth::domain::users::UserRepository;
use showtracker_auth::shared::error::AppError;
use time::OffsetDateTime;

fn refresh(token: &str) -> RefreshTokenRequest {
    RefreshTokenRequest {
        refresh_token: token.to_string(),
    }
}

#[tokio::test]
async fn test_register_login_rotate_then_replay() {
    let session = in_memory_session();
    let service = &session.service;

    let registered = service
        .register(registration("viewer@example.com"))
        .await
        .unwrap();

    let login = service
        .login(LoginRequest {
            email: "viewer@example.com".to_string(),
            password: "Secret1!".to_string(),
        })
        .await
        .unwrap();
    let refresh1 = login.refresh_token;

    let pair = match service.refresh(refresh(&refresh1)).await.unwrap() {
        RotationResult::Success(pair) => pair,
        other => panic!("Expected Success, got {:?}", other),
    };
    let refresh2 = pair.refresh_token;
    assert_ne!(refresh1, refresh2);

    let first = session.tokens.find_by_token(&refresh1).await.unwrap().unwrap();
    assert!(first.revoked_at.is_some());
    assert_eq!(first.replaced_by_token.as_deref(), Some(refresh2.as_str()));

    let second = session.tokens.find_by_token(&refresh2).await.unwrap().unwrap();
    assert!(second.is_active());

    // Replaying the rotated token is theft; every session goes down
    let replay = service.refresh(refresh(&refresh1)).await.unwrap();
    assert!(matches!(replay, RotationResult::Reused));

    let now = OffsetDateTime::now_utc();
    let active = session
        .tokens
        .find_active_by_user_id(registered.user.id, now)
        .await
        .unwrap();
    assert!(active.is_empty());

    let second = session.tokens.find_by_token(&refresh2).await.unwrap().unwrap();
    assert!(second.revoked_at.is_some());
    assert!(second.replaced_by_token.is_none());

    assert!(matches!(
        service.refresh(refresh(&refresh2)).await.unwrap(),
        RotationResult::Invalid
    ));
}

#[tokio::test]
async fn test_reuse_revokes_sessions_of_other_devices() {
    let session = in_memory_session();
    let service = &session.service;

    let registered = service
        .register(registration("viewer@example.com"))
        .await
        .unwrap();
    let phone = registered.tokens.refresh_token;

    let laptop = service
        .login(LoginRequest {
            email: "viewer@example.com".to_string(),
            password: "Secret1!".to_string(),
        })
        .await
        .unwrap()
        .refresh_token;

    service
        .refresh(refresh(&phone))
        .await
        .unwrap()
        .into_token_pair()
        .unwrap();

    let result = service.refresh(refresh(&phone)).await.unwrap().into_token_pair();
    assert!(matches!(result, Err(AppError::RefreshTokenReused)));

    let laptop_row = session.tokens.find_by_token(&laptop).await.unwrap().unwrap();
    assert!(!laptop_row.is_active());
}

#[tokio::test]
async fn test_reuse_leaves_other_users_alone() {
    let session = in_memory_session();
    let service = &session.service;

    let alice = service.register(registration("alice@example.com")).await.unwrap();
    let bob = service.register(registration("bob@example.com")).await.unwrap();

    let alice_token = alice.tokens.refresh_token;
    service.refresh(refresh(&alice_token)).await.unwrap();
    service.refresh(refresh(&alice_token)).await.unwrap();

    let bob_row = session
        .tokens
        .find_by_token(&bob.tokens.refresh_token)
        .await
        .unwrap()
        .unwrap();
    assert!(bob_row.is_active());
}

#[tokio::test]
async fn test_logout_then_refresh_is_invalid_without_blast_radius() {
    let session = in_memory_session();
    let service = &session.service;

    let registered = service
        .register(registration("viewer@example.com"))
        .await
        .unwrap();
    let other_device = service
        .login(LoginRequest {
            email: "viewer@example.com".to_string(),
            password: "Secret1!".to_string(),
        })
        .await
        .unwrap()
        .refresh_token;

    let token = registered.tokens.refresh_token;
    service
        .logout(LogoutRequest {
            refresh_token: token.clone(),
        })
        .await
        .unwrap();

    let row = session.tokens.find_by_token(&token).await.unwrap().unwrap();
    assert!(row.revoked_at.is_some());
    assert!(row.replaced_by_token.is_none());

    let result = service.refresh(refresh(&token)).await.unwrap().into_token_pair();
    assert!(matches!(result, Err(AppError::InvalidRefreshToken)));

    let other = session.tokens.find_by_token(&other_device).await.unwrap().unwrap();
    assert!(other.is_active());
}

#[tokio::test]
async fn test_access_token_reflects_current_roles() {
    let session = in_memory_session();
    let service = &session.service;

    let registered = service
        .register(registration("viewer@example.com"))
        .await
        .unwrap();

    let auth = crate::common::create_test_auth_service();
    let claims = auth
        .validate_access_token(&registered.tokens.access_token)
        .unwrap();
    assert_eq!(claims.roles, vec!["user".to_string()]);
    assert_eq!(claims.email, "viewer@example.com");
    assert_eq!(claims.display_name, "Binge Watcher");

    session
        .users
        .add_to_role(registered.user.id, "admin")
        .await
        .unwrap();

    let pair = service
        .refresh(refresh(&registered.tokens.refresh_token))
        .await
        .unwrap()
        .into_token_pair()
        .unwrap();

    let claims = auth.validate_access_token(&pair.access_token).unwrap();
    assert!(claims.has_role("admin"));
    assert!(claims.has_role("user"));
}

#[tokio::test]
async fn test_deleted_user_cannot_refresh() {
    let session = in_memory_session();
    let service = &session.service;

    let registered = service
        .register(registration("viewer@example.com"))
        .await
        .unwrap();
    session.users.delete(registered.user.id).unwrap();

    let result = service
        .refresh(refresh(&registered.tokens.refresh_token))
        .await
        .unwrap();
    assert!(matches!(result, RotationResult::Invalid));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_refresh_has_single_winner() {
    let session = in_memory_session();

    let registered = session
        .service
        .register(registration("viewer@example.com"))
        .await
        .unwrap();
    let token = registered.tokens.refresh_token;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = session.service.clone();
            let token = token.clone();
            tokio::spawn(async move { service.refresh(refresh(&token)).await })
        })
        .collect();

    let mut successes = Vec::new();
    let mut reused = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            RotationResult::Success(pair) => successes.push(pair),
            RotationResult::Reused => reused += 1,
            RotationResult::Invalid => panic!("A rotated token must be reported as reused"),
        }
    }

    assert_eq!(successes.len(), 1);
    assert_eq!(reused, 7);

    // The losers saw reuse, so the winner's token went down with the family
    let winner = session
        .tokens
        .find_by_token(&successes[0].refresh_token)
        .await
        .unwrap()
        .unwrap();
    assert!(!winner.is_active());

    let rows = session.tokens.all().unwrap();
    assert_eq!(rows.len(), 2);
}
