use crate::application::auth::login::LoginRequest;
use crate::application::auth::logout::LogoutRequest;
use crate::application::auth::refresh::RefreshTokenRequest;
use crate::application::auth::register::RegisterRequest;
use crate::infrastructure::state::AppState;
use crate::presentation::dtos::{AuthTokenResource, MeResource, RegisteredUserResource};
use crate::presentation::extractors::AuthUser;
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::response::{JsonApiResource, JsonApiResponse};
use crate::shared::validation::ValidatedJson;
use axum::{Json, body::Bytes, extract::State, http::StatusCode, response::IntoResponse};

/// Register a new account and open its first session
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = JsonApiResponse<JsonApiResource<RegisteredUserResource>>),
        (status = 400, description = "Registration failed", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = state.session_service().register(req).await?;

    let id = response.user.id.to_string();
    let resource = JsonApiResource::new("users", id, RegisteredUserResource::from(response));

    Ok((StatusCode::CREATED, Json(JsonApiResponse::new(resource))))
}

/// Login handler
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = JsonApiResponse<JsonApiResource<AuthTokenResource>>),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let pair = state.session_service().login(req).await?;
    let resource = JsonApiResource::new("auth-tokens", "session", AuthTokenResource::from(pair));

    Ok((StatusCode::OK, Json(JsonApiResponse::new(resource))))
}

/// Exchange a refresh token for a new pair.
///
/// Presenting a token that was already rotated revokes every session of its
/// owner and answers with `refresh_token_reused`.
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Token refreshed successfully", body = JsonApiResponse<JsonApiResource<AuthTokenResource>>),
        (status = 401, description = "Invalid or reused refresh token", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let pair = state
        .session_service()
        .refresh(req)
        .await?
        .into_token_pair()?;
    let resource = JsonApiResource::new("auth-tokens", "session", AuthTokenResource::from(pair));

    Ok((StatusCode::OK, Json(JsonApiResponse::new(resource))))
}

/// Logout handler; unknown tokens are accepted.
///
/// The body is read leniently: a missing, empty or malformed body revokes
/// nothing and still answers 204.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    request_body = LogoutRequest,
    responses(
        (status = 204, description = "Refresh token revoked")
    ),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let req = serde_json::from_slice::<LogoutRequest>(&body).unwrap_or_default();
    state.session_service().logout(req).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Profile of the caller behind the access token
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = JsonApiResponse<JsonApiResource<MeResource>>),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let user_id = auth_user
        .claims
        .user_id()
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    // Tokens outlive deleted accounts; only answer for users that still exist
    state.session_service().current_user(user_id).await?;

    let resource = JsonApiResource::new(
        "users",
        user_id.to_string(),
        MeResource::from(auth_user.claims),
    );

    Ok((StatusCode::OK, Json(JsonApiResponse::new(resource))))
}
