use crate::application::auth::login::LoginRequest;
use crate::application::auth::logout::LogoutRequest;
use crate::application::auth::refresh::RefreshTokenRequest;
use crate::application::auth::register::RegisterRequest;
use crate::presentation::dtos::{AuthTokenResource, MeResource, RegisteredUserResource};
use crate::shared::error::{ErrorResponse, JsonApiError};
use crate::shared::response::{JsonApiResource, JsonApiResponse};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ShowTracker Auth API",
        version = "0.1.0",
        description = "Account registration and session management for ShowTracker.\n\nRefresh tokens are single use. Presenting one twice revokes every session of its owner.",
    ),
    paths(
        crate::presentation::handlers::auth::register,
        crate::presentation::handlers::auth::login,
        crate::presentation::handlers::auth::refresh_token,
        crate::presentation::handlers::auth::logout,
        crate::presentation::handlers::auth::me,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            RefreshTokenRequest,
            LogoutRequest,

            AuthTokenResource,
            RegisteredUserResource,
            MeResource,
            JsonApiResource<AuthTokenResource>,
            JsonApiResource<RegisteredUserResource>,
            JsonApiResource<MeResource>,
            JsonApiResponse<JsonApiResource<AuthTokenResource>>,
            JsonApiResponse<JsonApiResource<RegisteredUserResource>>,
            JsonApiResponse<JsonApiResource<MeResource>>,

            ErrorResponse,
            JsonApiError,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and refresh token rotation")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
