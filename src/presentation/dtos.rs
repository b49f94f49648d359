use crate::application::auth::register::RegisterResponse;
use crate::application::auth::token_utils::TokenPair;
use crate::domain::auth::Claims;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokenResource {
    pub access_token: String,
    pub refresh_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    #[schema(example = 900)]
    pub expires_in: i64,
}

impl From<TokenPair> for AuthTokenResource {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: pair.token_type,
            expires_in: pair.expires_in,
        }
    }
}

/// A newly registered user together with the first session's tokens
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUserResource {
    pub email: String,
    pub display_name: String,
    #[serde(flatten)]
    pub tokens: AuthTokenResource,
}

impl From<RegisterResponse> for RegisteredUserResource {
    fn from(response: RegisterResponse) -> Self {
        Self {
            email: response.user.email,
            display_name: response.user.display_name,
            tokens: AuthTokenResource::from(response.tokens),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResource {
    pub email: String,
    pub display_name: String,
    pub roles: Vec<String>,
}

impl From<Claims> for MeResource {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.email,
            display_name: claims.display_name,
            roles: claims.roles,
        }
    }
}
