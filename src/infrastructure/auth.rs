use crate::domain::auth::{AuthService, Claims};
use crate::domain::users::User;
use crate::infrastructure::config::AuthSettings;
use anyhow::Result;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use time::OffsetDateTime;

/// JWT Authentication Service using the HS256 algorithm
pub struct JwtAuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    access_token_expiry: i64,
}

impl JwtAuthService {
    /// Create a new JWT service from a shared secret
    pub fn new(
        secret: &[u8],
        issuer: &str,
        audience: &str,
        access_token_expiry: i64,
    ) -> Result<Self> {
        if secret.is_empty() {
            anyhow::bail!("JWT signing secret must not be empty");
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            access_token_expiry,
        })
    }

    pub fn from_settings(settings: &AuthSettings) -> Result<Self> {
        Self::new(
            settings.jwt_secret.as_bytes(),
            &settings.issuer,
            &settings.audience,
            settings.access_token_expiry,
        )
    }
}

impl AuthService for JwtAuthService {
    fn generate_access_token(&self, user: &User, roles: Vec<String>) -> Result<String> {
        let claims = Claims::new_access_token(
            user,
            roles,
            &self.issuer,
            &self.audience,
            OffsetDateTime::now_utc(),
            self.access_token_expiry,
        )?;
        let header = Header::new(Algorithm::HS256);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to generate access token: {}", e))
    }

    fn validate_access_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| anyhow::anyhow!("Invalid token: {}", e))?;

        Ok(token_data.claims)
    }
}
