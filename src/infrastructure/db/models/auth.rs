use crate::domain::auth::RefreshToken;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct RefreshTokenDbModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
    pub revoked_at: Option<OffsetDateTime>,
    pub replaced_by_token: Option<String>,
}

impl From<RefreshTokenDbModel> for RefreshToken {
    fn from(model: RefreshTokenDbModel) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            token: model.token,
            created_at: model.created_at,
            expires_at: model.expires_at,
            revoked_at: model.revoked_at,
            replaced_by_token: model.replaced_by_token,
        }
    }
}
