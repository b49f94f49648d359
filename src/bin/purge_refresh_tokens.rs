//! One-shot job deleting refresh tokens past the retention window.
//!
//! Meant to be scheduled (cron, k8s CronJob) next to the API server.

use showtracker_auth::application::auth::purge::PurgeExpiredTokensUseCase;
use showtracker_auth::infrastructure::config::AuthSettings;
use showtracker_auth::infrastructure::db;
use showtracker_auth::infrastructure::repositories::refresh_tokens::PostgresRefreshTokenRepository;

use dotenvy::dotenv;
use std::env;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "showtracker_auth=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    let database_url =
        env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let settings = AuthSettings::from_env()?;

    let pool = db::create_pool(&database_url).await?;
    db::run_migrations(&pool).await?;

    let use_case = PurgeExpiredTokensUseCase::new(
        Arc::new(PostgresRefreshTokenRepository::new(pool)),
        settings.refresh_token_retention_days,
    );

    let deleted = use_case
        .execute(OffsetDateTime::now_utc())
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    tracing::info!("Refresh token purge finished, {} row(s) deleted", deleted);
    Ok(())
}
