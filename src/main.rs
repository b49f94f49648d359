use showtracker_auth::infrastructure;
use showtracker_auth::infrastructure::config::AuthSettings;
use showtracker_auth::infrastructure::state::AppState;
use showtracker_auth::presentation;

use dotenvy::dotenv;
use std::env;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use std::future::Future;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    run_with_signal(port).await
}

async fn run_with_signal(port: u16) -> anyhow::Result<()> {
    run(port, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run<F>(port: u16, shutdown_signal: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    dotenv().ok();

    // Tests call this more than once per process
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG")
                .unwrap_or_else(|_| "showtracker_auth=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    let database_url =
        env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let settings = AuthSettings::from_env()?;

    let (listener, app) = bootstrap(&database_url, settings, port).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await?;

    Ok(())
}

async fn bootstrap(
    database_url: &str,
    settings: AuthSettings,
    port: u16,
) -> anyhow::Result<(tokio::net::TcpListener, axum::Router)> {
    let pool = infrastructure::db::create_pool(database_url).await?;
    infrastructure::db::run_migrations(&pool).await?;

    let state = AppState::from_settings(pool, settings)?;
    let app = presentation::router::app(state)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::debug!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    Ok((listener, app))
}
