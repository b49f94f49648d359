use crate::infrastructure::state::AppState;
use crate::presentation::handlers::auth;
use crate::presentation::middleware::rate_limit::rate_limit_layer;
use axum::{
    Router,
    routing::{get, post},
};

/// Auth routes, rate limited per client IP
pub fn routes() -> anyhow::Result<Router<AppState>> {
    Ok(Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh_token))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .layer(rate_limit_layer()?))
}
