use axum::{body::Body, extract::ConnectInfo};
use governor::{clock::QuantaInstant, middleware::NoOpMiddleware};
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder, key_extractor::KeyExtractor};

pub const DEFAULT_REQUESTS_PER_MINUTE: u64 = 60;

pub type AuthRateLimitLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, Body>;

/// Buckets requests by the peer address of the connection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientIpKeyExtractor;

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<B>(
        &self,
        req: &axum::http::Request<B>,
    ) -> Result<Self::Key, tower_governor::errors::GovernorError> {
        // Routers driven through `oneshot` carry no connection info
        Ok(req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)))
    }
}

/// Limit from `RATE_LIMIT_PER_MINUTE`, falling back to the default for
/// missing, unparsable or zero values
pub fn requests_per_minute_from_env() -> u64 {
    env::var("RATE_LIMIT_PER_MINUTE")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_REQUESTS_PER_MINUTE)
}

pub fn rate_limit_layer() -> anyhow::Result<AuthRateLimitLayer> {
    custom_rate_limit_layer(requests_per_minute_from_env())
}

pub fn custom_rate_limit_layer(requests_per_minute: u64) -> anyhow::Result<AuthRateLimitLayer> {
    if requests_per_minute == 0 {
        anyhow::bail!("Rate limit must allow at least one request per minute");
    }

    let quota_duration_ms = (60_000 / requests_per_minute).max(1);
    let burst_size = u32::try_from(requests_per_minute).unwrap_or(u32::MAX);

    let config = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(quota_duration_ms)
            .burst_size(burst_size)
            .key_extractor(ClientIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Failed to finish governor config"))?,
    );

    Ok(GovernorLayer::new(config))
}
