use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::warn;

pub type KeyedLimiter = Arc<DefaultKeyedRateLimiter<IpAddr>>;

/// Per-client limiter allowing `per_minute` requests each minute
pub fn per_minute_limiter(per_minute: u32) -> KeyedLimiter {
    let quota = NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN);
    Arc::new(RateLimiter::keyed(Quota::per_minute(quota)))
}

/// Reject requests once the client IP exceeds its quota
pub async fn rate_limit_middleware(
    State(limiter): State<KeyedLimiter>,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, StatusCode> {
    let addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or_else(|| IpAddr::from([0, 0, 0, 0]));

    match limiter.check_key(&addr) {
        Ok(()) => Ok(next.run(request).await),
        Err(_) => {
            warn!("🚫 Rate limit exceeded for IP: {}", addr);
            Err(StatusCode::TOO_MANY_REQUESTS)
        }
    }
}
