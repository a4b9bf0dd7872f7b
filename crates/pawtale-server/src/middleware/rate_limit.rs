//! Per-client request budgets
//!
//! Each limiter hands a client `max` requests as a burst and refills one
//! slot per `window` (GCRA), so no window ever admits more than `max`.
//! Clients are keyed by peer IP.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

use crate::error::ApiError;

pub struct RateLimit {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
    clock: DefaultClock,
    error: &'static str,
    window_hint: Option<String>,
}

impl RateLimit {
    /// Budget of `max` requests per `window`, answered with `error` when spent
    pub fn new(window: Duration, max: u32, error: &'static str) -> anyhow::Result<Self> {
        let burst = NonZeroU32::new(max).context("rate limit budget must be at least 1")?;
        let quota = Quota::with_period(window)
            .context("rate limit window must be positive")?
            .allow_burst(burst);

        Ok(Self {
            limiter: RateLimiter::keyed(quota),
            clock: DefaultClock::default(),
            error,
            window_hint: None,
        })
    }

    /// Advertise the window as `retryAfter: "<n> minutes"` in the body
    pub fn with_window_hint(mut self, window: Duration) -> Self {
        let minutes = (window.as_secs() / 60).max(1);
        self.window_hint = Some(format!("{} minutes", minutes));
        self
    }

    /// Spend one request for `client`
    pub fn check(&self, client: IpAddr) -> Result<(), ApiError> {
        self.limiter.check_key(&client).map_err(|not_until| {
            let retry_after = not_until.wait_time_from(self.clock.now());
            ApiError::RateLimited {
                error: self.error,
                retry_after,
                window_hint: self.window_hint.clone(),
            }
        })
    }

    /// Drop state for clients whose budget has fully recovered
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }
}

/// Peer address from `ConnectInfo`; unknown peers share one bucket
fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

pub async fn enforce_rate_limit(
    State(limit): State<Arc<RateLimit>>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_ip(&request);
    match limit.check(client) {
        Ok(()) => next.run(request).await,
        Err(err) => {
            tracing::warn!(%client, path = %request.uri().path(), "Rate limit exceeded");
            err.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
    const BOB: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

    #[test]
    fn test_budget_is_per_client() {
        let limit = RateLimit::new(Duration::from_secs(900), 2, "Too many requests").unwrap();
        assert!(limit.check(ALICE).is_ok());
        assert!(limit.check(ALICE).is_ok());
        assert!(limit.check(ALICE).is_err());
        assert!(limit.check(BOB).is_ok());
    }

    #[test]
    fn test_window_admits_at_most_budget() {
        let limit = RateLimit::new(Duration::from_secs(60), 10, "Too many requests").unwrap();
        let allowed = (0..50).filter(|_| limit.check(ALICE).is_ok()).count();
        assert_eq!(allowed, 10);
    }

    #[test]
    fn test_budget_refills_after_window() {
        let limit = RateLimit::new(Duration::from_millis(200), 3, "Too many requests").unwrap();
        for _ in 0..3 {
            limit.check(ALICE).unwrap();
        }
        assert!(limit.check(ALICE).is_err());

        std::thread::sleep(Duration::from_millis(250));
        assert!(limit.check(ALICE).is_ok());
    }

    #[test]
    fn test_rejection_carries_retry_after() {
        let limit = RateLimit::new(Duration::from_secs(900), 1, "Too many AI requests")
            .unwrap()
            .with_window_hint(Duration::from_secs(900));
        limit.check(ALICE).unwrap();

        match limit.check(ALICE) {
            Err(ApiError::RateLimited {
                error,
                retry_after,
                window_hint,
            }) => {
                assert_eq!(error, "Too many AI requests");
                assert!(retry_after > Duration::from_secs(800));
                assert!(retry_after <= Duration::from_secs(900));
                assert_eq!(window_hint.as_deref(), Some("15 minutes"));
            }
            other => panic!("expected rate limit error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_budget_is_rejected() {
        assert!(RateLimit::new(Duration::from_secs(60), 0, "Too many requests").is_err());
    }
}
