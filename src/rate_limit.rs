use crate::AppState;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// Global token bucket shared by every `/api` request.
///
/// Not keyed by client address. Tokens refill continuously at
/// `rate_per_sec` up to `burst_size`; each admitted request spends one.
#[derive(Debug)]
pub struct SimpleRateLimiter {
    // (last_update, tokens)
    state: Mutex<(Instant, f32)>,
    rate_per_sec: f32,
    burst_size: f32,
}

impl SimpleRateLimiter {
    pub fn new(rate_per_sec: f32, burst_size: f32) -> Self {
        Self {
            state: Mutex::new((Instant::now(), burst_size)),
            rate_per_sec,
            burst_size,
        }
    }

    pub fn check(&self) -> bool {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let (last_update, tokens) = *guard;
        let now = Instant::now();
        let elapsed = now.duration_since(last_update).as_secs_f32();

        let new_tokens = (tokens + elapsed * self.rate_per_sec).min(self.burst_size);

        if new_tokens >= 1.0 {
            *guard = (now, new_tokens - 1.0);
            true
        } else {
            // Time still advances on a denied request.
            *guard = (now, new_tokens);
            false
        }
    }
}

/// Middleware to enforce rate limits
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if state.config.resilience.rate_limit_enabled && !state.rate_limiter.check() {
        tracing::warn!(
            name: "http.rate_limited",
            path = %req.uri().path(),
            "Request rejected by rate limiter"
        );
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_simple_rate_limiter() {
        let limiter = SimpleRateLimiter::new(2.0, 5.0); // 2 req/s, 5 burst

        for _ in 0..5 {
            assert!(limiter.check());
        }

        // Next should fail (immediate)
        assert!(!limiter.check());

        // 0.6s -> +1.2 tokens
        std::thread::sleep(Duration::from_millis(600));
        assert!(limiter.check());

        assert!(!limiter.check());
    }
}
