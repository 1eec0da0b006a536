//! Rate Limiting Middleware
//!
//! Redis-based sliding window rate limiting. Auth routes get a stricter
//! budget than the rest of the API; both budgets come from settings.

use std::net::IpAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::presentation::middleware::auth::AuthUser;
use crate::shared::error::ErrorResponse;
use crate::startup::AppState;

/// Which per-minute budget applies to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Auth,
    Api,
}

impl Scope {
    fn key_prefix(&self) -> &'static str {
        match self {
            Scope::Auth => "rl:auth",
            Scope::Api => "rl:api",
        }
    }

    fn limit(&self, state: &AppState) -> u32 {
        match self {
            Scope::Auth => state.settings.rate_limit.auth_requests_per_minute,
            Scope::Api => state.settings.rate_limit.api_requests_per_minute,
        }
    }
}

const WINDOW_SECONDS: u64 = 60;

/// Rate limit status for response headers.
#[derive(Debug, Serialize)]
struct RateLimitInfo {
    limit: u32,
    remaining: u32,
    reset_at: i64,
    retry_after: u64,
}

#[derive(Debug, Serialize)]
struct RateLimitExceededResponse {
    #[serde(flatten)]
    error: ErrorResponse,
    rate_limit: RateLimitInfo,
}

/// Stricter limiter for signin, signup, and password reset routes.
pub async fn rate_limit_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    rate_limit_inner(state, request, next, Scope::Auth).await
}

/// Limiter for general API routes.
pub async fn rate_limit_api(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    rate_limit_inner(state, request, next, Scope::Api).await
}

async fn rate_limit_inner(state: AppState, request: Request, next: Next, scope: Scope) -> Response {
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip());
    let identifier = extract_identifier(&request, client_ip);
    let limit = scope.limit(&state);

    match check(&state, scope, &identifier, limit).await {
        Ok(info) => {
            let mut response = next.run(request).await;
            add_rate_limit_headers(response.headers_mut(), &info);
            response
        }
        Err(info) => {
            tracing::warn!(
                identifier = %identifier,
                scope = ?scope,
                "Rate limit exceeded"
            );
            create_rate_limit_response(info)
        }
    }
}

/// Sliding window check against Redis. The sorted-set bookkeeping runs
/// as one Lua script so concurrent requests cannot double-spend.
async fn check(
    state: &AppState,
    scope: Scope,
    identifier: &str,
    limit: u32,
) -> Result<RateLimitInfo, RateLimitInfo> {
    let key = format!("{}:{}", scope.key_prefix(), identifier);
    let now_ms = chrono::Utc::now().timestamp_millis();
    let window_ms = (WINDOW_SECONDS * 1000) as i64;
    let window_start = now_ms - window_ms;

    let mut conn = state.redis.clone();

    let script = redis::Script::new(
        r#"
        local key = KEYS[1]
        local now_ms = tonumber(ARGV[1])
        local window_start = tonumber(ARGV[2])
        local max_requests = tonumber(ARGV[3])
        local window_seconds = tonumber(ARGV[4])

        redis.call('ZREMRANGEBYSCORE', key, '-inf', window_start)
        local current_count = redis.call('ZCARD', key)

        if current_count < max_requests then
            local member = now_ms .. ':' .. math.random(1000000)
            redis.call('ZADD', key, now_ms, member)
            redis.call('EXPIRE', key, window_seconds + 1)
            return {1, current_count + 1, max_requests}
        else
            local oldest = redis.call('ZRANGE', key, 0, 0, 'WITHSCORES')
            local retry_after = 0
            if oldest and #oldest >= 2 then
                retry_after = oldest[2] + (window_seconds * 1000) - now_ms
            end
            return {0, current_count, max_requests, retry_after}
        end
        "#,
    );

    let result: Vec<i64> = match script
        .key(&key)
        .arg(now_ms)
        .arg(window_start)
        .arg(limit as i64)
        .arg(WINDOW_SECONDS as i64)
        .invoke_async(&mut conn)
        .await
    {
        Ok(result) => result,
        Err(e) => {
            // A Redis outage must not take the API down with it
            tracing::error!("Rate limiter Redis error: {}", e);
            return Ok(RateLimitInfo {
                limit,
                remaining: 1,
                reset_at: (now_ms / 1000) + WINDOW_SECONDS as i64,
                retry_after: 0,
            });
        }
    };

    let allowed = result[0] == 1;
    let current_count = result[1] as u32;
    let reset_at = (now_ms / 1000) + WINDOW_SECONDS as i64;

    let info = RateLimitInfo {
        limit,
        remaining: limit.saturating_sub(current_count),
        reset_at,
        retry_after: if allowed {
            0
        } else {
            let retry_ms = result.get(3).copied().unwrap_or(0);
            ((retry_ms as f64) / 1000.0).ceil() as u64
        },
    };

    if allowed {
        Ok(info)
    } else {
        Err(info)
    }
}

/// Identify the caller: authenticated user ID when present, client IP
/// otherwise. X-Forwarded-For only means anything behind a trusted proxy.
fn extract_identifier(request: &Request, client_ip: Option<IpAddr>) -> String {
    if let Some(auth_user) = request.extensions().get::<AuthUser>() {
        return format!("user:{}", auth_user.user_id);
    }

    if let Some(forwarded_for) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
    {
        if let Some(first_ip) = forwarded_for.split(',').next() {
            let ip = first_ip.trim();
            if ip.parse::<IpAddr>().is_ok() {
                return format!("ip:{}", ip);
            }
        }
    }

    match client_ip {
        Some(ip) => format!("ip:{}", ip),
        None => {
            tracing::warn!("Could not determine client identifier for rate limiting");
            "ip:unknown".to_string()
        }
    }
}

fn add_rate_limit_headers(headers: &mut header::HeaderMap, info: &RateLimitInfo) {
    if let Ok(v) = header::HeaderValue::from_str(&info.limit.to_string()) {
        headers.insert("X-RateLimit-Limit", v);
    }
    if let Ok(v) = header::HeaderValue::from_str(&info.remaining.to_string()) {
        headers.insert("X-RateLimit-Remaining", v);
    }
    if let Ok(v) = header::HeaderValue::from_str(&info.reset_at.to_string()) {
        headers.insert("X-RateLimit-Reset", v);
    }
}

fn create_rate_limit_response(info: RateLimitInfo) -> Response {
    let retry_after = info.retry_after;
    let body = RateLimitExceededResponse {
        error: ErrorResponse {
            code: 10006,
            message: "You are being rate limited. Please slow down.".to_string(),
            errors: None,
        },
        rate_limit: RateLimitInfo {
            remaining: 0,
            ..info
        },
    };

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();

    if let Ok(v) = header::HeaderValue::from_str(&retry_after.to_string()) {
        response.headers_mut().insert(header::RETRY_AFTER, v);
    }

    response
}
