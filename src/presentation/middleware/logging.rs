//! Request Logging Middleware
//!
//! Trace layer for structured request/response logging plus the
//! Prometheus request recorder.

use std::time::Instant;

use axum::{extract::MatchedPath, extract::Request, middleware::Next, response::Response};
use tower_http::trace::{DefaultOnResponse, MakeSpan, TraceLayer};
use tracing::{Level, Span};

use crate::infrastructure::metrics;

/// Span factory that labels requests with the matched route template
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpMakeSpan;

impl<B> MakeSpan<B> for HttpMakeSpan {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let path = request
            .extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str)
            .unwrap_or_else(|| request.uri().path());

        tracing::info_span!(
            "http_request",
            method = %request.method(),
            path = %path,
        )
    }
}

/// Create the HTTP trace layer
pub fn create_trace_layer() -> TraceLayer<
    tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>,
    HttpMakeSpan,
> {
    TraceLayer::new_for_http()
        .make_span_with(HttpMakeSpan)
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}

/// Record request count and duration per matched route
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let response = next.run(request).await;

    metrics::record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_layer_uses_route_span_factory() {
        let _layer = create_trace_layer();

        let request = axum::http::Request::builder()
            .method("GET")
            .uri("/healthcheck")
            .body(())
            .unwrap();
        let _span = HttpMakeSpan.make_span(&request);
    }
}
