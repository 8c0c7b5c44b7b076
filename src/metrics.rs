//! Prometheus metrics owned by the application state.
//!
//! Collected metrics (prefix comes from `METRICS_PREFIX`, default `userboard`):
//! - `<prefix>_http_requests_duration_seconds{method,route}`: request latency (histogram)
//! - `<prefix>_http_requests_total{method,route,status}`: finished requests (counter)
//! - `<prefix>_db_query_duration_seconds{query_type}`: storage round trips (histogram)
//!
//! Recording never fails a request; rendering errors only affect `/metrics`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::error;

use crate::state::AppState;

pub struct Metrics {
    registry: Registry,
    http_duration: HistogramVec,
    http_requests: IntCounterVec,
    db_query_duration: HistogramVec,
}

impl Metrics {
    pub fn new(prefix: &str) -> anyhow::Result<Self> {
        let registry = Registry::new();

        let http_duration = HistogramVec::new(
            HistogramOpts::new(
                format!("{prefix}_http_requests_duration_seconds"),
                "HTTP request latency in seconds",
            ),
            &["method", "route"],
        )?;
        let http_requests = IntCounterVec::new(
            Opts::new(
                format!("{prefix}_http_requests_total"),
                "Finished HTTP requests",
            ),
            &["method", "route", "status"],
        )?;
        let db_query_duration = HistogramVec::new(
            HistogramOpts::new(
                format!("{prefix}_db_query_duration_seconds"),
                "Storage round trip latency in seconds",
            ),
            &["query_type"],
        )?;

        registry.register(Box::new(http_duration.clone()))?;
        registry.register(Box::new(http_requests.clone()))?;
        registry.register(Box::new(db_query_duration.clone()))?;

        Ok(Self {
            registry,
            http_duration,
            http_requests,
            db_query_duration,
        })
    }

    pub fn observe_request(&self, method: &str, route: &str, status: u16, elapsed: Duration) {
        self.http_duration
            .with_label_values(&[method, route])
            .observe(elapsed.as_secs_f64());
        self.http_requests
            .with_label_values(&[method, route, &status.to_string()])
            .inc();
    }

    pub fn observe_query(&self, query_type: &str, elapsed: Duration) {
        self.db_query_duration
            .with_label_values(&[query_type])
            .observe(elapsed.as_secs_f64());
    }

    /// Prometheus text exposition of everything in the registry.
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}

/// Route-layer middleware recording latency and status per matched route.
pub async fn track_http(State(metrics): State<Arc<Metrics>>, req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let res = next.run(req).await;
    metrics.observe_request(&method, &route, res.status().as_u16(), started.elapsed());
    res
}

/// GET /metrics
pub async fn metrics_endpoint(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "metrics render failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
