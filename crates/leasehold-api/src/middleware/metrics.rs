//! # Request Metrics
//!
//! In-process counters shared through a request extension. Besides the
//! request and error totals, 409 responses are counted on their own: they
//! are how lost booking races and double requests surface.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use serde::Serialize;

#[derive(Debug, Default)]
struct Counters {
    requests: AtomicU64,
    errors: AtomicU64,
    conflicts: AtomicU64,
}

/// Cloneable handle to the shared counters.
#[derive(Debug, Clone, Default)]
pub struct ApiMetrics(Arc<Counters>);

/// Point-in-time copy of [`ApiMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requests: u64,
    /// Responses with a 4xx or 5xx status.
    pub errors: u64,
    /// Responses with 409, a subset of `errors`.
    pub conflicts: u64,
}

impl ApiMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests served so far.
    pub fn requests(&self) -> u64 {
        self.0.requests.load(Ordering::Relaxed)
    }

    /// Responses with a 4xx or 5xx status so far.
    pub fn errors(&self) -> u64 {
        self.0.errors.load(Ordering::Relaxed)
    }

    /// 409 responses so far.
    pub fn conflicts(&self) -> u64 {
        self.0.conflicts.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests(),
            errors: self.errors(),
            conflicts: self.conflicts(),
        }
    }

    fn record(&self, status: StatusCode) {
        self.0.requests.fetch_add(1, Ordering::Relaxed);
        if status.is_client_error() || status.is_server_error() {
            self.0.errors.fetch_add(1, Ordering::Relaxed);
        }
        if status == StatusCode::CONFLICT {
            self.0.conflicts.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Count every response that passes through.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();
    let response = next.run(request).await;
    if let Some(metrics) = metrics {
        metrics.record(response.status());
    }
    response
}
