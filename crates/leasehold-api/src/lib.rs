//! # leasehold-api: Axum HTTP Transport
//!
//! A thin HTTP layer over [`leasehold_engine::Engine`]. Handlers resolve the
//! caller, parse the request, call one engine operation and map the result;
//! no workflow rule lives here.
//!
//! ## API Surface
//!
//! | Prefix                        | Module                 | Audience |
//! |-------------------------------|------------------------|----------|
//! | `/api/towers`, `/api/flats`, `/api/amenities` | [`routes::towers`], [`routes::flats`], [`routes::amenities`] | public |
//! | `/api/auth/register`          | [`routes::users`]      | public   |
//! | `/api/bookings`               | [`routes::bookings`]   | user     |
//! | `/api/admin/*`                | all route modules      | admin    |
//! | `/health/*`                   | this module            | probes   |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```

pub mod auth;
pub mod bootstrap;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;

use crate::auth::AuthConfig;
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

pub use error::AppError;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the auth middleware
/// so they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    app_with_metrics(state, ApiMetrics::new())
}

/// [`app`] with caller-supplied counters.
pub fn app_with_metrics(state: AppState, metrics: ApiMetrics) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };

    let api = routes::router()
        .layer(from_fn(auth::auth_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .layer(axum::Extension(auth_config))
        .layer(axum::Extension(metrics))
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe: 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 once the engine is bootstrapped.
async fn readiness() -> &'static str {
    "ready"
}
