//! # Route Modules
//!
//! Each module builds an Axum router for one area of the API. Public
//! catalog routes live under `/api`; administrative routes live under
//! `/api/admin` and check the caller's role in the handler.

pub mod amenities;
pub mod bookings;
pub mod flats;
pub mod reports;
pub mod tenants;
pub mod towers;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// All API routes, without middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(towers::router())
        .merge(flats::router())
        .merge(amenities::router())
        .merge(users::router())
        .merge(bookings::router())
        .merge(tenants::router())
        .merge(reports::router())
}
