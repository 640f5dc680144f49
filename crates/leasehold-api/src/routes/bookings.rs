//! # Booking Routes
//!
//! Tenants request bookings on available flats and see only their own.
//! Administrators list every booking and decide pending ones; approval
//! opens the lease in the same step.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;

use leasehold_core::{BookingId, FlatId};
use leasehold_engine::{Approval, BookingView, Role};
use leasehold_state::{Booking, BookingStatus};

use crate::auth::{require_role, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{extract_query, extract_validated_json, Validate};
use crate::state::AppState;

/// Booking request body.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub flat_id: FlatId,
    /// Desired move-in date, `YYYY-MM-DD`.
    pub requested_date: NaiveDate,
}

impl Validate for CreateBookingRequest {
    fn validate(&self) -> Result<(), String> {
        if self.flat_id.get() == 0 {
            return Err("flat_id must be a positive identifier".to_string());
        }
        Ok(())
    }
}

/// `?status=` filter for the admin listing.
#[derive(Debug, Default, Deserialize)]
pub struct BookingQuery {
    #[serde(default)]
    pub status: Option<BookingStatus>,
}

/// Build the booking router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", get(my_bookings).post(request_booking))
        .route("/api/bookings/:id", get(my_booking))
        .route("/api/admin/bookings", get(admin_list_bookings))
        .route("/api/admin/bookings/:id", get(admin_get_booking))
        .route("/api/admin/bookings/:id/approve", put(approve_booking))
        .route("/api/admin/bookings/:id/decline", put(decline_booking))
}

/// POST /api/bookings: Request a flat.
async fn request_booking(
    caller: CallerIdentity,
    State(state): State<AppState>,
    body: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let user_id = caller.require_user()?;
    let req = extract_validated_json(body)?;
    let booking = state
        .engine
        .request_booking(user_id, req.flat_id, req.requested_date)?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /api/bookings: The caller's bookings, newest first.
async fn my_bookings(
    caller: CallerIdentity,
    State(state): State<AppState>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let user_id = caller.require_user()?;
    Ok(Json(state.engine.bookings_for_user(user_id)?))
}

/// GET /api/bookings/:id: One of the caller's bookings.
async fn my_booking(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<BookingId>,
) -> Result<Json<Booking>, AppError> {
    let user_id = caller.require_user()?;
    Ok(Json(state.engine.booking_for_user(user_id, id)?))
}

/// GET /api/admin/bookings: Every booking with flat, requester and lease.
async fn admin_list_bookings(
    caller: CallerIdentity,
    State(state): State<AppState>,
    query: Result<Query<BookingQuery>, QueryRejection>,
) -> Result<Json<Vec<BookingView>>, AppError> {
    require_role(&caller, Role::Admin)?;
    let query = extract_query(query)?;
    Ok(Json(state.engine.booking_views(query.status)))
}

/// GET /api/admin/bookings/:id
async fn admin_get_booking(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<BookingId>,
) -> Result<Json<BookingView>, AppError> {
    require_role(&caller, Role::Admin)?;
    Ok(Json(state.engine.booking_view(id)?))
}

/// PUT /api/admin/bookings/:id/approve: Approve and open the lease.
async fn approve_booking(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<BookingId>,
) -> Result<Json<Approval>, AppError> {
    require_role(&caller, Role::Admin)?;
    Ok(Json(state.engine.approve_booking(id, caller.user_id)?))
}

/// PUT /api/admin/bookings/:id/decline
async fn decline_booking(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<BookingId>,
) -> Result<Json<Booking>, AppError> {
    require_role(&caller, Role::Admin)?;
    Ok(Json(state.engine.decline_booking(id, caller.user_id)?))
}
