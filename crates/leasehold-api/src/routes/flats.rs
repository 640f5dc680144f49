//! # Flat Routes
//!
//! Public flat search hides leased flats; the admin listing shows every
//! flat. Availability is never writable through these routes.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use leasehold_core::FlatId;
use leasehold_engine::{Flat, FlatFilter, FlatUpdate, NewFlat, Role};

use crate::auth::{require_role, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_query};
use crate::state::AppState;

/// Build the flat router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/flats", get(search_flats))
        .route("/api/flats/:id", get(get_flat))
        .route("/api/admin/flats", get(admin_list_flats).post(create_flat))
        .route(
            "/api/admin/flats/:id",
            get(admin_get_flat).put(update_flat).delete(delete_flat),
        )
}

/// GET /api/flats: Available flats matching `tower_id`, `bedrooms`,
/// `min_rent`, `max_rent`.
async fn search_flats(
    State(state): State<AppState>,
    query: Result<Query<FlatFilter>, QueryRejection>,
) -> Result<Json<Vec<Flat>>, AppError> {
    let filter = FlatFilter {
        include_unavailable: false,
        ..extract_query(query)?
    };
    Ok(Json(state.engine.flats(&filter)))
}

/// GET /api/flats/:id
async fn get_flat(
    State(state): State<AppState>,
    Path(id): Path<FlatId>,
) -> Result<Json<Flat>, AppError> {
    Ok(Json(state.engine.flat(id)?))
}

/// GET /api/admin/flats: Every flat matching the filter, leased or not.
async fn admin_list_flats(
    caller: CallerIdentity,
    State(state): State<AppState>,
    query: Result<Query<FlatFilter>, QueryRejection>,
) -> Result<Json<Vec<Flat>>, AppError> {
    require_role(&caller, Role::Admin)?;
    let filter = FlatFilter {
        include_unavailable: true,
        ..extract_query(query)?
    };
    Ok(Json(state.engine.flats(&filter)))
}

/// GET /api/admin/flats/:id
async fn admin_get_flat(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<FlatId>,
) -> Result<Json<Flat>, AppError> {
    require_role(&caller, Role::Admin)?;
    Ok(Json(state.engine.flat(id)?))
}

/// POST /api/admin/flats: Add a flat to a tower.
async fn create_flat(
    caller: CallerIdentity,
    State(state): State<AppState>,
    body: Result<Json<NewFlat>, JsonRejection>,
) -> Result<(StatusCode, Json<Flat>), AppError> {
    require_role(&caller, Role::Admin)?;
    let req = extract_json(body)?;
    let flat = state.engine.create_flat(req)?;
    Ok((StatusCode::CREATED, Json(flat)))
}

/// PUT /api/admin/flats/:id: Partial update.
async fn update_flat(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<FlatId>,
    body: Result<Json<FlatUpdate>, JsonRejection>,
) -> Result<Json<Flat>, AppError> {
    require_role(&caller, Role::Admin)?;
    let req = extract_json(body)?;
    Ok(Json(state.engine.update_flat(id, req)?))
}

/// DELETE /api/admin/flats/:id: Only flats never booked or leased.
async fn delete_flat(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<FlatId>,
) -> Result<StatusCode, AppError> {
    require_role(&caller, Role::Admin)?;
    state.engine.delete_flat(id)?;
    Ok(StatusCode::NO_CONTENT)
}
