//! # Amenity Routes
//!
//! Public amenity browsing with an optional `type` filter, and admin
//! amenity management.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use leasehold_core::AmenityId;
use leasehold_engine::{Amenity, AmenityType, AmenityUpdate, NewAmenity, Role};

use crate::auth::{require_role, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_query};
use crate::state::AppState;

/// `?type=` filter. Parsed by hand so an unknown type is a 422, not a 400.
#[derive(Debug, Default, Deserialize)]
pub struct AmenityQuery {
    #[serde(default, rename = "type")]
    pub amenity_type: Option<String>,
}

impl AmenityQuery {
    fn parse(&self) -> Result<Option<AmenityType>, AppError> {
        match self.amenity_type.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(t) => Ok(Some(t.parse()?)),
        }
    }
}

/// Build the amenity router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/amenities", get(list_amenities))
        .route("/api/amenities/:id", get(get_amenity))
        .route(
            "/api/admin/amenities",
            get(admin_list_amenities).post(create_amenity),
        )
        .route(
            "/api/admin/amenities/:id",
            get(admin_get_amenity)
                .put(update_amenity)
                .delete(delete_amenity),
        )
}

/// GET /api/amenities
async fn list_amenities(
    State(state): State<AppState>,
    query: Result<Query<AmenityQuery>, QueryRejection>,
) -> Result<Json<Vec<Amenity>>, AppError> {
    let filter = extract_query(query)?.parse()?;
    Ok(Json(state.engine.amenities(filter)))
}

/// GET /api/amenities/:id
async fn get_amenity(
    State(state): State<AppState>,
    Path(id): Path<AmenityId>,
) -> Result<Json<Amenity>, AppError> {
    Ok(Json(state.engine.amenity(id)?))
}

/// GET /api/admin/amenities
async fn admin_list_amenities(
    caller: CallerIdentity,
    State(state): State<AppState>,
    query: Result<Query<AmenityQuery>, QueryRejection>,
) -> Result<Json<Vec<Amenity>>, AppError> {
    require_role(&caller, Role::Admin)?;
    let filter = extract_query(query)?.parse()?;
    Ok(Json(state.engine.amenities(filter)))
}

/// GET /api/admin/amenities/:id
async fn admin_get_amenity(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<AmenityId>,
) -> Result<Json<Amenity>, AppError> {
    require_role(&caller, Role::Admin)?;
    Ok(Json(state.engine.amenity(id)?))
}

/// POST /api/admin/amenities
async fn create_amenity(
    caller: CallerIdentity,
    State(state): State<AppState>,
    body: Result<Json<NewAmenity>, JsonRejection>,
) -> Result<(StatusCode, Json<Amenity>), AppError> {
    require_role(&caller, Role::Admin)?;
    let req = extract_json(body)?;
    let amenity = state.engine.create_amenity(req)?;
    Ok((StatusCode::CREATED, Json(amenity)))
}

/// PUT /api/admin/amenities/:id
async fn update_amenity(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<AmenityId>,
    body: Result<Json<AmenityUpdate>, JsonRejection>,
) -> Result<Json<Amenity>, AppError> {
    require_role(&caller, Role::Admin)?;
    let req = extract_json(body)?;
    Ok(Json(state.engine.update_amenity(id, req)?))
}

/// DELETE /api/admin/amenities/:id: Also detaches it from every tower.
async fn delete_amenity(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<AmenityId>,
) -> Result<StatusCode, AppError> {
    require_role(&caller, Role::Admin)?;
    state.engine.delete_amenity(id)?;
    Ok(StatusCode::NO_CONTENT)
}
