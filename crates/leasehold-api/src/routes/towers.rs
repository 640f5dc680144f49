//! # Tower Routes
//!
//! Public tower browsing and admin tower management.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use leasehold_core::TowerId;
use leasehold_engine::{NewTower, Role, Tower, TowerDetails, TowerUpdate};

use crate::auth::{require_role, CallerIdentity};
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// Build the tower router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/towers", get(list_towers))
        .route("/api/towers/:id", get(get_tower))
        .route("/api/admin/towers", get(admin_list_towers).post(create_tower))
        .route(
            "/api/admin/towers/:id",
            get(admin_get_tower).put(update_tower).delete(delete_tower),
        )
}

/// GET /api/towers: All towers with amenities and flat counts.
async fn list_towers(State(state): State<AppState>) -> Json<Vec<TowerDetails>> {
    Json(state.engine.towers())
}

/// GET /api/towers/:id: One tower with amenities and flat counts.
async fn get_tower(
    State(state): State<AppState>,
    Path(id): Path<TowerId>,
) -> Result<Json<TowerDetails>, AppError> {
    Ok(Json(state.engine.tower_details(id)?))
}

/// GET /api/admin/towers
async fn admin_list_towers(
    caller: CallerIdentity,
    State(state): State<AppState>,
) -> Result<Json<Vec<TowerDetails>>, AppError> {
    require_role(&caller, Role::Admin)?;
    Ok(Json(state.engine.towers()))
}

/// GET /api/admin/towers/:id
async fn admin_get_tower(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<TowerId>,
) -> Result<Json<TowerDetails>, AppError> {
    require_role(&caller, Role::Admin)?;
    Ok(Json(state.engine.tower_details(id)?))
}

/// POST /api/admin/towers: Create a tower.
async fn create_tower(
    caller: CallerIdentity,
    State(state): State<AppState>,
    body: Result<Json<NewTower>, JsonRejection>,
) -> Result<(StatusCode, Json<Tower>), AppError> {
    require_role(&caller, Role::Admin)?;
    let req = extract_json(body)?;
    let tower = state.engine.create_tower(req)?;
    Ok((StatusCode::CREATED, Json(tower)))
}

/// PUT /api/admin/towers/:id: Partial update.
async fn update_tower(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<TowerId>,
    body: Result<Json<TowerUpdate>, JsonRejection>,
) -> Result<Json<Tower>, AppError> {
    require_role(&caller, Role::Admin)?;
    let req = extract_json(body)?;
    Ok(Json(state.engine.update_tower(id, req)?))
}

/// DELETE /api/admin/towers/:id: Only towers without flats.
async fn delete_tower(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<TowerId>,
) -> Result<StatusCode, AppError> {
    require_role(&caller, Role::Admin)?;
    state.engine.delete_tower(id)?;
    Ok(StatusCode::NO_CONTENT)
}
