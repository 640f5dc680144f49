//! # Tenant & Lease Routes
//!
//! Admin views of current tenants, a tenant's full history, single leases,
//! and lease termination. `DELETE /api/admin/leases/:id` ends a lease today;
//! `PUT /api/admin/leases/:id/terminate` accepts an explicit end date.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;

use leasehold_core::{LeaseId, UserId};
use leasehold_engine::{Role, TenantDetails, TenantSummary};
use leasehold_state::Lease;

use crate::auth::{require_role, CallerIdentity};
use crate::error::AppError;
use crate::state::AppState;

/// Optional termination body. An empty body ends the lease today.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TerminateLeaseRequest {
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl TerminateLeaseRequest {
    fn from_body(body: &[u8]) -> Result<Self, AppError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| AppError::BadRequest(e.to_string()))
    }
}

/// Build the tenant router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/tenants", get(list_tenants))
        .route("/api/admin/tenants/:id", get(get_tenant))
        .route("/api/admin/leases/:id", get(get_lease).delete(end_lease_today))
        .route("/api/admin/leases/:id/terminate", put(terminate_lease))
}

/// GET /api/admin/tenants: Users holding an active lease.
async fn list_tenants(
    caller: CallerIdentity,
    State(state): State<AppState>,
) -> Result<Json<Vec<TenantSummary>>, AppError> {
    require_role(&caller, Role::Admin)?;
    Ok(Json(state.engine.tenants()))
}

/// GET /api/admin/tenants/:id: Profile, leases and payment history.
async fn get_tenant(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<TenantDetails>, AppError> {
    require_role(&caller, Role::Admin)?;
    Ok(Json(state.engine.tenant_details(id)?))
}

/// GET /api/admin/leases/:id
async fn get_lease(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<LeaseId>,
) -> Result<Json<Lease>, AppError> {
    require_role(&caller, Role::Admin)?;
    Ok(Json(state.engine.lease(id)?))
}

/// DELETE /api/admin/leases/:id: End the lease today and release the flat.
async fn end_lease_today(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<LeaseId>,
) -> Result<Json<Lease>, AppError> {
    require_role(&caller, Role::Admin)?;
    Ok(Json(state.engine.terminate_lease(id, None)?))
}

/// PUT /api/admin/leases/:id/terminate: End the lease and release the flat.
async fn terminate_lease(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<LeaseId>,
    body: Bytes,
) -> Result<Json<Lease>, AppError> {
    require_role(&caller, Role::Admin)?;
    let req = TerminateLeaseRequest::from_body(&body)?;
    Ok(Json(state.engine.terminate_lease(id, req.end_date)?))
}
