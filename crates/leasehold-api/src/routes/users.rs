//! # Account Routes
//!
//! Self-service registration and the caller's own profile. A registered user
//! always gets the `user` role.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use leasehold_engine::{NewUser, User};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// Build the account router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/me", get(me))
}

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let req = extract_json(body)?;
    let user = state.engine.register_user(req)?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/auth/me: The profile of the user the token names.
async fn me(
    caller: CallerIdentity,
    State(state): State<AppState>,
) -> Result<Json<User>, AppError> {
    let id = caller.require_user()?;
    Ok(Json(state.engine.user(id)?))
}
