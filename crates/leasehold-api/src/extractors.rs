//! # Request Extractors
//!
//! Handlers take axum's extractor `Result` and pass it through one of these
//! helpers, so a malformed body or query is always a 400 with the same
//! error envelope, and a well-formed but invalid body is always a 422.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::Json;

use crate::error::AppError;

/// Request bodies with rules serde cannot express.
pub trait Validate {
    /// The first broken rule, as a message for the client.
    fn validate(&self) -> Result<(), String>;
}

/// The JSON body, or 400.
///
/// ```ignore
/// async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., AppError> {
///     let req = extract_json(body)?;
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match result {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
    }
}

/// The JSON body after [`Validate::validate`], or 400 / 422.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let body = extract_json(result)?;
    match body.validate() {
        Ok(()) => Ok(body),
        Err(message) => Err(AppError::Validation(message)),
    }
}

/// The parsed query string, or 400.
pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    match result {
        Ok(Query(query)) => Ok(query),
        Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
    }
}
