//! # Caller Identity & Authorization
//!
//! Bearer token middleware with role-based access control.
//!
//! ## Token Format
//!
//! ```text
//! Bearer {role}:{user_id}:{secret}
//! ```
//!
//! `role` is `user` or `admin`. `user_id` may be empty for an admin acting
//! without a user record. When no secret is configured (development mode)
//! the secret segment is not checked, and a request without an
//! `Authorization` header acts as an anonymous admin.
//!
//! Handlers that need a caller extract [`CallerIdentity`] via
//! `FromRequestParts`.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use subtle::ConstantTimeEq;

use leasehold_core::UserId;
use leasehold_engine::Role;

use crate::error::{AppError, ErrorBody, ErrorDetail};

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// Identity of the authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    /// The caller's role.
    pub role: Role,
    /// The user the caller acts as. `None` for an anonymous admin.
    pub user_id: Option<UserId>,
}

impl CallerIdentity {
    /// The identity used when authentication is disabled.
    pub fn anonymous_admin() -> Self {
        Self {
            role: Role::Admin,
            user_id: None,
        }
    }

    /// Whether the caller has at least the given role.
    pub fn has_role(&self, minimum: Role) -> bool {
        self.role >= minimum
    }

    /// The user the caller acts as, or 401 if the token names none.
    pub fn require_user(&self) -> Result<UserId, AppError> {
        self.user_id
            .ok_or_else(|| AppError::Unauthorized("token does not identify a user".into()))
    }
}

#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .copied()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

/// Check that the caller has at least the required role.
/// Returns 403 Forbidden if the caller's role is insufficient.
pub fn require_role(caller: &CallerIdentity, minimum: Role) -> Result<(), AppError> {
    if caller.has_role(minimum) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "role '{}' required, caller has '{}'",
            minimum.as_str(),
            caller.role.as_str()
        )))
    }
}

// ── Auth Configuration ──────────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value.
#[derive(Clone, Default)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ── Token Validation ────────────────────────────────────────────────────────

/// Constant-time comparison of bearer secrets.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        // Dummy comparison to keep timing constant regardless of length match.
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse a bearer token of the form `{role}:{user_id}:{secret}`.
///
/// With `expected_secret = None` the secret segment may be absent and is
/// not compared.
pub fn parse_bearer_token(
    provided: &str,
    expected_secret: Option<&str>,
) -> Result<CallerIdentity, String> {
    let parts: Vec<&str> = provided.splitn(3, ':').collect();
    let (role_str, user_str, secret) = match (parts.as_slice(), expected_secret) {
        ([role, user, secret], _) => (*role, *user, *secret),
        ([role, user], None) => (*role, *user, ""),
        _ => return Err("invalid token format: expected {role}:{user_id}:{secret}".into()),
    };

    if let Some(expected) = expected_secret {
        if !constant_time_token_eq(secret, expected) {
            return Err("invalid bearer token".into());
        }
    }

    let role = match role_str {
        "admin" => Role::Admin,
        "user" => Role::User,
        other => return Err(format!("unknown role: {other}")),
    };

    let user_id = if user_str.is_empty() {
        None
    } else {
        let id: u64 = user_str
            .parse()
            .map_err(|e| format!("invalid user_id: {e}"))?;
        Some(UserId::new(id))
    };

    if role == Role::User && user_id.is_none() {
        return Err("user tokens must carry a user_id".into());
    }

    Ok(CallerIdentity { role, user_id })
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Resolve the caller from the `Authorization` header and inject a
/// [`CallerIdentity`] into request extensions.
///
/// A malformed or wrong token is rejected here with 401. A request without
/// a header passes through with no identity when a secret is configured,
/// so public routes stay reachable and [`CallerIdentity`] extraction fails
/// with 401 on the rest.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let config = request
        .extensions()
        .get::<AuthConfig>()
        .cloned()
        .unwrap_or_default();

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let identity = match (auth_header, config.token.as_deref()) {
        (Some(value), expected) => match value.strip_prefix("Bearer ") {
            Some(provided) => match parse_bearer_token(provided, expected) {
                Ok(identity) => identity,
                Err(msg) => {
                    tracing::warn!(reason = %msg, "authentication failed: invalid bearer token");
                    return unauthorized_response(&msg);
                }
            },
            None => {
                tracing::warn!("authentication failed: non-Bearer authorization scheme");
                return unauthorized_response("authorization header must use Bearer scheme");
            }
        },
        // Public routes need no identity; the extractor rejects the rest.
        (None, Some(_)) => return next.run(request).await,
        (None, None) => CallerIdentity::anonymous_admin(),
    };

    request.extensions_mut().insert(identity);
    next.run(request).await
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            details: None,
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_app(token: Option<&str>) -> Router {
        let auth_config = AuthConfig {
            token: token.map(str::to_string),
        };
        Router::new()
            .route(
                "/whoami",
                get(|caller: CallerIdentity| async move {
                    format!(
                        "{}:{}",
                        caller.role.as_str(),
                        caller.user_id.map(|u| u.to_string()).unwrap_or_default()
                    )
                }),
            )
            .layer(from_fn(auth_middleware))
            .layer(axum::Extension(auth_config))
    }

    async fn call(app: Router, auth: Option<&str>) -> (StatusCode, String) {
        let mut builder = axum::http::Request::builder().uri("/whoami");
        if let Some(value) = auth {
            builder = builder.header("authorization", value);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn parse_full_token() {
        let id = parse_bearer_token("user:7:s3cret", Some("s3cret")).unwrap();
        assert_eq!(id.role, Role::User);
        assert_eq!(id.user_id, Some(UserId::new(7)));

        let admin = parse_bearer_token("admin::s3cret", Some("s3cret")).unwrap();
        assert_eq!(admin, CallerIdentity::anonymous_admin());
    }

    #[test]
    fn parse_rejects_bad_tokens() {
        assert!(parse_bearer_token("user:7:wrong", Some("s3cret")).is_err());
        assert!(parse_bearer_token("s3cret", Some("s3cret")).is_err());
        assert!(parse_bearer_token("owner:7:s3cret", Some("s3cret")).is_err());
        assert!(parse_bearer_token("user:abc:s3cret", Some("s3cret")).is_err());
        assert!(parse_bearer_token("user::s3cret", Some("s3cret")).is_err());
        // The secret segment is required once a secret is configured.
        assert!(parse_bearer_token("user:7", Some("s3cret")).is_err());
    }

    #[test]
    fn development_mode_ignores_secret() {
        let id = parse_bearer_token("user:3", None).unwrap();
        assert_eq!(id.user_id, Some(UserId::new(3)));
        assert!(parse_bearer_token("user:3:anything", None).is_ok());
    }

    #[test]
    fn role_ordering() {
        let user = CallerIdentity {
            role: Role::User,
            user_id: Some(UserId::new(1)),
        };
        assert!(require_role(&user, Role::User).is_ok());
        assert!(matches!(require_role(&user, Role::Admin), Err(AppError::Forbidden(_))));
        assert!(require_role(&CallerIdentity::anonymous_admin(), Role::User).is_ok());
    }

    #[test]
    fn auth_config_debug_redacts_token() {
        let config = AuthConfig {
            token: Some("super-secret".into()),
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[tokio::test]
    async fn missing_header_is_anonymous_admin_without_secret() {
        let (status, body) = call(test_app(None), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "admin:");
    }

    #[tokio::test]
    async fn missing_header_rejected_with_secret() {
        let (status, body) = call(test_app(Some("s3cret")), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("UNAUTHORIZED"));
    }

    #[tokio::test]
    async fn valid_token_injects_identity() {
        let (status, body) = call(test_app(Some("s3cret")), Some("Bearer user:42:s3cret")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "user:42");
    }

    #[tokio::test]
    async fn non_bearer_scheme_rejected() {
        let (status, _) = call(test_app(None), Some("Basic dXNlcjpwYXNz")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
