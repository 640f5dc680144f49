//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! All domain data lives in the [`Engine`]; handlers never hold a lock
//! across an `.await` because every engine call is synchronous.

use std::path::PathBuf;

use leasehold_core::MAX_TRAILING_MONTHS;
use leasehold_engine::Engine;

/// Trailing months in the payment report unless configured otherwise.
pub const DEFAULT_PAYMENT_REPORT_MONTHS: usize = 6;

/// Application configuration.
///
/// Custom `Debug` redacts the auth token to prevent credential leakage in logs.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Shared bearer secret. If `None`, authentication is disabled.
    pub auth_token: Option<String>,
    /// YAML seed loaded at startup.
    pub seed_file: Option<PathBuf>,
    /// Trailing months covered by the payment report.
    pub payment_report_months: usize,
}

impl AppConfig {
    /// Build from `PORT`, `AUTH_TOKEN`, `SEED_FILE` and
    /// `PAYMENT_REPORT_MONTHS`, falling back to defaults for unset or
    /// unparsable values.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            port: non_empty("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
            auth_token: non_empty("AUTH_TOKEN"),
            seed_file: non_empty("SEED_FILE").map(PathBuf::from),
            payment_report_months: non_empty("PAYMENT_REPORT_MONTHS")
                .and_then(|m| m.trim().parse().ok())
                .filter(|m: &usize| (1..=MAX_TRAILING_MONTHS).contains(m))
                .unwrap_or(defaults.payment_report_months),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("seed_file", &self.seed_file)
            .field("payment_report_months", &self.payment_report_months)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            seed_file: None,
            payment_report_months: DEFAULT_PAYMENT_REPORT_MONTHS,
        }
    }
}

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The workflow engine.
    pub engine: Engine,
    /// Application configuration.
    pub config: AppConfig,
}

impl AppState {
    /// State over an empty engine with default configuration.
    pub fn new() -> Self {
        Self::with_engine(Engine::new(), AppConfig::default())
    }

    /// State over an existing engine.
    pub fn with_engine(engine: Engine, config: AppConfig) -> Self {
        Self { engine, config }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
