//! # Startup Bootstrap
//!
//! Builds the engine the server runs on.
//!
//! ## Sequence
//!
//! 1. **Create the engine** over an in-memory payment ledger.
//! 2. **Apply the seed**, if `SEED_FILE` is configured. Seeded bookings go
//!    through the normal request/approve/decline paths.
//! 3. **Log a startup summary** of what was loaded.
//!
//! Without a seed file the server starts with an empty catalog.

use std::path::PathBuf;
use std::sync::Arc;

use leasehold_engine::{Engine, InMemoryLedger, Seed, SeedError, SeedSummary};

use crate::state::{AppConfig, AppState};

/// Errors during startup.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The seed file could not be read, parsed or applied.
    #[error("seed {path} failed: {source}")]
    Seed {
        /// The configured seed path.
        path: PathBuf,
        /// What went wrong.
        #[source]
        source: SeedError,
    },
}

/// Build application state from configuration.
pub fn bootstrap(config: AppConfig) -> Result<AppState, BootstrapError> {
    let ledger = Arc::new(InMemoryLedger::new());
    let engine = Engine::new().with_ledger(ledger.clone());

    let summary = match &config.seed_file {
        Some(path) => {
            let seed_err = |source| BootstrapError::Seed {
                path: path.clone(),
                source,
            };
            let seed = Seed::load(path).map_err(seed_err)?;
            let summary = seed.apply(&engine, &ledger).map_err(seed_err)?;
            Some(summary)
        }
        None => None,
    };

    log_startup(&config, summary.as_ref());
    Ok(AppState::with_engine(engine, config))
}

fn log_startup(config: &AppConfig, summary: Option<&SeedSummary>) {
    match summary {
        Some(s) => tracing::info!(
            seed = ?config.seed_file,
            users = s.users,
            amenities = s.amenities,
            towers = s.towers,
            flats = s.flats,
            bookings = s.bookings,
            leases = s.leases,
            payments = s.payments,
            "seed loaded"
        ),
        None => tracing::info!("no SEED_FILE configured; starting with an empty catalog"),
    }
    if config.auth_token.is_none() {
        tracing::warn!("AUTH_TOKEN not set; authentication is disabled");
    }
}
