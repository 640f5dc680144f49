//! # leasehold-cli: Operator CLI
//!
//! Provides the `leasehold` command-line interface. Every subcommand works
//! offline: it builds an in-memory [`Engine`], replays a YAML seed into it
//! and reads the result.
//!
//! ## Subcommands
//!
//! - `leasehold validate`: Replay a seed and print what it created.
//! - `leasehold report`: Print an admin report as JSON.
//!
//! ```bash
//! leasehold validate fixtures/demo.yaml
//! leasehold report occupancy --seed fixtures/demo.yaml
//! leasehold report bookings --seed fixtures/demo.yaml --period week
//! leasehold report payments --seed fixtures/demo.yaml --months 3 --as-of 2026-10-31
//! ```
//!
//! ## Exit Codes
//!
//! `0` success, `1` the seed was rejected, `2` operational error (unreadable
//! file, bad arguments).

pub mod report;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;

use leasehold_core::{Clock, FixedClock, SystemClock};
use leasehold_engine::{Engine, InMemoryLedger, Seed, SeedError, SeedSummary};

/// An engine loaded from a seed.
#[derive(Debug)]
pub struct LoadedSeed {
    pub engine: Engine,
    pub summary: SeedSummary,
}

/// Read `path`, then replay it into a fresh engine.
///
/// `as_of` freezes the engine clock on that date so bookings, default
/// termination dates and report windows are reproducible.
///
/// The outer `Err` is a file that could not be read; the inner one is a
/// seed the engine rejected.
pub fn load_seed(
    path: &Path,
    as_of: Option<NaiveDate>,
) -> std::io::Result<Result<LoadedSeed, SeedError>> {
    let text = std::fs::read_to_string(path)?;
    Ok(replay(&text, as_of))
}

fn replay(yaml: &str, as_of: Option<NaiveDate>) -> Result<LoadedSeed, SeedError> {
    let seed = Seed::from_yaml_str(yaml)?;
    let clock: Arc<dyn Clock> = match as_of {
        Some(date) => Arc::new(FixedClock::on(date)),
        None => Arc::new(SystemClock),
    };
    let ledger = Arc::new(InMemoryLedger::new());
    let engine = Engine::new().with_clock(clock).with_ledger(ledger.clone());
    let summary = seed.apply(&engine, &ledger)?;
    Ok(LoadedSeed { engine, summary })
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn loads_demo_seed() {
        let file = seed_file(DEMO_SEED);
        let loaded = load_seed(file.path(), NaiveDate::from_ymd_opt(2026, 10, 21))
            .unwrap()
            .unwrap();
        assert_eq!(loaded.summary.users, 3);
        assert_eq!(loaded.summary.flats, 2);
        assert_eq!(loaded.summary.leases, 1);
        assert!(loaded.engine.inconsistent_flats().is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(load_seed(Path::new("/nonexistent/leasehold.yaml"), None).is_err());
    }

    #[test]
    fn rejected_seed_is_inner_error() {
        let file = seed_file("towers:\n  - { name: T, total_floors: 0 }\n");
        let result = load_seed(file.path(), None).unwrap();
        assert!(matches!(result, Err(SeedError::Domain { .. })));
    }
}
