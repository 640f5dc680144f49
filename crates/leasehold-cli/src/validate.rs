//! # Validate Subcommand
//!
//! Replays a seed into a fresh engine. A seed passes when every record is
//! accepted by the same operations the HTTP API uses, so a seed that
//! validates here also boots the server.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;

use leasehold_engine::SeedSummary;

/// Arguments for the `leasehold validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Seed file to replay.
    #[arg(value_name = "SEED")]
    pub seed: PathBuf,

    /// Freeze the clock on this date (YYYY-MM-DD) while replaying.
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<NaiveDate>,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when the seed replays cleanly, 1 when a record is
/// rejected.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let loaded = crate::load_seed(&args.seed, args.as_of)
        .with_context(|| format!("failed to read {}", args.seed.display()))?;

    match loaded {
        Ok(loaded) => {
            println!("OK: {}", args.seed.display());
            for line in summary_lines(&loaded.summary) {
                println!("  {line}");
            }
            Ok(0)
        }
        Err(e) => {
            println!("FAIL: {}: {e}", args.seed.display());
            Ok(1)
        }
    }
}

fn summary_lines(summary: &SeedSummary) -> Vec<String> {
    [
        ("users", summary.users),
        ("amenities", summary.amenities),
        ("towers", summary.towers),
        ("flats", summary.flats),
        ("bookings", summary.bookings),
        ("leases", summary.leases),
        ("payments", summary.payments),
    ]
    .iter()
    .map(|(label, count)| format!("{label:<10} {count}"))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_file, DEMO_SEED};

    fn args(path: &std::path::Path) -> ValidateArgs {
        ValidateArgs {
            seed: path.to_path_buf(),
            as_of: NaiveDate::from_ymd_opt(2026, 10, 21),
        }
    }

    #[test]
    fn valid_seed_exits_zero() {
        let file = seed_file(DEMO_SEED);
        assert_eq!(run_validate(&args(file.path())).unwrap(), 0);
    }

    #[test]
    fn unknown_reference_exits_one() {
        let file = seed_file(
            "bookings:\n  - { user: ghost@example.com, tower: X, unit: \"1\", requested_date: 2026-01-01 }\n",
        );
        assert_eq!(run_validate(&args(file.path())).unwrap(), 1);
    }

    #[test]
    fn booking_a_leased_flat_exits_one() {
        let file = seed_file(
            r#"
users:
  - { email: a@example.com, name: A }
  - { email: b@example.com, name: B }
towers:
  - name: T
    total_floors: 2
    flats:
      - { unit_number: "1", floor: 1, rent: "900.00" }
bookings:
  - { user: a@example.com, tower: T, unit: "1", requested_date: 2026-03-01, decision: approved }
  - { user: b@example.com, tower: T, unit: "1", requested_date: 2026-04-01 }
"#,
        );
        assert_eq!(run_validate(&args(file.path())).unwrap(), 1);
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let result = run_validate(&args(std::path::Path::new("/nonexistent/seed.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn summary_lists_every_section() {
        let lines = summary_lines(&SeedSummary {
            users: 3,
            flats: 2,
            ..SeedSummary::default()
        });
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "users      3");
        assert_eq!(lines[3], "flats      2");
    }
}
