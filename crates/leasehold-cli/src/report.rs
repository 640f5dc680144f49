//! # Report Subcommand
//!
//! Prints one of the admin reports, as pretty JSON, over an engine loaded
//! from a seed. The output matches the body of the corresponding
//! `/api/admin/reports/*` endpoint.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, ValueEnum};

use leasehold_core::{ReportPeriod, MAX_TRAILING_MONTHS};
use leasehold_engine::Engine;

/// Months in the payment report when `--months` is not given.
pub const DEFAULT_MONTHS: usize = 6;

/// Which report to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    /// Per-tower occupancy.
    Occupancy,
    /// Booking counts overall and within a period.
    Bookings,
    /// Rent roll and collection history.
    Payments,
}

/// Arguments for the `leasehold report` subcommand.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Report to print.
    #[arg(value_enum)]
    pub kind: ReportKind,

    /// Seed file to load.
    #[arg(long, value_name = "SEED")]
    pub seed: PathBuf,

    /// Period for the bookings report: week, month or year.
    #[arg(long, default_value = "month")]
    pub period: ReportPeriod,

    /// Trailing months for the payments report.
    #[arg(long, default_value_t = DEFAULT_MONTHS)]
    pub months: usize,

    /// Freeze the clock on this date (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<NaiveDate>,
}

/// Execute the report subcommand.
///
/// Returns exit code: 0 after printing the report, 1 when the seed is
/// rejected.
pub fn run_report(args: &ReportArgs) -> Result<u8> {
    if !(1..=MAX_TRAILING_MONTHS).contains(&args.months) {
        bail!("--months must be between 1 and {MAX_TRAILING_MONTHS}");
    }

    let loaded = crate::load_seed(&args.seed, args.as_of)
        .with_context(|| format!("failed to read {}", args.seed.display()))?;
    let loaded = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            println!("FAIL: {}: {e}", args.seed.display());
            return Ok(1);
        }
    };

    let report = render(&loaded.engine, args)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(0)
}

/// Build the requested report as JSON.
pub fn render(engine: &Engine, args: &ReportArgs) -> Result<serde_json::Value> {
    tracing::debug!(kind = ?args.kind, "rendering report");
    let value = match args.kind {
        ReportKind::Occupancy => serde_json::to_value(engine.occupancy_report()),
        ReportKind::Bookings => serde_json::to_value(engine.booking_report(args.period)),
        ReportKind::Payments => serde_json::to_value(engine.payment_report(args.months)?),
    };
    value.context("failed to serialize report")
}
