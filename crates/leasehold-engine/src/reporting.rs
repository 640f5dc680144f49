//! # Reporting Engine
//!
//! Read-only aggregates over a [`Snapshot`] of the catalog, bookings and
//! leases:
//!
//! - **Occupancy**: per tower, how many flats are leased.
//! - **Booking activity**: booking counts by status, overall and for the
//!   week, month or year containing today.
//! - **Payments**: active rent roll and a trailing monthly breakdown of
//!   expected against received rent, read from the [`PaymentLedger`].
//!
//! Taking a snapshot holds at most one flat lock at a time. Each flat is
//! internally consistent in the snapshot; the flats together may straddle
//! concurrent writes.

use chrono::NaiveDate;
use serde::Serialize;

use leasehold_core::{
    rounded_percentage, LeaseholdError, Money, ReportPeriod, TowerId, ValidationError, YearMonth,
};
use leasehold_state::{Booking, BookingStatus, Lease};

use crate::catalog::Tower;
use crate::directory::User;
use crate::ledger::PaymentLedger;
use crate::partition::FlatPartition;
use crate::Engine;

/// A copy of the engine's state taken for read-only queries.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Towers in id order.
    pub towers: Vec<Tower>,
    /// Users in id order.
    pub users: Vec<User>,
    /// Flats with their bookings and leases, in flat id order.
    pub flats: Vec<FlatPartition>,
    /// The date the snapshot was taken.
    pub today: NaiveDate,
}

impl Snapshot {
    /// Every booking.
    pub fn bookings(&self) -> impl Iterator<Item = &Booking> {
        self.flats.iter().flat_map(|p| p.bookings.values())
    }

    /// Every lease.
    pub fn leases(&self) -> impl Iterator<Item = &Lease> {
        self.flats.iter().flat_map(|p| p.leases.values())
    }
}

// ─── Report types ────────────────────────────────────────────────────

/// Occupancy of one tower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TowerOccupancy {
    /// Tower identifier.
    pub tower_id: TowerId,
    /// Tower display name.
    pub tower_name: String,
    /// Flats in the tower.
    pub total_flats: usize,
    /// Flats under an active lease.
    pub occupied_flats: usize,
    /// Flats open for booking.
    pub vacant_flats: usize,
    /// `occupied / total` as a whole percentage, 0 for an empty tower.
    pub occupancy_percentage: u64,
}

/// Booking counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// Awaiting decision.
    pub pending: usize,
    /// Approved.
    pub approved: usize,
    /// Declined.
    pub declined: usize,
    /// Sum of the three.
    pub total: usize,
}

impl StatusCounts {
    fn tally<'a>(bookings: impl Iterator<Item = &'a Booking>) -> Self {
        let mut counts = Self::default();
        for booking in bookings {
            match booking.status {
                BookingStatus::Pending => counts.pending += 1,
                BookingStatus::Approved => counts.approved += 1,
                BookingStatus::Declined => counts.declined += 1,
            }
            counts.total += 1;
        }
        counts
    }
}

/// Booking counts overall and within a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingActivityReport {
    /// The requested period.
    pub period: ReportPeriod,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// Every booking ever created.
    pub total: StatusCounts,
    /// Bookings created within the period.
    pub period_counts: StatusCounts,
}

/// Expected and received rent for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCollection {
    /// Label such as `"October 2026"`.
    pub month: String,
    /// The month as `YYYY-MM`.
    pub period: YearMonth,
    /// Rent owed by leases in force during the month.
    pub expected: Money,
    /// Rent recorded as received for those leases.
    pub received: Money,
    /// `received / expected` as a whole percentage, 0 when nothing is owed.
    pub collection_rate: u64,
}

/// Rent roll and collection history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentReport {
    /// Leases currently active.
    pub active_leases_count: usize,
    /// Sum of active leases' monthly rent.
    pub total_expected_monthly: Money,
    /// Trailing months, most recent first.
    pub monthly_breakdown: Vec<MonthlyCollection>,
    /// Whether some lease-month in the breakdown has no ledger record.
    pub is_estimate: bool,
    /// How the figures were derived.
    pub note: String,
}

// ─── Queries ─────────────────────────────────────────────────────────

/// Stateless report queries over one snapshot.
#[derive(Debug, Clone, Copy)]
pub struct ReportingEngine<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> ReportingEngine<'a> {
    /// Queries over `snapshot`.
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    /// Per-tower occupancy, in tower id order. Empty when there are no
    /// towers.
    pub fn occupancy(&self) -> Vec<TowerOccupancy> {
        self.snapshot
            .towers
            .iter()
            .map(|tower| {
                let flats = self
                    .snapshot
                    .flats
                    .iter()
                    .filter(|p| p.flat.tower_id == tower.id);
                let (total, occupied) = flats.fold((0usize, 0usize), |(t, o), p| {
                    (t + 1, o + usize::from(!p.flat.is_available()))
                });
                TowerOccupancy {
                    tower_id: tower.id,
                    tower_name: tower.name.clone(),
                    total_flats: total,
                    occupied_flats: occupied,
                    vacant_flats: total - occupied,
                    occupancy_percentage: rounded_percentage(occupied as u64, total as u64),
                }
            })
            .collect()
    }

    /// Booking counts for all time and for the `period` containing the
    /// snapshot date. A booking belongs to the period when its creation date
    /// (UTC) falls within the inclusive bounds.
    pub fn booking_activity(&self, period: ReportPeriod) -> BookingActivityReport {
        let range = period.bounds(self.snapshot.today);
        BookingActivityReport {
            period,
            start_date: range.start,
            end_date: range.end,
            total: StatusCounts::tally(self.snapshot.bookings()),
            period_counts: StatusCounts::tally(
                self.snapshot
                    .bookings()
                    .filter(|b| range.contains(b.created_at.date_naive())),
            ),
        }
    }

    /// Rent roll and the trailing `months` of collections, most recent
    /// first.
    ///
    /// A month's expected rent is the sum of `monthly_rent` over leases in
    /// force on any day of that month; received is the sum of the ledger's
    /// received amounts for those same leases. Any such lease-month missing
    /// from the ledger marks the report as an estimate.
    ///
    /// Fails when `months` is outside `1..=MAX_TRAILING_MONTHS`.
    pub fn payments(
        &self,
        ledger: &dyn PaymentLedger,
        months: usize,
    ) -> Result<PaymentReport, ValidationError> {
        let window = YearMonth::trailing(self.snapshot.today, months)?;
        let active: Vec<&Lease> = self.snapshot.leases().filter(|l| l.is_active()).collect();
        let mut missing = 0usize;
        let monthly_breakdown = window
            .into_iter()
            .map(|month| {
                let range = month.range();
                let mut expected = Money::ZERO;
                let mut received = Money::ZERO;
                for lease in self.snapshot.leases().filter(|l| l.in_force_during(&range)) {
                    expected = expected + lease.monthly_rent;
                    match ledger.record(lease.id, month) {
                        Some(record) => received = received + record.received,
                        None => missing += 1,
                    }
                }
                MonthlyCollection {
                    month: month.label(),
                    period: month,
                    expected,
                    received,
                    collection_rate: rounded_percentage(
                        received.minor_units(),
                        expected.minor_units(),
                    ),
                }
            })
            .collect();
        let is_estimate = missing > 0;
        let note = if is_estimate {
            format!(
                "Estimate: {missing} lease-month(s) have no payment record; received amounts cover recorded payments only."
            )
        } else {
            "Received amounts are taken from the payment ledger.".to_string()
        };
        Ok(PaymentReport {
            active_leases_count: active.len(),
            total_expected_monthly: active.iter().map(|l| l.monthly_rent).sum(),
            monthly_breakdown,
            is_estimate,
            note,
        })
    }
}

impl Engine {
    /// Copy the current state for read-only queries.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            towers: self.towers.list(),
            users: self.users.list(),
            flats: self.flats.snapshot(),
            today: self.clock.today(),
        }
    }

    /// Per-tower occupancy.
    pub fn occupancy_report(&self) -> Vec<TowerOccupancy> {
        ReportingEngine::new(&self.snapshot()).occupancy()
    }

    /// Booking counts for all time and the given period.
    pub fn booking_report(&self, period: ReportPeriod) -> BookingActivityReport {
        ReportingEngine::new(&self.snapshot()).booking_activity(period)
    }

    /// Rent roll and the trailing `months` of collections.
    pub fn payment_report(&self, months: usize) -> Result<PaymentReport, LeaseholdError> {
        Ok(ReportingEngine::new(&self.snapshot()).payments(self.ledger.as_ref(), months)?)
    }
}
