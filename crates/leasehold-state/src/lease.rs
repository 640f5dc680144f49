//! # Lease Lifecycle State Machine
//!
//! A lease is opened when a booking is approved and closed when an
//! administrator terminates it.
//!
//! ## States
//!
//! ```text
//! Active ──▶ Terminated (terminal)
//! ```
//!
//! A lease is *in force* on a date when it started on or before that date and
//! either has no end date or ends on or after it. That definition is used by
//! the payment report to decide which leases owe rent in a month.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use leasehold_core::{
    BookingId, DateRange, FlatId, LeaseId, LeaseholdError, Money, UserId, ValidationError,
};

// ─── Lease Status ────────────────────────────────────────────────────

/// The lifecycle state of a lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaseStatus {
    /// The tenant occupies the flat.
    Active,
    /// The lease has ended (terminal).
    Terminated,
}

impl LeaseStatus {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated)
    }

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Terminated => "terminated",
        }
    }
}

impl std::fmt::Display for LeaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors that can occur during lease transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LeaseTransitionError {
    /// The lease is already terminated.
    #[error("lease {lease} is already terminated")]
    AlreadyTerminated {
        /// The lease.
        lease: LeaseId,
    },

    /// The requested end date precedes the lease start.
    #[error("lease {lease}: end date {end} is before start date {start}")]
    EndBeforeStart {
        /// The lease.
        lease: LeaseId,
        /// Lease start date.
        start: NaiveDate,
        /// Requested end date.
        end: NaiveDate,
    },
}

impl From<LeaseTransitionError> for LeaseholdError {
    fn from(err: LeaseTransitionError) -> Self {
        match err {
            LeaseTransitionError::AlreadyTerminated { .. } => {
                LeaseholdError::InvalidState(err.to_string())
            }
            LeaseTransitionError::EndBeforeStart { start, end, .. } => {
                ValidationError::EndBeforeStart { start, end }.into()
            }
        }
    }
}

// ─── Transition Record ───────────────────────────────────────────────

/// Record of a lease state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseTransitionRecord {
    /// State before the transition.
    pub from_state: LeaseStatus,
    /// State after the transition.
    pub to_state: LeaseStatus,
    /// When the transition occurred.
    pub timestamp: DateTime<Utc>,
}

// ─── Lease ───────────────────────────────────────────────────────────

/// A rental agreement between a tenant and a flat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    /// Unique identifier.
    pub id: LeaseId,
    /// The leased flat.
    pub flat_id: FlatId,
    /// The tenant.
    pub user_id: UserId,
    /// The booking whose approval opened this lease.
    pub booking_id: BookingId,
    /// First day of occupancy.
    pub start_date: NaiveDate,
    /// Last day of occupancy, set on termination.
    pub end_date: Option<NaiveDate>,
    /// Monthly rent, copied from the flat at approval time.
    pub monthly_rent: Money,
    /// Current lifecycle state.
    pub status: LeaseStatus,
    /// When the lease was opened.
    pub created_at: DateTime<Utc>,
    /// Ordered log of state transitions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<LeaseTransitionRecord>,
}

/// Parameters for opening a lease.
#[derive(Debug, Clone)]
pub struct LeaseTerms {
    /// The leased flat.
    pub flat_id: FlatId,
    /// The tenant.
    pub user_id: UserId,
    /// The originating booking.
    pub booking_id: BookingId,
    /// First day of occupancy.
    pub start_date: NaiveDate,
    /// Monthly rent.
    pub monthly_rent: Money,
}

impl Lease {
    /// Open an active lease.
    pub fn activate(id: LeaseId, terms: LeaseTerms, at: DateTime<Utc>) -> Self {
        Self {
            id,
            flat_id: terms.flat_id,
            user_id: terms.user_id,
            booking_id: terms.booking_id,
            start_date: terms.start_date,
            end_date: None,
            monthly_rent: terms.monthly_rent,
            status: LeaseStatus::Active,
            created_at: at,
            transitions: Vec::new(),
        }
    }

    /// Whether the lease is active.
    pub fn is_active(&self) -> bool {
        self.status == LeaseStatus::Active
    }

    /// Terminate (ACTIVE → TERMINATED), recording `end_date`.
    pub fn terminate(
        &mut self,
        end_date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<(), LeaseTransitionError> {
        if self.status.is_terminal() {
            return Err(LeaseTransitionError::AlreadyTerminated { lease: self.id });
        }
        if end_date < self.start_date {
            return Err(LeaseTransitionError::EndBeforeStart {
                lease: self.id,
                start: self.start_date,
                end: end_date,
            });
        }
        self.end_date = Some(end_date);
        self.transitions.push(LeaseTransitionRecord {
            from_state: self.status,
            to_state: LeaseStatus::Terminated,
            timestamp: at,
        });
        self.status = LeaseStatus::Terminated;
        Ok(())
    }

    /// Whether the lease is in force on at least one day of `range`.
    pub fn in_force_during(&self, range: &DateRange) -> bool {
        self.start_date <= range.end && self.end_date.map_or(true, |end| end >= range.start)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use leasehold_core::YearMonth;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_lease(start: NaiveDate) -> Lease {
        Lease::activate(
            LeaseId::new(1),
            LeaseTerms {
                flat_id: FlatId::new(2),
                user_id: UserId::new(3),
                booking_id: BookingId::new(4),
                start_date: start,
                monthly_rent: Money::from_units(1500),
            },
            at(),
        )
    }

    #[test]
    fn test_activate() {
        let lease = make_lease(date(2026, 5, 1));
        assert!(lease.is_active());
        assert_eq!(lease.end_date, None);
        assert_eq!(lease.monthly_rent, Money::from_units(1500));
    }

    #[test]
    fn test_terminate() {
        let mut lease = make_lease(date(2026, 5, 1));
        lease.terminate(date(2026, 9, 30), at()).unwrap();
        assert_eq!(lease.status, LeaseStatus::Terminated);
        assert_eq!(lease.end_date, Some(date(2026, 9, 30)));
        assert_eq!(lease.transitions.len(), 1);
    }

    #[test]
    fn test_terminate_on_start_date_is_allowed() {
        let mut lease = make_lease(date(2026, 5, 1));
        assert!(lease.terminate(date(2026, 5, 1), at()).is_ok());
    }

    #[test]
    fn test_terminate_twice_is_invalid_state() {
        let mut lease = make_lease(date(2026, 5, 1));
        lease.terminate(date(2026, 6, 1), at()).unwrap();
        let err = lease.terminate(date(2026, 7, 1), at()).unwrap_err();
        assert_eq!(err, LeaseTransitionError::AlreadyTerminated { lease: LeaseId::new(1) });
        assert_eq!(lease.end_date, Some(date(2026, 6, 1)));
        assert!(matches!(LeaseholdError::from(err), LeaseholdError::InvalidState(_)));
    }

    #[test]
    fn test_end_before_start_is_validation() {
        let mut lease = make_lease(date(2026, 5, 1));
        let err = lease.terminate(date(2026, 4, 30), at()).unwrap_err();
        assert!(lease.is_active());
        assert!(matches!(
            LeaseholdError::from(err),
            LeaseholdError::Validation(ValidationError::EndBeforeStart { .. })
        ));
    }

    #[test]
    fn test_in_force_during_month() {
        let mut lease = make_lease(date(2026, 5, 15));
        let april = YearMonth::new(2026, 4).unwrap().range();
        let may = YearMonth::new(2026, 5).unwrap().range();
        let july = YearMonth::new(2026, 7).unwrap().range();
        assert!(!lease.in_force_during(&april));
        assert!(lease.in_force_during(&may));
        assert!(lease.in_force_during(&july));

        lease.terminate(date(2026, 6, 1), at()).unwrap();
        assert!(!lease.in_force_during(&july));
    }
}
