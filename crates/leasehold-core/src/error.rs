//! # Error Hierarchy
//!
//! Structured error types shared by every leasehold crate, built with
//! `thiserror`.
//!
//! Callers must be able to tell four outcomes apart without parsing
//! messages: the entity does not exist, the entity is in the wrong lifecycle
//! state, the request collides with current data, or the input itself is
//! malformed. Each is its own [`LeaseholdError`] variant.

use chrono::NaiveDate;
use thiserror::Error;

/// The kind of entity a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A residential building.
    Tower,
    /// A rentable unit inside a tower.
    Flat,
    /// A facility offered by towers.
    Amenity,
    /// A registered person.
    User,
    /// A request to rent a flat.
    Booking,
    /// A rental agreement.
    Lease,
}

impl EntityKind {
    /// Lowercase name used in messages and error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tower => "tower",
            Self::Flat => "flat",
            Self::Amenity => "amenity",
            Self::User => "user",
            Self::Booking => "booking",
            Self::Lease => "lease",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error type for leasehold operations.
#[derive(Error, Debug)]
pub enum LeaseholdError {
    /// A referenced entity does not exist.
    #[error("{kind} {id} not found")]
    NotFound {
        /// What was being looked up.
        kind: EntityKind,
        /// The identifier that missed.
        id: u64,
    },

    /// The entity exists but is not in a state that permits the operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The operation collides with current data (availability, uniqueness,
    /// dependent records).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The input is malformed or out of range.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl LeaseholdError {
    /// Shorthand for [`LeaseholdError::NotFound`].
    pub fn not_found(kind: EntityKind, id: impl Into<u64>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Shorthand for [`LeaseholdError::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

/// Input validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field was empty or whitespace.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// A numeric field that must be strictly positive was zero.
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    /// A flat floor outside `1..=total_floors` of its tower.
    #[error("floor {floor} is outside 1..={total_floors}")]
    FloorOutOfRange {
        /// The requested floor.
        floor: u32,
        /// The tower's floor count.
        total_floors: u32,
    },

    /// An unrecognized report period token.
    #[error("invalid report period {0:?}; expected one of week, month, year")]
    InvalidPeriod(String),

    /// A trailing month window that is empty or too long.
    #[error("months must be between 1 and {max}, got {requested}")]
    MonthsOutOfRange {
        /// The requested window.
        requested: usize,
        /// The largest window allowed.
        max: usize,
    },

    /// An unparseable money amount.
    #[error("invalid amount {0:?}; expected a non-negative decimal with at most two fraction digits")]
    InvalidMoney(String),

    /// An unparseable calendar date.
    #[error("invalid date {0:?}; expected YYYY-MM-DD")]
    InvalidDate(String),

    /// An unparseable calendar month.
    #[error("invalid month {0:?}; expected YYYY-MM")]
    InvalidMonth(String),

    /// An unrecognized amenity category.
    #[error("invalid amenity type {0:?}; expected one of gym, pool, parking, common")]
    InvalidAmenityType(String),

    /// An email address without the minimal `local@domain` shape.
    #[error("invalid email address {0:?}")]
    InvalidEmail(String),

    /// A lease end date earlier than its start date.
    #[error("end date {end} is before start date {start}")]
    EndBeforeStart {
        /// Lease start date.
        start: NaiveDate,
        /// Requested end date.
        end: NaiveDate,
    },
}
