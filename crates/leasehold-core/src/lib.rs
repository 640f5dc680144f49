#![deny(missing_docs)]

//! # leasehold-core: Foundational Types for Leasehold
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies, only `serde`, `thiserror`, and
//! `chrono` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** Every entity identifier is a
//!    distinct type. You cannot pass a [`FlatId`] where a [`UserId`] is
//!    expected.
//!
//! 2. **[`Money`] is exact.** Rents, fees and collected amounts are
//!    non-negative `rust_decimal::Decimal` values with at most two fraction
//!    digits; the wire form is a decimal string.
//!
//! 3. **Time is injected.** Anything that needs "now" or "today" takes a
//!    [`Clock`], so reporting windows are reproducible in tests.
//!
//! 4. **[`LeaseholdError`] hierarchy.** Structured errors with `thiserror`.
//!    The four outcome classes (not found, invalid state, conflict,
//!    validation) are distinct variants that every transport maps the same
//!    way.

pub mod error;
pub mod identity;
pub mod money;
pub mod ratio;
pub mod temporal;

pub use error::{EntityKind, LeaseholdError, ValidationError};
pub use identity::{AmenityId, BookingId, FlatId, IdSequence, LeaseId, TowerId, UserId};
pub use money::Money;
pub use ratio::rounded_percentage;
pub use temporal::{
    parse_date, Clock, DateRange, FixedClock, ReportPeriod, SystemClock, YearMonth,
    MAX_TRAILING_MONTHS,
};
