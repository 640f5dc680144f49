//! # leasehold-state: Booking and Lease State Machines
//!
//! Runtime-checked lifecycle state machines. Each transition method checks
//! the current state, appends a transition record, and moves the entity to
//! its next state, or returns a structured error and leaves it untouched.
//!
//! - **Booking** (`booking.rs`): `Pending → Approved | Declined`.
//! - **Lease** (`lease.rs`): `Active → Terminated`.
//!
//! Both error types convert into [`leasehold_core::LeaseholdError`]:
//! acting on a decided booking or a terminated lease is `InvalidState`, an end
//! date before the start date is `Validation`.
//!
//! These types hold no locks and know nothing about flats' availability. The
//! engine owns that coupling.

pub mod booking;
pub mod lease;

pub use booking::{Booking, BookingStatus, BookingTransitionError, BookingTransitionRecord};
pub use lease::{Lease, LeaseStatus, LeaseTerms, LeaseTransitionError, LeaseTransitionRecord};
