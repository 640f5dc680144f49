//! # Booking Lifecycle State Machine
//!
//! A booking is a user's request to rent one flat from a requested move-in
//! date. An administrator decides it exactly once.
//!
//! ## States
//!
//! ```text
//! Pending ──▶ Approved (terminal)
//!    │
//!    └──▶ Declined (terminal)
//! ```
//!
//! Approval has a side effect outside this type (a lease is opened and the
//! flat stops being available); the engine performs it together with
//! [`Booking::approve`] under one flat lock.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use leasehold_core::{BookingId, FlatId, LeaseholdError, UserId};

// ─── Booking Status ──────────────────────────────────────────────────

/// The decision state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Awaiting an administrator decision.
    Pending,
    /// Approved; a lease was opened (terminal).
    Approved,
    /// Declined (terminal).
    Declined,
}

impl BookingStatus {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Declined)
    }

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Declined => "declined",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors that can occur during booking transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingTransitionError {
    /// The booking has already been decided.
    #[error("booking {booking} is already {state}")]
    TerminalState {
        /// The booking.
        booking: BookingId,
        /// Its terminal state.
        state: BookingStatus,
    },

    /// The target is not reachable from the current state.
    #[error("invalid booking transition for {booking}: {from} -> {to}")]
    InvalidTransition {
        /// The booking.
        booking: BookingId,
        /// Current state.
        from: BookingStatus,
        /// Attempted target state.
        to: BookingStatus,
    },
}

impl From<BookingTransitionError> for LeaseholdError {
    fn from(err: BookingTransitionError) -> Self {
        LeaseholdError::InvalidState(err.to_string())
    }
}

// ─── Transition Record ───────────────────────────────────────────────

/// Record of a booking decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingTransitionRecord {
    /// State before the transition.
    pub from_state: BookingStatus,
    /// State after the transition.
    pub to_state: BookingStatus,
    /// When the decision was made.
    pub timestamp: DateTime<Utc>,
    /// Administrator who decided, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<UserId>,
}

// ─── Booking ─────────────────────────────────────────────────────────

/// A request by a user to rent a flat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier.
    pub id: BookingId,
    /// The requesting user.
    pub user_id: UserId,
    /// The requested flat.
    pub flat_id: FlatId,
    /// Current decision state.
    pub status: BookingStatus,
    /// Requested move-in date; becomes the lease start on approval.
    pub requested_date: NaiveDate,
    /// When the request was made.
    pub created_at: DateTime<Utc>,
    /// Decision log; at most one entry.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<BookingTransitionRecord>,
}

impl Booking {
    /// A new pending booking.
    pub fn new_request(
        id: BookingId,
        user_id: UserId,
        flat_id: FlatId,
        requested_date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            flat_id,
            status: BookingStatus::Pending,
            requested_date,
            created_at,
            transitions: Vec::new(),
        }
    }

    /// Whether the booking still awaits a decision.
    pub fn is_pending(&self) -> bool {
        self.status == BookingStatus::Pending
    }

    /// When the booking was decided, if it has been.
    pub fn decided_at(&self) -> Option<DateTime<Utc>> {
        self.transitions.last().map(|t| t.timestamp)
    }

    /// Approve (PENDING → APPROVED).
    pub fn approve(
        &mut self,
        actor: Option<UserId>,
        at: DateTime<Utc>,
    ) -> Result<(), BookingTransitionError> {
        self.require_pending(BookingStatus::Approved)?;
        self.do_transition(BookingStatus::Approved, actor, at);
        Ok(())
    }

    /// Decline (PENDING → DECLINED).
    pub fn decline(
        &mut self,
        actor: Option<UserId>,
        at: DateTime<Utc>,
    ) -> Result<(), BookingTransitionError> {
        self.require_pending(BookingStatus::Declined)?;
        self.do_transition(BookingStatus::Declined, actor, at);
        Ok(())
    }

    /// Check that a decision towards `target` is currently allowed.
    pub fn require_pending(&self, target: BookingStatus) -> Result<(), BookingTransitionError> {
        if self.status.is_terminal() {
            return Err(BookingTransitionError::TerminalState {
                booking: self.id,
                state: self.status,
            });
        }
        if !target.is_terminal() {
            return Err(BookingTransitionError::InvalidTransition {
                booking: self.id,
                from: self.status,
                to: target,
            });
        }
        Ok(())
    }

    fn do_transition(&mut self, to: BookingStatus, actor: Option<UserId>, at: DateTime<Utc>) {
        self.transitions.push(BookingTransitionRecord {
            from_state: self.status,
            to_state: to,
            timestamp: at,
            actor,
        });
        self.status = to;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
