//! # Identity Newtypes
//!
//! Integer identifiers for every leasehold entity. Each identifier is a
//! distinct type, so a [`FlatId`] cannot be passed where a [`TowerId`] is
//! expected even though both wrap a `u64`.
//!
//! Identifiers are assigned by an [`IdSequence`] at creation time, start at
//! 1, and are never reused. On the wire they are plain JSON integers.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw identifier value.
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// The raw identifier value.
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

integer_id!(
    /// Identifier of a residential tower.
    TowerId
);
integer_id!(
    /// Identifier of a flat (rentable unit).
    FlatId
);
integer_id!(
    /// Identifier of an amenity.
    AmenityId
);
integer_id!(
    /// Identifier of a registered user.
    UserId
);
integer_id!(
    /// Identifier of a booking request.
    BookingId
);
integer_id!(
    /// Identifier of a lease.
    LeaseId
);

/// Monotonic identifier allocator.
///
/// Safe to share across threads; two concurrent calls to [`IdSequence::next`]
/// never return the same value.
#[derive(Debug)]
pub struct IdSequence(AtomicU64);

impl IdSequence {
    /// A sequence whose first allocated value is 1.
    pub const fn new() -> Self {
        Self(AtomicU64::new(1))
    }

    /// Allocate the next identifier.
    pub fn next<T: From<u64>>(&self) -> T {
        T::from(self.0.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}
