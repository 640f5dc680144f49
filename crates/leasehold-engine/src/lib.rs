//! # leasehold-engine: Booking-to-Lease Workflow Engine
//!
//! The domain core of leasehold. [`Engine`] is a cheaply cloneable handle
//! over shared state; every operation is synchronous and returns a result or
//! a typed [`LeaseholdError`].
//!
//! ## Components
//!
//! - **Catalog** (`catalog.rs`): towers, flats, amenities.
//! - **Directory** (`directory.rs`): registered users.
//! - **Partitions** (`partition.rs`): one lock per flat over the flat, its
//!   bookings and its leases.
//! - **BookingStateMachine** (`bookings.rs`): request, approve, decline.
//! - **LeaseManager** (`leases.rs`): the only writer of flat availability.
//! - **ReportingEngine** (`reporting.rs`): occupancy, booking activity and
//!   payment reports over a snapshot.
//! - **TenantView** (`tenants.rs`): tenant profiles with leases and payment
//!   history.
//! - **PaymentLedger** (`ledger.rs`): read-only access to rent receipts.
//! - **Seed** (`seed.rs`): YAML starting data replayed through the real
//!   write paths.
//!
//! ## Invariant
//!
//! After every successful operation, and unchanged by every failed one, each
//! flat is unavailable exactly when it has one active lease, and no flat has
//! more than one.

pub mod bookings;
pub mod catalog;
pub mod directory;
pub mod leases;
pub mod ledger;
pub mod partition;
pub mod reporting;
pub mod seed;
pub mod store;
pub mod tenants;

use std::sync::Arc;

use leasehold_core::{Clock, IdSequence, SystemClock};
use parking_lot::Mutex;

pub use leasehold_core::LeaseholdError;
pub use bookings::{Approval, BookingView};
pub use catalog::{
    Amenity, AmenityType, AmenityUpdate, Flat, FlatFilter, FlatSummary, FlatUpdate, NewAmenity,
    NewFlat, NewTower, Tower, TowerDetails, TowerUpdate,
};
pub use directory::{NewUser, Role, User, UserSummary};
pub use leases::LeaseManager;
pub use ledger::{InMemoryLedger, PaymentLedger, PaymentRecord, PaymentStatus};
pub use partition::FlatPartition;
pub use reporting::{
    BookingActivityReport, MonthlyCollection, PaymentReport, ReportingEngine, Snapshot,
    StatusCounts, TowerOccupancy,
};
pub use seed::{Seed, SeedError, SeedSummary};
pub use store::Store;
pub use tenants::{PaymentHistoryEntry, TenantDetails, TenantLease, TenantSummary, TenantView};

use crate::partition::Partitions;

#[derive(Debug, Default)]
pub(crate) struct Sequences {
    pub(crate) towers: IdSequence,
    pub(crate) flats: IdSequence,
    pub(crate) amenities: IdSequence,
    pub(crate) users: IdSequence,
    pub(crate) bookings: IdSequence,
    pub(crate) leases: IdSequence,
}

/// Handle to the workflow engine's shared state.
///
/// Clones share the same data. The clock and payment ledger are injected;
/// [`Engine::new`] uses the system clock and an empty in-memory ledger.
#[derive(Clone)]
pub struct Engine {
    pub(crate) towers: Store<leasehold_core::TowerId, Tower>,
    pub(crate) amenities: Store<leasehold_core::AmenityId, Amenity>,
    pub(crate) users: Store<leasehold_core::UserId, User>,
    pub(crate) flats: Arc<Partitions>,
    /// Held while tower amenity sets are checked and written, and while an
    /// amenity is deleted. Taken before the partition map and the tower store.
    pub(crate) amenity_links: Arc<Mutex<()>>,
    pub(crate) ids: Arc<Sequences>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) ledger: Arc<dyn PaymentLedger>,
}

impl Engine {
    /// An empty engine on the system clock with an empty ledger.
    pub fn new() -> Self {
        Self {
            towers: Store::new(),
            amenities: Store::new(),
            users: Store::new(),
            flats: Arc::new(Partitions::default()),
            amenity_links: Arc::new(Mutex::new(())),
            ids: Arc::new(Sequences::default()),
            clock: Arc::new(SystemClock),
            ledger: Arc::new(InMemoryLedger::new()),
        }
    }

    /// Use `clock` for timestamps and "today".
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Read payments from `ledger`.
    pub fn with_ledger(mut self, ledger: Arc<dyn PaymentLedger>) -> Self {
        self.ledger = ledger;
        self
    }

    /// The engine's clock.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Flats whose availability disagrees with their leases. Empty unless
    /// something is badly wrong.
    pub fn inconsistent_flats(&self) -> Vec<leasehold_core::FlatId> {
        self.flats
            .snapshot()
            .into_iter()
            .filter(|p| !p.is_consistent())
            .map(|p| p.flat.id)
            .collect()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("towers", &self.towers.len())
            .field("amenities", &self.amenities.len())
            .field("users", &self.users.len())
            .finish_non_exhaustive()
    }
}
