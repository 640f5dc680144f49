//! # Per-Flat Partitions
//!
//! The flat is the unit of contention. Each flat's record, its bookings and
//! its leases live together in one [`FlatPartition`] behind its own mutex.
//! Any write that touches a booking or lease locks exactly that partition,
//! so work on different flats runs in parallel while an approval (booking
//! status, new lease, availability flip) is applied as one unit.
//!
//! ## Lock order
//!
//! 1. the flat map (`RwLock`), only when a write needs to see or change the
//!    set of flats;
//! 2. one or more partition mutexes, in flat id order;
//! 3. the booking/lease location indexes.
//!
//! Nothing acquires the flat map while holding a partition mutex, and
//! nothing acquires a partition mutex while holding an index lock.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock, RwLockWriteGuard};

use leasehold_core::{BookingId, FlatId, LeaseId, TowerId, UserId};
use leasehold_state::{Booking, Lease};

use crate::catalog::Flat;

/// A flat together with every booking and lease that references it.
#[derive(Debug, Clone)]
pub struct FlatPartition {
    /// The flat record.
    pub flat: Flat,
    /// Bookings on this flat, by id.
    pub bookings: BTreeMap<BookingId, Booking>,
    /// Leases on this flat, by id.
    pub leases: BTreeMap<LeaseId, Lease>,
    pub(crate) retired: bool,
}

impl FlatPartition {
    pub(crate) fn new(flat: Flat) -> Self {
        Self {
            flat,
            bookings: BTreeMap::new(),
            leases: BTreeMap::new(),
            retired: false,
        }
    }

    /// The active lease, if any.
    pub fn active_lease(&self) -> Option<&Lease> {
        self.leases.values().find(|l| l.is_active())
    }

    /// The user's pending booking on this flat, if any.
    pub fn pending_booking_for(&self, user: UserId) -> Option<&Booking> {
        self.bookings
            .values()
            .find(|b| b.user_id == user && b.is_pending())
    }

    /// Whether the flat has ever been booked or leased.
    pub fn has_history(&self) -> bool {
        !self.bookings.is_empty() || !self.leases.is_empty()
    }

    /// Whether availability mirrors lease state: the flat is unavailable
    /// exactly when one lease is active, and never more than one is.
    pub fn is_consistent(&self) -> bool {
        let active = self.leases.values().filter(|l| l.is_active()).count();
        active <= 1 && self.flat.is_available() == (active == 0)
    }
}

/// A flat map slot. `tower_id` and `unit_number` are mirrored here so
/// catalog checks can scan the map without locking every partition; they
/// only change under the map's write lock.
#[derive(Debug)]
pub(crate) struct FlatEntry {
    pub(crate) tower_id: TowerId,
    pub(crate) unit_number: String,
    pub(crate) cell: Arc<Mutex<FlatPartition>>,
}

impl FlatEntry {
    pub(crate) fn new(partition: FlatPartition) -> Self {
        Self {
            tower_id: partition.flat.tower_id,
            unit_number: partition.flat.unit_number.clone(),
            cell: Arc::new(Mutex::new(partition)),
        }
    }
}

pub(crate) type FlatMap = BTreeMap<FlatId, FlatEntry>;

/// All partitions plus the indexes that locate a booking or lease.
#[derive(Debug, Default)]
pub(crate) struct Partitions {
    flats: RwLock<FlatMap>,
    bookings: RwLock<HashMap<BookingId, FlatId>>,
    leases: RwLock<HashMap<LeaseId, FlatId>>,
}

impl Partitions {
    pub(crate) fn write_map(&self) -> RwLockWriteGuard<'_, FlatMap> {
        self.flats.write()
    }

    pub(crate) fn cell(&self, id: FlatId) -> Option<Arc<Mutex<FlatPartition>>> {
        self.flats.read().get(&id).map(|entry| Arc::clone(&entry.cell))
    }

    pub(crate) fn flat_of_booking(&self, id: BookingId) -> Option<FlatId> {
        self.bookings.read().get(&id).copied()
    }

    pub(crate) fn flat_of_lease(&self, id: LeaseId) -> Option<FlatId> {
        self.leases.read().get(&id).copied()
    }

    pub(crate) fn index_booking(&self, booking: BookingId, flat: FlatId) {
        self.bookings.write().insert(booking, flat);
    }

    pub(crate) fn index_lease(&self, lease: LeaseId, flat: FlatId) {
        self.leases.write().insert(lease, flat);
    }

    /// Clones of the partitions whose map entry passes `pred`, in flat id
    /// order. Each partition is copied under its own lock, so every copy is
    /// internally consistent; the set as a whole is not a point-in-time cut.
    pub(crate) fn snapshot_where(&self, pred: impl Fn(&FlatEntry) -> bool) -> Vec<FlatPartition> {
        let cells: Vec<Arc<Mutex<FlatPartition>>> = self
            .flats
            .read()
            .values()
            .filter(|entry| pred(entry))
            .map(|entry| Arc::clone(&entry.cell))
            .collect();
        cells
            .iter()
            .map(|cell| cell.lock().clone())
            .filter(|p| !p.retired)
            .collect()
    }

    pub(crate) fn snapshot(&self) -> Vec<FlatPartition> {
        self.snapshot_where(|_| true)
    }
}
