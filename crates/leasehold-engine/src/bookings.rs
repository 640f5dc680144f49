//! # Booking Workflow
//!
//! Requests, decisions and booking queries. Every write locks the one flat
//! partition the booking belongs to, which serializes it against any other
//! booking or lease write on that flat.
//!
//! Approval is all-or-nothing: the booking transition is applied to a copy,
//! the lease is created (which may fail), and only then is the approved copy
//! written back. A failure at any step leaves the partition as it was.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use serde::Serialize;

use leasehold_core::{BookingId, EntityKind, FlatId, LeaseholdError, TowerId, UserId};
use leasehold_state::{Booking, BookingStatus, Lease, LeaseTerms};

use crate::catalog::FlatSummary;
use crate::directory::UserSummary;
use crate::leases::LeaseManager;
use crate::partition::FlatPartition;
use crate::Engine;

/// The outcome of approving a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Approval {
    /// The approved booking.
    pub booking: Booking,
    /// The lease it opened.
    pub lease: Lease,
}

/// A booking joined with its flat, requester and derived lease.
#[derive(Debug, Clone, Serialize)]
pub struct BookingView {
    /// The booking.
    #[serde(flatten)]
    pub booking: Booking,
    /// The requested flat.
    pub flat: FlatSummary,
    /// The requesting user; absent if the user record is gone.
    pub requester: Option<UserSummary>,
    /// The lease opened by approval.
    pub lease: Option<Lease>,
}

fn newest_first(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

impl Engine {
    fn booking_cell(&self, id: BookingId) -> Result<Arc<Mutex<FlatPartition>>, LeaseholdError> {
        let not_found = || LeaseholdError::not_found(EntityKind::Booking, id);
        let flat = self.flats.flat_of_booking(id).ok_or_else(not_found)?;
        self.flats.cell(flat).ok_or_else(not_found)
    }

    /// Request to rent `flat_id` from `requested_date`.
    ///
    /// Fails with `NotFound` for an unknown user or flat, and with
    /// `Conflict` if the flat is leased or the user already has a pending
    /// booking on it.
    pub fn request_booking(
        &self,
        user_id: UserId,
        flat_id: FlatId,
        requested_date: NaiveDate,
    ) -> Result<Booking, LeaseholdError> {
        self.user(user_id)?;
        let not_found = || LeaseholdError::not_found(EntityKind::Flat, flat_id);
        let cell = self.flats.cell(flat_id).ok_or_else(not_found)?;
        let mut partition = cell.lock();
        if partition.retired {
            return Err(not_found());
        }
        if !partition.flat.is_available() {
            tracing::warn!(%user_id, %flat_id, "booking rejected: flat not available");
            return Err(LeaseholdError::conflict(format!(
                "flat {flat_id} is not available"
            )));
        }
        if let Some(existing) = partition.pending_booking_for(user_id) {
            tracing::warn!(%user_id, %flat_id, pending = %existing.id, "booking rejected: duplicate pending request");
            return Err(LeaseholdError::conflict(format!(
                "user {user_id} already has pending booking {} for flat {flat_id}",
                existing.id
            )));
        }
        let id: BookingId = self.ids.bookings.next();
        let booking = Booking::new_request(id, user_id, flat_id, requested_date, self.clock.now());
        partition.bookings.insert(id, booking.clone());
        self.flats.index_booking(id, flat_id);
        drop(partition);
        tracing::info!(booking_id = %id, %user_id, %flat_id, %requested_date, "booking requested");
        Ok(booking)
    }

    /// Approve a pending booking, opening a lease that starts on the
    /// requested date at the flat's current rent.
    ///
    /// `NotFound` if the booking does not exist, `InvalidState` if it is
    /// already decided, `Conflict` if the flat was leased in the meantime.
    pub fn approve_booking(
        &self,
        id: BookingId,
        actor: Option<UserId>,
    ) -> Result<Approval, LeaseholdError> {
        let cell = self.booking_cell(id)?;
        let mut partition = cell.lock();
        let now = self.clock.now();
        let mut booking = partition
            .bookings
            .get(&id)
            .cloned()
            .ok_or_else(|| LeaseholdError::not_found(EntityKind::Booking, id))?;
        booking.approve(actor, now)?;
        if !partition.flat.is_available() {
            tracing::warn!(booking_id = %id, flat_id = %booking.flat_id, "approval rejected: flat already leased");
            return Err(LeaseholdError::conflict(format!(
                "flat {} is no longer available",
                booking.flat_id
            )));
        }
        let terms = LeaseTerms {
            flat_id: booking.flat_id,
            user_id: booking.user_id,
            booking_id: id,
            start_date: booking.requested_date,
            monthly_rent: partition.flat.rent,
        };
        let lease = LeaseManager::create_lease(&mut partition, self.ids.leases.next(), terms, now)?;
        partition.bookings.insert(id, booking.clone());
        self.flats.index_lease(lease.id, lease.flat_id);
        drop(partition);
        tracing::info!(booking_id = %id, lease_id = %lease.id, actor = ?actor, "booking approved");
        Ok(Approval { booking, lease })
    }

    /// Decline a pending booking. The flat is untouched.
    pub fn decline_booking(
        &self,
        id: BookingId,
        actor: Option<UserId>,
    ) -> Result<Booking, LeaseholdError> {
        let cell = self.booking_cell(id)?;
        let mut partition = cell.lock();
        let booking = partition
            .bookings
            .get_mut(&id)
            .ok_or_else(|| LeaseholdError::not_found(EntityKind::Booking, id))?;
        booking.decline(actor, self.clock.now())?;
        let booking = booking.clone();
        drop(partition);
        tracing::info!(booking_id = %id, actor = ?actor, "booking declined");
        Ok(booking)
    }

    /// Fetch a booking.
    pub fn booking(&self, id: BookingId) -> Result<Booking, LeaseholdError> {
        let cell = self.booking_cell(id)?;
        let booking = cell.lock().bookings.get(&id).cloned();
        booking.ok_or_else(|| LeaseholdError::not_found(EntityKind::Booking, id))
    }

    /// Fetch a booking only if `user_id` made it. Other users' bookings are
    /// reported as not found.
    pub fn booking_for_user(
        &self,
        user_id: UserId,
        id: BookingId,
    ) -> Result<Booking, LeaseholdError> {
        self.booking(id)
            .ok()
            .filter(|b| b.user_id == user_id)
            .ok_or_else(|| LeaseholdError::not_found(EntityKind::Booking, id))
    }

    /// A user's bookings, newest first.
    pub fn bookings_for_user(&self, user_id: UserId) -> Result<Vec<Booking>, LeaseholdError> {
        self.user(user_id)?;
        let mut bookings: Vec<Booking> = self
            .flats
            .snapshot()
            .into_iter()
            .flat_map(|p| p.bookings.into_values())
            .filter(|b| b.user_id == user_id)
            .collect();
        newest_first(&mut bookings);
        Ok(bookings)
    }

    /// Every booking, newest first, optionally only those in `status`.
    pub fn bookings(&self, status: Option<BookingStatus>) -> Vec<Booking> {
        let mut bookings: Vec<Booking> = self
            .flats
            .snapshot()
            .into_iter()
            .flat_map(|p| p.bookings.into_values())
            .filter(|b| status.map_or(true, |s| b.status == s))
            .collect();
        newest_first(&mut bookings);
        bookings
    }

    /// A booking joined with its flat, requester and lease.
    pub fn booking_view(&self, id: BookingId) -> Result<BookingView, LeaseholdError> {
        let cell = self.booking_cell(id)?;
        let partition = cell.lock().clone();
        let towers = self.tower_names();
        let booking = partition
            .bookings
            .get(&id)
            .cloned()
            .ok_or_else(|| LeaseholdError::not_found(EntityKind::Booking, id))?;
        Ok(self.compose_view(booking, &partition, &towers))
    }

    /// Every booking joined with flat, requester and lease, newest first.
    pub fn booking_views(&self, status: Option<BookingStatus>) -> Vec<BookingView> {
        let towers = self.tower_names();
        let mut views: Vec<BookingView> = self
            .flats
            .snapshot()
            .iter()
            .flat_map(|partition| {
                partition
                    .bookings
                    .values()
                    .filter(|b| status.map_or(true, |s| b.status == s))
                    .map(|b| self.compose_view(b.clone(), partition, &towers))
                    .collect::<Vec<_>>()
            })
            .collect();
        views.sort_by(|a, b| {
            b.booking
                .created_at
                .cmp(&a.booking.created_at)
                .then(b.booking.id.cmp(&a.booking.id))
        });
        views
    }

    fn compose_view(
        &self,
        booking: Booking,
        partition: &FlatPartition,
        towers: &HashMap<TowerId, String>,
    ) -> BookingView {
        let lease = partition
            .leases
            .values()
            .find(|l| l.booking_id == booking.id)
            .cloned();
        let requester = self.users.get(&booking.user_id).as_ref().map(UserSummary::from);
        let flat = FlatSummary::of(
            &partition.flat,
            towers.get(&partition.flat.tower_id).map(String::as_str),
        );
        BookingView {
            booking,
            flat,
            requester,
            lease,
        }
    }

    pub(crate) fn tower_names(&self) -> HashMap<TowerId, String> {
        self.towers
            .list()
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{engine, flat_in, tower, user};
    use leasehold_core::Money;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn request_creates_pending_booking_without_touching_flat() {
        let e = engine();
        let t = tower(&e, "A", 3);
        let f = flat_in(&e, t.id, "101", 1500);
        let u = user(&e, "u@example.com");
        let b = e.request_booking(u.id, f.id, date(2026, 11, 1)).unwrap();
        assert_eq!(b.status, BookingStatus::Pending);
        assert!(e.flat(f.id).unwrap().is_available());
        assert_eq!(e.booking(b.id).unwrap(), b);
    }

    #[test]
    fn request_unknown_user_or_flat_is_not_found() {
        let e = engine();
        let t = tower(&e, "A", 3);
        let f = flat_in(&e, t.id, "101", 1500);
        let u = user(&e, "u@example.com");
        assert!(matches!(
            e.request_booking(UserId::new(999), f.id, date(2026, 11, 1)),
            Err(LeaseholdError::NotFound { kind: EntityKind::User, .. })
        ));
        assert!(matches!(
            e.request_booking(u.id, FlatId::new(999), date(2026, 11, 1)),
            Err(LeaseholdError::NotFound { kind: EntityKind::Flat, .. })
        ));
    }

    #[test]
    fn duplicate_pending_request_conflicts() {
        let e = engine();
        let t = tower(&e, "A", 3);
        let f = flat_in(&e, t.id, "101", 1500);
        let u = user(&e, "u@example.com");
        e.request_booking(u.id, f.id, date(2026, 11, 1)).unwrap();
        let err = e.request_booking(u.id, f.id, date(2026, 12, 1)).unwrap_err();
        assert!(matches!(err, LeaseholdError::Conflict(_)));
        assert_eq!(e.bookings(None).len(), 1);
    }

    #[test]
    fn rerequest_after_decline_is_allowed() {
        let e = engine();
        let t = tower(&e, "A", 3);
        let f = flat_in(&e, t.id, "101", 1500);
        let u = user(&e, "u@example.com");
        let first = e.request_booking(u.id, f.id, date(2026, 11, 1)).unwrap();
        e.decline_booking(first.id, None).unwrap();
        assert!(e.request_booking(u.id, f.id, date(2026, 11, 1)).is_ok());
    }

    #[test]
    fn approve_opens_lease_at_requested_date_and_rent() {
        let e = engine();
        let t = tower(&e, "A", 3);
        let f = flat_in(&e, t.id, "101", 1500);
        let u = user(&e, "u@example.com");
        let b = e.request_booking(u.id, f.id, date(2026, 11, 1)).unwrap();
        let approval = e.approve_booking(b.id, Some(UserId::new(1))).unwrap();
        assert_eq!(approval.booking.status, BookingStatus::Approved);
        assert_eq!(approval.lease.start_date, date(2026, 11, 1));
        assert_eq!(approval.lease.monthly_rent, Money::from_units(1500));
        assert_eq!(approval.lease.booking_id, b.id);
        assert!(!e.flat(f.id).unwrap().is_available());
        assert_eq!(e.lease(approval.lease.id).unwrap(), approval.lease);
    }

    #[test]
    fn approve_decided_booking_is_invalid_state() {
        let e = engine();
        let t = tower(&e, "A", 3);
        let f = flat_in(&e, t.id, "101", 1500);
        let u = user(&e, "u@example.com");
        let b = e.request_booking(u.id, f.id, date(2026, 11, 1)).unwrap();
        e.approve_booking(b.id, None).unwrap();
        assert!(matches!(
            e.approve_booking(b.id, None),
            Err(LeaseholdError::InvalidState(_))
        ));
        assert!(matches!(
            e.decline_booking(b.id, None),
            Err(LeaseholdError::InvalidState(_))
        ));
        assert_eq!(e.booking(b.id).unwrap().status, BookingStatus::Approved);
    }

    #[test]
    fn approve_second_booking_after_flat_leased_conflicts_without_partial_write() {
        let e = engine();
        let t = tower(&e, "A", 3);
        let f = flat_in(&e, t.id, "101", 1500);
        let a = user(&e, "a@example.com");
        let b = user(&e, "b@example.com");
        let first = e.request_booking(a.id, f.id, date(2026, 11, 1)).unwrap();
        let second = e.request_booking(b.id, f.id, date(2026, 11, 2)).unwrap();
        e.approve_booking(first.id, None).unwrap();
        let err = e.approve_booking(second.id, None).unwrap_err();
        assert!(matches!(err, LeaseholdError::Conflict(_)));
        assert_eq!(e.booking(second.id).unwrap().status, BookingStatus::Pending);
        let cell = e.flats.cell(f.id).unwrap();
        let partition = cell.lock();
        assert_eq!(partition.leases.len(), 1);
        assert!(partition.is_consistent());
    }

    #[test]
    fn decline_has_no_side_effect_on_flat() {
        let e = engine();
        let t = tower(&e, "A", 3);
        let f = flat_in(&e, t.id, "101", 1500);
        let a = user(&e, "a@example.com");
        let b = user(&e, "b@example.com");
        let first = e.request_booking(a.id, f.id, date(2026, 11, 1)).unwrap();
        let second = e.request_booking(b.id, f.id, date(2026, 11, 1)).unwrap();
        let declined = e.decline_booking(first.id, Some(UserId::new(1))).unwrap();
        assert_eq!(declined.status, BookingStatus::Declined);
        assert!(e.flat(f.id).unwrap().is_available());
        assert!(e.approve_booking(second.id, None).is_ok());
    }

    #[test]
    fn unknown_booking_is_not_found() {
        let e = engine();
        for result in [
            e.approve_booking(BookingId::new(4), None).map(|_| ()),
            e.decline_booking(BookingId::new(4), None).map(|_| ()),
            e.booking(BookingId::new(4)).map(|_| ()),
        ] {
            assert!(matches!(
                result,
                Err(LeaseholdError::NotFound { kind: EntityKind::Booking, id: 4 })
            ));
        }
    }

    #[test]
    fn user_scoped_queries() {
        let e = engine();
        let t = tower(&e, "A", 3);
        let f1 = flat_in(&e, t.id, "101", 1500);
        let f2 = flat_in(&e, t.id, "102", 1500);
        let a = user(&e, "a@example.com");
        let b = user(&e, "b@example.com");
        let a1 = e.request_booking(a.id, f1.id, date(2026, 11, 1)).unwrap();
        let a2 = e.request_booking(a.id, f2.id, date(2026, 11, 1)).unwrap();
        let b1 = e.request_booking(b.id, f1.id, date(2026, 11, 1)).unwrap();

        let mine: Vec<BookingId> = e
            .bookings_for_user(a.id)
            .unwrap()
            .iter()
            .map(|x| x.id)
            .collect();
        assert_eq!(mine, vec![a2.id, a1.id]);
        assert!(e.booking_for_user(a.id, a1.id).is_ok());
        assert!(matches!(
            e.booking_for_user(a.id, b1.id),
            Err(LeaseholdError::NotFound { kind: EntityKind::Booking, .. })
        ));
        assert_eq!(e.bookings(Some(BookingStatus::Pending)).len(), 3);
    }

    #[test]
    fn booking_view_includes_flat_requester_and_lease() {
        let e = engine();
        let t = tower(&e, "Harbor", 3);
        let f = flat_in(&e, t.id, "101", 1500);
        let u = user(&e, "u@example.com");
        let b = e.request_booking(u.id, f.id, date(2026, 11, 1)).unwrap();
        let pending = e.booking_view(b.id).unwrap();
        assert!(pending.lease.is_none());
        assert_eq!(pending.flat.tower_name, "Harbor");
        assert_eq!(pending.requester.as_ref().map(|r| r.id), Some(u.id));

        let approval = e.approve_booking(b.id, None).unwrap();
        let views = e.booking_views(None);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].lease.as_ref().map(|l| l.id), Some(approval.lease.id));
    }
}
