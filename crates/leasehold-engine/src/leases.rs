//! # Lease Manager
//!
//! Owns lease creation and termination, and with them the flat
//! availability flag. [`LeaseManager::create_lease`] and
//! [`LeaseManager::terminate_lease`] are the only writers of
//! `Flat::is_available`; both operate on a partition the caller has already
//! locked, so the lease write and the flag flip land together.

use chrono::{DateTime, NaiveDate, Utc};

use leasehold_core::{EntityKind, LeaseId, LeaseholdError};
use leasehold_state::{Lease, LeaseTerms};

use crate::partition::FlatPartition;
use crate::Engine;

/// Lease creation and termination on a locked flat partition.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeaseManager;

impl LeaseManager {
    /// Open a lease and mark the flat unavailable.
    ///
    /// Fails with `Conflict` if the flat already has an active lease. The
    /// partition is unchanged on failure.
    pub(crate) fn create_lease(
        partition: &mut FlatPartition,
        id: LeaseId,
        terms: LeaseTerms,
        at: DateTime<Utc>,
    ) -> Result<Lease, LeaseholdError> {
        if let Some(active) = partition.active_lease() {
            tracing::warn!(
                flat_id = %partition.flat.id,
                active_lease = %active.id,
                "lease creation rejected: flat already leased"
            );
            return Err(LeaseholdError::conflict(format!(
                "flat {} already has active lease {}",
                partition.flat.id, active.id
            )));
        }
        let lease = Lease::activate(id, terms, at);
        partition.leases.insert(id, lease.clone());
        partition.flat.set_available(false);
        tracing::info!(
            lease_id = %id,
            flat_id = %lease.flat_id,
            user_id = %lease.user_id,
            start = %lease.start_date,
            rent = %lease.monthly_rent,
            "lease created"
        );
        Ok(lease)
    }

    /// Terminate a lease and reopen the flat.
    pub(crate) fn terminate_lease(
        partition: &mut FlatPartition,
        id: LeaseId,
        end_date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<Lease, LeaseholdError> {
        let lease = partition
            .leases
            .get_mut(&id)
            .ok_or_else(|| LeaseholdError::not_found(EntityKind::Lease, id))?;
        lease.terminate(end_date, at)?;
        let lease = lease.clone();
        let reopened = partition.active_lease().is_none();
        partition.flat.set_available(reopened);
        tracing::info!(lease_id = %id, flat_id = %lease.flat_id, end = %end_date, "lease terminated");
        Ok(lease)
    }
}

impl Engine {
    /// Fetch a lease.
    pub fn lease(&self, id: LeaseId) -> Result<Lease, LeaseholdError> {
        let not_found = || LeaseholdError::not_found(EntityKind::Lease, id);
        let flat = self.flats.flat_of_lease(id).ok_or_else(not_found)?;
        let cell = self.flats.cell(flat).ok_or_else(not_found)?;
        let lease = cell.lock().leases.get(&id).cloned();
        lease.ok_or_else(not_found)
    }

    /// Terminate a lease on `end_date` (today when absent) and make its flat
    /// available again.
    pub fn terminate_lease(
        &self,
        id: LeaseId,
        end_date: Option<NaiveDate>,
    ) -> Result<Lease, LeaseholdError> {
        let not_found = || LeaseholdError::not_found(EntityKind::Lease, id);
        let flat = self.flats.flat_of_lease(id).ok_or_else(not_found)?;
        let cell = self.flats.cell(flat).ok_or_else(not_found)?;
        let end_date = end_date.unwrap_or_else(|| self.clock.today());
        let mut partition = cell.lock();
        LeaseManager::terminate_lease(&mut partition, id, end_date, self.clock.now())
    }
}
