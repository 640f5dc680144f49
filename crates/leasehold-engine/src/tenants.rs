//! # Tenant View
//!
//! Read-only joins of a user with the leases they hold, each lease enriched
//! with its flat, and with their payment history from the ledger.

use std::collections::HashMap;

use serde::Serialize;

use leasehold_core::{EntityKind, LeaseId, LeaseholdError, Money, TowerId, UserId, YearMonth};
use leasehold_state::Lease;

use crate::catalog::FlatSummary;
use crate::directory::User;
use crate::ledger::{PaymentLedger, PaymentStatus};
use crate::reporting::Snapshot;
use crate::Engine;

/// A lease with its flat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantLease {
    /// The lease.
    #[serde(flatten)]
    pub lease: Lease,
    /// The leased flat.
    pub flat: FlatSummary,
}

/// One month of rent in a tenant's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentHistoryEntry {
    /// The lease the rent was owed under.
    pub lease_id: LeaseId,
    /// Label such as `"October 2026"`.
    pub month: String,
    /// The month as `YYYY-MM`.
    pub period: YearMonth,
    /// Amount owed.
    pub amount: Money,
    /// Amount collected.
    pub received: Money,
    /// Settlement state.
    pub status: PaymentStatus,
}

/// Everything an administrator sees about one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantDetails {
    /// The user.
    pub user: User,
    /// All leases, active and terminated, latest start first.
    pub leases: Vec<TenantLease>,
    /// How many of `leases` are active.
    pub active_leases_count: usize,
    /// Ledger records for those leases, newest month first.
    pub payment_history: Vec<PaymentHistoryEntry>,
}

/// A tenant in the tenant listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantSummary {
    /// The user.
    pub user: User,
    /// Their active leases.
    pub active_leases: Vec<TenantLease>,
}

/// Tenant joins over one snapshot.
pub struct TenantView<'a> {
    snapshot: &'a Snapshot,
    ledger: &'a dyn PaymentLedger,
    towers: HashMap<TowerId, &'a str>,
}

impl<'a> TenantView<'a> {
    /// Joins over `snapshot`, reading payments from `ledger`.
    pub fn new(snapshot: &'a Snapshot, ledger: &'a dyn PaymentLedger) -> Self {
        let towers = snapshot
            .towers
            .iter()
            .map(|t| (t.id, t.name.as_str()))
            .collect();
        Self {
            snapshot,
            ledger,
            towers,
        }
    }

    fn leases_of(&self, user: UserId) -> Vec<TenantLease> {
        let mut leases: Vec<TenantLease> = self
            .snapshot
            .flats
            .iter()
            .flat_map(|p| {
                p.leases
                    .values()
                    .filter(move |l| l.user_id == user)
                    .map(move |l| TenantLease {
                        lease: l.clone(),
                        flat: FlatSummary::of(&p.flat, self.towers.get(&p.flat.tower_id).copied()),
                    })
            })
            .collect();
        leases.sort_by(|a, b| {
            b.lease
                .start_date
                .cmp(&a.lease.start_date)
                .then(b.lease.id.cmp(&a.lease.id))
        });
        leases
    }

    /// The user, their leases and payment history.
    pub fn details(&self, user_id: UserId) -> Result<TenantDetails, LeaseholdError> {
        let user = self
            .snapshot
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| LeaseholdError::not_found(EntityKind::User, user_id))?;
        let leases = self.leases_of(user_id);
        let mut payment_history: Vec<PaymentHistoryEntry> = leases
            .iter()
            .flat_map(|l| self.ledger.records_for_lease(l.lease.id))
            .map(|r| PaymentHistoryEntry {
                lease_id: r.lease_id,
                month: r.month.label(),
                period: r.month,
                amount: r.expected,
                received: r.received,
                status: r.status(),
            })
            .collect();
        payment_history.sort_by(|a, b| b.period.cmp(&a.period).then(a.lease_id.cmp(&b.lease_id)));
        Ok(TenantDetails {
            active_leases_count: leases.iter().filter(|l| l.lease.is_active()).count(),
            user,
            leases,
            payment_history,
        })
    }

    /// Users holding at least one active lease, in user id order.
    pub fn tenants(&self) -> Vec<TenantSummary> {
        self.snapshot
            .users
            .iter()
            .filter_map(|user| {
                let active: Vec<TenantLease> = self
                    .leases_of(user.id)
                    .into_iter()
                    .filter(|l| l.lease.is_active())
                    .collect();
                (!active.is_empty()).then(|| TenantSummary {
                    user: user.clone(),
                    active_leases: active,
                })
            })
            .collect()
    }
}

impl Engine {
    /// A tenant's profile, leases and payment history.
    pub fn tenant_details(&self, user_id: UserId) -> Result<TenantDetails, LeaseholdError> {
        let snapshot = self.snapshot();
        TenantView::new(&snapshot, self.ledger.as_ref()).details(user_id)
    }

    /// Users with at least one active lease.
    pub fn tenants(&self) -> Vec<TenantSummary> {
        let snapshot = self.snapshot();
        TenantView::new(&snapshot, self.ledger.as_ref()).tenants()
    }
}
