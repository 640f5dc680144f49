//! # Payment Ledger
//!
//! Rent receipts are captured outside this system. The engine only reads
//! them, through the [`PaymentLedger`] trait: one record per (lease,
//! calendar month) carrying the amount expected and the amount received.
//!
//! [`InMemoryLedger`] backs seeding, the CLI and tests.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use leasehold_core::{LeaseId, Money, YearMonth};

/// Settlement state of one month's rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Received at least what was expected.
    Paid,
    /// Received something, but less than expected.
    Partial,
    /// Received nothing.
    Unpaid,
}

/// One month of rent for one lease.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// The lease the rent is owed under.
    pub lease_id: LeaseId,
    /// The month the rent covers.
    pub month: YearMonth,
    /// Amount owed.
    pub expected: Money,
    /// Amount collected.
    pub received: Money,
}

impl PaymentRecord {
    /// Settlement state.
    pub fn status(&self) -> PaymentStatus {
        if self.received >= self.expected {
            PaymentStatus::Paid
        } else if self.received.is_zero() {
            PaymentStatus::Unpaid
        } else {
            PaymentStatus::Partial
        }
    }
}

/// Read access to captured rent payments.
pub trait PaymentLedger: Send + Sync {
    /// The record for `lease` in `month`, if one was captured.
    fn record(&self, lease: LeaseId, month: YearMonth) -> Option<PaymentRecord>;

    /// Every record captured for `lease`, in month order.
    fn records_for_lease(&self, lease: LeaseId) -> Vec<PaymentRecord>;
}

/// A ledger held in memory.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    records: RwLock<BTreeMap<(LeaseId, YearMonth), PaymentRecord>>,
}

impl InMemoryLedger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for its (lease, month).
    pub fn upsert(&self, record: PaymentRecord) -> Option<PaymentRecord> {
        self.records
            .write()
            .insert((record.lease_id, record.month), record)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the ledger holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PaymentLedger for InMemoryLedger {
    fn record(&self, lease: LeaseId, month: YearMonth) -> Option<PaymentRecord> {
        self.records.read().get(&(lease, month)).cloned()
    }

    fn records_for_lease(&self, lease: LeaseId) -> Vec<PaymentRecord> {
        self.records
            .read()
            .range((lease, YearMonth::MIN)..=(lease, YearMonth::MAX))
            .map(|(_, r)| r.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(lease: u64, month: &str, expected: u64, received: u64) -> PaymentRecord {
        PaymentRecord {
            lease_id: LeaseId::new(lease),
            month: month.parse().unwrap(),
            expected: Money::from_units(expected),
            received: Money::from_units(received),
        }
    }

    #[test]
    fn status_classification() {
        assert_eq!(record(1, "2026-01", 100, 100).status(), PaymentStatus::Paid);
        assert_eq!(record(1, "2026-01", 100, 120).status(), PaymentStatus::Paid);
        assert_eq!(record(1, "2026-01", 100, 40).status(), PaymentStatus::Partial);
        assert_eq!(record(1, "2026-01", 100, 0).status(), PaymentStatus::Unpaid);
    }

    #[test]
    fn upsert_replaces_same_month() {
        let ledger = InMemoryLedger::new();
        assert!(ledger.upsert(record(1, "2026-01", 100, 0)).is_none());
        assert!(ledger.upsert(record(1, "2026-01", 100, 100)).is_some());
        assert_eq!(ledger.len(), 1);
        let r = ledger.record(LeaseId::new(1), "2026-01".parse().unwrap()).unwrap();
        assert_eq!(r.status(), PaymentStatus::Paid);
    }

    #[test]
    fn records_for_lease_only_that_lease_in_month_order() {
        let ledger = InMemoryLedger::new();
        ledger.upsert(record(2, "2026-03", 100, 100));
        ledger.upsert(record(1, "2026-02", 100, 100));
        ledger.upsert(record(2, "2025-12", 100, 50));
        ledger.upsert(record(3, "2026-01", 100, 0));
        let months: Vec<String> = ledger
            .records_for_lease(LeaseId::new(2))
            .iter()
            .map(|r| r.month.to_string())
            .collect();
        assert_eq!(months, vec!["2025-12", "2026-03"]);
    }
}
