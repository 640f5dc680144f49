//! # Seed Documents
//!
//! YAML description of a starting data set: users, amenities, towers with
//! their flats, bookings to replay, and ledger records.
//!
//! Bookings are replayed through [`Engine::request_booking`],
//! [`Engine::approve_booking`], [`Engine::decline_booking`] and
//! [`Engine::terminate_lease`] in document order, so a seed can never
//! produce a state the live workflow could not. References between sections
//! use natural keys (email, tower name, unit number, amenity name).
//!
//! Amounts should be quoted (`"1500.00"`) or whole integers. Negative amounts
//! and fractions of a cent are rejected.
//!
//! ```yaml
//! users:
//!   - { email: admin@example.com, name: Admin, role: admin }
//!   - { email: tenant@example.com, name: Tess }
//! amenities:
//!   - { name: Gym, type: gym, hours: "06:00-22:00" }
//! towers:
//!   - name: Tower A
//!     total_floors: 10
//!     amenities: [Gym]
//!     flats:
//!       - { unit_number: "101", floor: 1, bedrooms: 2, bathrooms: 1, rent: "1500.00" }
//! bookings:
//!   - { user: tenant@example.com, tower: Tower A, unit: "101", requested_date: 2026-05-01, decision: approved }
//! payments:
//!   - { user: tenant@example.com, tower: Tower A, unit: "101", month: 2026-09, received: "1500.00" }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use leasehold_core::{AmenityId, FlatId, LeaseholdError, Money, TowerId, YearMonth};

use crate::catalog::{AmenityType, NewAmenity, NewFlat, NewTower};
use crate::directory::{NewUser, Role};
use crate::ledger::{InMemoryLedger, PaymentRecord};
use crate::Engine;

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors while loading or applying a seed.
#[derive(Error, Debug)]
pub enum SeedError {
    /// The seed file could not be read.
    #[error("failed to read seed file {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The document is not a valid seed.
    #[error("invalid seed document: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A record was rejected by the engine.
    #[error("{context}: {source}")]
    Domain {
        /// Which record failed.
        context: String,
        /// The engine's error.
        source: LeaseholdError,
    },

    /// A natural-key reference names nothing declared earlier.
    #[error("unknown {kind} {name:?}")]
    UnknownReference {
        /// Kind of record referenced.
        kind: &'static str,
        /// The key used.
        name: String,
    },

    /// Two records share a natural key that must be unique in the seed.
    #[error("duplicate {kind} {name:?}")]
    Duplicate {
        /// Kind of record.
        kind: &'static str,
        /// The repeated key.
        name: String,
    },
}

trait Context<T> {
    fn context(self, what: impl FnOnce() -> String) -> Result<T, SeedError>;
}

impl<T> Context<T> for Result<T, LeaseholdError> {
    fn context(self, what: impl FnOnce() -> String) -> Result<T, SeedError> {
        self.map_err(|source| SeedError::Domain {
            context: what(),
            source,
        })
    }
}

// ─── Document ────────────────────────────────────────────────────────

/// A seed document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Seed {
    /// Users to register.
    #[serde(default)]
    pub users: Vec<SeedUser>,
    /// Amenities to create.
    #[serde(default)]
    pub amenities: Vec<SeedAmenity>,
    /// Towers, each with its flats.
    #[serde(default)]
    pub towers: Vec<SeedTower>,
    /// Bookings to replay, in order.
    #[serde(default)]
    pub bookings: Vec<SeedBooking>,
    /// Ledger records.
    #[serde(default)]
    pub payments: Vec<SeedPayment>,
}

/// A user in a seed.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedUser {
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Role; defaults to `user`.
    #[serde(default)]
    pub role: Role,
}

/// An amenity in a seed.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedAmenity {
    /// Display name; referenced by towers.
    pub name: String,
    /// Category.
    #[serde(rename = "type")]
    pub amenity_type: AmenityType,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Opening hours.
    #[serde(default)]
    pub hours: Option<String>,
    /// Usage fee.
    #[serde(default)]
    pub fee: Option<Money>,
}

/// A tower in a seed.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedTower {
    /// Display name; referenced by bookings and payments.
    pub name: String,
    /// Street address.
    #[serde(default)]
    pub address: String,
    /// Number of floors.
    pub total_floors: u32,
    /// Nominal flats per floor.
    #[serde(default)]
    pub flats_per_floor: Option<u32>,
    /// Amenity names.
    #[serde(default)]
    pub amenities: Vec<String>,
    /// Flats in this tower.
    #[serde(default)]
    pub flats: Vec<SeedFlat>,
}

/// A flat in a seed tower.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedFlat {
    /// Unit number.
    pub unit_number: String,
    /// Floor.
    pub floor: u32,
    /// Bedrooms.
    #[serde(default)]
    pub bedrooms: u32,
    /// Bathrooms.
    #[serde(default)]
    pub bathrooms: u32,
    /// Floor area.
    #[serde(default)]
    pub area_sqft: Option<u32>,
    /// Monthly rent.
    pub rent: Money,
}

/// What to do with a replayed booking after requesting it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedDecision {
    /// Leave it pending.
    #[default]
    Pending,
    /// Approve it.
    Approved,
    /// Decline it.
    Declined,
}

/// A booking to replay.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedBooking {
    /// Requesting user's email.
    pub user: String,
    /// Tower name.
    pub tower: String,
    /// Unit number within the tower.
    pub unit: String,
    /// Requested move-in date.
    pub requested_date: NaiveDate,
    /// Decision to apply.
    #[serde(default)]
    pub decision: SeedDecision,
    /// Terminate the resulting lease on this date.
    #[serde(default)]
    pub terminated_on: Option<NaiveDate>,
}

/// A ledger record for a tenant's lease on a flat.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedPayment {
    /// Tenant's email.
    pub user: String,
    /// Tower name.
    pub tower: String,
    /// Unit number.
    pub unit: String,
    /// Month covered.
    pub month: YearMonth,
    /// Amount owed; defaults to the lease's rent.
    #[serde(default)]
    pub expected: Option<Money>,
    /// Amount collected.
    pub received: Money,
}

/// Counts of what a seed created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    /// Users registered.
    pub users: usize,
    /// Amenities created.
    pub amenities: usize,
    /// Towers created.
    pub towers: usize,
    /// Flats created.
    pub flats: usize,
    /// Bookings replayed.
    pub bookings: usize,
    /// Leases opened.
    pub leases: usize,
    /// Ledger records written.
    pub payments: usize,
}

impl Seed {
    /// Parse a YAML seed.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a YAML seed file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Create every record in `engine` and write payments to `ledger`.
    ///
    /// Stops at the first failure; records created before it remain.
    pub fn apply(&self, engine: &Engine, ledger: &InMemoryLedger) -> Result<SeedSummary, SeedError> {
        let mut summary = SeedSummary::default();

        let mut users = HashMap::new();
        for u in &self.users {
            let key = u.email.trim().to_ascii_lowercase();
            let user = engine
                .add_user(
                    NewUser {
                        email: u.email.clone(),
                        name: u.name.clone(),
                        phone: u.phone.clone(),
                    },
                    u.role,
                )
                .context(|| format!("user {}", u.email))?;
            users.insert(key, user.id);
            summary.users += 1;
        }

        let mut amenities: HashMap<&str, AmenityId> = HashMap::new();
        for a in &self.amenities {
            if amenities.contains_key(a.name.as_str()) {
                return Err(SeedError::Duplicate {
                    kind: "amenity",
                    name: a.name.clone(),
                });
            }
            let amenity = engine
                .create_amenity(NewAmenity {
                    name: a.name.clone(),
                    amenity_type: a.amenity_type,
                    description: a.description.clone(),
                    hours: a.hours.clone(),
                    fee: a.fee,
                })
                .context(|| format!("amenity {}", a.name))?;
            amenities.insert(a.name.as_str(), amenity.id);
            summary.amenities += 1;
        }

        let mut flats: HashMap<(String, String), FlatId> = HashMap::new();
        let mut towers: HashMap<&str, TowerId> = HashMap::new();
        for t in &self.towers {
            if towers.contains_key(t.name.as_str()) {
                return Err(SeedError::Duplicate {
                    kind: "tower",
                    name: t.name.clone(),
                });
            }
            let amenity_ids = t
                .amenities
                .iter()
                .map(|name| {
                    amenities
                        .get(name.as_str())
                        .copied()
                        .ok_or_else(|| SeedError::UnknownReference {
                            kind: "amenity",
                            name: name.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let tower = engine
                .create_tower(NewTower {
                    name: t.name.clone(),
                    address: t.address.clone(),
                    total_floors: t.total_floors,
                    flats_per_floor: t.flats_per_floor,
                    amenity_ids,
                })
                .context(|| format!("tower {}", t.name))?;
            towers.insert(t.name.as_str(), tower.id);
            summary.towers += 1;

            for f in &t.flats {
                let flat = engine
                    .create_flat(NewFlat {
                        tower_id: tower.id,
                        unit_number: f.unit_number.clone(),
                        floor: f.floor,
                        bedrooms: f.bedrooms,
                        bathrooms: f.bathrooms,
                        area_sqft: f.area_sqft,
                        rent: f.rent,
                    })
                    .context(|| format!("flat {} in tower {}", f.unit_number, t.name))?;
                flats.insert((t.name.clone(), f.unit_number.trim().to_string()), flat.id);
                summary.flats += 1;
            }
        }

        let user_ref = |email: &str| {
            users
                .get(&email.trim().to_ascii_lowercase())
                .copied()
                .ok_or_else(|| SeedError::UnknownReference {
                    kind: "user",
                    name: email.to_string(),
                })
        };
        let flat_ref = |tower: &str, unit: &str| {
            flats
                .get(&(tower.to_string(), unit.trim().to_string()))
                .copied()
                .ok_or_else(|| SeedError::UnknownReference {
                    kind: "flat",
                    name: format!("{tower}/{unit}"),
                })
        };

        for (n, b) in self.bookings.iter().enumerate() {
            let context = || format!("booking #{} ({} on {}/{})", n + 1, b.user, b.tower, b.unit);
            let user_id = user_ref(&b.user)?;
            let flat_id = flat_ref(&b.tower, &b.unit)?;
            let booking = engine
                .request_booking(user_id, flat_id, b.requested_date)
                .context(context)?;
            summary.bookings += 1;
            match b.decision {
                SeedDecision::Pending => {}
                SeedDecision::Declined => {
                    engine.decline_booking(booking.id, None).context(context)?;
                }
                SeedDecision::Approved => {
                    let approval = engine.approve_booking(booking.id, None).context(context)?;
                    summary.leases += 1;
                    if let Some(end) = b.terminated_on {
                        engine
                            .terminate_lease(approval.lease.id, Some(end))
                            .context(context)?;
                    }
                }
            }
        }

        for p in &self.payments {
            let user_id = user_ref(&p.user)?;
            let flat_id = flat_ref(&p.tower, &p.unit)?;
            let lease = engine
                .flats
                .cell(flat_id)
                .and_then(|cell| {
                    cell.lock()
                        .leases
                        .values()
                        .filter(|l| l.user_id == user_id)
                        .max_by_key(|l| (l.start_date, l.id))
                        .cloned()
                })
                .ok_or_else(|| SeedError::UnknownReference {
                    kind: "lease",
                    name: format!("{} on {}/{}", p.user, p.tower, p.unit),
                })?;
            ledger.upsert(PaymentRecord {
                lease_id: lease.id,
                month: p.month,
                expected: p.expected.unwrap_or(lease.monthly_rent),
                received: p.received,
            });
            summary.payments += 1;
        }

        tracing::info!(
            users = summary.users,
            towers = summary.towers,
            flats = summary.flats,
            bookings = summary.bookings,
            leases = summary.leases,
            payments = summary.payments,
            "seed applied"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use leasehold_core::FixedClock;
    use leasehold_state::{BookingStatus, LeaseStatus};

    use crate::testing::today;

    const SEED: &str = r#"
users:
  - { email: admin@example.com, name: Admin, role: admin }
  - { email: tess@example.com, name: Tess }
  - { email: omar@example.com, name: Omar, phone: "555-0100" }
amenities:
  - { name: Gym, type: gym, hours: "06:00-22:00" }
  - { name: Garage, type: parking, fee: "25.00" }
towers:
  - name: Tower A
    address: 1 Main St
    total_floors: 5
    amenities: [Gym, Garage]
    flats:
      - { unit_number: "101", floor: 1, bedrooms: 2, bathrooms: 1, rent: "1500.00" }
      - { unit_number: "102", floor: 1, bedrooms: 1, bathrooms: 1, rent: 1100 }
  - name: Tower B
    total_floors: 3
    flats:
      - { unit_number: "301", floor: 3, bedrooms: 3, bathrooms: 2, area_sqft: 1400, rent: "2100.50" }
bookings:
  - { user: tess@example.com, tower: Tower A, unit: "101", requested_date: 2026-01-01, decision: approved, terminated_on: 2026-06-30 }
  - { user: omar@example.com, tower: Tower A, unit: "101", requested_date: 2026-07-01, decision: approved }
  - { user: tess@example.com, tower: Tower B, unit: "301", requested_date: 2026-08-01, decision: declined }
  - { user: tess@example.com, tower: Tower A, unit: "102", requested_date: 2026-11-01 }
payments:
  - { user: omar@example.com, tower: Tower A, unit: "101", month: 2026-09, received: "1500.00" }
  - { user: tess@example.com, tower: Tower A, unit: "101", month: 2026-06, received: 0 }
"#;

    fn fresh() -> (Engine, Arc<InMemoryLedger>) {
        let ledger = Arc::new(InMemoryLedger::new());
        let engine = Engine::new()
            .with_clock(Arc::new(FixedClock::on(today())))
            .with_ledger(ledger.clone());
        (engine, ledger)
    }

    #[test]
    fn applies_full_document() {
        let (engine, ledger) = fresh();
        let summary = Seed::from_yaml_str(SEED)
            .unwrap()
            .apply(&engine, &ledger)
            .unwrap();
        assert_eq!(
            summary,
            SeedSummary {
                users: 3,
                amenities: 2,
                towers: 2,
                flats: 3,
                bookings: 4,
                leases: 2,
                payments: 2,
            }
        );
        assert_eq!(engine.user_by_email("admin@example.com").unwrap().role, Role::Admin);
        assert_eq!(engine.bookings(Some(BookingStatus::Pending)).len(), 1);

        let occupancy = engine.occupancy_report();
        assert_eq!(occupancy[0].occupied_flats, 1);
        assert_eq!(occupancy[1].occupied_flats, 0);

        let tess = engine.user_by_email("tess@example.com").unwrap();
        let details = engine.tenant_details(tess.id).unwrap();
        assert_eq!(details.leases.len(), 1);
        assert_eq!(details.leases[0].lease.status, LeaseStatus::Terminated);
        assert_eq!(details.payment_history.len(), 1);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn unknown_reference_is_reported() {
        let (engine, ledger) = fresh();
        let seed = Seed::from_yaml_str(
            "towers:\n  - { name: T, total_floors: 1, amenities: [Sauna] }\n",
        )
        .unwrap();
        let err = seed.apply(&engine, &ledger).unwrap_err();
        assert!(matches!(err, SeedError::UnknownReference { kind: "amenity", .. }));
    }

    #[test]
    fn workflow_rules_apply_to_replayed_bookings() {
        let (engine, ledger) = fresh();
        let seed = Seed::from_yaml_str(
            r#"
users:
  - { email: a@example.com, name: A }
  - { email: b@example.com, name: B }
towers:
  - name: T
    total_floors: 1
    flats:
      - { unit_number: "1", floor: 1, rent: "900" }
bookings:
  - { user: a@example.com, tower: T, unit: "1", requested_date: 2026-01-01, decision: approved }
  - { user: b@example.com, tower: T, unit: "1", requested_date: 2026-02-01 }
"#,
        )
        .unwrap();
        let err = seed.apply(&engine, &ledger).unwrap_err();
        match err {
            SeedError::Domain { context, source } => {
                assert!(context.contains("booking #2"));
                assert!(matches!(source, LeaseholdError::Conflict(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_unknown_fields_and_bad_amounts() {
        assert!(matches!(
            Seed::from_yaml_str("userz: []\n"),
            Err(SeedError::Parse(_))
        ));
        for rent in ["\"12.345\"", "\"-5.00\""] {
            let yaml = format!(
                "towers:\n  - name: T\n    total_floors: 1\n    flats:\n      - {{ unit_number: \"1\", floor: 1, rent: {rent} }}\n"
            );
            assert!(
                matches!(Seed::from_yaml_str(&yaml), Err(SeedError::Parse(_))),
                "rent {rent}"
            );
        }
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = Seed::load("/nonexistent/leasehold-seed.yaml").unwrap_err();
        assert!(matches!(err, SeedError::Io { .. }));
    }
}
