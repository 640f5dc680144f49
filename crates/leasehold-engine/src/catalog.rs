//! # Catalog
//!
//! Towers, flats and amenities: the reference data the workflow runs
//! against.
//!
//! Catalog writes never touch a flat's availability. The only code that
//! flips it is [`crate::leases::LeaseManager`]. Flat updates therefore take
//! a [`FlatUpdate`] that has no availability field at all.
//!
//! ## Locking
//!
//! Cross-flat checks (unit number uniqueness within a tower, "tower still
//! owns flats", floors above a shrunk tower) run under the flat map's write
//! lock, so they serialize against flat creation and deletion. Single-flat
//! reads lock only that flat.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use leasehold_core::{
    AmenityId, EntityKind, FlatId, LeaseholdError, Money, TowerId, ValidationError,
};

use crate::partition::{FlatEntry, FlatPartition};
use crate::Engine;

/// Default number of flats per floor when a tower does not say.
pub const DEFAULT_FLATS_PER_FLOOR: u32 = 4;

// ─── Amenities ───────────────────────────────────────────────────────

/// Category of an amenity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmenityType {
    /// Fitness room.
    Gym,
    /// Swimming pool.
    Pool,
    /// Parking space.
    Parking,
    /// Shared common area.
    Common,
}

impl std::str::FromStr for AmenityType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gym" => Ok(Self::Gym),
            "pool" => Ok(Self::Pool),
            "parking" => Ok(Self::Parking),
            "common" => Ok(Self::Common),
            _ => Err(ValidationError::InvalidAmenityType(s.to_string())),
        }
    }
}

/// A facility that towers may offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Amenity {
    /// Unique identifier.
    pub id: AmenityId,
    /// Display name.
    pub name: String,
    /// Category.
    #[serde(rename = "type")]
    pub amenity_type: AmenityType,
    /// Free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Opening hours, free text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
    /// Usage fee, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<Money>,
}

/// Input for creating an amenity.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAmenity {
    /// Display name.
    pub name: String,
    /// Category.
    #[serde(rename = "type")]
    pub amenity_type: AmenityType,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Opening hours.
    #[serde(default)]
    pub hours: Option<String>,
    /// Usage fee.
    #[serde(default)]
    pub fee: Option<Money>,
}

impl NewAmenity {
    /// Check required fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name).map(drop)
    }
}

/// Partial amenity update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AmenityUpdate {
    /// New name.
    #[serde(default)]
    pub name: Option<String>,
    /// New category.
    #[serde(default, rename = "type")]
    pub amenity_type: Option<AmenityType>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New hours.
    #[serde(default)]
    pub hours: Option<String>,
    /// New fee.
    #[serde(default)]
    pub fee: Option<Money>,
}

impl AmenityUpdate {
    /// Check the fields that are present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        Ok(())
    }
}

// ─── Towers ──────────────────────────────────────────────────────────

/// A residential building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tower {
    /// Unique identifier.
    pub id: TowerId,
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Number of floors; flats sit on floors `1..=total_floors`.
    pub total_floors: u32,
    /// Nominal flats per floor.
    pub flats_per_floor: u32,
    /// Amenities offered.
    pub amenity_ids: BTreeSet<AmenityId>,
    /// When the tower was added.
    pub created_at: DateTime<Utc>,
}

/// A tower with its amenities resolved and flat counts.
#[derive(Debug, Clone, Serialize)]
pub struct TowerDetails {
    /// The tower record.
    #[serde(flatten)]
    pub tower: Tower,
    /// Amenities offered, in id order.
    pub amenities: Vec<Amenity>,
    /// Flats in the tower.
    pub total_flats: usize,
    /// Flats currently open for booking.
    pub available_flats: usize,
}

/// Input for creating a tower.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTower {
    /// Display name.
    pub name: String,
    /// Street address.
    #[serde(default)]
    pub address: String,
    /// Number of floors.
    pub total_floors: u32,
    /// Nominal flats per floor; defaults to 4.
    #[serde(default)]
    pub flats_per_floor: Option<u32>,
    /// Amenities offered.
    #[serde(default)]
    pub amenity_ids: Vec<AmenityId>,
}

impl NewTower {
    /// Check required fields and bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_positive("total_floors", self.total_floors)?;
        if let Some(n) = self.flats_per_floor {
            require_positive("flats_per_floor", n)?;
        }
        Ok(())
    }
}

/// Partial tower update. A present `amenity_ids` replaces the whole set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TowerUpdate {
    /// New name.
    #[serde(default)]
    pub name: Option<String>,
    /// New address.
    #[serde(default)]
    pub address: Option<String>,
    /// New floor count.
    #[serde(default)]
    pub total_floors: Option<u32>,
    /// New flats per floor.
    #[serde(default)]
    pub flats_per_floor: Option<u32>,
    /// Replacement amenity set.
    #[serde(default)]
    pub amenity_ids: Option<Vec<AmenityId>>,
}

impl TowerUpdate {
    /// Check the fields that are present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        if let Some(n) = self.total_floors {
            require_positive("total_floors", n)?;
        }
        if let Some(n) = self.flats_per_floor {
            require_positive("flats_per_floor", n)?;
        }
        Ok(())
    }
}

// ─── Flats ───────────────────────────────────────────────────────────

/// A rentable unit inside a tower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flat {
    /// Unique identifier.
    pub id: FlatId,
    /// Owning tower.
    pub tower_id: TowerId,
    /// Unit number, unique within the tower.
    pub unit_number: String,
    /// Floor, within `1..=tower.total_floors`.
    pub floor: u32,
    /// Bedroom count.
    pub bedrooms: u32,
    /// Bathroom count.
    pub bathrooms: u32,
    /// Floor area in square feet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_sqft: Option<u32>,
    /// Monthly rent asked for new leases.
    pub rent: Money,
    is_available: bool,
    /// When the flat was added.
    pub created_at: DateTime<Utc>,
}

impl Flat {
    /// Whether the flat is open for booking, i.e. has no active lease.
    pub fn is_available(&self) -> bool {
        self.is_available
    }

    pub(crate) fn set_available(&mut self, available: bool) {
        self.is_available = available;
    }
}

/// Flat fields shown next to bookings and leases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatSummary {
    /// Flat identifier.
    pub flat_id: FlatId,
    /// Owning tower.
    pub tower_id: TowerId,
    /// Tower display name; empty if the tower record is gone.
    pub tower_name: String,
    /// Unit number.
    pub unit_number: String,
    /// Floor.
    pub floor: u32,
    /// Bedroom count.
    pub bedrooms: u32,
    /// Current asking rent.
    pub rent: Money,
}

impl FlatSummary {
    pub(crate) fn of(flat: &Flat, tower_name: Option<&str>) -> Self {
        Self {
            flat_id: flat.id,
            tower_id: flat.tower_id,
            tower_name: tower_name.unwrap_or_default().to_string(),
            unit_number: flat.unit_number.clone(),
            floor: flat.floor,
            bedrooms: flat.bedrooms,
            rent: flat.rent,
        }
    }
}

/// Input for creating a flat.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFlat {
    /// Owning tower.
    pub tower_id: TowerId,
    /// Unit number.
    pub unit_number: String,
    /// Floor.
    pub floor: u32,
    /// Bedroom count.
    #[serde(default)]
    pub bedrooms: u32,
    /// Bathroom count.
    #[serde(default)]
    pub bathrooms: u32,
    /// Floor area.
    #[serde(default)]
    pub area_sqft: Option<u32>,
    /// Monthly rent.
    pub rent: Money,
}

impl NewFlat {
    /// Check required fields and bounds that do not depend on the tower.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("unit_number", &self.unit_number)?;
        require_positive("floor", self.floor)?;
        if self.rent.is_zero() {
            return Err(ValidationError::NotPositive("rent"));
        }
        Ok(())
    }
}

/// Partial flat update. Availability and tower are not updatable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlatUpdate {
    /// New unit number.
    #[serde(default)]
    pub unit_number: Option<String>,
    /// New floor.
    #[serde(default)]
    pub floor: Option<u32>,
    /// New bedroom count.
    #[serde(default)]
    pub bedrooms: Option<u32>,
    /// New bathroom count.
    #[serde(default)]
    pub bathrooms: Option<u32>,
    /// New floor area.
    #[serde(default)]
    pub area_sqft: Option<u32>,
    /// New asking rent. Existing leases keep their rent.
    #[serde(default)]
    pub rent: Option<Money>,
}

impl FlatUpdate {
    /// Check the fields that are present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(unit) = &self.unit_number {
            require_text("unit_number", unit)?;
        }
        if let Some(floor) = self.floor {
            require_positive("floor", floor)?;
        }
        if self.rent.is_some_and(Money::is_zero) {
            return Err(ValidationError::NotPositive("rent"));
        }
        Ok(())
    }
}

/// Flat listing filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlatFilter {
    /// Only flats in this tower.
    #[serde(default)]
    pub tower_id: Option<TowerId>,
    /// Only flats with exactly this many bedrooms.
    #[serde(default)]
    pub bedrooms: Option<u32>,
    /// Only flats renting for at least this much.
    #[serde(default)]
    pub min_rent: Option<Money>,
    /// Only flats renting for at most this much.
    #[serde(default)]
    pub max_rent: Option<Money>,
    /// Also list flats under an active lease.
    #[serde(default)]
    pub include_unavailable: bool,
}

impl FlatFilter {
    /// Whether `flat` passes the filter.
    pub fn matches(&self, flat: &Flat) -> bool {
        (self.include_unavailable || flat.is_available())
            && self.tower_id.map_or(true, |t| flat.tower_id == t)
            && self.bedrooms.map_or(true, |b| flat.bedrooms == b)
            && self.min_rent.map_or(true, |m| flat.rent >= m)
            && self.max_rent.map_or(true, |m| flat.rent <= m)
    }
}

fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

fn require_positive(field: &'static str, value: u32) -> Result<u32, ValidationError> {
    if value == 0 {
        return Err(ValidationError::NotPositive(field));
    }
    Ok(value)
}

fn trim_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ─── Engine operations ───────────────────────────────────────────────

impl Engine {
    // -- Amenities --

    /// Add an amenity.
    pub fn create_amenity(&self, new: NewAmenity) -> Result<Amenity, LeaseholdError> {
        new.validate()?;
        let id: AmenityId = self.ids.amenities.next();
        let amenity = Amenity {
            id,
            name: require_text("name", &new.name)?,
            amenity_type: new.amenity_type,
            description: trim_opt(new.description),
            hours: trim_opt(new.hours),
            fee: new.fee,
        };
        self.amenities.insert(id, amenity.clone());
        tracing::info!(amenity_id = %id, name = %amenity.name, "amenity created");
        Ok(amenity)
    }

    /// Fetch an amenity.
    pub fn amenity(&self, id: AmenityId) -> Result<Amenity, LeaseholdError> {
        self.amenities
            .get(&id)
            .ok_or_else(|| LeaseholdError::not_found(EntityKind::Amenity, id))
    }

    /// List amenities, optionally of one type, in id order.
    pub fn amenities(&self, amenity_type: Option<AmenityType>) -> Vec<Amenity> {
        self.amenities
            .filter(|a| amenity_type.map_or(true, |t| a.amenity_type == t))
    }

    /// Apply a partial update to an amenity.
    pub fn update_amenity(
        &self,
        id: AmenityId,
        update: AmenityUpdate,
    ) -> Result<Amenity, LeaseholdError> {
        update.validate()?;
        let updated = self
            .amenities
            .try_update(&id, |amenity| {
                if let Some(name) = &update.name {
                    amenity.name = require_text("name", name)?;
                }
                if let Some(t) = update.amenity_type {
                    amenity.amenity_type = t;
                }
                if update.description.is_some() {
                    amenity.description = trim_opt(update.description.clone());
                }
                if update.hours.is_some() {
                    amenity.hours = trim_opt(update.hours.clone());
                }
                if update.fee.is_some() {
                    amenity.fee = update.fee;
                }
                Ok::<_, LeaseholdError>(amenity.clone())
            })
            .ok_or_else(|| LeaseholdError::not_found(EntityKind::Amenity, id))??;
        tracing::info!(amenity_id = %id, "amenity updated");
        Ok(updated)
    }

    /// Remove an amenity and drop it from every tower.
    pub fn delete_amenity(&self, id: AmenityId) -> Result<Amenity, LeaseholdError> {
        let _links = self.amenity_links.lock();
        let removed = self
            .amenities
            .remove(&id)
            .ok_or_else(|| LeaseholdError::not_found(EntityKind::Amenity, id))?;
        self.towers.update_all(|tower| {
            tower.amenity_ids.remove(&id);
        });
        tracing::info!(amenity_id = %id, "amenity deleted");
        Ok(removed)
    }

    /// Resolve tower amenity ids. Callers hold `amenity_links` until the
    /// tower write lands.
    fn require_amenities(&self, ids: &[AmenityId]) -> Result<BTreeSet<AmenityId>, LeaseholdError> {
        ids.iter()
            .map(|id| {
                if self.amenities.contains(id) {
                    Ok(*id)
                } else {
                    Err(LeaseholdError::not_found(EntityKind::Amenity, *id))
                }
            })
            .collect()
    }

    // -- Towers --

    /// Add a tower.
    pub fn create_tower(&self, new: NewTower) -> Result<Tower, LeaseholdError> {
        new.validate()?;
        let _links = self.amenity_links.lock();
        let amenity_ids = self.require_amenities(&new.amenity_ids)?;
        let id: TowerId = self.ids.towers.next();
        let tower = Tower {
            id,
            name: require_text("name", &new.name)?,
            address: new.address.trim().to_string(),
            total_floors: new.total_floors,
            flats_per_floor: new.flats_per_floor.unwrap_or(DEFAULT_FLATS_PER_FLOOR),
            amenity_ids,
            created_at: self.clock.now(),
        };
        self.towers.insert(id, tower.clone());
        tracing::info!(tower_id = %id, name = %tower.name, "tower created");
        Ok(tower)
    }

    /// Fetch a tower record.
    pub fn tower(&self, id: TowerId) -> Result<Tower, LeaseholdError> {
        self.towers
            .get(&id)
            .ok_or_else(|| LeaseholdError::not_found(EntityKind::Tower, id))
    }

    /// Fetch a tower with its amenities and flat counts.
    pub fn tower_details(&self, id: TowerId) -> Result<TowerDetails, LeaseholdError> {
        let tower = self.tower(id)?;
        Ok(self.describe_tower(tower))
    }

    /// All towers with amenities and flat counts, in id order.
    pub fn towers(&self) -> Vec<TowerDetails> {
        self.towers
            .list()
            .into_iter()
            .map(|t| self.describe_tower(t))
            .collect()
    }

    fn describe_tower(&self, tower: Tower) -> TowerDetails {
        let amenities = tower
            .amenity_ids
            .iter()
            .filter_map(|id| self.amenities.get(id))
            .collect();
        let flats: Vec<Flat> = self
            .flats
            .snapshot_where(|entry| entry.tower_id == tower.id)
            .into_iter()
            .map(|p| p.flat)
            .collect();
        TowerDetails {
            total_flats: flats.len(),
            available_flats: flats.iter().filter(|f| f.is_available()).count(),
            amenities,
            tower,
        }
    }

    /// Apply a partial update to a tower.
    ///
    /// Shrinking `total_floors` below a floor that already holds a flat is a
    /// conflict.
    pub fn update_tower(&self, id: TowerId, update: TowerUpdate) -> Result<Tower, LeaseholdError> {
        update.validate()?;
        let _links = self.amenity_links.lock();
        let amenity_ids = match &update.amenity_ids {
            Some(ids) => Some(self.require_amenities(ids)?),
            None => None,
        };
        let map = self.flats.write_map();
        if let Some(floors) = update.total_floors {
            let highest = map
                .values()
                .filter(|entry| entry.tower_id == id)
                .map(|entry| entry.cell.lock().flat.floor)
                .max();
            if let Some(highest) = highest.filter(|h| *h > floors) {
                return Err(LeaseholdError::conflict(format!(
                    "tower {id} has a flat on floor {highest}; cannot reduce to {floors} floors"
                )));
            }
        }
        let updated = self
            .towers
            .try_update(&id, |tower| {
                if let Some(name) = &update.name {
                    tower.name = require_text("name", name)?;
                }
                if let Some(address) = &update.address {
                    tower.address = address.trim().to_string();
                }
                if let Some(n) = update.total_floors {
                    tower.total_floors = n;
                }
                if let Some(n) = update.flats_per_floor {
                    tower.flats_per_floor = n;
                }
                if let Some(ids) = amenity_ids {
                    tower.amenity_ids = ids;
                }
                Ok::<_, LeaseholdError>(tower.clone())
            })
            .ok_or_else(|| LeaseholdError::not_found(EntityKind::Tower, id))??;
        drop(map);
        tracing::info!(tower_id = %id, "tower updated");
        Ok(updated)
    }

    /// Remove a tower that no longer owns any flats.
    pub fn delete_tower(&self, id: TowerId) -> Result<Tower, LeaseholdError> {
        let map = self.flats.write_map();
        if !self.towers.contains(&id) {
            return Err(LeaseholdError::not_found(EntityKind::Tower, id));
        }
        let owned = map.values().filter(|entry| entry.tower_id == id).count();
        if owned > 0 {
            tracing::warn!(tower_id = %id, flats = owned, "tower delete rejected");
            return Err(LeaseholdError::conflict(format!(
                "tower {id} still has {owned} flat(s)"
            )));
        }
        let removed = self
            .towers
            .remove(&id)
            .ok_or_else(|| LeaseholdError::not_found(EntityKind::Tower, id))?;
        drop(map);
        tracing::info!(tower_id = %id, "tower deleted");
        Ok(removed)
    }

    // -- Flats --

    /// Add a flat to a tower. New flats are available.
    pub fn create_flat(&self, new: NewFlat) -> Result<Flat, LeaseholdError> {
        new.validate()?;
        let unit_number = require_text("unit_number", &new.unit_number)?;
        let mut map = self.flats.write_map();
        let tower = self.tower(new.tower_id)?;
        check_floor(new.floor, &tower)?;
        if map
            .values()
            .any(|entry| entry.tower_id == tower.id && entry.unit_number == unit_number)
        {
            tracing::warn!(tower_id = %tower.id, unit = %unit_number, "duplicate unit number");
            return Err(LeaseholdError::conflict(format!(
                "unit {unit_number} already exists in tower {}",
                tower.id
            )));
        }
        let id: FlatId = self.ids.flats.next();
        let flat = Flat {
            id,
            tower_id: tower.id,
            unit_number: unit_number.clone(),
            floor: new.floor,
            bedrooms: new.bedrooms,
            bathrooms: new.bathrooms,
            area_sqft: new.area_sqft,
            rent: new.rent,
            is_available: true,
            created_at: self.clock.now(),
        };
        map.insert(id, FlatEntry::new(FlatPartition::new(flat.clone())));
        drop(map);
        tracing::info!(flat_id = %id, tower_id = %tower.id, unit = %unit_number, "flat created");
        Ok(flat)
    }

    /// Fetch a flat.
    pub fn flat(&self, id: FlatId) -> Result<Flat, LeaseholdError> {
        let cell = self
            .flats
            .cell(id)
            .ok_or_else(|| LeaseholdError::not_found(EntityKind::Flat, id))?;
        let flat = cell.lock().flat.clone();
        Ok(flat)
    }

    /// Flats passing `filter`, in id order.
    pub fn flats(&self, filter: &FlatFilter) -> Vec<Flat> {
        self.flats
            .snapshot_where(|entry| filter.tower_id.map_or(true, |t| entry.tower_id == t))
            .into_iter()
            .map(|p| p.flat)
            .filter(|f| filter.matches(f))
            .collect()
    }

    /// Apply a partial update to a flat.
    pub fn update_flat(&self, id: FlatId, update: FlatUpdate) -> Result<Flat, LeaseholdError> {
        update.validate()?;
        let mut map = self.flats.write_map();
        let (tower_id, cell) = match map.get(&id) {
            Some(entry) => (entry.tower_id, entry.cell.clone()),
            None => return Err(LeaseholdError::not_found(EntityKind::Flat, id)),
        };
        let unit_number = match &update.unit_number {
            Some(unit) => {
                let unit = require_text("unit_number", unit)?;
                let taken = map.iter().any(|(other, entry)| {
                    *other != id && entry.tower_id == tower_id && entry.unit_number == unit
                });
                if taken {
                    return Err(LeaseholdError::conflict(format!(
                        "unit {unit} already exists in tower {tower_id}"
                    )));
                }
                Some(unit)
            }
            None => None,
        };
        if let Some(floor) = update.floor {
            check_floor(floor, &self.tower(tower_id)?)?;
        }

        let mut partition = cell.lock();
        let flat = &mut partition.flat;
        if let Some(unit) = &unit_number {
            flat.unit_number = unit.clone();
        }
        if let Some(floor) = update.floor {
            flat.floor = floor;
        }
        if let Some(n) = update.bedrooms {
            flat.bedrooms = n;
        }
        if let Some(n) = update.bathrooms {
            flat.bathrooms = n;
        }
        if update.area_sqft.is_some() {
            flat.area_sqft = update.area_sqft;
        }
        if let Some(rent) = update.rent {
            flat.rent = rent;
        }
        let updated = flat.clone();
        drop(partition);
        if let (Some(unit), Some(entry)) = (unit_number, map.get_mut(&id)) {
            entry.unit_number = unit;
        }
        drop(map);
        tracing::info!(flat_id = %id, "flat updated");
        Ok(updated)
    }

    /// Remove a flat that has never been booked or leased.
    pub fn delete_flat(&self, id: FlatId) -> Result<Flat, LeaseholdError> {
        let mut map = self.flats.write_map();
        let cell = match map.get(&id) {
            Some(entry) => entry.cell.clone(),
            None => return Err(LeaseholdError::not_found(EntityKind::Flat, id)),
        };
        let mut partition = cell.lock();
        if partition.has_history() {
            tracing::warn!(flat_id = %id, "flat delete rejected: booking or lease history");
            return Err(LeaseholdError::conflict(format!(
                "flat {id} has booking or lease history"
            )));
        }
        partition.retired = true;
        let flat = partition.flat.clone();
        drop(partition);
        map.remove(&id);
        drop(map);
        tracing::info!(flat_id = %id, "flat deleted");
        Ok(flat)
    }
}

fn check_floor(floor: u32, tower: &Tower) -> Result<(), ValidationError> {
    if floor == 0 || floor > tower.total_floors {
        return Err(ValidationError::FloorOutOfRange {
            floor,
            total_floors: tower.total_floors,
        });
    }
    Ok(())
}
