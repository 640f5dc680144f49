//! Fixtures shared by the integration test binaries.

#![allow(dead_code)]

use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;

use leasehold_core::{Clock, FlatId, Money, TowerId};
use leasehold_engine::{Engine, Flat, NewFlat, NewTower, NewUser, Tower, User};

/// Run `a` and `b` on two threads released by one barrier.
pub fn race<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    let barrier = Barrier::new(2);
    thread::scope(|s| {
        let left = s.spawn(|| {
            barrier.wait();
            a()
        });
        let right = s.spawn(|| {
            barrier.wait();
            b()
        });
        (left.join().unwrap(), right.join().unwrap())
    })
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A clock the test moves by hand.
#[derive(Debug)]
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn on(day: NaiveDate) -> Arc<Self> {
        Arc::new(Self(Mutex::new(noon(day))))
    }

    pub fn set(&self, day: NaiveDate) {
        *self.0.lock() = noon(day);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock()
    }
}

fn noon(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_opt(12, 0, 0).unwrap().and_utc()
}

/// An engine whose clock reads 2026-10-21 until moved.
pub fn engine() -> (Engine, Arc<ManualClock>) {
    let clock = ManualClock::on(date(2026, 10, 21));
    (Engine::new().with_clock(clock.clone()), clock)
}

pub fn tower(e: &Engine, name: &str, floors: u32) -> Tower {
    e.create_tower(NewTower {
        name: name.into(),
        address: format!("{name} Street"),
        total_floors: floors,
        flats_per_floor: None,
        amenity_ids: vec![],
    })
    .unwrap()
}

pub fn flat(e: &Engine, tower: TowerId, unit: &str, rent_units: u64) -> Flat {
    e.create_flat(NewFlat {
        tower_id: tower,
        unit_number: unit.into(),
        floor: 1,
        bedrooms: 2,
        bathrooms: 1,
        area_sqft: Some(850),
        rent: Money::from_units(rent_units),
    })
    .unwrap()
}

pub fn user(e: &Engine, email: &str) -> User {
    e.register_user(NewUser {
        email: email.into(),
        name: email.split('@').next().unwrap_or(email).into(),
        phone: None,
    })
    .unwrap()
}

/// Whether `flat` is open for booking.
pub fn available(e: &Engine, flat: FlatId) -> bool {
    e.flat(flat).unwrap().is_available()
}

