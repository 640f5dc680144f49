//! # Catalog Races
//!
//! Amenity deletion overlapping tower writes that reference the same
//! amenity. Whatever the interleaving, no tower may end up pointing at an
//! amenity that no longer exists.

mod common;

use common::{engine, race, tower};

use leasehold_core::LeaseholdError;
use leasehold_engine::{AmenityType, Engine, NewAmenity, NewTower, TowerUpdate};

const ROUNDS: usize = 64;

fn gym(e: &Engine, round: usize) -> leasehold_engine::Amenity {
    e.create_amenity(NewAmenity {
        name: format!("Gym {round}"),
        amenity_type: AmenityType::Gym,
        description: None,
        hours: None,
        fee: None,
    })
    .unwrap()
}

fn assert_no_dangling_amenities(e: &Engine) {
    for details in e.towers() {
        for id in &details.tower.amenity_ids {
            assert!(
                e.amenity(*id).is_ok(),
                "tower {} references deleted amenity {id}",
                details.tower.id
            );
        }
    }
}

#[test]
fn create_tower_racing_amenity_delete_leaves_no_dangling_id() {
    let (e, _) = engine();
    for round in 0..ROUNDS {
        let amenity = gym(&e, round);
        let (created, deleted) = race(
            || {
                e.create_tower(NewTower {
                    name: format!("Tower {round}"),
                    address: String::new(),
                    total_floors: 3,
                    flats_per_floor: None,
                    amenity_ids: vec![amenity.id],
                })
            },
            || e.delete_amenity(amenity.id),
        );
        assert!(deleted.is_ok(), "round {round}: delete must succeed");
        match created {
            // Created first: the delete then stripped the id.
            Ok(t) => assert!(e.tower(t.id).unwrap().amenity_ids.is_empty()),
            Err(LeaseholdError::NotFound { .. }) => {}
            Err(other) => panic!("round {round}: unexpected error {other}"),
        }
    }
    assert_no_dangling_amenities(&e);
}

#[test]
fn update_tower_racing_amenity_delete_leaves_no_dangling_id() {
    let (e, _) = engine();
    let t = tower(&e, "Maple", 3);
    for round in 0..ROUNDS {
        let amenity = gym(&e, round);
        let (updated, deleted) = race(
            || {
                e.update_tower(
                    t.id,
                    TowerUpdate {
                        amenity_ids: Some(vec![amenity.id]),
                        ..TowerUpdate::default()
                    },
                )
            },
            || e.delete_amenity(amenity.id),
        );
        assert!(deleted.is_ok(), "round {round}: delete must succeed");
        assert!(
            matches!(updated, Ok(_) | Err(LeaseholdError::NotFound { .. })),
            "round {round}: unexpected {updated:?}"
        );
        assert!(e.tower(t.id).unwrap().amenity_ids.is_empty());
    }
    assert_no_dangling_amenities(&e);
}
