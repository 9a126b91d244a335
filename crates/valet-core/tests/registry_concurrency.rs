//! Global-uniqueness probes: racing park requests for one vehicle identity
//! must resolve on the single registry claim.

// Integration tests have relaxed clippy settings for test infrastructure.
// Production code (src/) must use strict zero-unwrap/panic patterns.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinSet;
use valet_core::{ParkError, ParkingFacility, Vehicle};

/// GIVEN: one plate in several case spellings and two lots with room
/// WHEN: eight park requests race
/// THEN: exactly one wins; every loser reports the vehicle already parked
///       without touching any lot's capacity
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn same_identity_race_has_exactly_one_winner() -> Result<()> {
    common::init_tracing();

    let facility = Arc::new(ParkingFacility::new());
    facility.add_lot("East", 10.0, 4)?;
    facility.add_lot("West", 10.0, 4)?;

    for round in 0..25 {
        let mut attempts = JoinSet::new();
        for i in 0..8u32 {
            let facility = Arc::clone(&facility);
            let plate = if i % 2 == 0 { "abc123" } else { "ABC123" };
            let lot = if i % 4 < 2 { "East" } else { "West" };
            attempts.spawn(async move {
                let vehicle = Vehicle::car(plate)?;
                anyhow::Ok(facility.park(&vehicle, lot).await)
            });
        }

        let mut winners = 0u32;
        for _ in 0..8 {
            match attempts.join_next().await.unwrap()?? {
                Ok(_) => winners += 1,
                Err(ParkError::VehicleAlreadyParked { .. }) => {}
                Err(other) => panic!("round {round}: unexpected failure: {other}"),
            }
        }

        assert_eq!(winners, 1, "round {round}: expected a single winner");
        assert_eq!(facility.total_occupied(), 1);
        assert_eq!(facility.parked_vehicles().len(), 1);

        // The registry knows which lot won; release from there.
        let (vehicle, lot) = facility.parked_vehicles().remove(0);
        facility.unpark(lot.as_str(), vehicle.as_str()).await?;
        assert_eq!(facility.total_occupied(), 0);
    }
    Ok(())
}

/// GIVEN: distinct vehicles racing across two lots with enough room
/// WHEN: all park at once
/// THEN: everyone is admitted; the registry maps each to exactly one lot
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn distinct_identities_do_not_contend() -> Result<()> {
    common::init_tracing();

    let facility = Arc::new(ParkingFacility::new());
    facility.add_lot("East", 10.0, 8)?;
    facility.add_lot("West", 10.0, 8)?;

    let mut attempts = JoinSet::new();
    for i in 0..16u32 {
        let facility = Arc::clone(&facility);
        let lot = if i % 2 == 0 { "East" } else { "West" };
        attempts.spawn(async move {
            let vehicle = Vehicle::car(&format!("V-{i:02}"))?;
            facility.park(&vehicle, lot).await?;
            anyhow::Ok(())
        });
    }
    while let Some(attempt) = attempts.join_next().await {
        attempt??;
    }

    assert_eq!(facility.total_occupied(), 16);
    assert_eq!(facility.parked_vehicles().len(), 16);
    Ok(())
}

/// GIVEN: a single-spot lot and two racing vehicles
/// WHEN: the loser is turned away by the lot (not the registry)
/// THEN: its claim is rolled back and it can immediately park elsewhere
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn lot_rejection_rolls_back_the_claim_under_race() -> Result<()> {
    common::init_tracing();

    let facility = Arc::new(ParkingFacility::new());
    facility.add_lot("Tiny", 10.0, 1)?;
    facility.add_lot("Spare", 10.0, 4)?;

    let mut attempts = JoinSet::new();
    for i in 0..2u32 {
        let facility = Arc::clone(&facility);
        attempts.spawn(async move {
            let vehicle = Vehicle::car(&format!("R-{i}"))?;
            let outcome = facility.park(&vehicle, "Tiny").await;
            anyhow::Ok((vehicle, outcome))
        });
    }

    let mut losers = Vec::new();
    for _ in 0..2 {
        let (vehicle, outcome) = attempts.join_next().await.unwrap()??;
        match outcome {
            Ok(_) => {}
            Err(ParkError::NoSpotsAvailable { .. }) => losers.push(vehicle),
            Err(other) => panic!("unexpected failure: {other}"),
        }
    }

    assert_eq!(facility.lot_status("Tiny").unwrap().occupied, 1);
    // A rolled-back loser is free to park elsewhere right away.
    for vehicle in losers {
        facility.park(&vehicle, "Spare").await?;
    }
    Ok(())
}
