//! Suspended admission: waiters wake when capacity frees, and an abandoned
//! wait leaks neither a permit nor a registry claim.

// Integration tests have relaxed clippy settings for test infrastructure.
// Production code (src/) must use strict zero-unwrap/panic patterns.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::task::JoinSet;
use tokio::time::timeout;
use valet_core::{ParkingFacility, Vehicle};

/// GIVEN: a full single-spot lot and a waiting vehicle
/// WHEN: the occupant leaves
/// THEN: the waiter is admitted into the freed spot without re-polling
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn waiter_is_admitted_when_the_occupant_leaves() -> Result<()> {
    common::init_tracing();

    let facility = Arc::new(ParkingFacility::new());
    facility.add_lot("L", 10.0, 1)?;
    facility.park(&Vehicle::car("FIRST")?, "L").await?;

    let waiter = {
        let facility = Arc::clone(&facility);
        tokio::spawn(async move {
            let vehicle = Vehicle::car("SECOND")?;
            anyhow::Ok(facility.park_waiting(&vehicle, "L").await?)
        })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished(), "waiter should be suspended on a full lot");

    facility.unpark("L", "FIRST").await?;

    let parked = timeout(Duration::from_secs(1), waiter).await???;
    assert_eq!(parked.spot.as_str(), "A-01");
    assert_eq!(facility.lot_status("L").unwrap().occupied, 1);
    assert_eq!(facility.parked_vehicles()[0].0.as_str(), "SECOND");
    Ok(())
}

/// GIVEN: a full lot and a vehicle that gives up waiting
/// WHEN: the wait is abandoned
/// THEN: no registry claim remains, no permit is leaked, and the vehicle can
///       be admitted later as if the abandoned attempt never happened
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn abandoned_wait_leaks_nothing() -> Result<()> {
    common::init_tracing();

    let facility = ParkingFacility::new();
    facility.add_lot("L", 10.0, 1)?;
    facility.park(&Vehicle::car("FIRST")?, "L").await?;

    let impatient = Vehicle::car("SECOND")?;
    let abandoned = timeout(Duration::from_millis(30), facility.park_waiting(&impatient, "L")).await;
    assert!(abandoned.is_err(), "wait should still be suspended at timeout");

    // The abandoned claim was rolled back.
    assert_eq!(facility.parked_vehicles().len(), 1);
    assert_eq!(facility.parked_vehicles()[0].0.as_str(), "FIRST");

    // And no capacity was lost: the freed spot admits the vehicle normally.
    facility.unpark("L", "FIRST").await?;
    let parked = facility.park(&impatient, "L").await?;
    assert_eq!(parked.spot.as_str(), "A-01");
    Ok(())
}

/// GIVEN: a 2-spot lot, two occupants, and four waiters
/// WHEN: occupants leave and each admitted waiter leaves in turn
/// THEN: every waiter eventually completes a full visit and the lot drains
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn waiters_drain_through_in_turn() -> Result<()> {
    common::init_tracing();

    let facility = Arc::new(ParkingFacility::new());
    facility.add_lot("L", 10.0, 2)?;
    facility.park(&Vehicle::car("OCC-1")?, "L").await?;
    facility.park(&Vehicle::car("OCC-2")?, "L").await?;

    let mut waiters = JoinSet::new();
    for i in 0..4u32 {
        let facility = Arc::clone(&facility);
        waiters.spawn(async move {
            let vehicle = Vehicle::car(&format!("W-{i}"))?;
            facility.park_waiting(&vehicle, "L").await?;
            tokio::task::yield_now().await;
            facility.unpark("L", vehicle.id().as_str()).await?;
            anyhow::Ok(())
        });
    }

    tokio::time::sleep(Duration::from_millis(10)).await;
    facility.unpark("L", "OCC-1").await?;
    facility.unpark("L", "OCC-2").await?;

    while let Some(visit) = timeout(Duration::from_secs(5), waiters.join_next())
        .await?
        .transpose()?
    {
        visit?;
    }

    let status = facility.lot_status("L").unwrap();
    assert_eq!(status.occupied, 0);
    assert_eq!(status.available, 2);
    assert!(facility.parked_vehicles().is_empty());
    Ok(())
}
