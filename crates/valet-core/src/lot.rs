//! Per-lot admission/release state machine.
//!
//! A vehicle inside one lot moves Unparked → Active → Unparked. Admission is
//! the acquisition of a [`SpotPool`] unit; the active-session map and the
//! occupied counter are updated inside the same critical section so a
//! concurrent observer never sees one without the other.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{FacilityError, ParkError, UnparkError};
use crate::pool::{PooledSpot, SpotPool};
use crate::session::{ParkingSession, SessionId};
use crate::types::{LotName, SpotId, Vehicle, VehicleId};

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Fee for occupying a spot for `duration` at `hourly_rate`.
///
/// Billing is by started hour with a one-hour minimum: zero and fractional
/// durations charge one full hour. The result is rounded to two decimal
/// places, half away from zero.
#[must_use]
pub fn parking_fee(hourly_rate: f64, duration: Duration) -> f64 {
    let millis = duration.num_milliseconds().max(0);
    #[allow(clippy::cast_precision_loss)]
    let hours = ((millis + MILLIS_PER_HOUR - 1) / MILLIS_PER_HOUR).max(1) as f64;
    round_to_cents(hourly_rate * hours)
}

fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Successful admission into a lot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    /// The assigned spot.
    pub spot: SpotId,
    /// The created session's id.
    pub session_id: SessionId,
    /// When the session started.
    pub entered_at: DateTime<Utc>,
}

/// Successful release from a lot: the receipt data.
#[derive(Debug, Clone, PartialEq)]
pub struct Departure {
    /// Total fee for the visit.
    pub fee: f64,
    /// Frozen occupancy duration.
    pub duration: Duration,
    /// The completed session.
    pub session: ParkingSession,
}

impl Departure {
    /// Occupancy duration in whole seconds, for reporting layers.
    #[must_use]
    pub const fn duration_seconds(&self) -> i64 {
        self.duration.num_seconds()
    }
}

/// Advisory snapshot of one lot, momentarily stale under in-flight traffic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotStatus {
    /// Lot name as registered.
    pub name: String,
    /// Hourly billing rate.
    pub hourly_rate: f64,
    /// Fixed capacity.
    pub total_spots: u32,
    /// Currently occupied spots.
    pub occupied: u32,
    /// Currently free spots.
    pub available: u32,
}

/// A vehicle's live occupancy: its session plus the checked-out spot whose
/// permit keeps the capacity unit bound until release.
struct Occupancy {
    session: ParkingSession,
    slot: PooledSpot,
}

/// One capacity-bounded physical lot.
pub struct ParkingLot {
    name: LotName,
    hourly_rate: f64,
    total_spots: u32,
    // Mutated only inside the `sessions` critical section; atomic so status
    // reads skip the lock.
    occupied: AtomicU32,
    pool: SpotPool,
    sessions: Mutex<HashMap<VehicleId, Occupancy>>,
}

impl ParkingLot {
    /// Create a lot with `total_spots` spots billed at `hourly_rate`.
    ///
    /// # Errors
    ///
    /// Returns [`FacilityError::InvalidRate`] unless the rate is positive and
    /// finite, and [`FacilityError::InvalidCapacity`] for zero spots.
    pub fn new(name: LotName, hourly_rate: f64, total_spots: u32) -> Result<Self, FacilityError> {
        if !hourly_rate.is_finite() || hourly_rate <= 0.0 {
            return Err(FacilityError::InvalidRate { rate: hourly_rate });
        }
        if total_spots == 0 {
            return Err(FacilityError::InvalidCapacity);
        }
        Ok(Self {
            name,
            hourly_rate,
            total_spots,
            occupied: AtomicU32::new(0),
            pool: SpotPool::new(total_spots),
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// The lot's name.
    #[must_use]
    pub const fn name(&self) -> &LotName {
        &self.name
    }

    /// The lot's hourly billing rate.
    #[must_use]
    pub const fn hourly_rate(&self) -> f64 {
        self.hourly_rate
    }

    /// Fixed capacity.
    #[must_use]
    pub const fn total_spots(&self) -> u32 {
        self.total_spots
    }

    /// Currently occupied spots (advisory).
    #[must_use]
    pub fn occupied(&self) -> u32 {
        self.occupied.load(Ordering::Relaxed)
    }

    /// Currently free spots (advisory).
    #[must_use]
    pub fn available(&self) -> u32 {
        self.total_spots - self.occupied()
    }

    /// Advisory snapshot for status reporting.
    #[must_use]
    pub fn status(&self) -> LotStatus {
        let occupied = self.occupied();
        LotStatus {
            name: self.name.as_str().to_string(),
            hourly_rate: self.hourly_rate,
            total_spots: self.total_spots,
            occupied,
            available: self.total_spots - occupied,
        }
    }

    /// Admit `vehicle`, suspending while the lot is full.
    ///
    /// The suspension is cancel-safe: an abandoned wait leaks no capacity.
    ///
    /// # Errors
    ///
    /// Returns [`ParkError::VehicleAlreadyParked`] if the vehicle already has
    /// an active session here, and [`ParkError::SpotAssignmentFailed`] on the
    /// defensive occupied-spot path.
    pub async fn enter(&self, vehicle: &Vehicle) -> Result<Admission, ParkError> {
        let slot = self
            .pool
            .acquire()
            .await
            .map_err(|_| ParkError::NoSpotsAvailable {
                lot: self.name.clone(),
            })?;
        self.admit(vehicle, slot).await
    }

    /// Admit `vehicle`, failing immediately when the lot is full.
    ///
    /// # Errors
    ///
    /// Returns [`ParkError::NoSpotsAvailable`] at capacity, otherwise as
    /// [`Self::enter`].
    pub async fn try_enter(&self, vehicle: &Vehicle) -> Result<Admission, ParkError> {
        let slot = self
            .pool
            .try_acquire()
            .await
            .map_err(|_| ParkError::NoSpotsAvailable {
                lot: self.name.clone(),
            })?;
        self.admit(vehicle, slot).await
    }

    async fn admit(&self, vehicle: &Vehicle, mut slot: PooledSpot) -> Result<Admission, ParkError> {
        let mut sessions = self.sessions.lock().await;

        if sessions.contains_key(vehicle.id()) {
            drop(sessions);
            self.pool.release(slot).await;
            return Err(ParkError::VehicleAlreadyParked {
                vehicle: vehicle.id().clone(),
            });
        }

        if !slot.assign(vehicle.id().clone()) {
            // A spot out of the free queue is never occupied; fail closed and
            // re-enqueue it.
            let spot = slot.spot_id().clone();
            drop(sessions);
            self.pool.release(slot).await;
            return Err(ParkError::SpotAssignmentFailed { spot });
        }

        let session = ParkingSession::begin(vehicle.id().clone(), slot.spot_id().clone());
        let admission = Admission {
            spot: session.spot().clone(),
            session_id: session.id(),
            entered_at: session.entered_at(),
        };
        sessions.insert(vehicle.id().clone(), Occupancy { session, slot });
        self.occupied.fetch_add(1, Ordering::Relaxed);
        drop(sessions);

        debug!(
            lot = %self.name,
            vehicle = %vehicle.id(),
            spot = %admission.spot,
            session = %admission.session_id,
            "vehicle admitted"
        );
        Ok(admission)
    }

    /// Release `vehicle`, returning the receipt data.
    ///
    /// No side effects on failure. The freed capacity is observable to
    /// suspended waiters as soon as this returns.
    ///
    /// # Errors
    ///
    /// Returns [`UnparkError::VehicleNotFound`] if the vehicle has no active
    /// session here, and [`UnparkError::SessionAlreadyEnded`] on the
    /// defensive ended-session path (the entry is restored, the spot is not
    /// double-released).
    pub async fn exit(&self, vehicle: &VehicleId) -> Result<Departure, UnparkError> {
        let mut sessions = self.sessions.lock().await;

        let Some(mut occupancy) = sessions.remove(vehicle) else {
            return Err(UnparkError::VehicleNotFound {
                vehicle: vehicle.clone(),
            });
        };

        if !occupancy.session.end() {
            // The map holds active sessions only; restore the entry rather
            // than double-releasing the spot.
            sessions.insert(vehicle.clone(), occupancy);
            return Err(UnparkError::SessionAlreadyEnded {
                vehicle: vehicle.clone(),
            });
        }

        self.occupied.fetch_sub(1, Ordering::Relaxed);
        drop(sessions);

        let Occupancy { session, slot } = occupancy;
        let duration = session.duration();
        let fee = parking_fee(self.hourly_rate, duration);
        self.pool.release(slot).await;

        info!(
            lot = %self.name,
            vehicle = %vehicle,
            spot = %session.spot(),
            session = %session.id(),
            fee,
            "vehicle released"
        );
        Ok(Departure {
            fee,
            duration,
            session,
        })
    }
}
