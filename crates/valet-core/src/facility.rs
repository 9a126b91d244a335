//! Cross-lot facility registry.
//!
//! Single source of truth for "which lot, if any, holds vehicle V". The
//! registry claim is made *before* delegating to a lot, so two racing park
//! requests for one vehicle resolve on a single map insertion: exactly one
//! wins, the loser never touches lot capacity. A failed delegation rolls the
//! claim back; the rollback is RAII so an abandoned suspended admission
//! cannot leave a dangling claim either.
//!
//! Lock protocol: no lock is held across another. Lots and the registry map
//! are guarded independently; each lot guards its own pool and sessions.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{FacilityError, ParkError, UnparkError};
use crate::lot::{Departure, LotStatus, ParkingLot};
use crate::session::SessionId;
use crate::types::{LotName, SpotId, Vehicle, VehicleId};

/// Successful park: where the vehicle ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parked {
    /// The admitting lot, in its registered casing.
    pub lot: LotName,
    /// The assigned spot.
    pub spot: SpotId,
    /// The created session's id.
    pub session_id: SessionId,
}

/// Pending registry claim. Dropped un-committed (delegation failed or the
/// caller abandoned the wait), it removes its map entry again.
struct Claim<'a> {
    registry: &'a Mutex<HashMap<VehicleId, LotName>>,
    vehicle: VehicleId,
    committed: bool,
}

impl Claim<'_> {
    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.registry.lock().remove(&self.vehicle);
            debug!(vehicle = %self.vehicle, "registry claim rolled back");
        }
    }
}

/// Owner of the lots and the cross-lot vehicle registry.
///
/// Construct one per facility and share it by reference or `Arc`; there is no
/// process-wide instance.
#[derive(Default)]
pub struct ParkingFacility {
    lots: RwLock<HashMap<LotName, Arc<ParkingLot>>>,
    registry: Mutex<HashMap<VehicleId, LotName>>,
}

impl ParkingFacility {
    /// Create an empty facility.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new lot.
    ///
    /// # Errors
    ///
    /// Returns [`FacilityError::DuplicateLot`] if the name (case-insensitive)
    /// is taken, and validation errors for a blank name, non-positive rate,
    /// or zero capacity.
    pub fn add_lot(
        &self,
        name: &str,
        hourly_rate: f64,
        total_spots: u32,
    ) -> Result<(), FacilityError> {
        let name = LotName::parse(name)?;
        let lot = ParkingLot::new(name.clone(), hourly_rate, total_spots)?;

        let mut lots = self.lots.write();
        if lots.contains_key(&name) {
            return Err(FacilityError::DuplicateLot {
                name: name.as_str().to_string(),
            });
        }
        lots.insert(name.clone(), Arc::new(lot));
        drop(lots);

        info!(lot = %name, spots = total_spots, rate = hourly_rate, "parking lot added");
        Ok(())
    }

    /// Remove an empty lot. Returns `false` if no such lot exists.
    ///
    /// Any stale registry entries pointing at the removed lot are purged.
    ///
    /// # Errors
    ///
    /// Returns [`FacilityError::LotOccupied`] while vehicles are parked; the
    /// lot is not removed.
    pub fn remove_lot(&self, name: &str) -> Result<bool, FacilityError> {
        let Ok(name) = LotName::parse(name) else {
            return Ok(false);
        };

        let mut lots = self.lots.write();
        let Some(lot) = lots.get(&name) else {
            return Ok(false);
        };
        let occupied = lot.occupied();
        if occupied > 0 {
            return Err(FacilityError::LotOccupied {
                name: lot.name().as_str().to_string(),
                occupied,
            });
        }
        lots.remove(&name);
        drop(lots);

        let purged = {
            let mut registry = self.registry.lock();
            let before = registry.len();
            registry.retain(|_, lot| *lot != name);
            before - registry.len()
        };
        if purged > 0 {
            // An empty lot should have no registry entries left.
            warn!(lot = %name, purged, "purged stale registry entries");
        }

        info!(lot = %name, "parking lot removed");
        Ok(true)
    }

    /// Park `vehicle` in the named lot, failing immediately when it is full.
    ///
    /// The registry claim is made before the lot is touched and rolled back
    /// if the lot declines, so the registry and lot occupancy never disagree.
    ///
    /// # Errors
    ///
    /// [`ParkError::ParkingLotNotFound`], [`ParkError::VehicleAlreadyParked`]
    /// (any lot, including this one), [`ParkError::NoSpotsAvailable`], or the
    /// defensive [`ParkError::SpotAssignmentFailed`].
    pub async fn park(&self, vehicle: &Vehicle, lot_name: &str) -> Result<Parked, ParkError> {
        let lot = self.lot_for_park(lot_name)?;
        let claim = self.claim(vehicle.id(), lot.name())?;
        let admission = lot.try_enter(vehicle).await?;
        claim.commit();

        debug!(vehicle = %vehicle.id(), lot = %lot.name(), spot = %admission.spot, "parked");
        Ok(Parked {
            lot: lot.name().clone(),
            spot: admission.spot,
            session_id: admission.session_id,
        })
    }

    /// Park `vehicle` in the named lot, suspending while it is full.
    ///
    /// The claim is held for the duration of the wait; abandoning the wait
    /// rolls it back along with the lot's capacity wait.
    ///
    /// # Errors
    ///
    /// As [`Self::park`], minus the immediate `NoSpotsAvailable`.
    pub async fn park_waiting(
        &self,
        vehicle: &Vehicle,
        lot_name: &str,
    ) -> Result<Parked, ParkError> {
        let lot = self.lot_for_park(lot_name)?;
        let claim = self.claim(vehicle.id(), lot.name())?;
        let admission = lot.enter(vehicle).await?;
        claim.commit();

        debug!(vehicle = %vehicle.id(), lot = %lot.name(), spot = %admission.spot, "parked after wait");
        Ok(Parked {
            lot: lot.name().clone(),
            spot: admission.spot,
            session_id: admission.session_id,
        })
    }

    /// Release a vehicle from the named lot.
    ///
    /// The wrong-lot check runs against the registry before the lot is
    /// touched; the registry entry is removed only after the lot has freed
    /// the capacity unit.
    ///
    /// # Errors
    ///
    /// [`UnparkError::ParkingLotNotFound`], [`UnparkError::InvalidVehicle`],
    /// [`UnparkError::WrongParkingLot`], [`UnparkError::VehicleNotFound`], or
    /// the defensive [`UnparkError::SessionAlreadyEnded`].
    pub async fn unpark(&self, lot_name: &str, vehicle: &str) -> Result<Departure, UnparkError> {
        let vehicle = VehicleId::parse(vehicle)?;
        let lot = self.lot_for_unpark(lot_name)?;

        let registered = self.registry.lock().get(&vehicle).cloned();
        if let Some(actual) = registered {
            if actual != *lot.name() {
                return Err(UnparkError::WrongParkingLot {
                    vehicle,
                    actual,
                    requested: lot.name().clone(),
                });
            }
        }

        let departure = lot.exit(&vehicle).await?;
        self.registry.lock().remove(&vehicle);

        debug!(vehicle = %vehicle, lot = %lot.name(), fee = departure.fee, "unparked");
        Ok(departure)
    }

    /// Sum of all lots' capacities (advisory).
    #[must_use]
    pub fn total_capacity(&self) -> u32 {
        self.lots.read().values().map(|lot| lot.total_spots()).sum()
    }

    /// Sum of all lots' occupied counts (advisory).
    #[must_use]
    pub fn total_occupied(&self) -> u32 {
        self.lots.read().values().map(|lot| lot.occupied()).sum()
    }

    /// Sum of all lots' free counts (advisory).
    #[must_use]
    pub fn total_available(&self) -> u32 {
        self.lots.read().values().map(|lot| lot.available()).sum()
    }

    /// Snapshot of one lot, if registered.
    #[must_use]
    pub fn lot_status(&self, name: &str) -> Option<LotStatus> {
        let name = LotName::parse(name).ok()?;
        self.lots.read().get(&name).map(|lot| lot.status())
    }

    /// Snapshots of every lot, sorted by name.
    #[must_use]
    pub fn lot_statuses(&self) -> Vec<LotStatus> {
        let mut statuses: Vec<_> = self
            .lots
            .read()
            .values()
            .map(|lot| lot.status())
            .collect();
        statuses.sort_by(|a, b| a.name.cmp(&b.name));
        statuses
    }

    /// Snapshot of the registry: each parked vehicle and its lot.
    #[must_use]
    pub fn parked_vehicles(&self) -> Vec<(VehicleId, LotName)> {
        let mut entries: Vec<_> = self
            .registry
            .lock()
            .iter()
            .map(|(vehicle, lot)| (vehicle.clone(), lot.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Claim global uniqueness for `vehicle` before touching any lot. The
    /// canonical lot name (the lot's own casing) is recorded.
    fn claim(&self, vehicle: &VehicleId, lot: &LotName) -> Result<Claim<'_>, ParkError> {
        let mut registry = self.registry.lock();
        match registry.entry(vehicle.clone()) {
            Entry::Occupied(_) => Err(ParkError::VehicleAlreadyParked {
                vehicle: vehicle.clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(lot.clone());
                Ok(Claim {
                    registry: &self.registry,
                    vehicle: vehicle.clone(),
                    committed: false,
                })
            }
        }
    }

    fn lot_for_park(&self, raw: &str) -> Result<Arc<ParkingLot>, ParkError> {
        self.lookup(raw).ok_or_else(|| ParkError::ParkingLotNotFound {
            name: raw.trim().to_string(),
        })
    }

    fn lot_for_unpark(&self, raw: &str) -> Result<Arc<ParkingLot>, UnparkError> {
        self.lookup(raw)
            .ok_or_else(|| UnparkError::ParkingLotNotFound {
                name: raw.trim().to_string(),
            })
    }

    fn lookup(&self, raw: &str) -> Option<Arc<ParkingLot>> {
        let name = LotName::parse(raw).ok()?;
        self.lots.read().get(&name).cloned()
    }
}
