//! Error taxonomy for the parking facility core.
//!
//! Every failure is a typed value; nothing in the admission/release paths
//! panics. Categories:
//!
//! - [`ValidationError`] — blank identifiers, rejected before any concurrent
//!   state is touched
//! - [`ParkError`] / [`UnparkError`] — business-rule rejections and expected
//!   capacity exhaustion; local state is left unchanged on failure
//! - [`FacilityError`] — lot registration and removal conflicts

use thiserror::Error;

use crate::types::{LotName, SpotId, VehicleId};

/// Input validation failures, raised synchronously at parse time.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Vehicle id was empty or all whitespace.
    #[error("vehicle id cannot be empty")]
    EmptyVehicleId,

    /// Spot id was empty or all whitespace.
    #[error("spot id cannot be empty")]
    EmptySpotId,

    /// Lot name was empty or all whitespace.
    #[error("parking lot name cannot be empty")]
    EmptyLotName,
}

/// Failures of a park request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParkError {
    /// The named lot is not registered.
    #[error("parking lot '{name}' not found")]
    ParkingLotNotFound {
        /// The name as requested.
        name: String,
    },

    /// The vehicle already holds an active session somewhere in the facility.
    #[error("vehicle {vehicle} is already parked")]
    VehicleAlreadyParked {
        /// The vehicle's normalized id.
        vehicle: VehicleId,
    },

    /// The lot is at capacity. Expected under load; the caller may retry.
    #[error("no free spot in lot '{lot}'")]
    NoSpotsAvailable {
        /// The full lot.
        lot: LotName,
    },

    /// A dequeued spot could not be assigned. Defensive; unreachable under
    /// correct bookkeeping.
    #[error("spot {spot} could not be assigned")]
    SpotAssignmentFailed {
        /// The spot that was re-enqueued.
        spot: SpotId,
    },
}

/// Failures of an unpark request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UnparkError {
    /// The named lot is not registered.
    #[error("parking lot '{name}' not found")]
    ParkingLotNotFound {
        /// The name as requested.
        name: String,
    },

    /// The supplied vehicle id failed validation.
    #[error(transparent)]
    InvalidVehicle(#[from] ValidationError),

    /// The vehicle has no active session in the lot.
    #[error("vehicle {vehicle} is not currently parked")]
    VehicleNotFound {
        /// The vehicle's normalized id.
        vehicle: VehicleId,
    },

    /// The session was found but already ended. Defensive; unreachable under
    /// correct bookkeeping.
    #[error("parking session for vehicle {vehicle} has already ended")]
    SessionAlreadyEnded {
        /// The vehicle's normalized id.
        vehicle: VehicleId,
    },

    /// The registry shows the vehicle checked in at a different lot.
    #[error("vehicle {vehicle} is parked in '{actual}', not in '{requested}'")]
    WrongParkingLot {
        /// The vehicle's normalized id.
        vehicle: VehicleId,
        /// Where the registry says the vehicle is.
        actual: LotName,
        /// The lot the caller asked to release it from.
        requested: LotName,
    },
}

/// Failures of lot registration and removal.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FacilityError {
    /// A lot with this name (case-insensitive) already exists.
    #[error("parking lot '{name}' already exists")]
    DuplicateLot {
        /// The conflicting name.
        name: String,
    },

    /// Hourly rate must be positive and finite.
    #[error("hourly rate must be positive, got {rate}")]
    InvalidRate {
        /// The rejected rate.
        rate: f64,
    },

    /// A lot needs at least one spot.
    #[error("total spots must be positive")]
    InvalidCapacity,

    /// The lot still holds parked vehicles and cannot be removed.
    #[error("cannot remove lot '{name}': {occupied} vehicles still parked")]
    LotOccupied {
        /// The lot that was asked to be removed.
        name: String,
        /// How many vehicles are still inside.
        occupied: u32,
    },

    /// The lot name failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
