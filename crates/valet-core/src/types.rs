//! Validated identifier and vehicle value types.
//!
//! Identity rules:
//! - [`VehicleId`] and [`SpotId`] are trimmed, rejected when blank, and
//!   normalized to uppercase at parse time; equality and hashing use the
//!   normalized value only.
//! - [`LotName`] keeps its original casing for display but compares and
//!   hashes case-insensitively.
//!
//! [`VehicleClass`] is metadata and never participates in identity.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::error::ValidationError;

/// Normalized vehicle identity (license plate).
///
/// Two ids that differ only in case or surrounding whitespace are the same
/// vehicle: `"abc123"` and `" ABC123 "` both parse to `ABC123`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VehicleId(String);

impl VehicleId {
    /// Parse and normalize a raw vehicle id.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyVehicleId`] if the input is blank.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyVehicleId);
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    /// The normalized id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of one parking spot, unique within a lot only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SpotId(String);

impl SpotId {
    /// Parse and normalize a raw spot id.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptySpotId`] if the input is blank.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySpotId);
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    /// Label for the `index`-th spot of a lot (1-based): `A-01`, `A-02`, ...
    pub(crate) fn label(index: u32) -> Self {
        Self(format!("A-{index:02}"))
    }

    /// The normalized id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a parking lot.
///
/// Display keeps the casing the lot was registered with; equality and hashing
/// fold case so `"North"` and `"north"` address the same lot.
#[derive(Debug, Clone, Serialize)]
pub struct LotName(String);

impl LotName {
    /// Parse a raw lot name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyLotName`] if the input is blank.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyLotName);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The name as registered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for LotName {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }
}

impl Eq for LotName {}

impl Hash for LotName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_lowercase().hash(state);
    }
}

impl fmt::Display for LotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Vehicle class tag. Metadata only; never part of identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
pub enum VehicleClass {
    /// Passenger car.
    Car,
    /// Motorcycle.
    Motorcycle,
    /// Truck.
    Truck,
}

/// A vehicle as presented at a lot gate: validated identity plus class tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vehicle {
    id: VehicleId,
    class: VehicleClass,
}

impl Vehicle {
    /// Create a vehicle from an already-validated id.
    #[must_use]
    pub const fn new(id: VehicleId, class: VehicleClass) -> Self {
        Self { id, class }
    }

    /// Create a car from a raw plate.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyVehicleId`] if the plate is blank.
    pub fn car(plate: &str) -> Result<Self, ValidationError> {
        VehicleId::parse(plate).map(|id| Self::new(id, VehicleClass::Car))
    }

    /// Create a motorcycle from a raw plate.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyVehicleId`] if the plate is blank.
    pub fn motorcycle(plate: &str) -> Result<Self, ValidationError> {
        VehicleId::parse(plate).map(|id| Self::new(id, VehicleClass::Motorcycle))
    }

    /// Create a truck from a raw plate.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyVehicleId`] if the plate is blank.
    pub fn truck(plate: &str) -> Result<Self, ValidationError> {
        VehicleId::parse(plate).map(|id| Self::new(id, VehicleClass::Truck))
    }

    /// The vehicle's normalized identity.
    #[must_use]
    pub const fn id(&self) -> &VehicleId {
        &self.id
    }

    /// The vehicle's class tag.
    #[must_use]
    pub const fn class(&self) -> VehicleClass {
        self.class
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.class, self.id)
    }
}
