//! Parking session: the immutable record of one vehicle occupying one spot.
//!
//! A session is created at successful admission and ended exactly once at
//! release. `end` is idempotent-safe: the first call freezes the exit
//! timestamp, every later call is a no-op reporting failure. Fees are not
//! computed here; see [`crate::lot::parking_fee`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::types::{SpotId, VehicleId};

/// Process-lifetime session counter. Identity and debugging only; never used
/// to order business logic.
static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Monotonically increasing, globally unique session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SessionId(u64);

impl SessionId {
    /// Allocate the next id.
    pub(crate) fn next() -> Self {
        Self(NEXT_SESSION.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw sequence number.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{:06}", self.0)
    }
}

/// One vehicle occupying one spot from entry until release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkingSession {
    id: SessionId,
    vehicle: VehicleId,
    spot: SpotId,
    entered_at: DateTime<Utc>,
    exited_at: Option<DateTime<Utc>>,
}

impl ParkingSession {
    /// Start a session for `vehicle` in `spot`, stamped now.
    pub(crate) fn begin(vehicle: VehicleId, spot: SpotId) -> Self {
        Self {
            id: SessionId::next(),
            vehicle,
            spot,
            entered_at: Utc::now(),
            exited_at: None,
        }
    }

    /// The session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// The occupying vehicle.
    #[must_use]
    pub const fn vehicle(&self) -> &VehicleId {
        &self.vehicle
    }

    /// The occupied spot.
    #[must_use]
    pub const fn spot(&self) -> &SpotId {
        &self.spot
    }

    /// Entry timestamp.
    #[must_use]
    pub const fn entered_at(&self) -> DateTime<Utc> {
        self.entered_at
    }

    /// Exit timestamp, if the session has ended.
    #[must_use]
    pub const fn exited_at(&self) -> Option<DateTime<Utc>> {
        self.exited_at
    }

    /// Whether the session is still active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.exited_at.is_none()
    }

    /// End the session. The first call stamps the exit time and returns
    /// `true`; every subsequent call returns `false` and changes nothing.
    pub fn end(&mut self) -> bool {
        if self.exited_at.is_some() {
            return false;
        }
        self.exited_at = Some(Utc::now());
        true
    }

    /// Elapsed occupancy: exit minus entry while ended, now minus entry while
    /// active. Frozen once the session ends.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.exited_at.unwrap_or_else(Utc::now) - self.entered_at
    }
}
