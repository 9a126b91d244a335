//! Bounded spot pool: the capacity primitive of one lot.
//!
//! Admission is the acquisition of a bounded resource, not a counter check.
//! A counting semaphore carries the capacity bound and an ordered free queue
//! carries spot identity; the two are kept in lockstep by construction:
//!
//! - a spot is popped only by a caller holding a freshly granted permit
//! - a released spot is pushed back onto the queue *before* its permit is
//!   surrendered, so a waiter granted the freed permit always finds a spot
//!
//! The permit travels inside [`PooledSpot`], which makes double-release
//! unrepresentable: capacity frees only when the handle is given back.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tracing::warn;

use crate::types::{SpotId, VehicleId};

/// Errors from spot acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// No capacity permit is available.
    #[error("no spots available")]
    Exhausted,

    /// A permit was granted but the free queue was empty. Unreachable under
    /// correct bookkeeping; the permit is returned before this is reported.
    #[error("capacity permit granted but free queue is empty")]
    Inconsistent,
}

/// An addressable unit of parking capacity within one lot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spot {
    id: SpotId,
    occupant: Option<VehicleId>,
}

impl Spot {
    fn new(id: SpotId) -> Self {
        Self { id, occupant: None }
    }

    /// The spot's identifier.
    #[must_use]
    pub const fn id(&self) -> &SpotId {
        &self.id
    }

    /// The vehicle currently assigned, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<&VehicleId> {
        self.occupant.as_ref()
    }

    /// Whether the spot is currently assigned.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// Assign `vehicle` to this spot. Fails if already occupied.
    pub(crate) fn assign(&mut self, vehicle: VehicleId) -> bool {
        if self.occupant.is_some() {
            return false;
        }
        self.occupant = Some(vehicle);
        true
    }

    /// Clear the assignment, returning the previous occupant.
    pub(crate) fn release(&mut self) -> Option<VehicleId> {
        self.occupant.take()
    }
}

/// A spot checked out of the pool together with the capacity permit that
/// admitted it. Give it back with [`SpotPool::release`]; dropping it frees
/// the capacity but loses the spot from the free queue.
#[derive(Debug)]
pub struct PooledSpot {
    spot: Spot,
    permit: OwnedSemaphorePermit,
}

impl PooledSpot {
    /// The checked-out spot's identifier.
    #[must_use]
    pub fn spot_id(&self) -> &SpotId {
        self.spot.id()
    }

    /// Assign an occupant to the checked-out spot.
    pub(crate) fn assign(&mut self, vehicle: VehicleId) -> bool {
        self.spot.assign(vehicle)
    }

    fn into_parts(self) -> (Spot, OwnedSemaphorePermit) {
        (self.spot, self.permit)
    }
}

/// Fixed set of identified spots for one lot, handed out and reclaimed under
/// a capacity bound.
#[derive(Debug)]
pub struct SpotPool {
    capacity: Arc<Semaphore>,
    free: Mutex<VecDeque<Spot>>,
}

impl SpotPool {
    /// Create a pool of `total` spots labeled `A-01 .. A-NN`.
    #[must_use]
    pub fn new(total: u32) -> Self {
        let free = (1..=total).map(|i| Spot::new(SpotId::label(i))).collect();
        Self {
            capacity: Arc::new(Semaphore::new(total as usize)),
            free: Mutex::new(free),
        }
    }

    /// Acquire a spot, suspending while the pool is exhausted.
    ///
    /// Cancel-safe: abandoning the wait, including a cancellation that races
    /// with the grant, returns the permit to the pool.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Inconsistent`] if a granted permit finds the free
    /// queue empty (defensive; the permit is returned first).
    pub async fn acquire(&self) -> Result<PooledSpot, PoolError> {
        let permit = Arc::clone(&self.capacity)
            .acquire_owned()
            .await
            // The pool never closes its semaphore.
            .map_err(|_| PoolError::Exhausted)?;
        self.checkout(permit).await
    }

    /// Acquire a spot without suspending.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Exhausted`] when no permit is immediately
    /// available.
    pub async fn try_acquire(&self) -> Result<PooledSpot, PoolError> {
        let permit = Arc::clone(&self.capacity)
            .try_acquire_owned()
            .map_err(|_| PoolError::Exhausted)?;
        self.checkout(permit).await
    }

    async fn checkout(&self, permit: OwnedSemaphorePermit) -> Result<PooledSpot, PoolError> {
        match self.free.lock().await.pop_front() {
            Some(spot) => Ok(PooledSpot { spot, permit }),
            None => {
                // Permits and the free queue are kept in lockstep; fail
                // closed and surrender the permit by dropping it.
                warn!("capacity permit granted but free queue is empty");
                Err(PoolError::Inconsistent)
            }
        }
    }

    /// Return a checked-out spot.
    ///
    /// The spot re-enters the free queue before the permit is surrendered, so
    /// the freed capacity is observable only once the spot is reclaimable.
    pub async fn release(&self, slot: PooledSpot) {
        let (mut spot, permit) = slot.into_parts();
        spot.release();
        self.free.lock().await.push_back(spot);
        drop(permit);
    }

    /// Number of permits immediately available.
    #[must_use]
    pub fn available(&self) -> usize {
        self.capacity.available_permits()
    }
}
