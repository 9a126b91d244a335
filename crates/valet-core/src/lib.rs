//! # Valet Core
//!
//! Concurrency-correct multi-lot parking facility core.
//!
//! Two global invariants hold under true parallel access:
//!
//! - no lot ever exceeds its fixed capacity — admission is the acquisition of
//!   a bounded resource ([`SpotPool`]), never a counter check
//! - no vehicle is ever parked in more than one lot at a time — enforced by a
//!   single cross-lot registry claim made *before* any lot is touched, rolled
//!   back if admission fails ([`ParkingFacility`])
//!
//! ## Laws (Compiler Enforced)
//!
//! - No `unwrap()` - returns `Result` instead
//! - No `expect()` - returns `Result` instead
//! - No `panic!()` - returns `Result` instead
//! - No `unsafe` - safe Rust only
//!
//! ## Error Handling
//!
//! Every failure in the admission/release paths is a typed result; capacity
//! exhaustion is an expected outcome, not a fault. See [`error`].
//!
//! ```
//! use valet_core::{ParkingFacility, Vehicle};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let facility = ParkingFacility::new();
//! facility.add_lot("North", 10.0, 2)?;
//!
//! let parked = facility.park(&Vehicle::car("abc123")?, "North").await?;
//! assert_eq!(parked.spot.as_str(), "A-01");
//!
//! let receipt = facility.unpark("North", "ABC123").await?;
//! assert_eq!(receipt.fee, 10.0); // one-hour minimum
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![forbid(unsafe_code)]

pub mod error;
pub mod facility;
pub mod lot;
pub mod pool;
pub mod session;
pub mod types;

pub use error::{FacilityError, ParkError, UnparkError, ValidationError};
pub use facility::{Parked, ParkingFacility};
pub use lot::{parking_fee, Admission, Departure, LotStatus, ParkingLot};
pub use pool::{PoolError, PooledSpot, Spot, SpotPool};
pub use session::{ParkingSession, SessionId};
pub use types::{LotName, SpotId, Vehicle, VehicleClass, VehicleId};
