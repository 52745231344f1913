//! Vehicle Tagging
//!
//! Keeps the set of vehicles associated with the device and resolves which
//! of them a drive was taken in.

mod registry;

pub use registry::{VehicleRegistry, MAX_ASSOCIATED_VEHICLES};

use drive_model::{ValidationError, VehicleInfo};
use thiserror::Error;

/// Vehicle tagging errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaggingError {
    #[error("SDK is not set up")]
    NotSetup,
    #[error("Invalid vehicle info: {0}")]
    InvalidVehicleInfo(ValidationError),
    #[error("Vehicle {existing:?} already uses this vehicle id or bluetooth id")]
    AssociatedVehicleConflict { existing: VehicleInfo },
    #[error("At most {max} vehicles can be associated")]
    AssociatedVehiclesLimitExceeded { max: usize },
    #[error("Invalid vehicle id: {0}")]
    InvalidVehicleId(ValidationError),
    #[error("Vehicle {0} is not associated")]
    VehicleNotAssociated(String),
    #[error("Lock error: {0}")]
    Internal(String),
}
