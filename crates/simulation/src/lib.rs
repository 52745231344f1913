//! Mock Drive Simulation
//!
//! Replays a [`mock_drive::MockDrive`] as the callbacks the SDK would
//! deliver for a real drive, compressed or stretched into a chosen run time.

mod context;
mod delegate;
mod error;
mod settings;
mod simulator;
mod timeline;

pub use context::{DriveDetectionMode, SdkContext};
pub use delegate::DriveDelegate;
pub use error::SimulationError;
pub use settings::{MockSettings, SettingsError, ENV_PREFIX};
pub use simulator::{
    Delivery, SimulationHandle, SimulationReport, SimulationState, Simulator, MAX_RUN_TIME_MS,
};
pub use timeline::{Callback, CallbackKind, ScheduledCallback, Timeline};
