//! Simulation Error Types

use drive_model::VehicleType;
use thiserror::Error;

/// Reasons a simulation cannot start
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// Mock mode is disabled in the settings
    #[error("Not a mock drive build")]
    NotMockDriveBuild,

    /// Run time outside (0, max]
    #[error("Run time {run_time_ms} ms must be in (0, {max_ms}] ms")]
    InvalidRunTime { run_time_ms: i64, max_ms: i64 },

    #[error("SDK is not set up")]
    SdkNotSetup,

    #[error("Auto drive detection is not on")]
    AutoDetectionModeNotOn,

    /// Another drive is being simulated
    #[error("Simulation of drive {drive_id} already in progress")]
    SimulationAlreadyInProgress { drive_id: String },

    /// The drive's vehicle type differs from the one configured at setup
    #[error("Drive vehicle type {drive:?} conflicts with setup vehicle type {setup:?}")]
    UnsupportedVehicleType {
        drive: VehicleType,
        setup: VehicleType,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SimulationError {
    /// Short label used for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            SimulationError::NotMockDriveBuild => "not_mock_drive_build",
            SimulationError::InvalidRunTime { .. } => "invalid_run_time",
            SimulationError::SdkNotSetup => "sdk_not_setup",
            SimulationError::AutoDetectionModeNotOn => "auto_detection_mode_not_on",
            SimulationError::SimulationAlreadyInProgress { .. } => "already_in_progress",
            SimulationError::UnsupportedVehicleType { .. } => "unsupported_vehicle_type",
            SimulationError::Internal(_) => "internal",
        }
    }
}
