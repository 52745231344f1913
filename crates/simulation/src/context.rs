//! SDK state consulted before a simulation starts

use drive_model::VehicleType;
use serde::{Deserialize, Serialize};

/// Drive detection behaviour of the SDK
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveDetectionMode {
    /// Drives are detected automatically
    #[default]
    AutoOn,
    /// Only manually started drives are recorded
    AutoOff,
    /// Detection follows insurance periods
    Insurance,
}

/// Snapshot of the SDK state a simulation depends on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkContext {
    pub setup_complete: bool,
    pub drive_detection_mode: DriveDetectionMode,
    /// Vehicle type configured at setup
    pub vehicle_type: VehicleType,
    /// Whether the application handles potential accident callbacks
    pub implements_multiple_accident_callbacks: bool,
}

impl Default for SdkContext {
    fn default() -> Self {
        Self {
            setup_complete: true,
            drive_detection_mode: DriveDetectionMode::AutoOn,
            vehicle_type: VehicleType::Car,
            implements_multiple_accident_callbacks: true,
        }
    }
}

impl SdkContext {
    /// Context of an SDK that has not been set up
    pub fn not_set_up() -> Self {
        Self {
            setup_complete: false,
            ..Self::default()
        }
    }

    pub fn with_drive_detection_mode(mut self, mode: DriveDetectionMode) -> Self {
        self.drive_detection_mode = mode;
        self
    }

    pub fn with_vehicle_type(mut self, vehicle_type: VehicleType) -> Self {
        self.vehicle_type = vehicle_type;
        self
    }

    pub fn with_multiple_accident_callbacks(mut self, implemented: bool) -> Self {
        self.implements_multiple_accident_callbacks = implemented;
        self
    }
}
