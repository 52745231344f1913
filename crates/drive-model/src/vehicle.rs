//! Vehicle info

use crate::validation::{is_valid_bluetooth_id, validate_vehicle_id, ValidationError};
use serde::{Deserialize, Serialize};

/// A vehicle identified by the MAC address of its bluetooth stereo
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VehicleInfo {
    /// Unique vehicle identifier (at most 64 characters)
    pub vehicle_id: String,
    /// MAC address of the vehicle's bluetooth device
    pub bluetooth_id: String,
}

impl VehicleInfo {
    /// Create vehicle info
    pub fn new(vehicle_id: impl Into<String>, bluetooth_id: impl Into<String>) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            bluetooth_id: bluetooth_id.into(),
        }
    }

    /// Validate both identifiers
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_vehicle_id(&self.vehicle_id)?;
        if !is_valid_bluetooth_id(&self.bluetooth_id) {
            return Err(ValidationError::InvalidBluetoothId(self.bluetooth_id.clone()));
        }
        Ok(())
    }

    /// Whether both vehicles use the same bluetooth device (MACs compare case-insensitively)
    pub fn shares_bluetooth_with(&self, other: &VehicleInfo) -> bool {
        self.bluetooth_id.eq_ignore_ascii_case(&other.bluetooth_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_vehicle() {
        let vehicle = VehicleInfo::new("family-car", "14:0F:C7:62:F8:9E");
        assert!(vehicle.validate().is_ok());
    }

    #[test]
    fn test_invalid_bluetooth() {
        let vehicle = VehicleInfo::new("family-car", "not-a-mac");
        assert_eq!(
            vehicle.validate(),
            Err(ValidationError::InvalidBluetoothId("not-a-mac".to_string()))
        );
    }

    #[test]
    fn test_shared_bluetooth_case_insensitive() {
        let a = VehicleInfo::new("a", "14:0F:C7:62:F8:9E");
        let b = VehicleInfo::new("b", "14:0f:c7:62:f8:9e");
        assert!(a.shares_bluetooth_with(&b));
    }
}
