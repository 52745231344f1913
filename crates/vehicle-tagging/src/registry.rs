//! Vehicle Registry Implementation

use crate::TaggingError;
use drive_model::{validate_vehicle_id, TagInfo, VehicleInfo, VEHICLE_ID_TAG_KEY};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Maximum number of vehicles associated at the same time
pub const MAX_ASSOCIATED_VEHICLES: usize = 2;

#[derive(Debug, Default)]
struct RegistryState {
    setup_complete: bool,
    vehicles: Vec<VehicleInfo>,
}

/// Vehicles associated with the device, in association order
#[derive(Debug, Default)]
pub struct VehicleRegistry {
    state: Mutex<RegistryState>,
}

impl VehicleRegistry {
    /// Create an empty registry for an SDK that is not set up yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry for an SDK that is already set up
    pub fn set_up() -> Self {
        let registry = Self::new();
        if let Ok(mut state) = registry.state.lock() {
            state.setup_complete = true;
        }
        registry
    }

    fn state(&self) -> Result<MutexGuard<'_, RegistryState>, TaggingError> {
        self.state
            .lock()
            .map_err(|e| TaggingError::Internal(format!("Lock error: {}", e)))
    }

    /// Record whether the SDK is set up. Associations survive teardown.
    pub fn set_sdk_setup(&self, setup_complete: bool) -> Result<(), TaggingError> {
        let mut state = self.state()?;
        state.setup_complete = setup_complete;
        info!("Vehicle registry SDK setup: {}", setup_complete);
        Ok(())
    }

    /// Associate a vehicle with the device
    pub fn associate_vehicle(&self, vehicle: VehicleInfo) -> Result<(), TaggingError> {
        let mut state = self.state()?;
        if !state.setup_complete {
            return Err(TaggingError::NotSetup);
        }

        vehicle.validate().map_err(TaggingError::InvalidVehicleInfo)?;

        if let Some(existing) = state.vehicles.iter().find(|v| {
            v.vehicle_id == vehicle.vehicle_id || v.shares_bluetooth_with(&vehicle)
        }) {
            if existing.vehicle_id == vehicle.vehicle_id && existing.shares_bluetooth_with(&vehicle)
            {
                debug!("Vehicle {} already associated", vehicle.vehicle_id);
                return Ok(());
            }
            warn!(
                "Vehicle {} conflicts with associated vehicle {}",
                vehicle.vehicle_id, existing.vehicle_id
            );
            return Err(TaggingError::AssociatedVehicleConflict {
                existing: existing.clone(),
            });
        }

        if state.vehicles.len() >= MAX_ASSOCIATED_VEHICLES {
            return Err(TaggingError::AssociatedVehiclesLimitExceeded {
                max: MAX_ASSOCIATED_VEHICLES,
            });
        }

        info!(
            "Associated vehicle {} ({})",
            vehicle.vehicle_id, vehicle.bluetooth_id
        );
        state.vehicles.push(vehicle);
        Ok(())
    }

    /// Remove the association of `vehicle_id`
    pub fn dissociate_vehicle(&self, vehicle_id: &str) -> Result<VehicleInfo, TaggingError> {
        let mut state = self.state()?;
        if !state.setup_complete {
            return Err(TaggingError::NotSetup);
        }

        validate_vehicle_id(vehicle_id).map_err(TaggingError::InvalidVehicleId)?;

        let index = state
            .vehicles
            .iter()
            .position(|v| v.vehicle_id == vehicle_id)
            .ok_or_else(|| TaggingError::VehicleNotAssociated(vehicle_id.to_string()))?;

        let removed = state.vehicles.remove(index);
        info!("Dissociated vehicle {}", removed.vehicle_id);
        Ok(removed)
    }

    /// Associated vehicles, `None` when the SDK is not set up
    pub fn associated_vehicles(&self) -> Result<Option<Vec<VehicleInfo>>, TaggingError> {
        let state = self.state()?;
        Ok(state.setup_complete.then(|| state.vehicles.clone()))
    }

    /// Resolve the vehicle a drive was taken in from its tags.
    ///
    /// Tags are in the order they were recorded; the latest vehicle id tag
    /// naming an associated vehicle wins.
    pub fn associated_vehicle_for_drive(
        &self,
        drive_tags: &[TagInfo],
    ) -> Result<Option<VehicleInfo>, TaggingError> {
        let state = self.state()?;
        if !state.setup_complete {
            return Ok(None);
        }

        let vehicle = drive_tags
            .iter()
            .rev()
            .filter(|tag| tag.key == VEHICLE_ID_TAG_KEY)
            .find_map(|tag| state.vehicles.iter().find(|v| v.vehicle_id == tag.value))
            .cloned();
        Ok(vehicle)
    }

    /// Number of associated vehicles
    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.vehicles.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
