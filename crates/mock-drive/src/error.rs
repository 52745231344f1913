//! Builder Error Types

use drive_model::{DriveType, ValidationError, VehicleType};
use thiserror::Error;

/// Errors constructing or validating a mock event
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EventError {
    /// Timestamps are epoch millis and cannot be negative
    #[error("{field} {value} is negative")]
    NegativeTimestamp { field: &'static str, value: i64 },

    #[error("{field} overflows epoch millis")]
    TimestampOverflow { field: &'static str },

    /// Range events must end strictly after they start
    #[error("Range event must end after it starts (start {start}, end {end})")]
    InvalidRange { start: i64, end: i64 },

    /// Range events need distinct start and end locations
    #[error("Range event start and end locations are identical")]
    IdenticalLocations,

    /// Accident id is empty or contains disallowed characters
    #[error("Invalid accident id: {0:?}")]
    InvalidAccidentId(String),

    /// Confidence number outside the accepted range
    #[error("{field} {value} is out of range [{min}, 100]")]
    ConfidenceNumberOutOfRange {
        field: &'static str,
        value: i32,
        min: i32,
    },
}

/// Errors returned by `MockDriveBuilder::build`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("{field} {value} is negative")]
    NegativeTimestamp { field: &'static str, value: i64 },

    /// Start timestamp is not before end timestamp
    #[error("Start timestamp {start} must be before end timestamp {end}")]
    InvalidTimestamps { start: i64, end: i64 },

    /// A callback delay is negative
    #[error("{field} must not be negative, got {value}")]
    NegativeDelay { field: &'static str, value: i64 },

    /// A delayed callback would be due past the largest epoch millis
    #[error("{field} pushes a callback past the representable time range")]
    CallbackOverflow { field: &'static str },

    /// The vehicle id tag failed validation
    #[error("Invalid vehicle id tag: {0}")]
    InvalidVehicleId(#[from] ValidationError),

    /// Only real drives can carry a vehicle type
    #[error("Vehicle type {vehicle_type:?} requires a drive, got {drive_type:?}")]
    VehicleTypeNotAllowed {
        drive_type: DriveType,
        vehicle_type: VehicleType,
    },

    /// Speed or distance is negative or not finite
    #[error("{field} must be a finite non-negative number, got {value}")]
    InvalidMetric { field: &'static str, value: f64 },

    /// Waypoints are not sorted by timestamp
    #[error("Waypoint {index} is earlier than the previous waypoint")]
    WaypointsOutOfOrder { index: usize },

    /// A waypoint lies outside the trip
    #[error("Waypoint {index} at {timestamp} is outside the trip")]
    WaypointOutsideTrip { index: usize, timestamp: i64 },

    /// An event builder failed validation
    #[error("Event {index} is invalid: {source}")]
    InvalidEvent {
        index: usize,
        #[source]
        source: EventError,
    },

    /// An event lies outside the trip
    #[error("Event {index} [{start}, {end}] is outside the trip")]
    EventOutsideTrip { index: usize, start: i64, end: i64 },

    /// An accident names a different trip than the one being built
    #[error(
        "Accident event {index} belongs to trip {trip_timestamp}, drive starts at {drive_start}"
    )]
    AccidentTripMismatch {
        index: usize,
        trip_timestamp: i64,
        drive_start: i64,
    },
}
