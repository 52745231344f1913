//! Drive Data Model
//!
//! Data types delivered to applications by drive callbacks:
//! - Location points and waypoints
//! - Driving events (hard brake, overspeeding, accident, ...)
//! - Drive start, end and analysis info
//! - Accident info with dictionary/JSON export
//! - Vehicle info and input parameter validation

mod accident;
mod drive;
mod event;
mod location;
mod validation;
mod vehicle;

pub use accident::{AccidentConfidence, AccidentInfo};
pub use drive::{
    DriveInfo, DriveScore, DriveStartInfo, DriveType, EventRatings, PhonePosition, StarRating,
    TagInfo, UserMode, VehicleType, VEHICLE_ID_TAG_KEY,
};
pub use event::{Event, EventSeverity, EventType, SpeedingData, TurnDirection};
pub use location::LocationPoint;
pub use validation::{
    is_valid_bluetooth_id, is_valid_input_parameter, validate_vehicle_id, ValidationError,
    MAX_VEHICLE_ID_LEN,
};
pub use vehicle::VehicleInfo;
