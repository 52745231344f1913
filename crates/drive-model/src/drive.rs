//! Drive callback payloads

use crate::event::Event;
use crate::location::LocationPoint;
use serde::{Deserialize, Serialize};

/// Tag key under which the vehicle id of a drive is reported
pub const VEHICLE_ID_TAG_KEY: &str = "vehicle_id";

/// Kind of trip that was detected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriveType {
    /// Falsely detected trip
    Invalid,
    /// Non-automobile trip (biking, public transport, ...)
    NonDriving,
    #[default]
    Drive,
}

/// Whether the user was driving
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserMode {
    #[default]
    Driver,
    Passenger,
    Unavailable,
}

/// Vehicle the user drives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    #[default]
    Car,
    Motorcycle,
    Unknown,
}

/// Where the phone was during the trip
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhonePosition {
    #[default]
    Unknown,
    Mount,
}

/// Star rating for one class of events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StarRating {
    One,
    Two,
    Three,
    Four,
    Five,
    /// Not available
    #[default]
    NA,
}

impl StarRating {
    /// Numeric value, -1 for NA
    pub fn value(&self) -> i32 {
        match self {
            StarRating::One => 1,
            StarRating::Two => 2,
            StarRating::Three => 3,
            StarRating::Four => 4,
            StarRating::Five => 5,
            StarRating::NA => -1,
        }
    }
}

/// Per-event-class ratings of a drive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRatings {
    pub phone_handling_rating: StarRating,
    pub hard_brake_rating: StarRating,
    pub hard_turn_rating: StarRating,
    pub speeding_rating: StarRating,
    pub aggressive_acceleration_rating: StarRating,
}

/// Driving behaviour score, -1 when unavailable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveScore {
    pub zendrive_score: i32,
}

impl DriveScore {
    /// Create a score
    pub fn new(zendrive_score: i32) -> Self {
        Self { zendrive_score }
    }

    /// Whether a score was computed
    pub fn is_available(&self) -> bool {
        self.zendrive_score >= 0
    }
}

impl Default for DriveScore {
    fn default() -> Self {
        Self { zendrive_score: -1 }
    }
}

/// Additional key/value information attached to a drive
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagInfo {
    pub key: String,
    pub value: String,
}

impl TagInfo {
    /// Create a tag
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Payload of the start-of-drive callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveStartInfo {
    pub drive_id: String,
    pub start_timestamp: i64,
    /// Distance covered when the drive was detected (metres)
    pub distance: f64,
    pub waypoints: Vec<LocationPoint>,
    pub tracking_id: Option<String>,
    pub session_id: Option<String>,
}

/// Payload of the end-of-drive and analysis callbacks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveInfo {
    pub drive_id: String,
    pub drive_type: DriveType,
    pub user_mode: UserMode,
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    /// Metres/second
    pub average_speed: f64,
    /// Metres/second
    pub max_speed: f64,
    /// Metres
    pub distance: f64,
    pub waypoints: Vec<LocationPoint>,
    pub tracking_id: Option<String>,
    pub session_id: Option<String>,
    pub events: Vec<Event>,
    pub score: DriveScore,
    pub event_ratings: EventRatings,
    pub phone_position: PhonePosition,
    pub tags: Vec<TagInfo>,
    pub vehicle_type: VehicleType,
}

impl DriveInfo {
    /// Value of the tag with `key`, if present
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.key == key)
            .map(|tag| tag.value.as_str())
    }

    /// Trip duration in milliseconds
    pub fn duration_ms(&self) -> i64 {
        self.end_timestamp - self.start_timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_score_unavailable() {
        assert_eq!(DriveScore::default().zendrive_score, -1);
        assert!(!DriveScore::default().is_available());
        assert!(DriveScore::new(80).is_available());
    }

    #[test]
    fn test_default_ratings_na() {
        let ratings = EventRatings::default();
        assert_eq!(ratings.hard_brake_rating, StarRating::NA);
        assert_eq!(ratings.speeding_rating.value(), -1);
        assert_eq!(StarRating::Four.value(), 4);
    }
}
