//! Built Mock Drive

use drive_model::{
    AccidentInfo, DriveInfo, DriveScore, DriveStartInfo, DriveType, Event, EventRatings,
    LocationPoint, PhonePosition, TagInfo, UserMode, VehicleType, VEHICLE_ID_TAG_KEY,
};
use serde::Serialize;

/// One scheduled accident callback derived from an accident event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MockAccidentInfo {
    /// Payload delivered to the application
    pub accident_info: AccidentInfo,
    /// Potential (provisional) or final callback
    pub is_potential_accident: bool,
    /// Delay of the callback after the accident timestamp
    pub delay_from_accident_secs: u32,
    /// Position of the originating event in `MockDrive::events`
    pub event_index: usize,
}

impl MockAccidentInfo {
    /// Callback delay in milliseconds
    pub fn delay_ms(&self) -> i64 {
        i64::from(self.delay_from_accident_secs) * 1_000
    }

    /// Epoch millis at which the callback is due in trip time
    pub fn due_timestamp(&self) -> i64 {
        self.accident_info.timestamp + self.delay_ms()
    }
}

/// Immutable, validated description of a drive to simulate.
///
/// Built with [`crate::MockDriveBuilder::build`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MockDrive {
    pub(crate) drive_id: String,
    pub(crate) drive_type: DriveType,
    pub(crate) user_mode: UserMode,
    pub(crate) start_timestamp: i64,
    pub(crate) end_timestamp: i64,
    pub(crate) average_speed: f64,
    pub(crate) max_speed: f64,
    pub(crate) distance: f64,
    pub(crate) vehicle_type: VehicleType,
    pub(crate) tags: Vec<TagInfo>,
    pub(crate) waypoints: Vec<LocationPoint>,
    pub(crate) events: Vec<Event>,
    pub(crate) accident_infos: Vec<MockAccidentInfo>,
    pub(crate) score: DriveScore,
    pub(crate) event_ratings: EventRatings,
    pub(crate) phone_position: PhonePosition,
    pub(crate) trip_start_delay_ms: i64,
    pub(crate) trip_end_delay_ms: i64,
    pub(crate) trip_analysis_delay_ms: i64,
}

impl MockDrive {
    pub fn drive_id(&self) -> &str {
        &self.drive_id
    }

    pub fn drive_type(&self) -> DriveType {
        self.drive_type
    }

    pub fn user_mode(&self) -> UserMode {
        self.user_mode
    }

    /// Epoch millis
    pub fn start_timestamp(&self) -> i64 {
        self.start_timestamp
    }

    /// Epoch millis
    pub fn end_timestamp(&self) -> i64 {
        self.end_timestamp
    }

    /// Trip duration in milliseconds, always positive
    pub fn duration_ms(&self) -> i64 {
        self.end_timestamp - self.start_timestamp
    }

    /// Metres/second
    pub fn average_speed(&self) -> f64 {
        self.average_speed
    }

    /// Metres/second
    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    /// Metres
    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn vehicle_type(&self) -> VehicleType {
        self.vehicle_type
    }

    pub fn tags(&self) -> &[TagInfo] {
        &self.tags
    }

    /// Vehicle id tag, if one was set
    pub fn vehicle_id_tag(&self) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.key == VEHICLE_ID_TAG_KEY)
            .map(|tag| tag.value.as_str())
    }

    pub fn waypoints(&self) -> &[LocationPoint] {
        &self.waypoints
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Accident callbacks, in event order with potential before final
    pub fn accident_infos(&self) -> &[MockAccidentInfo] {
        &self.accident_infos
    }

    pub fn score(&self) -> DriveScore {
        self.score
    }

    pub fn event_ratings(&self) -> EventRatings {
        self.event_ratings
    }

    pub fn phone_position(&self) -> PhonePosition {
        self.phone_position
    }

    /// Delay of the start callback after trip start
    pub fn trip_start_delay_ms(&self) -> i64 {
        self.trip_start_delay_ms
    }

    /// Delay of the end callback after trip end
    pub fn trip_end_delay_ms(&self) -> i64 {
        self.trip_end_delay_ms
    }

    /// Delay of the analysis callback after the end callback
    pub fn trip_analysis_delay_ms(&self) -> i64 {
        self.trip_analysis_delay_ms
    }

    /// Payload of the start-of-drive callback
    pub fn drive_start_info(&self) -> DriveStartInfo {
        DriveStartInfo {
            drive_id: self.drive_id.clone(),
            start_timestamp: self.start_timestamp,
            distance: 0.0,
            waypoints: self.waypoints.first().copied().into_iter().collect(),
            tracking_id: None,
            session_id: None,
        }
    }

    /// Payload of the end-of-drive callback. Events and scores are only
    /// known once the drive is analyzed.
    pub fn estimated_drive_info(&self) -> DriveInfo {
        DriveInfo {
            events: Vec::new(),
            score: DriveScore::default(),
            event_ratings: EventRatings::default(),
            ..self.analyzed_drive_info()
        }
    }

    /// Payload of the analysis callback
    pub fn analyzed_drive_info(&self) -> DriveInfo {
        DriveInfo {
            drive_id: self.drive_id.clone(),
            drive_type: self.drive_type,
            user_mode: self.user_mode,
            start_timestamp: self.start_timestamp,
            end_timestamp: self.end_timestamp,
            average_speed: self.average_speed,
            max_speed: self.max_speed,
            distance: self.distance,
            waypoints: self.waypoints.clone(),
            tracking_id: None,
            session_id: None,
            events: self.events.clone(),
            score: self.score,
            event_ratings: self.event_ratings,
            phone_position: self.phone_position,
            tags: self.tags.clone(),
            vehicle_type: self.vehicle_type,
        }
    }
}
