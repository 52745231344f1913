//! Mock Drive Builder

use crate::drive::{MockAccidentInfo, MockDrive};
use crate::error::{BuildError, EventError};
use crate::event::{AccidentSpec, CallbackMode, EventBuilder};
use crate::preset::PresetTrip;
use drive_model::{
    validate_vehicle_id, AccidentConfidence, AccidentInfo, DriveScore, DriveType, EventRatings,
    LocationPoint, PhonePosition, TagInfo, UserMode, VehicleType, VEHICLE_ID_TAG_KEY,
};
use tracing::{debug, warn};
use uuid::Uuid;

/// Builder for [`MockDrive`]
#[derive(Debug, Clone)]
pub struct MockDriveBuilder {
    drive_id: Option<String>,
    start_timestamp: i64,
    end_timestamp: i64,
    drive_type: DriveType,
    user_mode: UserMode,
    average_speed: f64,
    max_speed: f64,
    distance: f64,
    /// Unset resolves from the drive type at build time
    vehicle_type: Option<VehicleType>,
    tags: Vec<TagInfo>,
    waypoints: Vec<LocationPoint>,
    events: Vec<EventBuilder>,
    score: DriveScore,
    event_ratings: EventRatings,
    phone_position: PhonePosition,
    trip_start_delay_ms: i64,
    trip_end_delay_ms: i64,
    trip_analysis_delay_ms: i64,
}

impl MockDriveBuilder {
    /// Builder for an automatically detected drive between two epoch-millis timestamps.
    ///
    /// The drive type defaults to [`DriveType::Drive`].
    pub fn new(start_timestamp: i64, end_timestamp: i64) -> Self {
        Self {
            drive_id: None,
            start_timestamp,
            end_timestamp,
            drive_type: DriveType::Drive,
            user_mode: UserMode::Driver,
            average_speed: 0.0,
            max_speed: 0.0,
            distance: 0.0,
            vehicle_type: None,
            tags: Vec::new(),
            waypoints: Vec::new(),
            events: Vec::new(),
            score: DriveScore::default(),
            event_ratings: EventRatings::default(),
            phone_position: PhonePosition::Unknown,
            trip_start_delay_ms: 0,
            trip_end_delay_ms: 0,
            trip_analysis_delay_ms: 0,
        }
    }

    /// Builder pre-populated with a canned trip ending now
    pub fn preset(preset: PresetTrip) -> Result<Self, EventError> {
        preset.builder()
    }

    /// Use a fixed drive id instead of a generated one
    pub fn drive_id(mut self, drive_id: impl Into<String>) -> Self {
        self.drive_id = Some(drive_id.into());
        self
    }

    /// Metres/second
    pub fn average_speed(mut self, average_speed: f64) -> Self {
        self.average_speed = average_speed;
        self
    }

    /// Metres/second
    pub fn max_speed(mut self, max_speed: f64) -> Self {
        self.max_speed = max_speed;
        self
    }

    /// Metres
    pub fn distance(mut self, distance_meters: f64) -> Self {
        self.distance = distance_meters;
        self
    }

    pub fn drive_type(mut self, drive_type: DriveType) -> Self {
        self.drive_type = drive_type;
        self
    }

    pub fn user_mode(mut self, user_mode: UserMode) -> Self {
        self.user_mode = user_mode;
        self
    }

    /// `Unknown` keeps the default: `Car` for a drive, `Unknown` otherwise
    pub fn vehicle_type(mut self, vehicle_type: VehicleType) -> Self {
        self.vehicle_type = Some(vehicle_type);
        self
    }

    /// Add a tag, replacing the value of an existing tag with the same key
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let tag = TagInfo::new(key, value);
        match self.tags.iter_mut().find(|t| t.key == tag.key) {
            Some(existing) => existing.value = tag.value,
            None => self.tags.push(tag),
        }
        self
    }

    /// Vehicle id reported as a tag of the drive
    pub fn vehicle_id_tag(self, vehicle_id: impl Into<String>) -> Self {
        self.tag(VEHICLE_ID_TAG_KEY, vehicle_id)
    }

    pub fn add_event(mut self, event: impl Into<EventBuilder>) -> Self {
        self.events.push(event.into());
        self
    }

    pub fn clear_events(mut self) -> Self {
        self.events.clear();
        self
    }

    /// Defaults to -1 (unavailable)
    pub fn score(mut self, score: DriveScore) -> Self {
        self.score = score;
        self
    }

    pub fn event_ratings(mut self, event_ratings: EventRatings) -> Self {
        self.event_ratings = event_ratings;
        self
    }

    /// Waypoints in increasing timestamp order
    pub fn waypoints(mut self, waypoints: Vec<LocationPoint>) -> Self {
        self.waypoints = waypoints;
        self
    }

    pub fn phone_position(mut self, phone_position: PhonePosition) -> Self {
        self.phone_position = phone_position;
        self
    }

    /// Delay of the start callback after trip start
    pub fn trip_start_delay_ms(mut self, delay: i64) -> Self {
        self.trip_start_delay_ms = delay;
        self
    }

    /// Delay of the end callback after trip end
    pub fn trip_end_delay_ms(mut self, delay: i64) -> Self {
        self.trip_end_delay_ms = delay;
        self
    }

    /// Delay of the analysis callback after the end callback
    pub fn trip_analysis_delay_ms(mut self, delay: i64) -> Self {
        self.trip_analysis_delay_ms = delay;
        self
    }

    pub fn start_timestamp(&self) -> i64 {
        self.start_timestamp
    }

    pub fn end_timestamp(&self) -> i64 {
        self.end_timestamp
    }

    pub fn event_builders(&self) -> &[EventBuilder] {
        &self.events
    }

    fn resolved_vehicle_type(&self) -> VehicleType {
        match (self.vehicle_type, self.drive_type) {
            (Some(vehicle_type), _) if vehicle_type != VehicleType::Unknown => vehicle_type,
            (_, DriveType::Drive) => VehicleType::Car,
            _ => VehicleType::Unknown,
        }
    }

    /// Validate the configuration and build an immutable drive
    pub fn build(&self) -> Result<MockDrive, BuildError> {
        if let Err(e) = self.validate() {
            warn!("Mock drive rejected: {}", e);
            return Err(e);
        }

        let drive_id = self
            .drive_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let events: Vec<_> = self.events.iter().map(EventBuilder::build_event).collect();
        let accident_infos = self.accident_infos(&drive_id);

        debug!(
            "Built mock drive {} ({} ms, {} events, {} accident callbacks)",
            drive_id,
            self.end_timestamp.saturating_sub(self.start_timestamp),
            events.len(),
            accident_infos.len()
        );

        Ok(MockDrive {
            drive_id,
            drive_type: self.drive_type,
            user_mode: self.user_mode,
            start_timestamp: self.start_timestamp,
            end_timestamp: self.end_timestamp,
            average_speed: self.average_speed,
            max_speed: self.max_speed,
            distance: self.distance,
            vehicle_type: self.resolved_vehicle_type(),
            tags: self.tags.clone(),
            waypoints: self.waypoints.clone(),
            events,
            accident_infos,
            score: self.score,
            event_ratings: self.event_ratings,
            phone_position: self.phone_position,
            trip_start_delay_ms: self.trip_start_delay_ms,
            trip_end_delay_ms: self.trip_end_delay_ms,
            trip_analysis_delay_ms: self.trip_analysis_delay_ms,
        })
    }

    fn validate(&self) -> Result<(), BuildError> {
        let (start, end) = (self.start_timestamp, self.end_timestamp);
        if start < 0 {
            return Err(BuildError::NegativeTimestamp {
                field: "start_timestamp",
                value: start,
            });
        }
        if start >= end {
            return Err(BuildError::InvalidTimestamps { start, end });
        }

        for (field, value) in [
            ("trip_start_delay_ms", self.trip_start_delay_ms),
            ("trip_end_delay_ms", self.trip_end_delay_ms),
            ("trip_analysis_delay_ms", self.trip_analysis_delay_ms),
        ] {
            if value < 0 {
                return Err(BuildError::NegativeDelay { field, value });
            }
        }

        // Both bounds are non-negative, so the duration itself always fits
        let end_offset = (end - start)
            .checked_add(self.trip_end_delay_ms)
            .ok_or(BuildError::CallbackOverflow {
                field: "trip_end_delay_ms",
            })?;
        end_offset
            .checked_add(self.trip_analysis_delay_ms)
            .ok_or(BuildError::CallbackOverflow {
                field: "trip_analysis_delay_ms",
            })?;

        if let Some(tag) = self.tags.iter().find(|t| t.key == VEHICLE_ID_TAG_KEY) {
            validate_vehicle_id(&tag.value)?;
        }

        if let Some(vehicle_type) = self.vehicle_type {
            if self.drive_type != DriveType::Drive && vehicle_type != VehicleType::Unknown {
                return Err(BuildError::VehicleTypeNotAllowed {
                    drive_type: self.drive_type,
                    vehicle_type,
                });
            }
        }

        for (field, value) in [
            ("average_speed", self.average_speed),
            ("max_speed", self.max_speed),
            ("distance", self.distance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(BuildError::InvalidMetric { field, value });
            }
        }

        self.validate_waypoints()?;
        self.validate_events()
    }

    fn validate_waypoints(&self) -> Result<(), BuildError> {
        let (start, end) = (self.start_timestamp, self.end_timestamp);
        for (index, point) in self.waypoints.iter().enumerate() {
            if point.timestamp < start || point.timestamp > end {
                return Err(BuildError::WaypointOutsideTrip {
                    index,
                    timestamp: point.timestamp,
                });
            }
        }
        if let Some(index) = self
            .waypoints
            .windows(2)
            .position(|pair| pair[1].timestamp < pair[0].timestamp)
        {
            return Err(BuildError::WaypointsOutOfOrder { index: index + 1 });
        }
        Ok(())
    }

    fn validate_events(&self) -> Result<(), BuildError> {
        let (start, end) = (self.start_timestamp, self.end_timestamp);
        for (index, event) in self.events.iter().enumerate() {
            event
                .validate()
                .map_err(|source| BuildError::InvalidEvent { index, source })?;

            let (event_start, event_end) = event.time_span();
            if event_start < start || event_end > end {
                return Err(BuildError::EventOutsideTrip {
                    index,
                    start: event_start,
                    end: event_end,
                });
            }

            if let Some(spec) = event.accident_spec() {
                if spec.trip_timestamp != start {
                    return Err(BuildError::AccidentTripMismatch {
                        index,
                        trip_timestamp: spec.trip_timestamp,
                        drive_start: start,
                    });
                }
                let delay_ms = i64::from(spec.config.delay_between_callbacks_secs()) * 1_000;
                if spec.callback_mode == CallbackMode::Multiple
                    && event_start.checked_add(delay_ms).is_none()
                {
                    return Err(BuildError::CallbackOverflow {
                        field: "delay_between_callbacks_secs",
                    });
                }
            }
        }
        Ok(())
    }

    fn accident_infos(&self, drive_id: &str) -> Vec<MockAccidentInfo> {
        let mut infos = Vec::new();
        for (event_index, builder) in self.events.iter().enumerate() {
            let (EventBuilder::Point(point), Some(spec)) = (builder, builder.accident_spec()) else {
                continue;
            };
            let info = |confidence, confidence_number| AccidentInfo {
                drive_id: drive_id.to_string(),
                accident_location: point.location(),
                timestamp: point.timestamp(),
                session_id: None,
                tracking_id: None,
                confidence,
                accident_id: spec.accident_id.clone(),
                confidence_number,
            };
            infos.extend(expand_accident(spec, event_index, info));
        }
        infos
    }
}

/// Accident callbacks for one accident event: potential then final in
/// multi-callback mode, a single final callback otherwise.
fn expand_accident(
    spec: &AccidentSpec,
    event_index: usize,
    info: impl Fn(AccidentConfidence, i32) -> AccidentInfo,
) -> Vec<MockAccidentInfo> {
    let config = &spec.config;
    let final_info = info(config.final_confidence(), config.final_confidence_number());
    match spec.callback_mode {
        CallbackMode::Single => vec![MockAccidentInfo {
            accident_info: final_info,
            is_potential_accident: false,
            delay_from_accident_secs: 0,
            event_index,
        }],
        CallbackMode::Multiple => vec![
            MockAccidentInfo {
                accident_info: info(
                    config.potential_confidence(),
                    config.potential_confidence_number(),
                ),
                is_potential_accident: true,
                delay_from_accident_secs: 0,
                event_index,
            },
            MockAccidentInfo {
                accident_info: final_info,
                is_potential_accident: false,
                delay_from_accident_secs: config.delay_between_callbacks_secs(),
                event_index,
            },
        ],
    }
}
