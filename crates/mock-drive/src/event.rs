//! Mock Event Builders
//!
//! Point events (accident, aggressive acceleration, stop sign violation)
//! happen at an instant and a single location. Range events (hard brake,
//! hard turn, overspeeding, phone handling, phone screen interaction) span
//! a time interval between two distinct locations.

use crate::accident_config::{check_confidence_number, MockAccidentConfig};
use crate::error::EventError;
use drive_model::{
    is_valid_input_parameter, AccidentConfidence, Event, EventSeverity, EventType, LocationPoint,
    SpeedingData, TurnDirection,
};
use serde::{Deserialize, Serialize};

/// How an accident is reported to the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallbackMode {
    /// One final callback
    Single,
    /// A potential callback followed by a final callback
    Multiple,
}

/// Accident-specific payload of an accident event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccidentSpec {
    /// Start timestamp of the trip this accident belongs to
    pub trip_timestamp: i64,
    pub accident_id: String,
    pub config: MockAccidentConfig,
    pub callback_mode: CallbackMode,
}

impl AccidentSpec {
    fn validate(&self) -> Result<(), EventError> {
        check_timestamp("trip_timestamp", self.trip_timestamp)?;
        if self.accident_id.is_empty() || !is_valid_input_parameter(&self.accident_id) {
            return Err(EventError::InvalidAccidentId(self.accident_id.clone()));
        }
        match self.callback_mode {
            CallbackMode::Multiple => self.config.validate(),
            CallbackMode::Single => check_confidence_number(
                "confidence_number",
                self.config.final_confidence_number(),
                0,
            ),
        }
    }
}

/// Kinds of point events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointKind {
    Accident(AccidentSpec),
    AggressiveAcceleration,
    StopSignViolation,
}

impl PointKind {
    fn event_type(&self) -> EventType {
        match self {
            PointKind::Accident(_) => EventType::Accident,
            PointKind::AggressiveAcceleration => EventType::AggressiveAcceleration,
            PointKind::StopSignViolation => EventType::StopSignViolation,
        }
    }
}

/// Kinds of range events, with their type-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RangeKind {
    HardBrake,
    HardTurn(TurnDirection),
    Overspeeding(SpeedingData),
    PhoneHandling,
    PhoneScreenInteraction,
}

impl RangeKind {
    fn event_type(&self) -> EventType {
        match self {
            RangeKind::HardBrake => EventType::HardBrake,
            RangeKind::HardTurn(_) => EventType::HardTurn,
            RangeKind::Overspeeding(_) => EventType::OverSpeeding,
            RangeKind::PhoneHandling => EventType::PhoneHandling,
            RangeKind::PhoneScreenInteraction => EventType::PhoneScreenInteraction,
        }
    }
}

fn check_timestamp(field: &'static str, value: i64) -> Result<(), EventError> {
    if value < 0 {
        Err(EventError::NegativeTimestamp { field, value })
    } else {
        Ok(())
    }
}

fn check_range(start: i64, end: i64) -> Result<(), EventError> {
    check_timestamp("start_timestamp", start)?;
    check_timestamp("end_timestamp", end)?;
    if start >= end {
        return Err(EventError::InvalidRange { start, end });
    }
    Ok(())
}

/// Builder for instantaneous events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointEventBuilder {
    kind: PointKind,
    timestamp: i64,
    location: Option<LocationPoint>,
    severity: EventSeverity,
}

impl PointEventBuilder {
    fn new(kind: PointKind, timestamp: i64) -> Result<Self, EventError> {
        check_timestamp("timestamp", timestamp)?;
        Ok(Self {
            kind,
            timestamp,
            location: None,
            severity: EventSeverity::None,
        })
    }

    /// Accident reported through a single final callback
    pub fn accident(
        timestamp: i64,
        trip_timestamp: i64,
        accident_id: impl Into<String>,
        confidence: AccidentConfidence,
        confidence_number: i32,
    ) -> Result<Self, EventError> {
        let mut config = MockAccidentConfig::new()
            .with_potential_confidence(confidence)
            .with_final_confidence(confidence)
            .with_final_confidence_number(confidence_number);
        if confidence_number > 0 {
            config = config.with_potential_confidence_number(confidence_number);
        }
        Self::accident_with_mode(
            config,
            CallbackMode::Single,
            timestamp,
            trip_timestamp,
            accident_id,
        )
    }

    /// Accident reported through potential and final callbacks as described by `config`
    pub fn accident_with_config(
        config: MockAccidentConfig,
        timestamp: i64,
        trip_timestamp: i64,
        accident_id: impl Into<String>,
    ) -> Result<Self, EventError> {
        Self::accident_with_mode(
            config,
            CallbackMode::Multiple,
            timestamp,
            trip_timestamp,
            accident_id,
        )
    }

    fn accident_with_mode(
        config: MockAccidentConfig,
        callback_mode: CallbackMode,
        timestamp: i64,
        trip_timestamp: i64,
        accident_id: impl Into<String>,
    ) -> Result<Self, EventError> {
        let spec = AccidentSpec {
            trip_timestamp,
            accident_id: accident_id.into(),
            config,
            callback_mode,
        };
        spec.validate()?;
        let builder = Self::new(PointKind::Accident(spec), timestamp)?;
        Ok(builder.with_severity(EventSeverity::High))
    }

    /// Aggressive acceleration at `timestamp`
    pub fn aggressive_acceleration(timestamp: i64) -> Result<Self, EventError> {
        Self::new(PointKind::AggressiveAcceleration, timestamp)
    }

    /// Stop sign violation at `timestamp`
    pub fn stop_sign_violation(timestamp: i64) -> Result<Self, EventError> {
        Self::new(PointKind::StopSignViolation, timestamp)
    }

    /// Set event severity
    pub fn with_severity(mut self, severity: EventSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Set the event location
    pub fn with_location(mut self, location: LocationPoint) -> Self {
        self.location = Some(location);
        self
    }

    pub fn kind(&self) -> &PointKind {
        &self.kind
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Accident payload, for accident events only
    pub fn accident_spec(&self) -> Option<&AccidentSpec> {
        match &self.kind {
            PointKind::Accident(spec) => Some(spec),
            _ => None,
        }
    }

    /// Mutable accident config, for accident events only
    pub fn accident_config_mut(&mut self) -> Option<&mut MockAccidentConfig> {
        match &mut self.kind {
            PointKind::Accident(spec) => Some(&mut spec.config),
            _ => None,
        }
    }

    /// Re-check everything that can change after construction
    pub fn validate(&self) -> Result<(), EventError> {
        check_timestamp("timestamp", self.timestamp)?;
        match &self.kind {
            PointKind::Accident(spec) => spec.validate(),
            _ => Ok(()),
        }
    }

    /// Location the event is reported at
    pub fn location(&self) -> LocationPoint {
        self.location
            .unwrap_or_else(|| LocationPoint::unknown_at(self.timestamp))
    }

    /// Build the event
    pub fn build_event(&self) -> Event {
        let location = self.location();
        Event {
            event_type: self.kind.event_type(),
            severity: self.severity,
            start_time: self.timestamp,
            end_time: self.timestamp,
            start_location: location,
            stop_location: location,
            turn_direction: TurnDirection::NotAvailable,
            speeding_data: None,
        }
    }
}

/// Builder for events spanning a time interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeEventBuilder {
    kind: RangeKind,
    start_timestamp: i64,
    end_timestamp: i64,
    locations: Option<(LocationPoint, LocationPoint)>,
    severity: EventSeverity,
}

impl RangeEventBuilder {
    fn new(kind: RangeKind, start_timestamp: i64, end_timestamp: i64) -> Result<Self, EventError> {
        check_range(start_timestamp, end_timestamp)?;
        Ok(Self {
            kind,
            start_timestamp,
            end_timestamp,
            locations: None,
            severity: EventSeverity::None,
        })
    }

    /// Hard brake between `start_timestamp` and `end_timestamp`
    pub fn hard_brake(start_timestamp: i64, end_timestamp: i64) -> Result<Self, EventError> {
        Self::new(RangeKind::HardBrake, start_timestamp, end_timestamp)
    }

    /// Hard turn in `direction`
    pub fn hard_turn(
        start_timestamp: i64,
        end_timestamp: i64,
        direction: TurnDirection,
    ) -> Result<Self, EventError> {
        Self::new(RangeKind::HardTurn(direction), start_timestamp, end_timestamp)
    }

    /// Overspeeding with the given speeding data
    pub fn overspeeding(
        start_timestamp: i64,
        end_timestamp: i64,
        speeding_data: SpeedingData,
    ) -> Result<Self, EventError> {
        Self::new(RangeKind::Overspeeding(speeding_data), start_timestamp, end_timestamp)
    }

    /// Phone handling between `start_timestamp` and `end_timestamp`
    pub fn phone_handling(start_timestamp: i64, end_timestamp: i64) -> Result<Self, EventError> {
        Self::new(RangeKind::PhoneHandling, start_timestamp, end_timestamp)
    }

    /// Phone screen interaction between `start_timestamp` and `end_timestamp`
    pub fn phone_screen_interaction(
        start_timestamp: i64,
        end_timestamp: i64,
    ) -> Result<Self, EventError> {
        Self::new(RangeKind::PhoneScreenInteraction, start_timestamp, end_timestamp)
    }

    /// Set event severity
    pub fn with_severity(mut self, severity: EventSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Set start and end locations
    pub fn with_locations(mut self, start: LocationPoint, end: LocationPoint) -> Self {
        self.locations = Some((start, end));
        self
    }

    pub fn kind(&self) -> &RangeKind {
        &self.kind
    }

    pub fn start_timestamp(&self) -> i64 {
        self.start_timestamp
    }

    pub fn end_timestamp(&self) -> i64 {
        self.end_timestamp
    }

    /// Start and end locations the event is reported at
    pub fn locations(&self) -> (LocationPoint, LocationPoint) {
        self.locations.unwrap_or_else(|| {
            (
                LocationPoint::unknown_at(self.start_timestamp),
                LocationPoint::unknown_at(self.end_timestamp),
            )
        })
    }

    /// Re-check everything that can change after construction
    pub fn validate(&self) -> Result<(), EventError> {
        check_range(self.start_timestamp, self.end_timestamp)?;
        let (start, end) = self.locations();
        if start == end {
            return Err(EventError::IdenticalLocations);
        }
        Ok(())
    }

    /// Build the event
    pub fn build_event(&self) -> Event {
        let (start_location, stop_location) = self.locations();
        let (turn_direction, speeding_data) = match &self.kind {
            RangeKind::HardTurn(direction) => (*direction, None),
            RangeKind::Overspeeding(data) => (TurnDirection::NotAvailable, Some(*data)),
            _ => (TurnDirection::NotAvailable, None),
        };
        Event {
            event_type: self.kind.event_type(),
            severity: self.severity,
            start_time: self.start_timestamp,
            end_time: self.end_timestamp,
            start_location,
            stop_location,
            turn_direction,
            speeding_data,
        }
    }
}

/// Any event builder accepted by the drive builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventBuilder {
    Point(PointEventBuilder),
    Range(RangeEventBuilder),
}

impl EventBuilder {
    /// Set event severity
    pub fn with_severity(self, severity: EventSeverity) -> Self {
        match self {
            EventBuilder::Point(b) => EventBuilder::Point(b.with_severity(severity)),
            EventBuilder::Range(b) => EventBuilder::Range(b.with_severity(severity)),
        }
    }

    /// Validate the builder
    pub fn validate(&self) -> Result<(), EventError> {
        match self {
            EventBuilder::Point(b) => b.validate(),
            EventBuilder::Range(b) => b.validate(),
        }
    }

    /// Build the event
    pub fn build_event(&self) -> Event {
        match self {
            EventBuilder::Point(b) => b.build_event(),
            EventBuilder::Range(b) => b.build_event(),
        }
    }

    /// Type of the event this builder produces
    pub fn event_type(&self) -> EventType {
        match self {
            EventBuilder::Point(b) => b.kind.event_type(),
            EventBuilder::Range(b) => b.kind.event_type(),
        }
    }

    /// Interval covered by the event
    pub fn time_span(&self) -> (i64, i64) {
        match self {
            EventBuilder::Point(b) => (b.timestamp, b.timestamp),
            EventBuilder::Range(b) => (b.start_timestamp, b.end_timestamp),
        }
    }

    /// Accident payload, for accident events only
    pub fn accident_spec(&self) -> Option<&AccidentSpec> {
        match self {
            EventBuilder::Point(b) => b.accident_spec(),
            EventBuilder::Range(_) => None,
        }
    }
}

impl From<PointEventBuilder> for EventBuilder {
    fn from(builder: PointEventBuilder) -> Self {
        EventBuilder::Point(builder)
    }
}

impl From<RangeEventBuilder> for EventBuilder {
    fn from(builder: RangeEventBuilder) -> Self {
        EventBuilder::Range(builder)
    }
}
