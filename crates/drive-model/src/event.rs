//! Driving events

use crate::location::LocationPoint;
use serde::{Deserialize, Serialize};

/// Severity of a driving event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Severity not applicable
    #[default]
    None,
    Low,
    High,
}

/// Direction of a hard turn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnDirection {
    #[default]
    NotAvailable,
    Left,
    Right,
}

/// Event types reported during a drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    HardBrake,
    AggressiveAcceleration,
    PhoneHandling,
    OverSpeeding,
    Accident,
    HardTurn,
    PhoneScreenInteraction,
    StopSignViolation,
}

impl EventType {
    /// Point events happen at an instant, range events span a duration
    pub fn is_point(&self) -> bool {
        matches!(
            self,
            EventType::Accident | EventType::AggressiveAcceleration | EventType::StopSignViolation
        )
    }

    /// Stable snake_case name, used as a log/metric label
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::HardBrake => "hard_brake",
            EventType::AggressiveAcceleration => "aggressive_acceleration",
            EventType::PhoneHandling => "phone_handling",
            EventType::OverSpeeding => "overspeeding",
            EventType::Accident => "accident",
            EventType::HardTurn => "hard_turn",
            EventType::PhoneScreenInteraction => "phone_screen_interaction",
            EventType::StopSignViolation => "stop_sign_violation",
        }
    }
}

/// Speeding details attached to overspeeding events (metres/second)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeedingData {
    /// Posted speed limit
    pub speed_limit_mps: f64,
    /// Average user speed during the event
    pub user_speed_mps: f64,
    /// Maximum user speed during the event
    pub max_user_speed_mps: f64,
}

impl SpeedingData {
    /// Create speeding data
    pub fn new(speed_limit_mps: f64, user_speed_mps: f64, max_user_speed_mps: f64) -> Self {
        Self {
            speed_limit_mps,
            user_speed_mps,
            max_user_speed_mps,
        }
    }
}

/// A driving event detected during a drive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_type: EventType,
    pub severity: EventSeverity,
    /// Epoch millis at event start
    pub start_time: i64,
    /// Epoch millis at event end (equal to start for point events)
    pub end_time: i64,
    pub start_location: LocationPoint,
    pub stop_location: LocationPoint,
    /// Only meaningful for hard turns
    pub turn_direction: TurnDirection,
    /// Only present for overspeeding
    pub speeding_data: Option<SpeedingData>,
}

impl Event {
    /// Duration of the event in milliseconds
    pub fn duration_ms(&self) -> i64 {
        self.end_time - self.start_time
    }
}
