//! Preset Trips
//!
//! Canned drives with fixed distance, duration and event list. A preset
//! yields a [`MockDriveBuilder`] that can be customized further before
//! `build()`.

use crate::accident_config::MockAccidentConfig;
use crate::builder::MockDriveBuilder;
use crate::error::EventError;
use crate::event::{EventBuilder, PointEventBuilder, RangeEventBuilder};
use chrono::Utc;
use drive_model::{
    AccidentConfidence, DriveType, EventSeverity, LocationPoint, SpeedingData, TurnDirection,
    VehicleType,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Number of waypoints generated along a preset route
const WAYPOINT_COUNT: usize = 11;

/// Canned trip templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresetTrip {
    Urban10MinTrip,
    Highway60MinTrip,
    Urban30MinWithCollisionTrip,
    Urban30MinWithMultipleCollisionCallbackTrip,
    NonDriving60MinTrip,
    InvalidTrip,
    Urban10MinMotorcycleTrip,
}

impl PresetTrip {
    pub const ALL: [PresetTrip; 7] = [
        PresetTrip::Urban10MinTrip,
        PresetTrip::Highway60MinTrip,
        PresetTrip::Urban30MinWithCollisionTrip,
        PresetTrip::Urban30MinWithMultipleCollisionCallbackTrip,
        PresetTrip::NonDriving60MinTrip,
        PresetTrip::InvalidTrip,
        PresetTrip::Urban10MinMotorcycleTrip,
    ];

    /// Distance in metres
    pub fn distance_m(&self) -> f64 {
        match self {
            PresetTrip::Urban10MinTrip | PresetTrip::Urban10MinMotorcycleTrip => 4445.0,
            PresetTrip::Highway60MinTrip => 59112.0,
            PresetTrip::Urban30MinWithCollisionTrip
            | PresetTrip::Urban30MinWithMultipleCollisionCallbackTrip => 50130.0,
            PresetTrip::NonDriving60MinTrip => 74990.0,
            PresetTrip::InvalidTrip => 1624.0,
        }
    }

    /// Duration in milliseconds
    pub fn duration_ms(&self) -> i64 {
        match self {
            PresetTrip::Urban10MinTrip | PresetTrip::Urban10MinMotorcycleTrip => 600_000,
            PresetTrip::Highway60MinTrip => 3_480_000,
            PresetTrip::Urban30MinWithCollisionTrip
            | PresetTrip::Urban30MinWithMultipleCollisionCallbackTrip => 1_860_000,
            PresetTrip::NonDriving60MinTrip => 3_960_000,
            PresetTrip::InvalidTrip => 14_700,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PresetTrip::Urban10MinTrip => "Urban10MinTrip",
            PresetTrip::Highway60MinTrip => "Highway60MinTrip",
            PresetTrip::Urban30MinWithCollisionTrip => "Urban30MinWithCollisionTrip",
            PresetTrip::Urban30MinWithMultipleCollisionCallbackTrip => {
                "Urban30MinWithMultipleCollisionCallbackTrip"
            }
            PresetTrip::NonDriving60MinTrip => "NonDriving60MinTrip",
            PresetTrip::InvalidTrip => "InvalidTrip",
            PresetTrip::Urban10MinMotorcycleTrip => "Urban10MinMotorcycleTrip",
        }
    }

    /// Builder for this trip ending now
    pub fn builder(&self) -> Result<MockDriveBuilder, EventError> {
        self.builder_at(Utc::now().timestamp_millis() - self.duration_ms())
    }

    /// Builder for this trip starting at `start_timestamp` (epoch millis)
    pub fn builder_at(&self, start_timestamp: i64) -> Result<MockDriveBuilder, EventError> {
        if start_timestamp < 0 {
            return Err(EventError::NegativeTimestamp {
                field: "start_timestamp",
                value: start_timestamp,
            });
        }
        let duration = self.duration_ms();
        let end_timestamp = start_timestamp
            .checked_add(duration)
            .ok_or(EventError::TimestampOverflow {
                field: "end_timestamp",
            })?;
        let route = self.route(start_timestamp, end_timestamp);
        let average_speed = self.distance_m() / (duration as f64 / 1_000.0);

        let mut builder = MockDriveBuilder::new(start_timestamp, end_timestamp)
            .distance(self.distance_m())
            .average_speed(average_speed)
            .max_speed(average_speed * 1.6)
            .waypoints(route.waypoints(WAYPOINT_COUNT));

        builder = match self {
            PresetTrip::NonDriving60MinTrip => builder.drive_type(DriveType::NonDriving),
            PresetTrip::InvalidTrip => builder.drive_type(DriveType::Invalid),
            PresetTrip::Urban10MinMotorcycleTrip => builder.vehicle_type(VehicleType::Motorcycle),
            _ => builder,
        };

        for event in self.events(&route)? {
            builder = builder.add_event(event);
        }
        Ok(builder)
    }

    fn route(&self, start_timestamp: i64, end_timestamp: i64) -> Route {
        let (from, to) = match self {
            PresetTrip::Highway60MinTrip | PresetTrip::NonDriving60MinTrip => {
                ((37.7749, -122.4194), (37.3382, -121.8863))
            }
            PresetTrip::Urban30MinWithCollisionTrip
            | PresetTrip::Urban30MinWithMultipleCollisionCallbackTrip => {
                ((37.7749, -122.4194), (37.8716, -122.2727))
            }
            _ => ((37.7749, -122.4194), (37.7955, -122.3937)),
        };
        Route {
            from: LocationPoint::new(start_timestamp, from.0, from.1),
            to: LocationPoint::new(end_timestamp, to.0, to.1),
        }
    }

    fn events(&self, route: &Route) -> Result<Vec<EventBuilder>, EventError> {
        let events = match self {
            PresetTrip::Urban10MinTrip | PresetTrip::Urban10MinMotorcycleTrip => vec![
                route.range(
                    RangeEventBuilder::hard_brake(route.at(120_000), route.at(124_000))?,
                    EventSeverity::High,
                ),
                route.point(
                    PointEventBuilder::aggressive_acceleration(route.at(300_000))?,
                    EventSeverity::Low,
                ),
            ],
            PresetTrip::Highway60MinTrip => vec![
                route.range(
                    RangeEventBuilder::hard_brake(route.at(420_000), route.at(425_000))?,
                    EventSeverity::High,
                ),
                route.range(
                    RangeEventBuilder::overspeeding(
                        route.at(600_000),
                        route.at(660_000),
                        SpeedingData::new(29.0, 33.5, 36.1),
                    )?,
                    EventSeverity::High,
                ),
                route.range(
                    RangeEventBuilder::phone_handling(route.at(1_800_000), route.at(1_860_000))?,
                    EventSeverity::Low,
                ),
            ],
            PresetTrip::Urban30MinWithCollisionTrip => {
                let accident = PointEventBuilder::accident(
                    route.at(1_500_000),
                    route.from.timestamp,
                    Uuid::new_v4().to_string(),
                    AccidentConfidence::High,
                    85,
                )?;
                Self::collision_events(route, accident)?
            }
            PresetTrip::Urban30MinWithMultipleCollisionCallbackTrip => {
                let accident = PointEventBuilder::accident_with_config(
                    MockAccidentConfig::default(),
                    route.at(1_500_000),
                    route.from.timestamp,
                    Uuid::new_v4().to_string(),
                )?;
                Self::collision_events(route, accident)?
            }
            PresetTrip::NonDriving60MinTrip | PresetTrip::InvalidTrip => Vec::new(),
        };
        Ok(events)
    }

    /// Hard brake and hard turn in town, then the collision
    fn collision_events(
        route: &Route,
        accident: PointEventBuilder,
    ) -> Result<Vec<EventBuilder>, EventError> {
        Ok(vec![
            route.range(
                RangeEventBuilder::hard_brake(route.at(480_000), route.at(484_000))?,
                EventSeverity::High,
            ),
            route.range(
                RangeEventBuilder::hard_turn(
                    route.at(900_000),
                    route.at(903_000),
                    TurnDirection::Left,
                )?,
                EventSeverity::Low,
            ),
            route.point(accident, EventSeverity::High),
        ])
    }
}

impl fmt::Display for PresetTrip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Straight line between two timestamped points
struct Route {
    from: LocationPoint,
    to: LocationPoint,
}

impl Route {
    /// Timestamp `offset_ms` into the trip
    fn at(&self, offset_ms: i64) -> i64 {
        self.from.timestamp + offset_ms
    }

    fn location_at(&self, timestamp: i64) -> LocationPoint {
        let span = (self.to.timestamp - self.from.timestamp) as f64;
        let fraction = (timestamp - self.from.timestamp) as f64 / span;
        self.from.lerp(&self.to, fraction)
    }

    fn waypoints(&self, count: usize) -> Vec<LocationPoint> {
        let steps = (count.max(2) - 1) as f64;
        (0..count.max(2))
            .map(|i| self.from.lerp(&self.to, i as f64 / steps))
            .collect()
    }

    fn point(&self, builder: PointEventBuilder, severity: EventSeverity) -> EventBuilder {
        let location = self.location_at(builder.timestamp());
        builder
            .with_location(location)
            .with_severity(severity)
            .into()
    }

    fn range(&self, builder: RangeEventBuilder, severity: EventSeverity) -> EventBuilder {
        let start = self.location_at(builder.start_timestamp());
        let end = self.location_at(builder.end_timestamp());
        builder
            .with_locations(start, end)
            .with_severity(severity)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drive_model::EventType;
    use std::collections::HashSet;

    const START: i64 = 1_700_000_000_000;

    #[test]
    fn test_urban_10_min_trip() {
        let drive = PresetTrip::Urban10MinTrip
            .builder_at(START)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(drive.distance(), 4445.0);
        assert_eq!(drive.duration_ms(), 600_000);
        let types: HashSet<_> = drive.events().iter().map(|e| e.event_type).collect();
        assert_eq!(
            types,
            HashSet::from([EventType::HardBrake, EventType::AggressiveAcceleration])
        );
        assert!(drive.accident_infos().is_empty());
    }

    #[test]
    fn test_all_presets_build() {
        for preset in PresetTrip::ALL {
            let drive = preset.builder().unwrap().build();
            assert!(drive.is_ok(), "{} failed: {:?}", preset, drive.as_ref().err());
            let drive = drive.unwrap();
            assert_eq!(drive.duration_ms(), preset.duration_ms());
            assert_eq!(drive.distance(), preset.distance_m());
        }
    }

    fn event_types(preset: PresetTrip) -> HashSet<EventType> {
        let drive = preset.builder_at(START).unwrap().build().unwrap();
        drive.events().iter().map(|e| e.event_type).collect()
    }

    #[test]
    fn test_preset_event_types() {
        let collision = HashSet::from([
            EventType::HardBrake,
            EventType::Accident,
            EventType::HardTurn,
        ]);
        let expected = [
            (
                PresetTrip::Urban10MinTrip,
                HashSet::from([EventType::HardBrake, EventType::AggressiveAcceleration]),
            ),
            (
                PresetTrip::Highway60MinTrip,
                HashSet::from([
                    EventType::HardBrake,
                    EventType::OverSpeeding,
                    EventType::PhoneHandling,
                ]),
            ),
            (PresetTrip::Urban30MinWithCollisionTrip, collision.clone()),
            (
                PresetTrip::Urban30MinWithMultipleCollisionCallbackTrip,
                collision,
            ),
            (PresetTrip::NonDriving60MinTrip, HashSet::new()),
            (PresetTrip::InvalidTrip, HashSet::new()),
            (
                PresetTrip::Urban10MinMotorcycleTrip,
                HashSet::from([EventType::HardBrake, EventType::AggressiveAcceleration]),
            ),
        ];
        assert_eq!(expected.len(), PresetTrip::ALL.len());
        for (preset, types) in expected {
            assert_eq!(event_types(preset), types, "{}", preset);
        }
    }

    #[test]
    fn test_builder_at_overflow() {
        for preset in PresetTrip::ALL {
            assert_eq!(
                preset.builder_at(i64::MAX - 1).err(),
                Some(EventError::TimestampOverflow {
                    field: "end_timestamp"
                })
            );
        }
        assert_eq!(
            PresetTrip::Urban10MinTrip.builder_at(-1).err(),
            Some(EventError::NegativeTimestamp {
                field: "start_timestamp",
                value: -1
            })
        );
    }

    #[test]
    fn test_non_driving_presets() {
        let drive = PresetTrip::NonDriving60MinTrip
            .builder_at(START)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(drive.drive_type(), DriveType::NonDriving);
        assert_eq!(drive.vehicle_type(), VehicleType::Unknown);

        let drive = PresetTrip::InvalidTrip.builder_at(START).unwrap().build().unwrap();
        assert_eq!(drive.drive_type(), DriveType::Invalid);
        assert_eq!(drive.vehicle_type(), VehicleType::Unknown);
        assert_eq!(drive.duration_ms(), 14_700);
    }

    #[test]
    fn test_collision_presets() {
        let single = PresetTrip::Urban30MinWithCollisionTrip
            .builder_at(START)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(single.accident_infos().len(), 1);
        assert!(!single.accident_infos()[0].is_potential_accident);
        assert_eq!(single.accident_infos()[0].event_index, 2);

        let multi = PresetTrip::Urban30MinWithMultipleCollisionCallbackTrip
            .builder_at(START)
            .unwrap()
            .build()
            .unwrap();
        let infos = multi.accident_infos();
        assert_eq!(infos.len(), 2);
        assert!(infos[0].is_potential_accident);
        assert_eq!(infos[1].delay_from_accident_secs, 20);
    }

    #[test]
    fn test_motorcycle_preset() {
        let drive = PresetTrip::Urban10MinMotorcycleTrip
            .builder_at(START)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(drive.vehicle_type(), VehicleType::Motorcycle);
    }

    #[test]
    fn test_preset_customizable() {
        let drive = PresetTrip::Urban10MinTrip
            .builder_at(START)
            .unwrap()
            .clear_events()
            .vehicle_id_tag("car-1")
            .build()
            .unwrap();
        assert!(drive.events().is_empty());
        assert_eq!(drive.vehicle_id_tag(), Some("car-1"));
    }

    #[test]
    fn test_preset_waypoints_bound_trip() {
        let drive = PresetTrip::Highway60MinTrip
            .builder_at(START)
            .unwrap()
            .build()
            .unwrap();
        let waypoints = drive.waypoints();
        assert_eq!(waypoints.len(), WAYPOINT_COUNT);
        assert_eq!(waypoints[0].timestamp, drive.start_timestamp());
        assert_eq!(waypoints[WAYPOINT_COUNT - 1].timestamp, drive.end_timestamp());
    }
}
