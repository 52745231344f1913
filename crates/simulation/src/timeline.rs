//! Callback Timeline
//!
//! Every callback of a simulated drive is placed at an offset from trip
//! start, then scaled so the whole trip plays out in the requested run time.
//! Callbacks are popped in scaled-offset order; equal offsets keep the
//! order in which the callbacks were declared.

use crate::delegate::DriveDelegate;
use drive_model::{AccidentInfo, DriveInfo, DriveStartInfo, Event};
use mock_drive::MockDrive;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Kind of a delivered callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackKind {
    StartOfDrive,
    Event,
    PotentialAccident,
    Accident,
    EndOfDrive,
    AnalysisOfDrive,
}

impl CallbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallbackKind::StartOfDrive => "start_of_drive",
            CallbackKind::Event => "event",
            CallbackKind::PotentialAccident => "potential_accident",
            CallbackKind::Accident => "accident",
            CallbackKind::EndOfDrive => "end_of_drive",
            CallbackKind::AnalysisOfDrive => "analysis_of_drive",
        }
    }
}

/// A callback with its payload
#[derive(Debug, Clone, PartialEq)]
pub enum Callback {
    StartOfDrive(DriveStartInfo),
    Event(Event),
    PotentialAccident(AccidentInfo),
    Accident(AccidentInfo),
    EndOfDrive(DriveInfo),
    AnalysisOfDrive(DriveInfo),
}

impl Callback {
    pub fn kind(&self) -> CallbackKind {
        match self {
            Callback::StartOfDrive(_) => CallbackKind::StartOfDrive,
            Callback::Event(_) => CallbackKind::Event,
            Callback::PotentialAccident(_) => CallbackKind::PotentialAccident,
            Callback::Accident(_) => CallbackKind::Accident,
            Callback::EndOfDrive(_) => CallbackKind::EndOfDrive,
            Callback::AnalysisOfDrive(_) => CallbackKind::AnalysisOfDrive,
        }
    }

    /// Invoke the matching delegate method
    pub fn deliver(&self, delegate: &dyn DriveDelegate) {
        match self {
            Callback::StartOfDrive(info) => delegate.process_start_of_drive(info),
            Callback::Event(event) => delegate.process_event(event),
            Callback::PotentialAccident(info) => delegate.process_potential_accident_detected(info),
            Callback::Accident(info) => delegate.process_accident_detected(info),
            Callback::EndOfDrive(info) => delegate.process_end_of_drive(info),
            Callback::AnalysisOfDrive(info) => delegate.process_analysis_of_drive(info),
        }
    }
}

/// A callback placed on the timeline
#[derive(Debug, Clone)]
pub struct ScheduledCallback {
    /// Offset from trip start in trip time
    pub trip_offset_ms: i64,
    /// Offset from simulation start in run time
    pub scaled_offset_ms: i64,
    /// Declaration order, breaks ties between equal offsets
    pub sequence: usize,
    pub callback: Callback,
}

impl Eq for ScheduledCallback {}

impl PartialEq for ScheduledCallback {
    fn eq(&self, other: &Self) -> bool {
        self.scaled_offset_ms == other.scaled_offset_ms && self.sequence == other.sequence
    }
}

impl Ord for ScheduledCallback {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap behavior: earliest offset, then first declared
        other
            .scaled_offset_ms
            .cmp(&self.scaled_offset_ms)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for ScheduledCallback {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pending callbacks of one simulation run
#[derive(Debug, Clone)]
pub struct Timeline {
    queue: BinaryHeap<ScheduledCallback>,
    scale_ratio: f64,
}

impl Timeline {
    /// Lay out the callbacks of `drive` over `run_time_ms`.
    ///
    /// Potential accident callbacks are left out unless
    /// `deliver_potential_accidents` is set.
    pub fn plan(drive: &MockDrive, run_time_ms: i64, deliver_potential_accidents: bool) -> Self {
        let scale_ratio = run_time_ms as f64 / drive.duration_ms() as f64;
        let mut timeline = Self {
            queue: BinaryHeap::new(),
            scale_ratio,
        };

        let start = drive.start_timestamp();
        timeline.push(
            drive.trip_start_delay_ms(),
            Callback::StartOfDrive(drive.drive_start_info()),
        );

        for (index, event) in drive.events().iter().enumerate() {
            timeline.push(event.start_time - start, Callback::Event(event.clone()));

            for accident in drive.accident_infos().iter().filter(|a| a.event_index == index) {
                let offset = accident.due_timestamp() - start;
                if accident.is_potential_accident {
                    if deliver_potential_accidents {
                        let info = accident.accident_info.clone();
                        timeline.push(offset, Callback::PotentialAccident(info));
                    }
                } else {
                    timeline.push(offset, Callback::Accident(accident.accident_info.clone()));
                }
            }
        }

        let end_offset = drive.duration_ms() + drive.trip_end_delay_ms();
        timeline.push(end_offset, Callback::EndOfDrive(drive.estimated_drive_info()));
        timeline.push(
            end_offset + drive.trip_analysis_delay_ms(),
            Callback::AnalysisOfDrive(drive.analyzed_drive_info()),
        );

        timeline
    }

    fn push(&mut self, trip_offset_ms: i64, callback: Callback) {
        let scheduled = ScheduledCallback {
            trip_offset_ms,
            scaled_offset_ms: self.scale(trip_offset_ms),
            sequence: self.queue.len(),
            callback,
        };
        self.queue.push(scheduled);
    }

    /// Convert a trip-time offset to run time, rounded to whole milliseconds
    pub fn scale(&self, trip_offset_ms: i64) -> i64 {
        (trip_offset_ms as f64 * self.scale_ratio).round() as i64
    }

    /// Run time per unit of trip time
    pub fn scale_ratio(&self) -> f64 {
        self.scale_ratio
    }

    /// Next callback due
    pub fn pop(&mut self) -> Option<ScheduledCallback> {
        self.queue.pop()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// All pending callbacks in delivery order
    pub fn into_sorted_vec(self) -> Vec<ScheduledCallback> {
        // Ord is reversed, so ascending heap order is latest first
        let mut callbacks = self.queue.into_sorted_vec();
        callbacks.reverse();
        callbacks
    }
}
