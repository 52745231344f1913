//! Mock Accident Configuration
//!
//! Controls the two-phase accident reporting of a simulated accident: a
//! potential callback followed by a final callback after a configurable gap.

use crate::error::EventError;
use drive_model::AccidentConfidence;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Confidence values and timing of potential/final accident callbacks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockAccidentConfig {
    potential_confidence: AccidentConfidence,
    potential_confidence_number: i32,
    final_confidence: AccidentConfidence,
    final_confidence_number: i32,
    delay_between_callbacks_secs: u32,
    final_invalidated: bool,
}

impl Default for MockAccidentConfig {
    fn default() -> Self {
        Self {
            potential_confidence: AccidentConfidence::High,
            potential_confidence_number: 70,
            final_confidence: AccidentConfidence::High,
            final_confidence_number: 70,
            delay_between_callbacks_secs: 20,
            final_invalidated: false,
        }
    }
}

impl MockAccidentConfig {
    /// Create a config with default values (High/70, High/70, 20s)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the potential callback confidence
    pub fn with_potential_confidence(mut self, confidence: AccidentConfidence) -> Self {
        self.potential_confidence = confidence;
        self
    }

    /// Set the potential callback confidence number
    pub fn with_potential_confidence_number(mut self, number: i32) -> Self {
        self.potential_confidence_number = number;
        self
    }

    /// Set the final callback confidence. Ignored once the final callback is invalidated.
    pub fn with_final_confidence(mut self, confidence: AccidentConfidence) -> Self {
        if self.final_invalidated {
            debug!("Final callback invalidated, ignoring confidence {:?}", confidence);
        } else {
            self.final_confidence = confidence;
        }
        self
    }

    /// Set the final callback confidence number. Ignored once the final callback is invalidated.
    pub fn with_final_confidence_number(mut self, number: i32) -> Self {
        if self.final_invalidated {
            debug!("Final callback invalidated, ignoring confidence number {}", number);
        } else {
            self.final_confidence_number = number;
        }
        self
    }

    /// Set the gap between potential and final callbacks, in seconds
    pub fn with_delay_between_callbacks_secs(mut self, secs: u32) -> Self {
        self.delay_between_callbacks_secs = secs;
        self
    }

    /// Make the final callback retract the potential one: confidence
    /// `Invalid` and confidence number 0 from now on.
    pub fn invalidate_final_callback(&mut self) {
        self.final_invalidated = true;
        self.final_confidence = AccidentConfidence::Invalid;
        self.final_confidence_number = 0;
    }

    /// Consuming variant of [`MockAccidentConfig::invalidate_final_callback`]
    pub fn invalidated(mut self) -> Self {
        self.invalidate_final_callback();
        self
    }

    pub fn potential_confidence(&self) -> AccidentConfidence {
        self.potential_confidence
    }

    pub fn potential_confidence_number(&self) -> i32 {
        self.potential_confidence_number
    }

    pub fn final_confidence(&self) -> AccidentConfidence {
        self.final_confidence
    }

    pub fn final_confidence_number(&self) -> i32 {
        self.final_confidence_number
    }

    /// Whether the final callback retracts the potential one
    pub fn is_final_invalidated(&self) -> bool {
        self.final_invalidated
    }

    pub fn delay_between_callbacks_secs(&self) -> u32 {
        self.delay_between_callbacks_secs
    }

    /// Gap between potential and final callbacks
    pub fn delay_between_callbacks(&self) -> Duration {
        Duration::from_secs(u64::from(self.delay_between_callbacks_secs))
    }

    /// Check confidence numbers. A potential callback never reports 0.
    pub fn validate(&self) -> Result<(), EventError> {
        check_confidence_number(
            "potential_confidence_number",
            self.potential_confidence_number,
            1,
        )?;
        check_confidence_number("final_confidence_number", self.final_confidence_number, 0)
    }
}

/// Check `value` lies in `min..=100`
pub(crate) fn check_confidence_number(
    field: &'static str,
    value: i32,
    min: i32,
) -> Result<(), EventError> {
    if (min..=100).contains(&value) {
        Ok(())
    } else {
        Err(EventError::ConfidenceNumberOutOfRange { field, value, min })
    }
}
