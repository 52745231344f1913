//! Accident info

use crate::location::LocationPoint;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Confidence measure of a detected accident
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccidentConfidence {
    /// Emergency services may be informed after a short wait for user feedback
    #[default]
    High,
    /// The user should be asked before notifying anyone
    Low,
    /// Final callback retracting an earlier potential accident
    Invalid,
}

/// Meta-information about an accident detected during a drive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccidentInfo {
    /// Drive during which the accident occurred
    pub drive_id: String,
    pub accident_location: LocationPoint,
    /// Epoch millis
    pub timestamp: i64,
    pub session_id: Option<String>,
    pub tracking_id: Option<String>,
    pub confidence: AccidentConfidence,
    /// Unique identifier of this accident
    pub accident_id: String,
    /// Approximate precision, 0..=100. Zero means "not an accident".
    pub confidence_number: i32,
}

impl AccidentInfo {
    /// Whether this info retracts a previously reported potential accident
    pub fn is_invalidation(&self) -> bool {
        self.confidence == AccidentConfidence::Invalid || self.confidence_number == 0
    }

    /// Dictionary representation with camelCase keys
    pub fn to_dictionary(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Ok(Map::from_iter([("value".to_string(), other)])),
        }
    }

    /// JSON string representation, same keys as [`AccidentInfo::to_dictionary`]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AccidentInfo {
        AccidentInfo {
            drive_id: "drive-1".to_string(),
            accident_location: LocationPoint::new(1_000, 37.77, -122.41),
            timestamp: 1_000,
            session_id: None,
            tracking_id: Some("track-9".to_string()),
            confidence: AccidentConfidence::High,
            accident_id: "accident-1".to_string(),
            confidence_number: 70,
        }
    }

    #[test]
    fn test_dictionary_keys() {
        let dict = sample().to_dictionary().unwrap();
        let mut keys: Vec<_> = dict.keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "accidentId",
                "accidentLocation",
                "confidence",
                "confidenceNumber",
                "driveId",
                "sessionId",
                "timestamp",
                "trackingId",
            ]
        );
        assert_eq!(dict["confidence"], "high");
        assert_eq!(dict["confidenceNumber"], 70);
        assert!(dict["sessionId"].is_null());
    }

    #[test]
    fn test_json_matches_dictionary() {
        let info = sample();
        let parsed: Value = serde_json::from_str(&info.to_json().unwrap()).unwrap();
        assert_eq!(parsed, Value::Object(info.to_dictionary().unwrap()));
    }

    #[test]
    fn test_invalidation() {
        let mut info = sample();
        assert!(!info.is_invalidation());
        info.confidence = AccidentConfidence::Invalid;
        info.confidence_number = 0;
        assert!(info.is_invalidation());
    }
}
