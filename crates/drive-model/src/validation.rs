//! Input Parameter Validation

use thiserror::Error;

/// Maximum length of a vehicle id
pub const MAX_VEHICLE_ID_LEN: usize = 64;

/// Characters never accepted in SDK input parameters
const DISALLOWED_CHARS: [char; 7] = ['?', ' ', '&', '/', '\\', ';', '#'];

/// Errors validating identifiers passed by the application
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Identifier is empty
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    /// Identifier exceeds the maximum length
    #[error("{field} has {len} characters, maximum is {max}")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// Identifier contains a disallowed or non-ascii character
    #[error("{field} contains disallowed character {ch:?}")]
    DisallowedCharacter { field: &'static str, ch: char },

    /// Not a `XX:XX:XX:XX:XX:XX` MAC address
    #[error("Invalid bluetooth address: {0}")]
    InvalidBluetoothId(String),
}

/// Whether `input` may be passed to the SDK: ascii only, none of `? &/\;#`
pub fn is_valid_input_parameter(input: &str) -> bool {
    first_disallowed(input).is_none()
}

fn first_disallowed(input: &str) -> Option<char> {
    input
        .chars()
        .find(|c| !c.is_ascii() || DISALLOWED_CHARS.contains(c))
}

/// Validate a vehicle id: non-empty, at most 64 characters, valid input parameter
pub fn validate_vehicle_id(vehicle_id: &str) -> Result<(), ValidationError> {
    const FIELD: &str = "vehicle_id";

    if vehicle_id.is_empty() {
        return Err(ValidationError::Empty { field: FIELD });
    }

    let len = vehicle_id.chars().count();
    if len > MAX_VEHICLE_ID_LEN {
        return Err(ValidationError::TooLong {
            field: FIELD,
            len,
            max: MAX_VEHICLE_ID_LEN,
        });
    }

    match first_disallowed(vehicle_id) {
        Some(ch) => Err(ValidationError::DisallowedCharacter { field: FIELD, ch }),
        None => Ok(()),
    }
}

/// Whether `bluetooth_id` is a MAC address of six hex octets separated by ':'
pub fn is_valid_bluetooth_id(bluetooth_id: &str) -> bool {
    let octets: Vec<&str> = bluetooth_id.split(':').collect();
    octets.len() == 6
        && octets
            .iter()
            .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_input_parameter_charset() {
        assert!(is_valid_input_parameter("vehicle_01-A"));
        assert!(is_valid_input_parameter(""));
        for bad in ["a b", "a?b", "a&b", "a/b", "a\\b", "a;b", "a#b", "véhicule"] {
            assert!(!is_valid_input_parameter(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_vehicle_id_length() {
        assert!(validate_vehicle_id(&"a".repeat(64)).is_ok());
        assert_eq!(
            validate_vehicle_id(&"a".repeat(65)),
            Err(ValidationError::TooLong {
                field: "vehicle_id",
                len: 65,
                max: 64
            })
        );
        assert!(matches!(
            validate_vehicle_id(""),
            Err(ValidationError::Empty { .. })
        ));
    }

    #[test]
    fn test_vehicle_id_disallowed_char() {
        assert_eq!(
            validate_vehicle_id("my car"),
            Err(ValidationError::DisallowedCharacter {
                field: "vehicle_id",
                ch: ' '
            })
        );
    }

    #[test]
    fn test_bluetooth_id() {
        assert!(is_valid_bluetooth_id("14:0F:C7:62:F8:9E"));
        assert!(is_valid_bluetooth_id("14:0f:c7:62:f8:9e"));
        assert!(!is_valid_bluetooth_id("14:0F:C7:62:F8"));
        assert!(!is_valid_bluetooth_id("14-0F-C7-62-F8-9E"));
        assert!(!is_valid_bluetooth_id("14:0F:C7:62:F8:9G"));
        assert!(!is_valid_bluetooth_id("140:F:C7:62:F8:9E"));
    }

    proptest! {
        #[test]
        fn prop_alphanumeric_ids_are_valid(id in "[A-Za-z0-9_-]{1,64}") {
            prop_assert!(validate_vehicle_id(&id).is_ok());
        }

        #[test]
        fn prop_formatted_macs_are_valid(bytes in proptest::array::uniform6(any::<u8>())) {
            let mac = bytes
                .iter()
                .map(|b| format!("{:02X}", b))
                .collect::<Vec<_>>()
                .join(":");
            prop_assert!(is_valid_bluetooth_id(&mac));
        }
    }
}
