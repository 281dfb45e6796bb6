//! Power state for a controller.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Whether the controller is emitting its stored color.
///
/// Parses from the tokens `on` and `off` in any ASCII case.
///
/// ```
/// use std::str::FromStr;
/// use magic_home_rs::PowerState;
///
/// assert_eq!(PowerState::from_str("ON").unwrap(), PowerState::On);
/// assert_eq!(PowerState::Off.to_string(), "off");
/// ```
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PowerState {
    On = 0x23,
    Off = 0x24,
}

impl PowerState {
    /// Look up a power state by its wire byte.
    pub fn from_byte(value: u8) -> Option<Self> {
        PowerState::iter().find(|state| state.byte() == value)
    }

    /// The byte this state is carried as on the wire.
    pub fn byte(&self) -> u8 {
        *self as u8
    }

    pub fn is_on(&self) -> bool {
        matches!(self, PowerState::On)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_from_byte() {
        assert_eq!(PowerState::from_byte(0x23), Some(PowerState::On));
        assert_eq!(PowerState::from_byte(0x24), Some(PowerState::Off));
        assert_eq!(PowerState::from_byte(0x00), None);
    }

    #[test]
    fn test_parse_token() {
        assert_eq!(PowerState::from_str("on").unwrap(), PowerState::On);
        assert_eq!(PowerState::from_str("Off").unwrap(), PowerState::Off);
        assert!(PowerState::from_str("toggle").is_err());
    }
}
