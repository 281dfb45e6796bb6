//! Point-in-time device state.

use serde::{Deserialize, Serialize};

use crate::types::{Color, PowerState};

/// The power state and color read from a controller at one instant.
///
/// A snapshot is a plain value: querying the device again produces a new one.
/// The color is the stored color, reported whether or not the device is on.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceSnapshot {
    power: PowerState,
    color: Color,
}

impl DeviceSnapshot {
    pub fn new(power: PowerState, color: Color) -> Self {
        DeviceSnapshot { power, color }
    }

    pub fn power(&self) -> PowerState {
        self.power
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    /// Check if the device is emitting its stored color.
    pub fn emitting(&self) -> bool {
        self.power.is_on()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_snapshot() {
        let snapshot = DeviceSnapshot::new(PowerState::On, Color::rgbw(10, 20, 30, 0));
        assert_eq!(
            serde_json::to_value(snapshot).unwrap(),
            json!({
                "power": "on",
                "color": {"red": 10, "green": 20, "blue": 30, "white": 0}
            })
        );
    }

    #[test]
    fn test_off_keeps_color() {
        let snapshot = DeviceSnapshot::new(PowerState::Off, Color::rgb(255, 0, 0));
        assert!(!snapshot.emitting());
        assert_eq!(snapshot.color().red(), 255);
    }
}
