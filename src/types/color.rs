//! RGBW color representation.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::Error;

/// An RGBW color with red, green, blue and white channels (0-255 each).
///
/// The channels are independent; all-zero is a valid color and is not the
/// same thing as the controller being powered off.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub(crate) red: u8,
    pub(crate) green: u8,
    pub(crate) blue: u8,
    pub(crate) white: u8,
}

impl Color {
    /// Create a color with the given RGBW values.
    pub fn rgbw(red: u8, green: u8, blue: u8, white: u8) -> Self {
        Self {
            red,
            green,
            blue,
            white,
        }
    }

    /// Create a color with the white channel off.
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::rgbw(red, green, blue, 0)
    }

    /// Create a default color (all channels 0).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn red(&self) -> u8 {
        self.red
    }

    pub fn green(&self) -> u8 {
        self.green
    }

    pub fn blue(&self) -> u8 {
        self.blue
    }

    pub fn white(&self) -> u8 {
        self.white
    }

    /// Channels in wire order.
    pub fn channels(&self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.white]
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Parse from comma-separated string (e.g., "255,128,0,0").
    fn from_str(s: &str) -> Result<Self, Error> {
        let parts = s
            .split(',')
            .map(|c| c.trim().parse::<u8>())
            .collect::<Result<Vec<u8>, _>>()
            .map_err(|_| Error::InvalidColorString(s.to_string()))?;
        match parts[..] {
            [red, green, blue, white] => Ok(Self::rgbw(red, green, blue, white)),
            _ => Err(Error::InvalidColorString(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        let color = Color::from_str("255, 0,128,7").unwrap();
        assert_eq!(color.channels(), [255, 0, 128, 7]);
    }

    #[test]
    fn test_parse_color_rejects_bad_input() {
        assert!(Color::from_str("255,0,128").is_err());
        assert!(Color::from_str("256,0,0,0").is_err());
        assert!(Color::from_str("red").is_err());
    }

    #[test]
    fn test_rgb_leaves_white_off() {
        assert_eq!(Color::rgb(1, 2, 3), Color::rgbw(1, 2, 3, 0));
    }
}
