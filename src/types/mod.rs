//! Value types for controller parameters.

mod color;
mod power;

pub use color::Color;
pub use power::PowerState;
