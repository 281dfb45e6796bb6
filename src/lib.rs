//! # magic_home_rs
//!
//! An async Rust library for controlling Magic Home RGBW LED controllers.
//!
//! This crate provides a **runtime-agnostic** async API to talk to Magic Home
//! (HF-A11 based) LED strip controllers on your local network. It can set a
//! controller's color and power state, read both back, and find controllers
//! with a broadcast request.
//!
//! ## Quick Start
//!
//! ```ignore
//! use magic_home_rs::{Color, PowerState, Session, SessionConfig, device_addr};
//!
//! // Works with any async runtime!
//! async fn control_strip() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Session::connect(device_addr("192.168.1.42".parse()?), SessionConfig::default()).await?;
//!
//!     session.set_power(PowerState::On).await?;
//!     session.set_color(&Color::rgbw(255, 0, 128, 0)).await?;
//!
//!     let snapshot = session.query_state().await?;
//!     println!("{:?}", snapshot);
//!
//!     session.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Runtime Agnostic**: Works with tokio, async-std, or smol async runtimes
//! - **RGBW Colors**: Four independent channels with [`Color`]
//! - **Power Control**: Turn controllers on/off with [`PowerState`]
//! - **State Queries**: Read power and color as a [`DeviceSnapshot`]
//! - **Discovery**: Find controllers on your network with [`discover`]
//! - **Wire Codec**: Frame encoding and validation in [`codec`]
//!
//! ## Communication
//!
//! Commands travel over TCP on port 5577, one [`Session`] per controller.
//! Color and power commands are not acknowledged by the controller. Discovery
//! broadcasts `HF-A11ASSISTHREAD` over UDP to port 48899 and collects the
//! `ip,id,model` replies.
//!
//! ## Runtime Selection
//!
//! This library is runtime-agnostic. Select your preferred runtime using feature flags:
//!
//! ### Using tokio (default)
//!
//! ```toml
//! [dependencies]
//! magic-home-rs = "0.1"
//! tokio = { version = "1", features = ["rt-multi-thread", "macros"] }
//! ```
//!
//! ### Using async-std
//!
//! ```toml
//! [dependencies]
//! magic-home-rs = { version = "0.1", default-features = false, features = ["runtime-async-std"] }
//! async-std = { version = "1.12", features = ["attributes"] }
//! ```
//!
//! ### Using smol
//!
//! ```toml
//! [dependencies]
//! magic-home-rs = { version = "0.1", default-features = false, features = ["runtime-smol"] }
//! smol = "2"
//! ```
//!
//! ## Feature Flags
//!
//! - `runtime-tokio` (default): Use the tokio async runtime
//! - `runtime-async-std`: Use the async-std runtime
//! - `runtime-smol`: Use the smol runtime

pub mod codec;
mod config;
mod device;
mod discovery;
mod errors;
pub mod runtime;
mod session;
mod snapshot;
mod types;

// Re-export public API
pub use config::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_DISCOVERY_TIMEOUT, DEFAULT_PORT, DEFAULT_READ_TIMEOUT,
    DISCOVERY_PORT, DiscoveryConfig, SessionConfig, device_addr,
};
pub use device::DiscoveredDevice;
pub use discovery::{discover, discover_devices};
pub use errors::Error;
pub use session::{Session, SessionState};
pub use snapshot::DeviceSnapshot;
pub use types::{Color, PowerState};
