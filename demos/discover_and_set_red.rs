//! Discover all Magic Home controllers on the network and set them to red.
//!
//! This example demonstrates:
//! - Discovery of controllers on the local network
//! - Opening a session per controller and setting its color
//!
//! Run with: cargo run --example discover_and_set_red

use magic_home_rs::{Color, DiscoveryConfig, PowerState, Session, SessionConfig, discover};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Discovering Magic Home controllers on the network...");

    let devices = discover(&DiscoveryConfig::default()).await?;

    if devices.is_empty() {
        println!("No controllers found on the network.");
        return Ok(());
    }

    println!("Found {} controller(s):", devices.len());
    for device in &devices {
        println!("  - {} ({}, {})", device.addr(), device.id(), device.model());
    }

    let red = Color::rgb(255, 0, 0);

    println!("\nSetting all controllers to red...");

    for device in &devices {
        let session = Session::for_device(device, SessionConfig::default());
        let result = async {
            session.open().await?;
            session.set_power(PowerState::On).await?;
            session.set_color(&red).await?;
            session.close().await
        }
        .await;

        match result {
            Ok(()) => println!("  ✓ Successfully set {} to red", session.addr()),
            Err(e) => eprintln!("  ✗ Failed to set {} to red: {}", session.addr(), e),
        }
    }

    println!("\nDone!");
    Ok(())
}
