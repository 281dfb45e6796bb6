//! CLI application for controlling Magic Home LED controllers.
//!
//! This example mirrors the classic `magic-home` tool: set a color, switch
//! power, print the status, or discover controllers on the network.
//!
//! Run with: cargo run --example magic_home_cli -- --help
//! Set `RUST_LOG=debug` to see the frames on the wire.

use clap::{Parser, Subcommand};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use magic_home_rs::{
    Color, DEFAULT_PORT, DiscoveryConfig, PowerState, Session, SessionConfig, discover,
};

#[derive(Parser)]
#[command(name = "magic-home")]
#[command(about = "Control Magic Home LED controllers from the command line", long_about = None)]
struct Cli {
    /// TCP port the controller listens on
    #[arg(short, long, global = true, default_value_t = DEFAULT_PORT)]
    port: u16,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set the color of the LED strip
    #[command(visible_alias = "c")]
    Color {
        ip: IpAddr,
        /// Red component (0-255)
        red: u8,
        /// Green component (0-255)
        green: u8,
        /// Blue component (0-255)
        blue: u8,
        /// White component (0-255)
        white: u8,
    },

    /// Switch the LED strip on or off
    #[command(visible_alias = "s")]
    State {
        ip: IpAddr,
        /// "on" or "off"
        state: PowerState,
    },

    /// Print the status of the LED strip
    Status {
        ip: IpAddr,
        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },

    /// Discover Magic Home devices on the network
    #[command(visible_alias = "d")]
    Discover {
        /// Broadcast address to send the request to
        #[arg(short, long, default_value = "255.255.255.255")]
        broadcast_addr: IpAddr,
        /// How long to wait for replies, in seconds
        #[arg(short, long, default_value = "1")]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Color {
            ip,
            red,
            green,
            blue,
            white,
        } => {
            let session = open(ip, cli.port).await?;
            session
                .set_color(&Color::rgbw(red, green, blue, white))
                .await?;
            session.close().await?;
        }

        Commands::State { ip, state } => {
            let session = open(ip, cli.port).await?;
            session.set_power(state).await?;
            session.close().await?;
        }

        Commands::Status { ip, json } => {
            let session = open(ip, cli.port).await?;
            let snapshot = session.query_state().await?;
            session.close().await?;

            if json {
                println!("{}", serde_json::to_string(&snapshot)?);
            } else {
                let color = snapshot.color();
                println!("Device is: {}", if snapshot.emitting() { "On" } else { "Off" });
                println!(
                    "Color: \tR: {}\n\tG: {}\n\tB: {}\n\tW: {}",
                    color.red(),
                    color.green(),
                    color.blue(),
                    color.white()
                );
            }
        }

        Commands::Discover {
            broadcast_addr,
            timeout,
        } => {
            println!("Discovering (timeout: {}s)...", timeout);
            let config = DiscoveryConfig::default()
                .with_broadcast_ip(broadcast_addr)
                .with_timeout(Duration::from_secs(timeout));
            let devices = discover(&config).await?;

            if devices.is_empty() {
                println!("No devices discovered.");
            } else {
                println!("\nDiscovered the following devices:\n");
                println!("{:<16}| {:<14}| Model", "Address", "ID");
                println!("{}", "-".repeat(44));
                for device in devices {
                    println!(
                        "{:<16}| {:<14}| {}",
                        device.addr().ip(),
                        device.id(),
                        device.model()
                    );
                }
            }
        }
    }

    Ok(())
}

async fn open(ip: IpAddr, port: u16) -> Result<Session, magic_home_rs::Error> {
    Session::connect(SocketAddr::new(ip, port), SessionConfig::default()).await
}
