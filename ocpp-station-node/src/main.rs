//! OCPP Station Node - CLI charging station
//!
//! Connects to a CSMS over WebSocket and speaks OCPP 2.0.1: boot, heartbeat,
//! status reporting, and handling of CSMS requests (remote start/stop,
//! charging profiles, reservations, availability, device variables).
//!
//! # Usage
//!
//! ```bash
//! # Start with defaults
//! ocpp-station-node --station EK3-001
//!
//! # Connect to a specific CSMS
//! ocpp-station-node --station EK3-001 \
//!     --csms-url ws://localhost:8180/steve/websocket/CentralSystemService
//!
//! # Require signed payloads
//! ocpp-station-node --station EK3-001 --signing-key key-7
//! ```

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ocpp_adapter::signing::{NoSigning, SignaturePolicy, StaticKeySigning};
use ocpp_adapter::{Connection, Router, StationConfig};
use ocpp_model::device_model::standard::default_model;

/// OCPP 2.0.1 charging station node
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// OCPP station ID
    #[arg(short, long, default_value = "EK3-001")]
    station: String,

    /// CSMS WebSocket URL
    #[arg(long, default_value = "ws://localhost:8180/steve/websocket/CentralSystemService")]
    csms_url: String,

    /// Number of EVSEs
    #[arg(long, default_value = "1")]
    evse_count: u32,

    /// Vendor name
    #[arg(long, default_value = "Elektrokombinacija")]
    vendor: String,

    /// Model name
    #[arg(long, default_value = "EK3-OCPP")]
    model: String,

    /// Serial number
    #[arg(long)]
    serial: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    request_timeout: u64,

    /// Key id for payload signing; signing is off when absent
    #[arg(long)]
    signing_key: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Setup logging
    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Print banner
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              OCPP Station Node - Charging Point              ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║  Station:  {:<50} ║", args.station);
    println!("║  CSMS URL: {:<50} ║", truncate(&args.csms_url, 50));
    println!("║  EVSEs:    {:<50} ║", args.evse_count);
    println!("║  Vendor:   {:<50} ║", args.vendor);
    println!("║  Model:    {:<50} ║", args.model);
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    // Build configuration
    let mut config = StationConfig::default()
        .with_csms_url(&args.csms_url)
        .with_station_id(&args.station)
        .with_evse_count(args.evse_count)
        .with_request_timeout(Duration::from_secs(args.request_timeout));
    config.vendor = args.vendor.clone();
    config.model = args.model.clone();
    config.serial_number = args.serial.clone();

    let policy: Arc<dyn SignaturePolicy> = match args.signing_key {
        Some(key_id) => {
            info!("payload signing enabled with key {}", key_id);
            Arc::new(StaticKeySigning::new(key_id, "ES256"))
        }
        None => Arc::new(NoSigning),
    };

    let heartbeat_interval = 300;
    let model = default_model(&args.vendor, heartbeat_interval);

    let (connection, client, incoming) = Connection::new(config, policy);
    let router = Router::new(client, model);

    info!("starting OCPP station node...");
    tokio::spawn(router.run(incoming));
    connection.run().await?;

    Ok(())
}

/// Truncate string with ellipsis, counting characters so a cut never
/// lands inside a multibyte sequence.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
