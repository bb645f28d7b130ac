//! # OCPP Adapter
//!
//! OCPP 2.0.1 message layer for a charging station: OCPP-J framing over
//! WebSocket, request/response correlation, session tracking, and routing of
//! CSMS-originated requests.
//!
//! ## Architecture
//!
//! ```text
//! OCPP CSMS (Backend)
//!       │ WebSocket, subprotocol ocpp2.0.1
//!       ▼
//! ┌──────────────────────────────────────┐
//! │    ocpp-adapter                      │
//! │  ┌────────────┐   ┌──────────────┐   │
//! │  │ Connection │──►│ Router       │   │
//! │  │ (socket)   │   │ (CSMS calls) │   │
//! │  └─────┬──────┘   └──────┬───────┘   │
//! │        │ StationClient   │           │
//! │        ▼                 ▼           │
//! │    Session          DeviceModel      │
//! └──────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use ocpp_adapter::{Connection, Router, StationConfig};
//! use ocpp_adapter::signing::NoSigning;
//! use ocpp_model::device_model::standard::default_model;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StationConfig::default().with_station_id("EK3-042");
//!     let (connection, client, incoming) = Connection::new(config, Arc::new(NoSigning));
//!
//!     let router = Router::new(client, default_model("Elektrokombinacija", 300));
//!     tokio::spawn(router.run(incoming));
//!
//!     connection.run().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod frame;
pub mod router;
pub mod send;
pub mod session;
pub mod signing;

pub use client::{Connection, StationClient};
pub use config::StationConfig;
pub use error::OcppError;
pub use frame::{Action, Call, CallError, CallResult, Frame, RpcErrorCode};
pub use router::Router;
pub use session::{Session, SessionEvent, SessionState};
pub use signing::{NoSigning, SignaturePolicy, StaticKeySigning};
