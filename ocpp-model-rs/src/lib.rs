//! # ocpp-model
//!
//! OCPP 2.0.1 data model for the Elektrokombinacija charging stack:
//!
//! - `enums`: enumerated value types with text parse/render pairs and an
//!   explicit `Unknown` sentinel for forward compatibility
//! - `datatypes`: compound value objects shared across messages
//! - `messages`: request/response pairs with serde JSON shapes mirroring the
//!   published schemas
//! - `device_model`: logical components exposing typed variables
//!   (name, mutability, data type, limits) with getter/setter hooks
//!
//! The wire layer (OCPP-J framing, WebSocket client, session) lives in
//! `ocpp-adapter`; this crate has no I/O.

pub mod datatypes;
pub mod device_model;
pub mod enums;
pub mod error;
pub mod messages;

pub use datatypes::*;
pub use device_model::{ComponentConfig, DeviceModel, VariableCharacteristics, VariableDescriptor};
pub use enums::*;
pub use error::{ModelError, UnknownToken};
pub use messages::*;
