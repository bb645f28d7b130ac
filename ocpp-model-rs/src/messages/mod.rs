//! Request/response message pairs, grouped by functional block.
//!
//! Field names and optionality mirror the published OCPP 2.0.1 JSON schemas;
//! this is compliance surface, not design. Every pair round-trips through
//! serde under structural equality.

pub mod authorization;
pub mod availability;
pub mod charging;
pub mod device;
pub mod diagnostics;
pub mod provisioning;
pub mod transactions;

pub use authorization::*;
pub use availability::*;
pub use charging::*;
pub use device::*;
pub use diagnostics::*;
pub use provisioning::*;
pub use transactions::*;
