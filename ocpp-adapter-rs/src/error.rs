//! Adapter error taxonomy.
//!
//! Four failure classes: malformed input, signature failure, a
//! protocol-level error from the CSMS, and transport failure. Parse helpers
//! return errors, never panic; retry and backpressure belong to the caller.

use serde_json::Value;
use thiserror::Error;

use crate::frame::RpcErrorCode;

/// Errors in OCPP message handling.
#[derive(Debug, Error)]
pub enum OcppError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid message format")]
    InvalidFormat,

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("unknown message type: {0}")]
    UnknownMessageType(i64),

    #[error("signature policy rejected message: {0}")]
    Signature(String),

    #[error("CSMS returned {code}: {description}")]
    Remote {
        code: RpcErrorCode,
        description: String,
        details: Value,
    },

    #[error("timeout waiting for response")]
    Timeout,

    #[error("connection closed")]
    ConnectionClosed,
}

impl OcppError {
    /// Whether the peer explicitly rejected the request, as opposed to the
    /// exchange failing outright.
    pub fn is_remote(&self) -> bool {
        matches!(self, OcppError::Remote { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn remote_error_display() {
        let err = OcppError::Remote {
            code: RpcErrorCode::NotImplemented,
            description: "no handler".into(),
            details: json!({}),
        };
        assert_eq!(err.to_string(), "CSMS returned NotImplemented: no handler");
        assert!(err.is_remote());
        assert!(!OcppError::Timeout.is_remote());
    }
}
