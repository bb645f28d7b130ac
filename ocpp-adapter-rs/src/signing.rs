//! Message signing seam.
//!
//! Signatures ride inside the payload's `signatures` array; the policy
//! attaches them before send and checks them on receipt. The actual policy
//! engine (key management, algorithm choice) is an external collaborator;
//! this module only defines the seam and two reference implementations.

use serde_json::Value;

use ocpp_model::datatypes::SignatureEntry;

use crate::error::OcppError;
use crate::frame::Action;

/// Attaches and checks payload signatures.
pub trait SignaturePolicy: Send + Sync {
    /// Sign an outgoing payload in place. Errors abort the send before the
    /// message reaches the transport.
    fn sign(&self, action: Action, payload: &mut Value) -> Result<(), OcppError>;

    /// Verify an inbound payload. Errors surface as
    /// [`OcppError::Signature`] to the caller awaiting the reply.
    fn verify(&self, action: Action, payload: &Value) -> Result<(), OcppError>;
}

/// Signing disabled: attaches nothing, accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSigning;

impl SignaturePolicy for NoSigning {
    fn sign(&self, _action: Action, _payload: &mut Value) -> Result<(), OcppError> {
        Ok(())
    }

    fn verify(&self, _action: Action, _payload: &Value) -> Result<(), OcppError> {
        Ok(())
    }
}

/// Attaches a fixed signature entry and requires one on inbound payloads.
/// A stand-in for a real policy engine, mainly useful in tests and demos.
#[derive(Debug, Clone)]
pub struct StaticKeySigning {
    pub key_id: String,
    pub algorithm: String,
}

impl StaticKeySigning {
    pub fn new(key_id: impl Into<String>, algorithm: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            algorithm: algorithm.into(),
        }
    }
}

impl SignaturePolicy for StaticKeySigning {
    fn sign(&self, action: Action, payload: &mut Value) -> Result<(), OcppError> {
        let object = payload
            .as_object_mut()
            .ok_or_else(|| OcppError::Signature(format!("{} payload is not an object", action)))?;

        let entry = SignatureEntry {
            key_id: self.key_id.clone(),
            algorithm: self.algorithm.clone(),
            value: format!("sig:{}:{}", self.key_id, action),
        };
        let entry = serde_json::to_value(entry)?;

        match object.get_mut("signatures") {
            Some(Value::Array(entries)) => entries.push(entry),
            _ => {
                object.insert("signatures".into(), Value::Array(vec![entry]));
            }
        }
        Ok(())
    }

    fn verify(&self, action: Action, payload: &Value) -> Result<(), OcppError> {
        let present = payload
            .get("signatures")
            .and_then(Value::as_array)
            .map(|entries| !entries.is_empty())
            .unwrap_or(false);

        if present {
            Ok(())
        } else {
            Err(OcppError::Signature(format!(
                "{} response carries no signatures",
                action
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn no_signing_leaves_payload_alone() {
        let mut payload = json!({"reason": "PowerUp"});
        let before = payload.clone();
        NoSigning.sign(Action::BootNotification, &mut payload).unwrap();
        assert_eq!(payload, before);
        NoSigning.verify(Action::BootNotification, &payload).unwrap();
    }

    #[test]
    fn static_key_appends_signature() {
        let policy = StaticKeySigning::new("key-7", "ES256");
        let mut payload = json!({"evseId": 1});
        policy.sign(Action::MeterValues, &mut payload).unwrap();

        let entries = payload["signatures"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["keyId"], "key-7");
        assert_eq!(entries[0]["algorithm"], "ES256");

        policy.verify(Action::MeterValues, &payload).unwrap();
    }

    #[test]
    fn static_key_rejects_unsigned_inbound() {
        let policy = StaticKeySigning::new("key-7", "ES256");
        let err = policy
            .verify(Action::Heartbeat, &json!({"currentTime": "2026-08-20T00:00:00Z"}))
            .unwrap_err();
        assert!(matches!(err, OcppError::Signature(_)));
    }

    #[test]
    fn non_object_payload_cannot_be_signed() {
        let policy = StaticKeySigning::new("key-7", "ES256");
        let mut payload = json!([1, 2, 3]);
        assert!(matches!(
            policy.sign(Action::DataTransfer, &mut payload),
            Err(OcppError::Signature(_))
        ));
    }
}
