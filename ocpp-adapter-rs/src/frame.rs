//! OCPP-J RPC framing
//!
//! OCPP 2.0.1 uses JSON arrays over WebSocket:
//! - CALL:       `[2, messageId, action, payload]`
//! - CALLRESULT: `[3, messageId, payload]`
//! - CALLERROR:  `[4, messageId, errorCode, errorDescription, errorDetails]`

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::OcppError;

/// OCPP message type identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Call = 2,
    CallResult = 3,
    CallError = 4,
}

/// RPC framework error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RpcErrorCode {
    FormatViolation,
    GenericError,
    InternalError,
    MessageTypeNotSupported,
    NotImplemented,
    NotSupported,
    OccurrenceConstraintViolation,
    PropertyConstraintViolation,
    ProtocolError,
    RpcFrameworkError,
    SecurityError,
    TypeConstraintViolation,
    /// Code introduced by a later protocol revision.
    #[serde(other)]
    Unknown,
}

impl RpcErrorCode {
    /// Canonical token from the OCPP-J vocabulary.
    pub fn as_text(&self) -> &'static str {
        match self {
            Self::FormatViolation => "FormatViolation",
            Self::GenericError => "GenericError",
            Self::InternalError => "InternalError",
            Self::MessageTypeNotSupported => "MessageTypeNotSupported",
            Self::NotImplemented => "NotImplemented",
            Self::NotSupported => "NotSupported",
            Self::OccurrenceConstraintViolation => "OccurrenceConstraintViolation",
            Self::PropertyConstraintViolation => "PropertyConstraintViolation",
            Self::ProtocolError => "ProtocolError",
            Self::RpcFrameworkError => "RpcFrameworkError",
            Self::SecurityError => "SecurityError",
            Self::TypeConstraintViolation => "TypeConstraintViolation",
            Self::Unknown => "Unknown",
        }
    }

    /// Exact match after trimming surrounding whitespace.
    pub fn try_parse(s: &str) -> Option<Self> {
        match s.trim() {
            "FormatViolation" => Some(Self::FormatViolation),
            "GenericError" => Some(Self::GenericError),
            "InternalError" => Some(Self::InternalError),
            "MessageTypeNotSupported" => Some(Self::MessageTypeNotSupported),
            "NotImplemented" => Some(Self::NotImplemented),
            "NotSupported" => Some(Self::NotSupported),
            "OccurrenceConstraintViolation" => Some(Self::OccurrenceConstraintViolation),
            "PropertyConstraintViolation" => Some(Self::PropertyConstraintViolation),
            "ProtocolError" => Some(Self::ProtocolError),
            "RpcFrameworkError" => Some(Self::RpcFrameworkError),
            "SecurityError" => Some(Self::SecurityError),
            "TypeConstraintViolation" => Some(Self::TypeConstraintViolation),
            _ => None,
        }
    }

    /// Lenient parse: unmatched tokens become [`Self::Unknown`].
    pub fn parse(s: &str) -> Self {
        Self::try_parse(s).unwrap_or(Self::Unknown)
    }
}

impl std::fmt::Display for RpcErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_text())
    }
}

/// Actions this station speaks, in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    // CP -> CSMS
    Authorize,
    BootNotification,
    FirmwareStatusNotification,
    Heartbeat,
    MeterValues,
    SecurityEventNotification,
    StatusNotification,
    TransactionEvent,

    // CSMS -> CP
    CancelReservation,
    ChangeAvailability,
    ClearChargingProfile,
    GetVariables,
    RequestStartTransaction,
    RequestStopTransaction,
    ReserveNow,
    Reset,
    SetChargingProfile,
    SetVariables,

    // Bidirectional
    DataTransfer,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::str::FromStr for Action {
    type Err = OcppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Authorize" => Ok(Action::Authorize),
            "BootNotification" => Ok(Action::BootNotification),
            "CancelReservation" => Ok(Action::CancelReservation),
            "ChangeAvailability" => Ok(Action::ChangeAvailability),
            "ClearChargingProfile" => Ok(Action::ClearChargingProfile),
            "DataTransfer" => Ok(Action::DataTransfer),
            "FirmwareStatusNotification" => Ok(Action::FirmwareStatusNotification),
            "GetVariables" => Ok(Action::GetVariables),
            "Heartbeat" => Ok(Action::Heartbeat),
            "MeterValues" => Ok(Action::MeterValues),
            "RequestStartTransaction" => Ok(Action::RequestStartTransaction),
            "RequestStopTransaction" => Ok(Action::RequestStopTransaction),
            "ReserveNow" => Ok(Action::ReserveNow),
            "Reset" => Ok(Action::Reset),
            "SecurityEventNotification" => Ok(Action::SecurityEventNotification),
            "SetChargingProfile" => Ok(Action::SetChargingProfile),
            "SetVariables" => Ok(Action::SetVariables),
            "StatusNotification" => Ok(Action::StatusNotification),
            "TransactionEvent" => Ok(Action::TransactionEvent),
            _ => Err(OcppError::UnknownAction(s.to_string())),
        }
    }
}

/// CALL message (request).
#[derive(Debug, Clone)]
pub struct Call {
    pub message_id: String,
    pub action: Action,
    pub payload: Value,
    /// Hop list for logging; not part of the wire format.
    pub network_path: Vec<String>,
}

impl Call {
    /// New CALL with an auto-generated message id.
    pub fn new(action: Action, payload: impl Serialize) -> Result<Self, OcppError> {
        Ok(Self::with_payload(action, serde_json::to_value(payload)?))
    }

    /// New CALL around an already-serialized payload.
    pub fn with_payload(action: Action, payload: Value) -> Self {
        Self {
            message_id: Uuid::new_v4().to_string(),
            action,
            payload,
            network_path: Vec::new(),
        }
    }

    /// Records the sending hop on the network path.
    pub fn via(mut self, hop: impl Into<String>) -> Self {
        self.network_path.push(hop.into());
        self
    }

    /// Serialize to wire format: `[2, messageId, action, payload]`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, OcppError> {
        let array = serde_json::json!([
            MessageType::Call as i32,
            &self.message_id,
            self.action.to_string(),
            &self.payload
        ]);
        Ok(serde_json::to_vec(&array)?)
    }

    /// Decode the payload as a typed request.
    pub fn parse_payload<T: for<'de> Deserialize<'de>>(&self) -> Result<T, OcppError> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

/// CALLRESULT message (success response).
#[derive(Debug, Clone)]
pub struct CallResult {
    pub message_id: String,
    pub payload: Value,
}

impl CallResult {
    pub fn new(message_id: impl Into<String>, payload: impl Serialize) -> Result<Self, OcppError> {
        Ok(Self {
            message_id: message_id.into(),
            payload: serde_json::to_value(payload)?,
        })
    }

    /// Serialize to wire format: `[3, messageId, payload]`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, OcppError> {
        let array = serde_json::json!([
            MessageType::CallResult as i32,
            &self.message_id,
            &self.payload
        ]);
        Ok(serde_json::to_vec(&array)?)
    }

    /// Decode the payload as a typed response.
    pub fn parse_payload<T: for<'de> Deserialize<'de>>(&self) -> Result<T, OcppError> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

/// CALLERROR message (error response).
#[derive(Debug, Clone)]
pub struct CallError {
    pub message_id: String,
    pub error_code: RpcErrorCode,
    pub error_description: String,
    pub error_details: Value,
}

impl CallError {
    pub fn new(
        message_id: impl Into<String>,
        error_code: RpcErrorCode,
        error_description: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            error_code,
            error_description: error_description.into(),
            error_details: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn not_implemented(message_id: impl Into<String>, action: Action) -> Self {
        Self::new(
            message_id,
            RpcErrorCode::NotImplemented,
            format!("no handler for {}", action),
        )
    }

    pub fn format_violation(message_id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(message_id, RpcErrorCode::FormatViolation, detail)
    }

    pub fn security_error(message_id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(message_id, RpcErrorCode::SecurityError, detail)
    }

    /// Serialize to wire format:
    /// `[4, messageId, errorCode, errorDescription, errorDetails]`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, OcppError> {
        let array = serde_json::json!([
            MessageType::CallError as i32,
            &self.message_id,
            self.error_code.as_text(),
            &self.error_description,
            &self.error_details
        ]);
        Ok(serde_json::to_vec(&array)?)
    }
}

/// Any parsed OCPP-J frame.
#[derive(Debug, Clone)]
pub enum Frame {
    Call(Call),
    CallResult(CallResult),
    CallError(CallError),
}

impl Frame {
    /// Parse a frame from JSON bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, OcppError> {
        let array: Vec<Value> = serde_json::from_slice(bytes)?;

        if array.is_empty() {
            return Err(OcppError::InvalidFormat);
        }

        let msg_type = array[0].as_i64().ok_or(OcppError::InvalidFormat)?;

        match msg_type {
            2 => {
                if array.len() != 4 {
                    return Err(OcppError::InvalidFormat);
                }
                let message_id = array[1]
                    .as_str()
                    .ok_or(OcppError::InvalidFormat)?
                    .to_string();
                let action: Action = array[2]
                    .as_str()
                    .ok_or(OcppError::InvalidFormat)?
                    .parse()?;

                Ok(Frame::Call(Call {
                    message_id,
                    action,
                    payload: array[3].clone(),
                    network_path: Vec::new(),
                }))
            }
            3 => {
                if array.len() != 3 {
                    return Err(OcppError::InvalidFormat);
                }
                let message_id = array[1]
                    .as_str()
                    .ok_or(OcppError::InvalidFormat)?
                    .to_string();

                Ok(Frame::CallResult(CallResult {
                    message_id,
                    payload: array[2].clone(),
                }))
            }
            4 => {
                if array.len() != 5 {
                    return Err(OcppError::InvalidFormat);
                }
                let message_id = array[1]
                    .as_str()
                    .ok_or(OcppError::InvalidFormat)?
                    .to_string();
                let error_code_str = array[2].as_str().ok_or(OcppError::InvalidFormat)?;

                // An unrecognized code still correlates the reply.
                let error_code = RpcErrorCode::parse(error_code_str);

                Ok(Frame::CallError(CallError {
                    message_id,
                    error_code,
                    error_description: array[3].as_str().unwrap_or("").to_string(),
                    error_details: array[4].clone(),
                }))
            }
            other => Err(OcppError::UnknownMessageType(other)),
        }
    }

    /// Correlation id of this frame.
    pub fn message_id(&self) -> &str {
        match self {
            Frame::Call(c) => &c.message_id,
            Frame::CallResult(r) => &r.message_id,
            Frame::CallError(e) => &e.message_id,
        }
    }

    /// Serialize to wire bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, OcppError> {
        match self {
            Frame::Call(c) => c.to_bytes(),
            Frame::CallResult(r) => r.to_bytes(),
            Frame::CallError(e) => e.to_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocpp_model::messages::HeartbeatRequest;

    #[test]
    fn call_serialization() {
        let call = Call::new(Action::Heartbeat, HeartbeatRequest::default()).unwrap();
        let text = String::from_utf8(call.to_bytes().unwrap()).unwrap();
        assert!(text.starts_with("[2,"));
        assert!(text.contains("\"Heartbeat\""));
    }

    #[test]
    fn call_parsing() {
        let json = r#"[2, "msg-123", "Heartbeat", {}]"#;
        let frame = Frame::parse(json.as_bytes()).unwrap();
        match frame {
            Frame::Call(call) => {
                assert_eq!(call.message_id, "msg-123");
                assert_eq!(call.action, Action::Heartbeat);
            }
            _ => panic!("expected Call"),
        }
    }

    #[test]
    fn call_result_parsing() {
        let json = r#"[3, "msg-123", {"currentTime": "2026-08-20T12:00:00Z"}]"#;
        let frame = Frame::parse(json.as_bytes()).unwrap();
        match frame {
            Frame::CallResult(result) => {
                assert_eq!(result.message_id, "msg-123");
                assert_eq!(result.payload["currentTime"], "2026-08-20T12:00:00Z");
            }
            _ => panic!("expected CallResult"),
        }
    }

    #[test]
    fn call_error_parsing() {
        let json = r#"[4, "msg-123", "NotImplemented", "no handler", {}]"#;
        let frame = Frame::parse(json.as_bytes()).unwrap();
        match frame {
            Frame::CallError(error) => {
                assert_eq!(error.message_id, "msg-123");
                assert_eq!(error.error_code, RpcErrorCode::NotImplemented);
                assert_eq!(error.error_description, "no handler");
            }
            _ => panic!("expected CallError"),
        }
    }

    #[test]
    fn unrecognized_error_code_becomes_unknown() {
        let json = r#"[4, "msg-9", "FutureCode", "", {}]"#;
        let frame = Frame::parse(json.as_bytes()).unwrap();
        match frame {
            Frame::CallError(error) => {
                assert_eq!(error.error_code, RpcErrorCode::Unknown);
            }
            _ => panic!("expected CallError"),
        }
    }

    #[test]
    fn error_code_text_pair() {
        assert_eq!(RpcErrorCode::SecurityError.as_text(), "SecurityError");
        assert_eq!(
            RpcErrorCode::try_parse(" FormatViolation "),
            Some(RpcErrorCode::FormatViolation)
        );
        assert_eq!(RpcErrorCode::try_parse("FutureCode"), None);
        assert_eq!(RpcErrorCode::parse("FutureCode"), RpcErrorCode::Unknown);
    }

    #[test]
    fn malformed_frames_are_rejected() {
        assert!(matches!(
            Frame::parse(b"[]"),
            Err(OcppError::InvalidFormat)
        ));
        assert!(matches!(
            Frame::parse(br#"[2, "id", "Heartbeat"]"#),
            Err(OcppError::InvalidFormat)
        ));
        assert!(matches!(
            Frame::parse(br#"[7, "id", {}]"#),
            Err(OcppError::UnknownMessageType(7))
        ));
        assert!(matches!(
            Frame::parse(br#"[2, "id", "MakeCoffee", {}]"#),
            Err(OcppError::UnknownAction(_))
        ));
    }

    #[test]
    fn network_path_stays_off_the_wire() {
        let call = Call::new(Action::Heartbeat, HeartbeatRequest::default())
            .unwrap()
            .via("EK3-001");
        assert_eq!(call.network_path, vec!["EK3-001".to_string()]);
        let text = String::from_utf8(call.to_bytes().unwrap()).unwrap();
        assert!(!text.contains("EK3-001"));
    }

    #[test]
    fn action_round_trip() {
        for action in [
            Action::Authorize,
            Action::BootNotification,
            Action::SetVariables,
            Action::TransactionEvent,
        ] {
            let parsed: Action = action.to_string().parse().unwrap();
            assert_eq!(parsed, action);
        }
    }
}
