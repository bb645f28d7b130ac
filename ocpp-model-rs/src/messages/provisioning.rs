//! Provisioning block: BootNotification, Heartbeat, Reset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::datatypes::{ChargingStationInfo, CustomData, StatusInfo};
use crate::enums::{BootReason, RegistrationStatus, ResetStatus, ResetType};

/// BootNotification request (CP -> CSMS)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootNotificationRequest {
    pub charging_station: ChargingStationInfo,
    pub reason: BootReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

/// BootNotification response (CSMS -> CP)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootNotificationResponse {
    pub current_time: DateTime<Utc>,
    /// Heartbeat interval in seconds while `Accepted`; retry interval otherwise.
    pub interval: i32,
    pub status: RegistrationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_info: Option<StatusInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

/// Heartbeat request (CP -> CSMS)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

/// Heartbeat response (CSMS -> CP)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatResponse {
    pub current_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

/// Reset request (CSMS -> CP)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    #[serde(rename = "type")]
    pub reset_type: ResetType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evse_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

/// Reset response (CP -> CSMS)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub status: ResetStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_info: Option<StatusInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_notification_round_trip() {
        let req = BootNotificationRequest {
            charging_station: ChargingStationInfo {
                model: "EK3-OCPP".into(),
                vendor_name: "Elektrokombinacija".into(),
                serial_number: Some("EK3-042".into()),
                firmware_version: None,
                custom_data: None,
            },
            reason: BootReason::PowerUp,
            custom_data: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        let parsed: BootNotificationRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, req);
        assert!(json.contains("\"chargingStation\""));
        assert!(!json.contains("firmwareVersion"));
    }

    #[test]
    fn reset_request_uses_type_field() {
        let json = r#"{"type":"OnIdle","evseId":2}"#;
        let req: ResetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.reset_type, ResetType::OnIdle);
        assert_eq!(req.evse_id, Some(2));
    }
}
