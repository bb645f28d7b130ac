//! Smart charging block: SetChargingProfile, ClearChargingProfile, MeterValues.

use serde::{Deserialize, Serialize};

use crate::datatypes::{ChargingProfile, CustomData, MeterValue, StatusInfo};
use crate::enums::{ChargingProfilePurpose, ClearChargingProfileStatus, GenericStatus};

/// SetChargingProfile request (CSMS -> CP)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetChargingProfileRequest {
    pub evse_id: i32,
    pub charging_profile: ChargingProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

/// SetChargingProfile response (CP -> CSMS)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetChargingProfileResponse {
    pub status: GenericStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_info: Option<StatusInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

/// Filter for ClearChargingProfile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearChargingProfileCriterion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evse_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charging_profile_purpose: Option<ChargingProfilePurpose>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_level: Option<i32>,
}

/// ClearChargingProfile request (CSMS -> CP)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearChargingProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charging_profile_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charging_profile_criteria: Option<ClearChargingProfileCriterion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

/// ClearChargingProfile response (CP -> CSMS)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearChargingProfileResponse {
    pub status: ClearChargingProfileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_info: Option<StatusInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

/// MeterValues request (CP -> CSMS)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterValuesRequest {
    pub evse_id: i32,
    pub meter_value: Vec<MeterValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

/// MeterValues response (CSMS -> CP)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterValuesResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::{ChargingSchedule, ChargingSchedulePeriod, SampledValue};
    use crate::enums::{ChargingProfileKind, ChargingRateUnit, Measurand, UnitOfMeasure};
    use chrono::Utc;

    #[test]
    fn set_charging_profile_round_trip() {
        let profile = ChargingProfile::new(
            3,
            1,
            ChargingProfilePurpose::TxDefaultProfile,
            ChargingProfileKind::Absolute,
            vec![ChargingSchedule {
                id: 1,
                charging_rate_unit: ChargingRateUnit::W,
                charging_schedule_period: vec![ChargingSchedulePeriod {
                    start_period: 0,
                    limit: 22000.0,
                    number_phases: Some(3),
                    phase_to_use: None,
                    custom_data: None,
                }],
                start_schedule: None,
                duration: None,
                min_charging_rate: None,
                custom_data: None,
            }],
        )
        .unwrap();

        let req = SetChargingProfileRequest {
            evse_id: 1,
            charging_profile: profile,
            custom_data: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"chargingProfilePurpose\":\"TxDefaultProfile\""));
        let parsed: SetChargingProfileRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, req);
    }

    #[test]
    fn meter_values_round_trip() {
        let req = MeterValuesRequest {
            evse_id: 1,
            meter_value: vec![MeterValue {
                timestamp: Utc::now(),
                sampled_value: vec![SampledValue::new(7.36)
                    .measurand(Measurand::PowerActiveImport)
                    .unit(UnitOfMeasure::KW)],
                custom_data: None,
            }],
            custom_data: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        let parsed: MeterValuesRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, req);
    }

    #[test]
    fn clear_charging_profile_empty_filter() {
        let req = ClearChargingProfileRequest::default();
        assert_eq!(serde_json::to_string(&req).unwrap(), "{}");
    }
}
