//! Compound value objects shared across messages.
//!
//! All types serialize to the camelCase field names of the OCPP 2.0.1 JSON
//! schemas, skip absent optionals, and compare structurally. Constructors
//! that take free-form text validate it up front; deserialization stays
//! lenient because the wire shape is compliance surface, not policy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::enums::*;
use crate::error::ModelError;

/// Maximum length of an identifier string (IdToken, transaction ids).
pub const MAX_IDENTIFIER_LEN: usize = 36;

/// Vendor-extensible custom data, attached to nearly every message and
/// datatype. Unknown vendor fields are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomData {
    pub vendor_id: String,
    #[serde(flatten)]
    pub additional: Map<String, Value>,
}

impl CustomData {
    pub fn new(vendor_id: impl Into<String>) -> Result<Self, ModelError> {
        let vendor_id = vendor_id.into();
        if vendor_id.is_empty() {
            return Err(ModelError::Empty { field: "vendorId" });
        }
        Ok(Self {
            vendor_id,
            additional: Map::new(),
        })
    }
}

/// Detail element accompanying a response status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusInfo {
    pub reason_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

impl StatusInfo {
    pub fn new(reason_code: impl Into<String>) -> Self {
        Self {
            reason_code: reason_code.into(),
            additional_info: None,
            custom_data: None,
        }
    }
}

/// EVSE identifier, optionally narrowed to a single connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evse {
    pub id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

impl Evse {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            connector_id: None,
            custom_data: None,
        }
    }

    pub fn with_connector(id: i32, connector_id: i32) -> Self {
        Self {
            id,
            connector_id: Some(connector_id),
            custom_data: None,
        }
    }
}

/// Identification token presented for authorization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdToken {
    pub id_token: String,
    #[serde(rename = "type")]
    pub token_type: IdTokenType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

impl IdToken {
    /// Validates the token text: non-empty, at most 36 characters.
    pub fn new(id_token: impl Into<String>, token_type: IdTokenType) -> Result<Self, ModelError> {
        let id_token = id_token.into();
        if id_token.is_empty() {
            return Err(ModelError::Empty { field: "idToken" });
        }
        if id_token.len() > MAX_IDENTIFIER_LEN {
            return Err(ModelError::TooLong {
                field: "idToken",
                max: MAX_IDENTIFIER_LEN,
                len: id_token.len(),
            });
        }
        Ok(Self {
            id_token,
            token_type,
            custom_data: None,
        })
    }
}

/// Station identity reported in BootNotification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargingStationInfo {
    pub model: String,
    pub vendor_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

/// One period within a charging schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargingSchedulePeriod {
    /// Offset in seconds from the schedule start.
    pub start_period: i32,
    pub limit: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_phases: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_to_use: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

/// A charging schedule: a rate unit plus an ordered list of periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargingSchedule {
    pub id: i32,
    pub charging_rate_unit: ChargingRateUnit,
    pub charging_schedule_period: Vec<ChargingSchedulePeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_schedule: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_charging_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

/// A stacked charging profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargingProfile {
    pub id: i32,
    pub stack_level: i32,
    pub charging_profile_purpose: ChargingProfilePurpose,
    pub charging_profile_kind: ChargingProfileKind,
    pub charging_schedule: Vec<ChargingSchedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrency_kind: Option<RecurrencyKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

impl ChargingProfile {
    /// Validates the invariants the schema leaves implicit: a non-negative
    /// stack level and at least one schedule.
    pub fn new(
        id: i32,
        stack_level: i32,
        purpose: ChargingProfilePurpose,
        kind: ChargingProfileKind,
        charging_schedule: Vec<ChargingSchedule>,
    ) -> Result<Self, ModelError> {
        if stack_level < 0 {
            return Err(ModelError::Negative {
                field: "stackLevel",
                value: stack_level,
            });
        }
        if charging_schedule.is_empty() {
            return Err(ModelError::EmptySchedule);
        }
        Ok(Self {
            id,
            stack_level,
            charging_profile_purpose: purpose,
            charging_profile_kind: kind,
            charging_schedule,
            valid_from: None,
            valid_to: None,
            recurrency_kind: None,
            transaction_id: None,
            custom_data: None,
        })
    }

    /// Limit of the first period of the first schedule, converted to kW.
    /// Amp limits assume a 230 V three-phase supply.
    pub fn first_limit_kw(&self) -> Option<f64> {
        let schedule = self.charging_schedule.first()?;
        let period = schedule.charging_schedule_period.first()?;
        match schedule.charging_rate_unit {
            ChargingRateUnit::W => Some(period.limit / 1000.0),
            ChargingRateUnit::A => Some(period.limit * 230.0 * 3.0 / 1000.0),
            ChargingRateUnit::Unknown => None,
        }
    }
}

/// One sampled reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampledValue {
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ReadingContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurand: Option<Measurand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_of_measure: Option<UnitOfMeasure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

impl SampledValue {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            context: None,
            measurand: None,
            phase: None,
            unit_of_measure: None,
            custom_data: None,
        }
    }

    pub fn measurand(mut self, measurand: Measurand) -> Self {
        self.measurand = Some(measurand);
        self
    }

    pub fn unit(mut self, unit: UnitOfMeasure) -> Self {
        self.unit_of_measure = Some(unit);
        self
    }

    pub fn context(mut self, context: ReadingContext) -> Self {
        self.context = Some(context);
        self
    }
}

/// A timestamped batch of sampled values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterValue {
    pub timestamp: DateTime<Utc>,
    pub sampled_value: Vec<SampledValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

/// Text content for display messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContent {
    pub format: MessageFormat,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

/// One cryptographic signature carried in a message's `signatures` array.
/// Produced and checked by the signature policy, opaque to the data model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureEntry {
    pub key_id: String,
    pub algorithm: String,
    pub value: String,
}
