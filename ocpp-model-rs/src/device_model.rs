//! Device model: logical components exposing typed variables.
//!
//! A [`ComponentConfig`] is a named configuration unit from the OCPP 2.0.1
//! device model (`OCPPCommCtrlr`, `SecurityCtrlr`, ...). Each variable pairs
//! static metadata (mutability, data type, limits, description) with a getter
//! closure, and optionally a setter hook for writable variables. The
//! [`DeviceModel`] registry resolves GetVariables/SetVariables against these
//! components.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::enums::{AttributeType, GetVariableStatus, Mutability, SetVariableStatus, VariableDataType};
use crate::messages::device::{
    GetVariableData, GetVariableResult, SetVariableData, SetVariableResult,
};

/// Reads the current value of a variable.
pub type ValueGetter = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Applies a new value; returns false when the value is not acceptable.
pub type ValueSetter = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Static metadata of a variable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableCharacteristics {
    pub data_type: VariableDataType,
    pub unit: Option<String>,
    pub min_limit: Option<f64>,
    pub max_limit: Option<f64>,
    pub max_length: Option<usize>,
}

impl VariableCharacteristics {
    pub fn of(data_type: VariableDataType) -> Self {
        Self {
            data_type,
            ..Default::default()
        }
    }

    pub fn limits(mut self, min: f64, max: f64) -> Self {
        self.min_limit = Some(min);
        self.max_limit = Some(max);
        self
    }

    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// One variable of a logical component: metadata plus accessors.
#[derive(Clone)]
pub struct VariableDescriptor {
    pub name: String,
    pub mutability: Mutability,
    pub characteristics: VariableCharacteristics,
    pub description: Option<String>,
    getter: ValueGetter,
    setter: Option<ValueSetter>,
}

impl fmt::Debug for VariableDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableDescriptor")
            .field("name", &self.name)
            .field("mutability", &self.mutability)
            .field("characteristics", &self.characteristics)
            .finish_non_exhaustive()
    }
}

impl VariableDescriptor {
    /// A variable backed by an arbitrary getter, read-only.
    pub fn read_only(
        name: impl Into<String>,
        characteristics: VariableCharacteristics,
        getter: ValueGetter,
    ) -> Self {
        Self {
            name: name.into(),
            mutability: Mutability::ReadOnly,
            characteristics,
            description: None,
            getter,
            setter: None,
        }
    }

    /// A read-only variable with a fixed value.
    pub fn constant(
        name: impl Into<String>,
        characteristics: VariableCharacteristics,
        value: impl Into<String>,
    ) -> Self {
        let value = value.into();
        Self::read_only(name, characteristics, Arc::new(move || Some(value.clone())))
    }

    /// A read-write variable backed by internal storage.
    pub fn stored(
        name: impl Into<String>,
        characteristics: VariableCharacteristics,
        initial: impl Into<String>,
    ) -> Self {
        let cell = Arc::new(Mutex::new(initial.into()));
        let read = cell.clone();
        let write = cell;
        Self {
            name: name.into(),
            mutability: Mutability::ReadWrite,
            characteristics,
            description: None,
            getter: Arc::new(move || Some(read.lock().ok()?.clone())),
            setter: Some(Arc::new(move |value: &str| {
                if let Ok(mut slot) = write.lock() {
                    *slot = value.to_string();
                    true
                } else {
                    false
                }
            })),
        }
    }

    /// A read-write variable with caller-supplied accessors.
    pub fn read_write(
        name: impl Into<String>,
        characteristics: VariableCharacteristics,
        getter: ValueGetter,
        setter: ValueSetter,
    ) -> Self {
        Self {
            name: name.into(),
            mutability: Mutability::ReadWrite,
            characteristics,
            description: None,
            getter,
            setter: Some(setter),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Current value, `None` when the source has nothing to report.
    pub fn value(&self) -> Option<String> {
        (self.getter)()
    }

    /// Checks limits and mutability, then applies the value.
    pub fn set_value(&self, value: &str) -> SetVariableStatus {
        match self.mutability {
            Mutability::ReadOnly => return SetVariableStatus::Rejected,
            Mutability::WriteOnly | Mutability::ReadWrite => {}
            Mutability::Unknown => return SetVariableStatus::Rejected,
        }
        if !self.value_in_limits(value) {
            return SetVariableStatus::Rejected;
        }
        match &self.setter {
            Some(setter) if setter(value) => SetVariableStatus::Accepted,
            _ => SetVariableStatus::Rejected,
        }
    }

    fn value_in_limits(&self, value: &str) -> bool {
        if let Some(max_length) = self.characteristics.max_length {
            if value.len() > max_length {
                return false;
            }
        }
        if self.characteristics.min_limit.is_some() || self.characteristics.max_limit.is_some() {
            let Ok(numeric) = value.trim().parse::<f64>() else {
                return false;
            };
            if let Some(min) = self.characteristics.min_limit {
                if numeric < min {
                    return false;
                }
            }
            if let Some(max) = self.characteristics.max_limit {
                if numeric > max {
                    return false;
                }
            }
        }
        true
    }
}

/// A named logical component holding its variable registry.
#[derive(Debug, Clone)]
pub struct ComponentConfig {
    pub name: String,
    variables: HashMap<String, VariableDescriptor>,
}

impl ComponentConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: HashMap::new(),
        }
    }

    pub fn with_variable(mut self, descriptor: VariableDescriptor) -> Self {
        self.add_variable(descriptor);
        self
    }

    pub fn add_variable(&mut self, descriptor: VariableDescriptor) {
        self.variables.insert(descriptor.name.clone(), descriptor);
    }

    pub fn variable(&self, name: &str) -> Option<&VariableDescriptor> {
        self.variables.get(name)
    }

    pub fn variables(&self) -> impl Iterator<Item = &VariableDescriptor> {
        self.variables.values()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Registry of all logical components of a station.
#[derive(Debug, Clone, Default)]
pub struct DeviceModel {
    components: HashMap<String, ComponentConfig>,
}

impl DeviceModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_component(&mut self, component: ComponentConfig) {
        self.components.insert(component.name.clone(), component);
    }

    pub fn with_component(mut self, component: ComponentConfig) -> Self {
        self.add_component(component);
        self
    }

    pub fn component(&self, name: &str) -> Option<&ComponentConfig> {
        self.components.get(name)
    }

    /// Resolves one GetVariables entry.
    pub fn get_variable(&self, data: &GetVariableData) -> GetVariableResult {
        let mut result = GetVariableResult {
            attribute_status: GetVariableStatus::Accepted,
            component: data.component.clone(),
            variable: data.variable.clone(),
            attribute_type: data.attribute_type,
            attribute_value: None,
            attribute_status_info: None,
        };

        // Only the Actual attribute is modeled.
        if matches!(
            data.attribute_type,
            Some(t) if t != AttributeType::Actual
        ) {
            result.attribute_status = GetVariableStatus::NotSupportedAttributeType;
            return result;
        }

        let Some(component) = self.component(&data.component.name) else {
            result.attribute_status = GetVariableStatus::UnknownComponent;
            return result;
        };
        let Some(descriptor) = component.variable(&data.variable.name) else {
            result.attribute_status = GetVariableStatus::UnknownVariable;
            return result;
        };

        if descriptor.mutability == Mutability::WriteOnly {
            result.attribute_status = GetVariableStatus::Rejected;
            return result;
        }

        match descriptor.value() {
            Some(value) => result.attribute_value = Some(value),
            None => result.attribute_status = GetVariableStatus::Rejected,
        }
        result
    }

    /// Resolves one SetVariables entry.
    pub fn set_variable(&self, data: &SetVariableData) -> SetVariableResult {
        let mut result = SetVariableResult {
            attribute_status: SetVariableStatus::Accepted,
            component: data.component.clone(),
            variable: data.variable.clone(),
            attribute_type: data.attribute_type,
            attribute_status_info: None,
        };

        if matches!(
            data.attribute_type,
            Some(t) if t != AttributeType::Actual
        ) {
            result.attribute_status = SetVariableStatus::NotSupportedAttributeType;
            return result;
        }

        let Some(component) = self.component(&data.component.name) else {
            result.attribute_status = SetVariableStatus::UnknownComponent;
            return result;
        };
        let Some(descriptor) = component.variable(&data.variable.name) else {
            result.attribute_status = SetVariableStatus::UnknownVariable;
            return result;
        };

        result.attribute_status = descriptor.set_value(&data.attribute_value);
        result
    }
}

/// Constructors for the standard controllers of the device-model spec.
pub mod standard {
    use super::*;

    /// OCPPCommCtrlr: communication parameters.
    pub fn ocpp_comm_ctrlr(heartbeat_interval_secs: u32, message_timeout_secs: u32) -> ComponentConfig {
        ComponentConfig::new("OCPPCommCtrlr")
            .with_variable(
                VariableDescriptor::stored(
                    "HeartbeatInterval",
                    VariableCharacteristics::of(VariableDataType::Integer)
                        .limits(1.0, 86_400.0)
                        .unit("s"),
                    heartbeat_interval_secs.to_string(),
                )
                .describe("Interval between Heartbeat messages"),
            )
            .with_variable(
                VariableDescriptor::constant(
                    "MessageTimeout",
                    VariableCharacteristics::of(VariableDataType::Integer).unit("s"),
                    message_timeout_secs.to_string(),
                )
                .describe("Timeout waiting for a CALLRESULT"),
            )
            .with_variable(VariableDescriptor::stored(
                "NetworkConfigurationPriority",
                VariableCharacteristics::of(VariableDataType::SequenceList),
                "0",
            ))
            .with_variable(
                VariableDescriptor::stored(
                    "OfflineThreshold",
                    VariableCharacteristics::of(VariableDataType::Integer).unit("s"),
                    "300",
                )
                .describe("Offline duration after which availability is reported"),
            )
    }

    /// SecurityCtrlr: read-only security posture.
    pub fn security_ctrlr(organization_name: &str, security_profile: u8) -> ComponentConfig {
        ComponentConfig::new("SecurityCtrlr")
            .with_variable(VariableDescriptor::constant(
                "OrganizationName",
                VariableCharacteristics::of(VariableDataType::String).max_length(48),
                organization_name,
            ))
            .with_variable(
                VariableDescriptor::constant(
                    "SecurityProfile",
                    VariableCharacteristics::of(VariableDataType::Integer).limits(1.0, 3.0),
                    security_profile.to_string(),
                )
                .describe("Active OCPP security profile"),
            )
            .with_variable(VariableDescriptor::stored(
                "CertificateEntries",
                VariableCharacteristics::of(VariableDataType::Integer),
                "0",
            ))
    }

    /// SampledDataCtrlr: transaction metering cadence and measurands.
    pub fn sampled_data_ctrlr(tx_updated_interval_secs: u32) -> ComponentConfig {
        ComponentConfig::new("SampledDataCtrlr")
            .with_variable(
                VariableDescriptor::stored(
                    "TxUpdatedInterval",
                    VariableCharacteristics::of(VariableDataType::Integer)
                        .limits(0.0, 86_400.0)
                        .unit("s"),
                    tx_updated_interval_secs.to_string(),
                )
                .describe("Interval between TransactionEvent(Updated) samples"),
            )
            .with_variable(VariableDescriptor::stored(
                "TxUpdatedMeasurands",
                VariableCharacteristics::of(VariableDataType::MemberList),
                "Energy.Active.Import.Register,Power.Active.Import",
            ))
    }

    /// TxCtrlr: transaction behavior switches.
    pub fn tx_ctrlr() -> ComponentConfig {
        ComponentConfig::new("TxCtrlr")
            .with_variable(VariableDescriptor::stored(
                "StopTxOnInvalidId",
                VariableCharacteristics::of(VariableDataType::Boolean),
                "true",
            ))
            .with_variable(
                VariableDescriptor::constant(
                    "TxStartPoint",
                    VariableCharacteristics::of(VariableDataType::OptionList),
                    "PowerPathClosed",
                )
                .describe("Condition that starts a transaction"),
            )
    }

    /// AlignedDataCtrlr: clock-aligned metering.
    pub fn aligned_data_ctrlr(interval_secs: u32) -> ComponentConfig {
        ComponentConfig::new("AlignedDataCtrlr")
            .with_variable(VariableDescriptor::stored(
                "Interval",
                VariableCharacteristics::of(VariableDataType::Integer)
                    .limits(0.0, 86_400.0)
                    .unit("s"),
                interval_secs.to_string(),
            ))
            .with_variable(VariableDescriptor::stored(
                "Measurands",
                VariableCharacteristics::of(VariableDataType::MemberList),
                "Energy.Active.Import.Register",
            ))
    }

    /// The default registry a station boots with.
    pub fn default_model(organization_name: &str, heartbeat_interval_secs: u32) -> DeviceModel {
        DeviceModel::new()
            .with_component(ocpp_comm_ctrlr(heartbeat_interval_secs, 30))
            .with_component(security_ctrlr(organization_name, 1))
            .with_component(sampled_data_ctrlr(60))
            .with_component(tx_ctrlr())
            .with_component(aligned_data_ctrlr(900))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::device::{ComponentRef, VariableRef};

    fn model() -> DeviceModel {
        standard::default_model("Elektrokombinacija", 300)
    }

    fn get(model: &DeviceModel, component: &str, variable: &str) -> GetVariableResult {
        model.get_variable(&GetVariableData {
            component: ComponentRef::new(component),
            variable: VariableRef::new(variable),
            attribute_type: None,
        })
    }

    fn set(model: &DeviceModel, component: &str, variable: &str, value: &str) -> SetVariableResult {
        model.set_variable(&SetVariableData {
            component: ComponentRef::new(component),
            variable: VariableRef::new(variable),
            attribute_value: value.into(),
            attribute_type: None,
        })
    }

    #[test]
    fn read_standard_variable() {
        let model = model();
        let result = get(&model, "OCPPCommCtrlr", "HeartbeatInterval");
        assert_eq!(result.attribute_status, GetVariableStatus::Accepted);
        assert_eq!(result.attribute_value.as_deref(), Some("300"));
    }

    #[test]
    fn unknown_component_and_variable() {
        let model = model();
        assert_eq!(
            get(&model, "NoSuchCtrlr", "HeartbeatInterval").attribute_status,
            GetVariableStatus::UnknownComponent
        );
        assert_eq!(
            get(&model, "OCPPCommCtrlr", "NoSuchVariable").attribute_status,
            GetVariableStatus::UnknownVariable
        );
    }

    #[test]
    fn write_round_trip() {
        let model = model();
        let result = set(&model, "OCPPCommCtrlr", "HeartbeatInterval", "120");
        assert_eq!(result.attribute_status, SetVariableStatus::Accepted);
        assert_eq!(
            get(&model, "OCPPCommCtrlr", "HeartbeatInterval")
                .attribute_value
                .as_deref(),
            Some("120")
        );
    }

    #[test]
    fn write_to_read_only_is_rejected() {
        let model = model();
        let result = set(&model, "SecurityCtrlr", "SecurityProfile", "3");
        assert_eq!(result.attribute_status, SetVariableStatus::Rejected);
    }

    #[test]
    fn limits_are_enforced() {
        let model = model();
        assert_eq!(
            set(&model, "OCPPCommCtrlr", "HeartbeatInterval", "0").attribute_status,
            SetVariableStatus::Rejected
        );
        assert_eq!(
            set(&model, "OCPPCommCtrlr", "HeartbeatInterval", "not-a-number").attribute_status,
            SetVariableStatus::Rejected
        );
    }

    #[test]
    fn unsupported_attribute_type() {
        let model = model();
        let result = model.get_variable(&GetVariableData {
            component: ComponentRef::new("TxCtrlr"),
            variable: VariableRef::new("StopTxOnInvalidId"),
            attribute_type: Some(AttributeType::MaxSet),
        });
        assert_eq!(
            result.attribute_status,
            GetVariableStatus::NotSupportedAttributeType
        );
    }
}
