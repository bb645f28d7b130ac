//! OCPP 2.0.1 enumerated value types
//!
//! Every vocabulary here is a closed token list from the specification plus
//! an explicit `Unknown` sentinel for forward compatibility with later
//! protocol revisions. Each enum carries a text pair:
//! - `as_text()` renders the canonical token
//! - `try_parse()` is an exact, case-sensitive match on the trimmed input
//! - `parse()` falls back to `Unknown` instead of failing
//!
//! On the wire the serde token is authoritative; an unrecognized token
//! deserializes to `Unknown` (`#[serde(other)]`) rather than rejecting the
//! whole message.

use serde::{Deserialize, Serialize};

use crate::error::UnknownToken;

/// Generates the text pair for a vocabulary.
///
/// `Unknown` must not be listed; it renders as `"Unknown"` and is never
/// produced by `try_parse`, so `parse("Unknown")` still lands on the
/// sentinel via the fallback.
macro_rules! text_pair {
    ($name:ident { $($variant:ident => $token:literal),+ $(,)? }) => {
        impl $name {
            /// Canonical token from the OCPP 2.0.1 vocabulary.
            pub fn as_text(&self) -> &'static str {
                match self {
                    $(Self::$variant => $token,)+
                    Self::Unknown => "Unknown",
                }
            }

            /// Exact, case-sensitive match after trimming surrounding whitespace.
            pub fn try_parse(s: &str) -> Option<Self> {
                match s.trim() {
                    $($token => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Lenient parse: unmatched tokens become [`Self::Unknown`].
            pub fn parse(s: &str) -> Self {
                Self::try_parse(s).unwrap_or(Self::Unknown)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_text())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownToken;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::try_parse(s).ok_or_else(|| UnknownToken::new(stringify!($name), s))
            }
        }
    };
}

/// Reason for sending a BootNotification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BootReason {
    ApplicationReset,
    FirmwareUpdate,
    LocalReset,
    PowerUp,
    RemoteReset,
    ScheduledReset,
    Triggered,
    Watchdog,
    #[serde(other)]
    Unknown,
}

text_pair!(BootReason {
    ApplicationReset => "ApplicationReset",
    FirmwareUpdate => "FirmwareUpdate",
    LocalReset => "LocalReset",
    PowerUp => "PowerUp",
    RemoteReset => "RemoteReset",
    ScheduledReset => "ScheduledReset",
    Triggered => "Triggered",
    Watchdog => "Watchdog",
});

/// CSMS verdict on a BootNotification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistrationStatus {
    Accepted,
    Pending,
    Rejected,
    #[serde(other)]
    Unknown,
}

text_pair!(RegistrationStatus {
    Accepted => "Accepted",
    Pending => "Pending",
    Rejected => "Rejected",
});

/// Connector-level status reported via StatusNotification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectorStatus {
    Available,
    Occupied,
    Reserved,
    Unavailable,
    Faulted,
    #[serde(other)]
    Unknown,
}

text_pair!(ConnectorStatus {
    Available => "Available",
    Occupied => "Occupied",
    Reserved => "Reserved",
    Unavailable => "Unavailable",
    Faulted => "Faulted",
});

/// Requested operational state in ChangeAvailability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationalStatus {
    Inoperative,
    Operative,
    #[serde(other)]
    Unknown,
}

text_pair!(OperationalStatus {
    Inoperative => "Inoperative",
    Operative => "Operative",
});

/// Station verdict on ChangeAvailability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeAvailabilityStatus {
    Accepted,
    Rejected,
    Scheduled,
    #[serde(other)]
    Unknown,
}

text_pair!(ChangeAvailabilityStatus {
    Accepted => "Accepted",
    Rejected => "Rejected",
    Scheduled => "Scheduled",
});

/// Generic accepted/rejected verdict shared by several responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenericStatus {
    Accepted,
    Rejected,
    #[serde(other)]
    Unknown,
}

text_pair!(GenericStatus {
    Accepted => "Accepted",
    Rejected => "Rejected",
});

/// Authorization verdict for an id token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorizationStatus {
    Accepted,
    Blocked,
    ConcurrentTx,
    Expired,
    Invalid,
    NoCredit,
    #[serde(rename = "NotAllowedTypeEVSE")]
    NotAllowedTypeEvse,
    NotAtThisLocation,
    NotAtThisTime,
    #[serde(other)]
    Unknown,
}

text_pair!(AuthorizationStatus {
    Accepted => "Accepted",
    Blocked => "Blocked",
    ConcurrentTx => "ConcurrentTx",
    Expired => "Expired",
    Invalid => "Invalid",
    NoCredit => "NoCredit",
    NotAllowedTypeEvse => "NotAllowedTypeEVSE",
    NotAtThisLocation => "NotAtThisLocation",
    NotAtThisTime => "NotAtThisTime",
});

/// Kind of identification token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdTokenType {
    Central,
    #[serde(rename = "eMAID")]
    Emaid,
    #[serde(rename = "ISO14443")]
    Iso14443,
    #[serde(rename = "ISO15693")]
    Iso15693,
    KeyCode,
    Local,
    MacAddress,
    NoAuthorization,
    #[serde(other)]
    Unknown,
}

text_pair!(IdTokenType {
    Central => "Central",
    Emaid => "eMAID",
    Iso14443 => "ISO14443",
    Iso15693 => "ISO15693",
    KeyCode => "KeyCode",
    Local => "Local",
    MacAddress => "MacAddress",
    NoAuthorization => "NoAuthorization",
});

/// Phase of a transaction reported in TransactionEvent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionEventType {
    Ended,
    Started,
    Updated,
    #[serde(other)]
    Unknown,
}

text_pair!(TransactionEventType {
    Ended => "Ended",
    Started => "Started",
    Updated => "Updated",
});

/// What triggered a TransactionEvent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerReason {
    Authorized,
    CablePluggedIn,
    ChargingRateChanged,
    ChargingStateChanged,
    Deauthorized,
    EnergyLimitReached,
    #[serde(rename = "EVCommunicationLost")]
    EvCommunicationLost,
    #[serde(rename = "EVConnectTimeout")]
    EvConnectTimeout,
    #[serde(rename = "EVDeparted")]
    EvDeparted,
    #[serde(rename = "EVDetected")]
    EvDetected,
    MeterValueClock,
    MeterValuePeriodic,
    RemoteStart,
    RemoteStop,
    ResetCommand,
    SignedDataReceived,
    StopAuthorized,
    TimeLimitReached,
    Trigger,
    UnlockCommand,
    #[serde(other)]
    Unknown,
}

text_pair!(TriggerReason {
    Authorized => "Authorized",
    CablePluggedIn => "CablePluggedIn",
    ChargingRateChanged => "ChargingRateChanged",
    ChargingStateChanged => "ChargingStateChanged",
    Deauthorized => "Deauthorized",
    EnergyLimitReached => "EnergyLimitReached",
    EvCommunicationLost => "EVCommunicationLost",
    EvConnectTimeout => "EVConnectTimeout",
    EvDeparted => "EVDeparted",
    EvDetected => "EVDetected",
    MeterValueClock => "MeterValueClock",
    MeterValuePeriodic => "MeterValuePeriodic",
    RemoteStart => "RemoteStart",
    RemoteStop => "RemoteStop",
    ResetCommand => "ResetCommand",
    SignedDataReceived => "SignedDataReceived",
    StopAuthorized => "StopAuthorized",
    TimeLimitReached => "TimeLimitReached",
    Trigger => "Trigger",
    UnlockCommand => "UnlockCommand",
});

/// Charging state within a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChargingState {
    Charging,
    #[serde(rename = "EVConnected")]
    EvConnected,
    Idle,
    #[serde(rename = "SuspendedEV")]
    SuspendedEv,
    #[serde(rename = "SuspendedEVSE")]
    SuspendedEvse,
    #[serde(other)]
    Unknown,
}

text_pair!(ChargingState {
    Charging => "Charging",
    EvConnected => "EVConnected",
    Idle => "Idle",
    SuspendedEv => "SuspendedEV",
    SuspendedEvse => "SuspendedEVSE",
});

/// Kind of reset requested by the CSMS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResetType {
    Immediate,
    OnIdle,
    #[serde(other)]
    Unknown,
}

text_pair!(ResetType {
    Immediate => "Immediate",
    OnIdle => "OnIdle",
});

/// Station verdict on a Reset request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResetStatus {
    Accepted,
    Rejected,
    Scheduled,
    #[serde(other)]
    Unknown,
}

text_pair!(ResetStatus {
    Accepted => "Accepted",
    Rejected => "Rejected",
    Scheduled => "Scheduled",
});

/// Purpose of a charging profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChargingProfilePurpose {
    ChargingStationExternalConstraints,
    ChargingStationMaxProfile,
    TxDefaultProfile,
    TxProfile,
    #[serde(other)]
    Unknown,
}

text_pair!(ChargingProfilePurpose {
    ChargingStationExternalConstraints => "ChargingStationExternalConstraints",
    ChargingStationMaxProfile => "ChargingStationMaxProfile",
    TxDefaultProfile => "TxDefaultProfile",
    TxProfile => "TxProfile",
});

/// Schedule anchoring of a charging profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChargingProfileKind {
    Absolute,
    Recurring,
    Relative,
    #[serde(other)]
    Unknown,
}

text_pair!(ChargingProfileKind {
    Absolute => "Absolute",
    Recurring => "Recurring",
    Relative => "Relative",
});

/// Unit of a charging schedule limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChargingRateUnit {
    W,
    A,
    #[serde(other)]
    Unknown,
}

text_pair!(ChargingRateUnit {
    W => "W",
    A => "A",
});

/// Recurrence period for recurring profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecurrencyKind {
    Daily,
    Weekly,
    #[serde(other)]
    Unknown,
}

text_pair!(RecurrencyKind {
    Daily => "Daily",
    Weekly => "Weekly",
});

/// Measured quantity of a sampled value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Measurand {
    #[serde(rename = "Current.Export")]
    CurrentExport,
    #[serde(rename = "Current.Import")]
    CurrentImport,
    #[serde(rename = "Current.Offered")]
    CurrentOffered,
    #[serde(rename = "Energy.Active.Export.Register")]
    EnergyActiveExportRegister,
    #[serde(rename = "Energy.Active.Import.Register")]
    EnergyActiveImportRegister,
    #[serde(rename = "Frequency")]
    Frequency,
    #[serde(rename = "Power.Active.Export")]
    PowerActiveExport,
    #[serde(rename = "Power.Active.Import")]
    PowerActiveImport,
    #[serde(rename = "Power.Offered")]
    PowerOffered,
    #[serde(rename = "SoC")]
    SoC,
    #[serde(rename = "Voltage")]
    Voltage,
    #[serde(other)]
    Unknown,
}

text_pair!(Measurand {
    CurrentExport => "Current.Export",
    CurrentImport => "Current.Import",
    CurrentOffered => "Current.Offered",
    EnergyActiveExportRegister => "Energy.Active.Export.Register",
    EnergyActiveImportRegister => "Energy.Active.Import.Register",
    Frequency => "Frequency",
    PowerActiveExport => "Power.Active.Export",
    PowerActiveImport => "Power.Active.Import",
    PowerOffered => "Power.Offered",
    SoC => "SoC",
    Voltage => "Voltage",
});

/// Context in which a sample was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadingContext {
    #[serde(rename = "Interruption.Begin")]
    InterruptionBegin,
    #[serde(rename = "Interruption.End")]
    InterruptionEnd,
    #[serde(rename = "Other")]
    Other,
    #[serde(rename = "Sample.Clock")]
    SampleClock,
    #[serde(rename = "Sample.Periodic")]
    SamplePeriodic,
    #[serde(rename = "Transaction.Begin")]
    TransactionBegin,
    #[serde(rename = "Transaction.End")]
    TransactionEnd,
    #[serde(rename = "Trigger")]
    Trigger,
    #[serde(other)]
    Unknown,
}

text_pair!(ReadingContext {
    InterruptionBegin => "Interruption.Begin",
    InterruptionEnd => "Interruption.End",
    Other => "Other",
    SampleClock => "Sample.Clock",
    SamplePeriodic => "Sample.Periodic",
    TransactionBegin => "Transaction.Begin",
    TransactionEnd => "Transaction.End",
    Trigger => "Trigger",
});

/// Unit of measure for sampled values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitOfMeasure {
    Wh,
    #[serde(rename = "kWh")]
    KWh,
    #[serde(rename = "varh")]
    Varh,
    #[serde(rename = "kvarh")]
    Kvarh,
    W,
    #[serde(rename = "kW")]
    KW,
    #[serde(rename = "VA")]
    Va,
    #[serde(rename = "kVA")]
    Kva,
    #[serde(rename = "var")]
    Var,
    #[serde(rename = "kvar")]
    Kvar,
    A,
    V,
    Celsius,
    Fahrenheit,
    K,
    Percent,
    Hertz,
    #[serde(other)]
    Unknown,
}

text_pair!(UnitOfMeasure {
    Wh => "Wh",
    KWh => "kWh",
    Varh => "varh",
    Kvarh => "kvarh",
    W => "W",
    KW => "kW",
    Va => "VA",
    Kva => "kVA",
    Var => "var",
    Kvar => "kvar",
    A => "A",
    V => "V",
    Celsius => "Celsius",
    Fahrenheit => "Fahrenheit",
    K => "K",
    Percent => "Percent",
    Hertz => "Hertz",
});

/// Station verdict on a DataTransfer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataTransferStatus {
    Accepted,
    Rejected,
    UnknownMessageId,
    UnknownVendorId,
    #[serde(other)]
    Unknown,
}

text_pair!(DataTransferStatus {
    Accepted => "Accepted",
    Rejected => "Rejected",
    UnknownMessageId => "UnknownMessageId",
    UnknownVendorId => "UnknownVendorId",
});

/// Progress of a firmware update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FirmwareStatus {
    Downloaded,
    DownloadFailed,
    Downloading,
    DownloadScheduled,
    DownloadPaused,
    Idle,
    InstallationFailed,
    Installing,
    Installed,
    InstallRebooting,
    InstallScheduled,
    InstallVerificationFailed,
    InvalidSignature,
    SignatureVerified,
    #[serde(other)]
    Unknown,
}

text_pair!(FirmwareStatus {
    Downloaded => "Downloaded",
    DownloadFailed => "DownloadFailed",
    Downloading => "Downloading",
    DownloadScheduled => "DownloadScheduled",
    DownloadPaused => "DownloadPaused",
    Idle => "Idle",
    InstallationFailed => "InstallationFailed",
    Installing => "Installing",
    Installed => "Installed",
    InstallRebooting => "InstallRebooting",
    InstallScheduled => "InstallScheduled",
    InstallVerificationFailed => "InstallVerificationFailed",
    InvalidSignature => "InvalidSignature",
    SignatureVerified => "SignatureVerified",
});

/// Display priority of a CSMS message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessagePriority {
    AlwaysFront,
    InFront,
    NormalCycle,
    #[serde(other)]
    Unknown,
}

text_pair!(MessagePriority {
    AlwaysFront => "AlwaysFront",
    InFront => "InFront",
    NormalCycle => "NormalCycle",
});

/// Content format of a display message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageFormat {
    #[serde(rename = "ASCII")]
    Ascii,
    #[serde(rename = "HTML")]
    Html,
    #[serde(rename = "URI")]
    Uri,
    #[serde(rename = "UTF8")]
    Utf8,
    #[serde(other)]
    Unknown,
}

text_pair!(MessageFormat {
    Ascii => "ASCII",
    Html => "HTML",
    Uri => "URI",
    Utf8 => "UTF8",
});

/// Intended use of a certificate signing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CertificateSigningUse {
    ChargingStationCertificate,
    #[serde(rename = "V2GCertificate")]
    V2gCertificate,
    #[serde(other)]
    Unknown,
}

text_pair!(CertificateSigningUse {
    ChargingStationCertificate => "ChargingStationCertificate",
    V2gCertificate => "V2GCertificate",
});

/// Mutability of a device-model variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mutability {
    ReadOnly,
    WriteOnly,
    ReadWrite,
    #[serde(other)]
    Unknown,
}

text_pair!(Mutability {
    ReadOnly => "ReadOnly",
    WriteOnly => "WriteOnly",
    ReadWrite => "ReadWrite",
});

/// Data type of a device-model variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableDataType {
    #[default]
    #[serde(rename = "string")]
    String,
    #[serde(rename = "decimal")]
    Decimal,
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "dateTime")]
    DateTime,
    #[serde(rename = "boolean")]
    Boolean,
    OptionList,
    SequenceList,
    MemberList,
    #[serde(other)]
    Unknown,
}

text_pair!(VariableDataType {
    String => "string",
    Decimal => "decimal",
    Integer => "integer",
    DateTime => "dateTime",
    Boolean => "boolean",
    OptionList => "OptionList",
    SequenceList => "SequenceList",
    MemberList => "MemberList",
});

/// Which attribute of a variable is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeType {
    Actual,
    Target,
    MinSet,
    MaxSet,
    #[serde(other)]
    Unknown,
}

text_pair!(AttributeType {
    Actual => "Actual",
    Target => "Target",
    MinSet => "MinSet",
    MaxSet => "MaxSet",
});

/// Per-variable result of GetVariables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GetVariableStatus {
    Accepted,
    Rejected,
    UnknownComponent,
    UnknownVariable,
    NotSupportedAttributeType,
    #[serde(other)]
    Unknown,
}

text_pair!(GetVariableStatus {
    Accepted => "Accepted",
    Rejected => "Rejected",
    UnknownComponent => "UnknownComponent",
    UnknownVariable => "UnknownVariable",
    NotSupportedAttributeType => "NotSupportedAttributeType",
});

/// Per-variable result of SetVariables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetVariableStatus {
    Accepted,
    Rejected,
    UnknownComponent,
    UnknownVariable,
    NotSupportedAttributeType,
    RebootRequired,
    #[serde(other)]
    Unknown,
}

text_pair!(SetVariableStatus {
    Accepted => "Accepted",
    Rejected => "Rejected",
    UnknownComponent => "UnknownComponent",
    UnknownVariable => "UnknownVariable",
    NotSupportedAttributeType => "NotSupportedAttributeType",
    RebootRequired => "RebootRequired",
});

/// Station verdict on ReserveNow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservationStatus {
    Accepted,
    Faulted,
    Occupied,
    Rejected,
    Unavailable,
    #[serde(other)]
    Unknown,
}

text_pair!(ReservationStatus {
    Accepted => "Accepted",
    Faulted => "Faulted",
    Occupied => "Occupied",
    Rejected => "Rejected",
    Unavailable => "Unavailable",
});

/// Station verdict on ClearChargingProfile. `Unknown` is a real token in
/// this vocabulary ("no matching profile"), which the sentinel doubles as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClearChargingProfileStatus {
    Accepted,
    #[serde(other)]
    Unknown,
}

text_pair!(ClearChargingProfileStatus {
    Accepted => "Accepted",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trip() {
        let cases: &[(&str, &str)] = &[
            (BootReason::PowerUp.as_text(), "PowerUp"),
            (ConnectorStatus::Occupied.as_text(), "Occupied"),
            (Measurand::EnergyActiveImportRegister.as_text(), "Energy.Active.Import.Register"),
            (ReadingContext::SamplePeriodic.as_text(), "Sample.Periodic"),
            (IdTokenType::Emaid.as_text(), "eMAID"),
            (UnitOfMeasure::KWh.as_text(), "kWh"),
            (VariableDataType::DateTime.as_text(), "dateTime"),
        ];
        for (rendered, expected) in cases {
            assert_eq!(rendered, expected);
        }

        assert_eq!(BootReason::try_parse("PowerUp"), Some(BootReason::PowerUp));
        assert_eq!(
            Measurand::try_parse("Energy.Active.Import.Register"),
            Some(Measurand::EnergyActiveImportRegister)
        );
        assert_eq!(IdTokenType::try_parse("eMAID"), Some(IdTokenType::Emaid));
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(
            ConnectorStatus::try_parse("  Available "),
            Some(ConnectorStatus::Available)
        );
        assert_eq!(ResetType::try_parse("\tOnIdle\n"), Some(ResetType::OnIdle));
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!(ConnectorStatus::try_parse("available"), None);
        assert_eq!(RegistrationStatus::try_parse("ACCEPTED"), None);
    }

    #[test]
    fn garbage_falls_back_to_unknown() {
        assert_eq!(BootReason::try_parse("garbage"), None);
        assert_eq!(BootReason::parse("garbage"), BootReason::Unknown);
        assert_eq!(AuthorizationStatus::parse(""), AuthorizationStatus::Unknown);
    }

    #[test]
    fn from_str_reports_vocabulary() {
        let err = "NotAToken".parse::<ResetStatus>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("ResetStatus"));
        assert!(msg.contains("NotAToken"));
    }

    #[test]
    fn serde_uses_spec_tokens() {
        assert_eq!(
            serde_json::to_string(&Measurand::SoC).unwrap(),
            "\"SoC\""
        );
        assert_eq!(
            serde_json::to_string(&ReadingContext::TransactionBegin).unwrap(),
            "\"Transaction.Begin\""
        );
        assert_eq!(
            serde_json::to_string(&AuthorizationStatus::NotAllowedTypeEvse).unwrap(),
            "\"NotAllowedTypeEVSE\""
        );
    }

    #[test]
    fn serde_unrecognized_token_degrades_to_unknown() {
        let parsed: ConnectorStatus = serde_json::from_str("\"Hibernating\"").unwrap();
        assert_eq!(parsed, ConnectorStatus::Unknown);

        let parsed: FirmwareStatus = serde_json::from_str("\"Shredding\"").unwrap();
        assert_eq!(parsed, FirmwareStatus::Unknown);
    }

    #[test]
    fn display_matches_as_text() {
        assert_eq!(ChargingRateUnit::W.to_string(), "W");
        assert_eq!(TriggerReason::EvDeparted.to_string(), "EVDeparted");
        assert_eq!(GenericStatus::Unknown.to_string(), "Unknown");
    }
}
