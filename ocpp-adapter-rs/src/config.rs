//! Station configuration.

use std::time::Duration;

/// Configuration for the station-side OCPP client.
#[derive(Debug, Clone)]
pub struct StationConfig {
    /// CSMS WebSocket base URL; the station id is appended as a path segment.
    pub csms_url: String,
    /// Charging station identity.
    pub station_id: String,
    pub vendor: String,
    pub model: String,
    pub serial_number: Option<String>,
    pub firmware_version: Option<String>,
    /// Number of EVSEs, numbered from 1.
    pub evse_count: u32,
    /// Initial reconnect delay; doubles per failed attempt.
    pub reconnect_delay: Duration,
    pub max_reconnect_delay: Duration,
    /// How long a caller waits for a CALLRESULT before giving up.
    pub request_timeout: Duration,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            csms_url: "ws://localhost:8180/steve/websocket/CentralSystemService".to_string(),
            station_id: "EK3-001".to_string(),
            vendor: "Elektrokombinacija".to_string(),
            model: "EK3-OCPP".to_string(),
            serial_number: None,
            firmware_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            evse_count: 1,
            reconnect_delay: Duration::from_secs(5),
            max_reconnect_delay: Duration::from_secs(300),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl StationConfig {
    pub fn with_csms_url(mut self, url: impl Into<String>) -> Self {
        self.csms_url = url.into();
        self
    }

    pub fn with_station_id(mut self, id: impl Into<String>) -> Self {
        self.station_id = id.into();
        self
    }

    pub fn with_evse_count(mut self, count: u32) -> Self {
        self.evse_count = count;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Full WebSocket URL including the station id path segment.
    pub fn station_url(&self) -> String {
        format!("{}/{}", self.csms_url.trim_end_matches('/'), self.station_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_url_joins_cleanly() {
        let config = StationConfig::default()
            .with_csms_url("ws://csms.example/ocpp/")
            .with_station_id("EK3-042");
        assert_eq!(config.station_url(), "ws://csms.example/ocpp/EK3-042");

        let config = config.with_csms_url("ws://csms.example/ocpp");
        assert_eq!(config.station_url(), "ws://csms.example/ocpp/EK3-042");
    }

    #[test]
    fn builder_overrides() {
        let config = StationConfig::default()
            .with_evse_count(4)
            .with_request_timeout(Duration::from_secs(5));
        assert_eq!(config.evse_count, 4);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }
}
