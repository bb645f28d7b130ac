//! Typed station-to-CSMS calls.
//!
//! Each wrapper runs the same pipeline: serialize, sign, send, correlate the
//! reply, verify its signature, decode into the response type.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use ocpp_model::datatypes::{IdToken, MeterValue};
use ocpp_model::enums::{BootReason, ConnectorStatus, FirmwareStatus, RegistrationStatus};
use ocpp_model::messages::{
    AuthorizeRequest, AuthorizeResponse, BootNotificationRequest, BootNotificationResponse,
    DataTransferRequest, DataTransferResponse, FirmwareStatusNotificationRequest,
    FirmwareStatusNotificationResponse, HeartbeatRequest, HeartbeatResponse, MeterValuesRequest,
    MeterValuesResponse, SecurityEventNotificationRequest, SecurityEventNotificationResponse,
    StatusNotificationRequest, StatusNotificationResponse, TransactionEventRequest,
    TransactionEventResponse,
};

use crate::client::StationClient;
use crate::error::OcppError;
use crate::frame::{Action, Call};
use crate::session::SessionEvent;

impl StationClient {
    /// Send a typed request and decode the typed response.
    pub async fn call<Req, Resp>(&self, action: Action, request: &Req) -> Result<Resp, OcppError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let call = Call::new(action, request)?;
        let result = self.request(call).await?;
        self.policy().verify(action, &result.payload)?;
        result.parse_payload()
    }

    /// Send BootNotification and apply the outcome to the session.
    pub async fn boot_notification(&self) -> Result<BootNotificationResponse, OcppError> {
        let request = BootNotificationRequest {
            charging_station: self.session().read().await.charging_station_info(),
            reason: BootReason::PowerUp,
            custom_data: None,
        };
        let response: BootNotificationResponse =
            self.call(Action::BootNotification, &request).await?;

        let mut session = self.session().write_owned().await;
        match response.status {
            RegistrationStatus::Accepted => session.handle_event(SessionEvent::BootAccepted {
                interval: response.interval,
            }),
            RegistrationStatus::Pending => session.handle_event(SessionEvent::BootPending {
                interval: response.interval,
            }),
            _ => session.handle_event(SessionEvent::BootRejected),
        }
        Ok(response)
    }

    /// Send Heartbeat and record it on the session.
    pub async fn heartbeat(&self) -> Result<HeartbeatResponse, OcppError> {
        let response: HeartbeatResponse = self
            .call(Action::Heartbeat, &HeartbeatRequest::default())
            .await?;
        debug!("heartbeat answered, CSMS time: {}", response.current_time);
        self.session()
            .write()
            .await
            .handle_event(SessionEvent::HeartbeatSent);
        Ok(response)
    }

    /// Send StatusNotification for one connector.
    pub async fn status_notification(
        &self,
        evse_id: i32,
        connector_id: i32,
        status: ConnectorStatus,
    ) -> Result<StatusNotificationResponse, OcppError> {
        let request = StatusNotificationRequest {
            timestamp: Utc::now(),
            connector_status: status,
            evse_id,
            connector_id,
            custom_data: None,
        };
        self.call(Action::StatusNotification, &request).await
    }

    /// Report the effective status of every EVSE.
    pub async fn status_notification_all(&self) -> Result<(), OcppError> {
        let statuses = self.session().read().await.evse_statuses();
        for (evse_id, connector_id, status) in statuses {
            self.status_notification(evse_id, connector_id, status)
                .await?;
        }
        Ok(())
    }

    pub async fn authorize(&self, id_token: IdToken) -> Result<AuthorizeResponse, OcppError> {
        let request = AuthorizeRequest {
            id_token,
            certificate: None,
            custom_data: None,
        };
        self.call(Action::Authorize, &request).await
    }

    pub async fn transaction_event(
        &self,
        request: &TransactionEventRequest,
    ) -> Result<TransactionEventResponse, OcppError> {
        self.call(Action::TransactionEvent, request).await
    }

    pub async fn meter_values(
        &self,
        evse_id: i32,
        meter_value: Vec<MeterValue>,
    ) -> Result<MeterValuesResponse, OcppError> {
        let request = MeterValuesRequest {
            evse_id,
            meter_value,
            custom_data: None,
        };
        self.call(Action::MeterValues, &request).await
    }

    pub async fn data_transfer(
        &self,
        request: &DataTransferRequest,
    ) -> Result<DataTransferResponse, OcppError> {
        self.call(Action::DataTransfer, request).await
    }

    pub async fn firmware_status_notification(
        &self,
        status: FirmwareStatus,
        request_id: Option<i32>,
    ) -> Result<FirmwareStatusNotificationResponse, OcppError> {
        let request = FirmwareStatusNotificationRequest {
            status,
            request_id,
            custom_data: None,
        };
        self.call(Action::FirmwareStatusNotification, &request).await
    }

    pub async fn security_event_notification(
        &self,
        event_type: impl Into<String>,
        tech_info: Option<String>,
    ) -> Result<SecurityEventNotificationResponse, OcppError> {
        let request = SecurityEventNotificationRequest {
            event_type: event_type.into(),
            timestamp: Utc::now(),
            tech_info,
            custom_data: None,
        };
        self.call(Action::SecurityEventNotification, &request).await
    }
}
