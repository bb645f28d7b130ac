//! CSMS request routing.
//!
//! Takes inbound CALLs off the connection channel, decodes them into typed
//! requests, applies them to the session and device model, and sends the
//! CALLRESULT back. Decode failures answer with FormatViolation, actions
//! without a handler with NotImplemented.

use serde_json::json;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use ocpp_model::device_model::DeviceModel;
use ocpp_model::enums::DataTransferStatus;
use ocpp_model::messages::{
    CancelReservationRequest, CancelReservationResponse, ChangeAvailabilityRequest,
    ChangeAvailabilityResponse, ClearChargingProfileRequest, ClearChargingProfileResponse,
    DataTransferRequest, DataTransferResponse, GetVariablesRequest, GetVariablesResponse,
    RequestStartTransactionRequest, RequestStartTransactionResponse, RequestStopTransactionRequest,
    RequestStopTransactionResponse, ReserveNowRequest, ReserveNowResponse, ResetRequest,
    ResetResponse, SetChargingProfileRequest, SetChargingProfileResponse, SetVariablesRequest,
    SetVariablesResponse,
};

use crate::client::StationClient;
use crate::error::OcppError;
use crate::frame::{Action, Call, CallError, CallResult};

/// Routes CSMS-originated requests to their handlers.
pub struct Router {
    client: StationClient,
    model: DeviceModel,
}

impl Router {
    pub fn new(client: StationClient, model: DeviceModel) -> Self {
        Self { client, model }
    }

    /// Consume inbound CALLs until the connection channel closes.
    pub async fn run(mut self, mut incoming: mpsc::Receiver<Call>) -> Result<(), OcppError> {
        while let Some(call) = incoming.recv().await {
            self.handle(call).await?;
        }
        info!("request channel closed, router stopping");
        Ok(())
    }

    /// Handle one CSMS request and send the reply.
    pub async fn handle(&mut self, call: Call) -> Result<(), OcppError> {
        info!("handling {} ({})", call.action, call.message_id);

        if let Err(e) = self.client.policy().verify(call.action, &call.payload) {
            warn!("rejecting {}: {}", call.action, e);
            return self
                .client
                .respond_error(CallError::security_error(call.message_id, e.to_string()))
                .await;
        }

        match call.action {
            Action::Reset => self.reset(call).await,
            Action::ChangeAvailability => self.change_availability(call).await,
            Action::SetChargingProfile => self.set_charging_profile(call).await,
            Action::ClearChargingProfile => self.clear_charging_profile(call).await,
            Action::RequestStartTransaction => self.request_start_transaction(call).await,
            Action::RequestStopTransaction => self.request_stop_transaction(call).await,
            Action::ReserveNow => self.reserve_now(call).await,
            Action::CancelReservation => self.cancel_reservation(call).await,
            Action::GetVariables => self.get_variables(call).await,
            Action::SetVariables => self.set_variables(call).await,
            Action::DataTransfer => self.data_transfer(call).await,
            other => {
                warn!("no handler for {}", other);
                self.client
                    .respond_error(CallError::not_implemented(call.message_id, other))
                    .await
            }
        }
    }

    /// Decode the payload, answering FormatViolation on failure.
    async fn decode<T: for<'de> serde::Deserialize<'de>>(
        &self,
        call: &Call,
    ) -> Result<Option<T>, OcppError> {
        match call.parse_payload() {
            Ok(request) => Ok(Some(request)),
            Err(e) => {
                warn!("malformed {} payload: {}", call.action, e);
                self.client
                    .respond_error(CallError::format_violation(
                        call.message_id.clone(),
                        e.to_string(),
                    ))
                    .await?;
                Ok(None)
            }
        }
    }

    async fn respond<T: serde::Serialize>(
        &self,
        message_id: String,
        payload: T,
    ) -> Result<(), OcppError> {
        self.client
            .respond(CallResult::new(message_id, payload)?)
            .await
    }

    async fn reset(&mut self, call: Call) -> Result<(), OcppError> {
        let Some(request) = self.decode::<ResetRequest>(&call).await? else {
            return Ok(());
        };
        let status = self.client.session().write().await.reset(request.reset_type);
        self.respond(
            call.message_id,
            ResetResponse {
                status,
                status_info: None,
                custom_data: None,
            },
        )
        .await
    }

    async fn change_availability(&mut self, call: Call) -> Result<(), OcppError> {
        let Some(request) = self.decode::<ChangeAvailabilityRequest>(&call).await? else {
            return Ok(());
        };
        let status = self
            .client
            .session()
            .write()
            .await
            .change_availability(request.evse.map(|e| e.id), request.operational_status);
        self.respond(
            call.message_id,
            ChangeAvailabilityResponse {
                status,
                status_info: None,
                custom_data: None,
            },
        )
        .await
    }

    async fn set_charging_profile(&mut self, call: Call) -> Result<(), OcppError> {
        let Some(request) = self.decode::<SetChargingProfileRequest>(&call).await? else {
            return Ok(());
        };
        let status = self
            .client
            .session()
            .write()
            .await
            .set_charging_profile(request.evse_id, request.charging_profile);
        self.respond(
            call.message_id,
            SetChargingProfileResponse {
                status,
                status_info: None,
                custom_data: None,
            },
        )
        .await
    }

    async fn clear_charging_profile(&mut self, call: Call) -> Result<(), OcppError> {
        let Some(request) = self.decode::<ClearChargingProfileRequest>(&call).await? else {
            return Ok(());
        };
        let status = self.client.session().write().await.clear_charging_profile(
            request.charging_profile_id,
            request.charging_profile_criteria.as_ref(),
        );
        self.respond(
            call.message_id,
            ClearChargingProfileResponse {
                status,
                status_info: None,
                custom_data: None,
            },
        )
        .await
    }

    async fn request_start_transaction(&mut self, call: Call) -> Result<(), OcppError> {
        let Some(request) = self.decode::<RequestStartTransactionRequest>(&call).await? else {
            return Ok(());
        };
        let transaction_id = Uuid::new_v4().to_string();
        let (status, transaction_id) = self.client.session().write().await.start_transaction(
            request.evse_id,
            request.id_token.id_token.clone(),
            request.remote_start_id,
            transaction_id,
        );
        self.respond(
            call.message_id,
            RequestStartTransactionResponse {
                status,
                transaction_id,
                status_info: None,
                custom_data: None,
            },
        )
        .await
    }

    async fn request_stop_transaction(&mut self, call: Call) -> Result<(), OcppError> {
        let Some(request) = self.decode::<RequestStopTransactionRequest>(&call).await? else {
            return Ok(());
        };
        let status = self
            .client
            .session()
            .write()
            .await
            .stop_transaction(&request.transaction_id);
        self.respond(
            call.message_id,
            RequestStopTransactionResponse {
                status,
                status_info: None,
                custom_data: None,
            },
        )
        .await
    }

    async fn reserve_now(&mut self, call: Call) -> Result<(), OcppError> {
        let Some(request) = self.decode::<ReserveNowRequest>(&call).await? else {
            return Ok(());
        };
        let status = self.client.session().write().await.reserve(
            request.id,
            request.evse_id,
            request.id_token.id_token.clone(),
            request.expiry_date_time,
        );
        self.respond(
            call.message_id,
            ReserveNowResponse {
                status,
                status_info: None,
                custom_data: None,
            },
        )
        .await
    }

    async fn cancel_reservation(&mut self, call: Call) -> Result<(), OcppError> {
        let Some(request) = self.decode::<CancelReservationRequest>(&call).await? else {
            return Ok(());
        };
        let status = self
            .client
            .session()
            .write()
            .await
            .cancel_reservation(request.reservation_id);
        self.respond(
            call.message_id,
            CancelReservationResponse {
                status,
                status_info: None,
                custom_data: None,
            },
        )
        .await
    }

    async fn get_variables(&mut self, call: Call) -> Result<(), OcppError> {
        let Some(request) = self.decode::<GetVariablesRequest>(&call).await? else {
            return Ok(());
        };
        let results = request
            .get_variable_data
            .iter()
            .map(|data| self.model.get_variable(data))
            .collect();
        self.respond(
            call.message_id,
            GetVariablesResponse {
                get_variable_result: results,
                custom_data: None,
            },
        )
        .await
    }

    async fn set_variables(&mut self, call: Call) -> Result<(), OcppError> {
        let Some(request) = self.decode::<SetVariablesRequest>(&call).await? else {
            return Ok(());
        };
        let results = request
            .set_variable_data
            .iter()
            .map(|data| self.model.set_variable(data))
            .collect();
        self.respond(
            call.message_id,
            SetVariablesResponse {
                set_variable_result: results,
                custom_data: None,
            },
        )
        .await
    }

    async fn data_transfer(&mut self, call: Call) -> Result<(), OcppError> {
        let Some(request) = self.decode::<DataTransferRequest>(&call).await? else {
            return Ok(());
        };

        // Echo diagnostics for our own vendor id, reject everyone else.
        let response = if request.vendor_id == "com.elektrokombinacija" {
            DataTransferResponse {
                status: DataTransferStatus::Accepted,
                data: Some(json!({
                    "stationId": self.client.station_id(),
                    "echo": request.data,
                })),
                status_info: None,
                custom_data: None,
            }
        } else {
            warn!("DataTransfer from unknown vendor: {}", request.vendor_id);
            DataTransferResponse {
                status: DataTransferStatus::UnknownVendorId,
                data: None,
                status_info: None,
                custom_data: None,
            }
        };
        self.respond(call.message_id, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use ocpp_model::device_model::standard::default_model;
    use ocpp_model::enums::{
        ChangeAvailabilityStatus, GenericStatus, GetVariableStatus, ResetStatus, SetVariableStatus,
    };

    use crate::config::StationConfig;
    use crate::client::Connection;
    use crate::frame::Frame;
    use crate::signing::NoSigning;

    struct Harness {
        router: Router,
        outgoing: tokio::sync::mpsc::Receiver<Frame>,
    }

    // Wires a router to a client whose driver never runs, so replies can be
    // inspected straight off the outgoing channel.
    fn harness() -> Harness {
        let config = StationConfig::default().with_request_timeout(Duration::from_millis(50));
        let (connection, client, _incoming) = Connection::new(config, Arc::new(NoSigning));
        let outgoing = connection.into_outgoing_rx();
        Harness {
            router: Router::new(client, default_model("Elektrokombinacija", 300)),
            outgoing,
        }
    }

    fn call(action: Action, payload: serde_json::Value) -> Call {
        Call::with_payload(action, payload)
    }

    async fn reply(harness: &mut Harness) -> Frame {
        harness.outgoing.recv().await.unwrap()
    }

    fn result_payload(frame: Frame) -> serde_json::Value {
        match frame {
            Frame::CallResult(result) => result.payload,
            other => panic!("expected CallResult, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn reset_on_idle_station() {
        let mut harness = harness();
        harness
            .router
            .handle(call(Action::Reset, json!({"type": "OnIdle"})))
            .await
            .unwrap();

        let payload = result_payload(reply(&mut harness).await);
        let response: ResetResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(response.status, ResetStatus::Accepted);
    }

    #[tokio::test]
    async fn malformed_payload_answers_format_violation() {
        let mut harness = harness();
        harness
            .router
            .handle(call(Action::Reset, json!({"type": 42})))
            .await
            .unwrap();

        match reply(&mut harness).await {
            Frame::CallError(error) => {
                assert_eq!(error.error_code, crate::frame::RpcErrorCode::FormatViolation);
            }
            other => panic!("expected CallError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unhandled_action_answers_not_implemented() {
        let mut harness = harness();
        harness
            .router
            .handle(call(Action::Heartbeat, json!({})))
            .await
            .unwrap();

        match reply(&mut harness).await {
            Frame::CallError(error) => {
                assert_eq!(error.error_code, crate::frame::RpcErrorCode::NotImplemented);
            }
            other => panic!("expected CallError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn change_availability_station_wide() {
        let mut harness = harness();
        harness
            .router
            .handle(call(
                Action::ChangeAvailability,
                json!({"operationalStatus": "Inoperative"}),
            ))
            .await
            .unwrap();

        let payload = result_payload(reply(&mut harness).await);
        let response: ChangeAvailabilityResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(response.status, ChangeAvailabilityStatus::Accepted);
    }

    #[tokio::test]
    async fn remote_start_then_stop() {
        let mut harness = harness();
        harness
            .router
            .handle(call(
                Action::RequestStartTransaction,
                json!({
                    "idToken": {"idToken": "TAG-1", "type": "Central"},
                    "remoteStartId": 7,
                    "evseId": 1
                }),
            ))
            .await
            .unwrap();

        let payload = result_payload(reply(&mut harness).await);
        let response: RequestStartTransactionResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(response.status, GenericStatus::Accepted);
        let transaction_id = response.transaction_id.unwrap();

        harness
            .router
            .handle(call(
                Action::RequestStopTransaction,
                json!({"transactionId": transaction_id}),
            ))
            .await
            .unwrap();

        let payload = result_payload(reply(&mut harness).await);
        let response: RequestStopTransactionResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(response.status, GenericStatus::Accepted);
    }

    #[tokio::test]
    async fn get_variables_resolves_known_and_unknown() {
        let mut harness = harness();
        harness
            .router
            .handle(call(
                Action::GetVariables,
                json!({
                    "getVariableData": [
                        {
                            "component": {"name": "OCPPCommCtrlr"},
                            "variable": {"name": "HeartbeatInterval"}
                        },
                        {
                            "component": {"name": "NoSuchCtrlr"},
                            "variable": {"name": "Whatever"}
                        }
                    ]
                }),
            ))
            .await
            .unwrap();

        let payload = result_payload(reply(&mut harness).await);
        let response: GetVariablesResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(response.get_variable_result.len(), 2);
        assert_eq!(
            response.get_variable_result[0].attribute_status,
            GetVariableStatus::Accepted
        );
        assert_eq!(
            response.get_variable_result[1].attribute_status,
            GetVariableStatus::UnknownComponent
        );
    }

    #[tokio::test]
    async fn set_variables_rejects_read_only() {
        let mut harness = harness();
        harness
            .router
            .handle(call(
                Action::SetVariables,
                json!({
                    "setVariableData": [{
                        "component": {"name": "SecurityCtrlr"},
                        "variable": {"name": "SecurityProfile"},
                        "attributeValue": "3"
                    }]
                }),
            ))
            .await
            .unwrap();

        let payload = result_payload(reply(&mut harness).await);
        let response: SetVariablesResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(
            response.set_variable_result[0].attribute_status,
            SetVariableStatus::Rejected
        );
    }

    #[tokio::test]
    async fn unsigned_inbound_call_answers_security_error() {
        let config = StationConfig::default().with_request_timeout(Duration::from_millis(50));
        let (connection, client, _incoming) = Connection::new(
            config,
            Arc::new(crate::signing::StaticKeySigning::new("key-7", "ES256")),
        );
        let mut outgoing = connection.into_outgoing_rx();
        let mut router = Router::new(client, default_model("Elektrokombinacija", 300));

        router
            .handle(call(Action::Reset, json!({"type": "OnIdle"})))
            .await
            .unwrap();

        match outgoing.recv().await.unwrap() {
            Frame::CallError(error) => {
                assert_eq!(error.error_code, crate::frame::RpcErrorCode::SecurityError);
            }
            other => panic!("expected CallError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn data_transfer_unknown_vendor() {
        let mut harness = harness();
        harness
            .router
            .handle(call(
                Action::DataTransfer,
                json!({"vendorId": "com.someoneelse"}),
            ))
            .await
            .unwrap();

        let payload = result_payload(reply(&mut harness).await);
        let response: DataTransferResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(response.status, DataTransferStatus::UnknownVendorId);
    }
}
