//! Station session state machine
//!
//! Tracks the lifecycle of the connection to the CSMS (boot sequence,
//! registration, heartbeat cadence) and per-EVSE state: connector status,
//! operative flag, active transaction, reservation, and stacked charging
//! profiles. Handlers return the typed statuses the router sends back.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use ocpp_model::datatypes::{ChargingProfile, ChargingStationInfo};
use ocpp_model::enums::{
    ChangeAvailabilityStatus, ClearChargingProfileStatus, ConnectorStatus, GenericStatus,
    OperationalStatus, ReservationStatus, ResetStatus, ResetType,
};
use ocpp_model::messages::ClearChargingProfileCriterion;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Initial state, waiting to connect.
    Disconnected,
    /// Connected but not registered.
    Connected,
    /// BootNotification sent, awaiting response.
    BootPending,
    /// Registered with the CSMS.
    Registered,
    /// Registration rejected, will retry.
    Rejected,
}

/// Events driving the session lifecycle.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Connected,
    Disconnected,
    BootAccepted { interval: i32 },
    BootPending { interval: i32 },
    BootRejected,
    HeartbeatSent,
}

/// Per-EVSE state.
#[derive(Debug, Clone)]
pub struct EvseState {
    pub evse_id: i32,
    pub connector_id: i32,
    pub status: ConnectorStatus,
    /// False after ChangeAvailability(Inoperative).
    pub operative: bool,
    /// Availability change accepted as Scheduled, applied when the running
    /// transaction ends.
    pub pending_operative: Option<bool>,
    pub transaction: Option<TransactionState>,
    pub reservation: Option<ReservationState>,
    pub charging_profiles: Vec<ChargingProfile>,
}

impl EvseState {
    pub fn new(evse_id: i32, connector_id: i32) -> Self {
        Self {
            evse_id,
            connector_id,
            status: ConnectorStatus::Available,
            operative: true,
            pending_operative: None,
            transaction: None,
            reservation: None,
            charging_profiles: Vec::new(),
        }
    }

    /// Effective connector status, folding the operative flag in.
    pub fn effective_status(&self) -> ConnectorStatus {
        if self.operative {
            self.status
        } else {
            ConnectorStatus::Unavailable
        }
    }

    /// Power limit from the highest stacked profile, in kW.
    pub fn active_power_limit_kw(&self) -> Option<f64> {
        self.charging_profiles
            .iter()
            .max_by_key(|p| p.stack_level)?
            .first_limit_kw()
    }
}

/// Active transaction.
#[derive(Debug, Clone)]
pub struct TransactionState {
    pub transaction_id: String,
    pub remote_start_id: Option<i32>,
    pub id_token: String,
    pub started_at: DateTime<Utc>,
    pub seq_no: i32,
}

/// Active reservation.
#[derive(Debug, Clone)]
pub struct ReservationState {
    pub reservation_id: i32,
    pub id_token: String,
    pub expiry: DateTime<Utc>,
}

/// Session manager for one station.
#[derive(Debug)]
pub struct Session {
    pub station_id: String,
    pub vendor: String,
    pub model: String,
    pub serial_number: Option<String>,
    pub firmware_version: Option<String>,

    pub state: SessionState,
    pub registered_at: Option<DateTime<Utc>>,
    pub heartbeat_interval: i32,
    pub last_heartbeat: Option<DateTime<Utc>>,

    /// evse_id -> state
    pub evses: HashMap<i32, EvseState>,

    pending_reset: Option<ResetType>,
    last_boot_attempt: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(
        station_id: impl Into<String>,
        vendor: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            station_id: station_id.into(),
            vendor: vendor.into(),
            model: model.into(),
            serial_number: None,
            firmware_version: None,
            state: SessionState::Disconnected,
            registered_at: None,
            heartbeat_interval: 300,
            last_heartbeat: None,
            evses: HashMap::new(),
            pending_reset: None,
            last_boot_attempt: None,
        }
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    pub fn with_firmware(mut self, version: impl Into<String>) -> Self {
        self.firmware_version = Some(version.into());
        self
    }

    pub fn add_evse(&mut self, evse_id: i32, connector_id: i32) {
        self.evses.insert(evse_id, EvseState::new(evse_id, connector_id));
    }

    pub fn handle_event(&mut self, event: SessionEvent) {
        debug!("session event: {:?}", event);

        match event {
            SessionEvent::Connected => {
                self.state = SessionState::Connected;
                info!("session connected, will send BootNotification");
            }
            SessionEvent::Disconnected => {
                self.state = SessionState::Disconnected;
                self.registered_at = None;
                warn!("session disconnected");
            }
            SessionEvent::BootAccepted { interval } => {
                self.state = SessionState::Registered;
                self.registered_at = Some(Utc::now());
                if interval > 0 {
                    self.heartbeat_interval = interval;
                }
                info!("session registered, heartbeat interval: {}s", self.heartbeat_interval);
            }
            SessionEvent::BootPending { interval } => {
                self.state = SessionState::BootPending;
                self.last_boot_attempt = Some(Utc::now());
                if interval > 0 {
                    self.heartbeat_interval = interval;
                }
                info!("boot pending, will retry in {}s", interval);
            }
            SessionEvent::BootRejected => {
                self.state = SessionState::Rejected;
                self.last_boot_attempt = Some(Utc::now());
                warn!("boot rejected by CSMS");
            }
            SessionEvent::HeartbeatSent => {
                self.last_heartbeat = Some(Utc::now());
            }
        }
    }

    /// Records a Heartbeat leaving the station. Marked at send time so a
    /// reply slower than the due check cannot trigger a duplicate in-flight
    /// Heartbeat.
    pub fn mark_heartbeat_attempt(&mut self) {
        self.last_heartbeat = Some(Utc::now());
    }

    /// Records a BootNotification retry leaving the station.
    pub fn mark_boot_attempt(&mut self) {
        self.last_boot_attempt = Some(Utc::now());
    }

    /// Whether a heartbeat should be sent now.
    pub fn heartbeat_due(&self) -> bool {
        if self.state != SessionState::Registered {
            return false;
        }
        match self.last_heartbeat {
            None => true,
            Some(last) => {
                let elapsed = Utc::now().signed_duration_since(last);
                elapsed.num_seconds() >= self.heartbeat_interval as i64
            }
        }
    }

    /// Whether a BootNotification retry should be sent now. The CSMS-supplied
    /// interval doubles as the retry backoff while Pending or Rejected.
    pub fn boot_retry_due(&self) -> bool {
        if !matches!(self.state, SessionState::BootPending | SessionState::Rejected) {
            return false;
        }
        match self.last_boot_attempt {
            None => true,
            Some(last) => {
                let elapsed = Utc::now().signed_duration_since(last);
                elapsed.num_seconds() >= self.heartbeat_interval as i64
            }
        }
    }

    /// Station identity for BootNotification.
    pub fn charging_station_info(&self) -> ChargingStationInfo {
        ChargingStationInfo {
            model: self.model.clone(),
            vendor_name: self.vendor.clone(),
            serial_number: self.serial_number.clone(),
            firmware_version: self.firmware_version.clone(),
            custom_data: None,
        }
    }

    /// SetChargingProfile: install on one EVSE, or all when evse_id is 0.
    pub fn set_charging_profile(&mut self, evse_id: i32, profile: ChargingProfile) -> GenericStatus {
        if evse_id == 0 {
            for evse in self.evses.values_mut() {
                evse.charging_profiles.retain(|p| p.id != profile.id);
                evse.charging_profiles.push(profile.clone());
            }
            info!("set charging profile {} on all EVSEs", profile.id);
            return GenericStatus::Accepted;
        }

        if let Some(evse) = self.evses.get_mut(&evse_id) {
            evse.charging_profiles.retain(|p| p.id != profile.id);
            evse.charging_profiles.push(profile);
            info!(
                "set charging profile on EVSE {}, limit: {:?} kW",
                evse_id,
                evse.active_power_limit_kw()
            );
            GenericStatus::Accepted
        } else {
            warn!("unknown EVSE {}", evse_id);
            GenericStatus::Rejected
        }
    }

    /// ClearChargingProfile: by id or by criteria. `Unknown` means nothing
    /// matched.
    pub fn clear_charging_profile(
        &mut self,
        profile_id: Option<i32>,
        criteria: Option<&ClearChargingProfileCriterion>,
    ) -> ClearChargingProfileStatus {
        let mut removed = 0usize;

        for evse in self.evses.values_mut() {
            if let Some(filter) = criteria {
                if let Some(evse_id) = filter.evse_id {
                    if evse.evse_id != evse_id {
                        continue;
                    }
                }
            }
            let before = evse.charging_profiles.len();
            evse.charging_profiles.retain(|p| {
                if let Some(id) = profile_id {
                    if p.id != id {
                        return true;
                    }
                }
                if let Some(filter) = criteria {
                    if let Some(purpose) = filter.charging_profile_purpose {
                        if p.charging_profile_purpose != purpose {
                            return true;
                        }
                    }
                    if let Some(stack_level) = filter.stack_level {
                        if p.stack_level != stack_level {
                            return true;
                        }
                    }
                }
                false
            });
            removed += before - evse.charging_profiles.len();
        }

        if removed > 0 {
            info!("cleared {} charging profile(s)", removed);
            ClearChargingProfileStatus::Accepted
        } else {
            ClearChargingProfileStatus::Unknown
        }
    }

    /// RequestStartTransaction: picks an available EVSE when none is given.
    pub fn start_transaction(
        &mut self,
        evse_id: Option<i32>,
        id_token: String,
        remote_start_id: i32,
        transaction_id: String,
    ) -> (GenericStatus, Option<String>) {
        let evse_id = evse_id.or_else(|| {
            let mut candidates: Vec<_> = self
                .evses
                .values()
                .filter(|e| {
                    e.operative
                        && e.status == ConnectorStatus::Available
                        && e.transaction.is_none()
                })
                .map(|e| e.evse_id)
                .collect();
            candidates.sort_unstable();
            candidates.first().copied()
        });

        let Some(evse_id) = evse_id else {
            return (GenericStatus::Rejected, None);
        };
        let Some(evse) = self.evses.get_mut(&evse_id) else {
            return (GenericStatus::Rejected, None);
        };
        if !evse.operative || evse.transaction.is_some() {
            return (GenericStatus::Rejected, None);
        }

        evse.transaction = Some(TransactionState {
            transaction_id: transaction_id.clone(),
            remote_start_id: Some(remote_start_id),
            id_token: id_token.clone(),
            started_at: Utc::now(),
            seq_no: 0,
        });
        evse.status = ConnectorStatus::Occupied;
        evse.reservation = None;

        info!(
            "started transaction {} on EVSE {} for token {}",
            transaction_id, evse_id, id_token
        );
        (GenericStatus::Accepted, Some(transaction_id))
    }

    /// RequestStopTransaction.
    pub fn stop_transaction(&mut self, transaction_id: &str) -> GenericStatus {
        for evse in self.evses.values_mut() {
            if let Some(ref tx) = evse.transaction {
                if tx.transaction_id == transaction_id {
                    info!("stopped transaction {} on EVSE {}", transaction_id, evse.evse_id);
                    evse.transaction = None;
                    evse.status = ConnectorStatus::Available;
                    if let Some(operative) = evse.pending_operative.take() {
                        info!(
                            "applying scheduled availability change on EVSE {}",
                            evse.evse_id
                        );
                        evse.operative = operative;
                    }
                    return GenericStatus::Accepted;
                }
            }
        }
        warn!("transaction {} not found", transaction_id);
        GenericStatus::Rejected
    }

    /// ReserveNow.
    pub fn reserve(
        &mut self,
        reservation_id: i32,
        evse_id: Option<i32>,
        id_token: String,
        expiry: DateTime<Utc>,
    ) -> ReservationStatus {
        let evse_id = evse_id.or_else(|| {
            let mut candidates: Vec<_> = self
                .evses
                .values()
                .filter(|e| {
                    e.operative
                        && e.status == ConnectorStatus::Available
                        && e.reservation.is_none()
                })
                .map(|e| e.evse_id)
                .collect();
            candidates.sort_unstable();
            candidates.first().copied()
        });

        let Some(evse_id) = evse_id else {
            return ReservationStatus::Rejected;
        };
        let Some(evse) = self.evses.get_mut(&evse_id) else {
            return ReservationStatus::Rejected;
        };

        if !evse.operative {
            return ReservationStatus::Unavailable;
        }
        if evse.status == ConnectorStatus::Faulted {
            return ReservationStatus::Faulted;
        }
        if evse.status != ConnectorStatus::Available || evse.reservation.is_some() {
            return ReservationStatus::Occupied;
        }

        evse.reservation = Some(ReservationState {
            reservation_id,
            id_token: id_token.clone(),
            expiry,
        });
        evse.status = ConnectorStatus::Reserved;

        info!(
            "reserved EVSE {} for token {}, expires {}",
            evse_id, id_token, expiry
        );
        ReservationStatus::Accepted
    }

    /// CancelReservation.
    pub fn cancel_reservation(&mut self, reservation_id: i32) -> GenericStatus {
        for evse in self.evses.values_mut() {
            if let Some(ref res) = evse.reservation {
                if res.reservation_id == reservation_id {
                    info!("cancelled reservation {} on EVSE {}", reservation_id, evse.evse_id);
                    evse.reservation = None;
                    evse.status = ConnectorStatus::Available;
                    return GenericStatus::Accepted;
                }
            }
        }
        warn!("reservation {} not found", reservation_id);
        GenericStatus::Rejected
    }

    /// ChangeAvailability: whole station when evse_id is None. EVSEs with a
    /// running transaction accept the change as Scheduled.
    pub fn change_availability(
        &mut self,
        evse_id: Option<i32>,
        status: OperationalStatus,
    ) -> ChangeAvailabilityStatus {
        let operative = match status {
            OperationalStatus::Operative => true,
            OperationalStatus::Inoperative => false,
            OperationalStatus::Unknown => return ChangeAvailabilityStatus::Rejected,
        };

        let targets: Vec<i32> = match evse_id {
            Some(id) => {
                if !self.evses.contains_key(&id) {
                    warn!("unknown EVSE {}", id);
                    return ChangeAvailabilityStatus::Rejected;
                }
                vec![id]
            }
            None => self.evses.keys().copied().collect(),
        };

        let mut scheduled = false;
        for id in targets {
            let Some(evse) = self.evses.get_mut(&id) else {
                continue;
            };
            if evse.transaction.is_some() && !operative {
                // Applied once the transaction ends.
                evse.pending_operative = Some(operative);
                scheduled = true;
                continue;
            }
            evse.operative = operative;
            evse.pending_operative = None;
        }

        if scheduled {
            ChangeAvailabilityStatus::Scheduled
        } else {
            ChangeAvailabilityStatus::Accepted
        }
    }

    /// Reset: Immediate is rejected mid-transaction, OnIdle is scheduled.
    pub fn reset(&mut self, reset_type: ResetType) -> ResetStatus {
        let busy = self.evses.values().any(|e| e.transaction.is_some());
        match reset_type {
            ResetType::Immediate if busy => ResetStatus::Rejected,
            ResetType::Immediate => {
                self.pending_reset = Some(ResetType::Immediate);
                ResetStatus::Accepted
            }
            ResetType::OnIdle => {
                self.pending_reset = Some(ResetType::OnIdle);
                if busy {
                    ResetStatus::Scheduled
                } else {
                    ResetStatus::Accepted
                }
            }
            ResetType::Unknown => ResetStatus::Rejected,
        }
    }

    pub fn pending_reset(&self) -> Option<ResetType> {
        self.pending_reset
    }

    /// Effective status of all EVSEs, for StatusNotification.
    pub fn evse_statuses(&self) -> Vec<(i32, i32, ConnectorStatus)> {
        let mut statuses: Vec<_> = self
            .evses
            .values()
            .map(|e| (e.evse_id, e.connector_id, e.effective_status()))
            .collect();
        statuses.sort_unstable_by_key(|(id, _, _)| *id);
        statuses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocpp_model::enums::{ChargingProfileKind, ChargingProfilePurpose, ChargingRateUnit};

    fn session() -> Session {
        let mut session = Session::new("CS001", "Elektrokombinacija", "EK3-OCPP");
        session.add_evse(1, 1);
        session
    }

    fn profile(id: i32, stack_level: i32, limit_w: f64) -> ChargingProfile {
        ChargingProfile::new(
            id,
            stack_level,
            ChargingProfilePurpose::TxDefaultProfile,
            ChargingProfileKind::Absolute,
            vec![ocpp_model::datatypes::ChargingSchedule {
                id: 1,
                charging_rate_unit: ChargingRateUnit::W,
                charging_schedule_period: vec![ocpp_model::datatypes::ChargingSchedulePeriod {
                    start_period: 0,
                    limit: limit_w,
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
        .unwrap()
    }

    #[test]
    fn boot_lifecycle() {
        let mut session = session();
        assert_eq!(session.state, SessionState::Disconnected);

        session.handle_event(SessionEvent::Connected);
        assert_eq!(session.state, SessionState::Connected);

        session.handle_event(SessionEvent::BootAccepted { interval: 60 });
        assert_eq!(session.state, SessionState::Registered);
        assert_eq!(session.heartbeat_interval, 60);
        assert!(session.heartbeat_due());

        session.handle_event(SessionEvent::HeartbeatSent);
        assert!(!session.heartbeat_due());
    }

    #[test]
    fn heartbeat_attempt_suppresses_next_due_check() {
        let mut session = session();
        session.handle_event(SessionEvent::Connected);
        session.handle_event(SessionEvent::BootAccepted { interval: 60 });
        assert!(session.heartbeat_due());

        // Marked at send time: a pending reply must not look due again.
        session.mark_heartbeat_attempt();
        assert!(!session.heartbeat_due());
    }

    #[test]
    fn boot_attempt_suppresses_next_retry_check() {
        let mut session = session();
        session.handle_event(SessionEvent::Connected);
        session.handle_event(SessionEvent::BootRejected);
        session.last_boot_attempt = None;
        assert!(session.boot_retry_due());

        session.mark_boot_attempt();
        assert!(!session.boot_retry_due());
    }

    #[test]
    fn boot_retry_backoff() {
        let mut session = session();
        session.handle_event(SessionEvent::Connected);
        assert!(!session.boot_retry_due());

        session.handle_event(SessionEvent::BootPending { interval: 60 });
        // Just attempted, so the retry interval has not elapsed yet.
        assert!(!session.boot_retry_due());
        assert_eq!(session.state, SessionState::BootPending);
    }

    #[test]
    fn transaction_lifecycle() {
        let mut session = session();
        let (status, tx_id) =
            session.start_transaction(Some(1), "TOKEN123".into(), 1, "tx-1".into());
        assert_eq!(status, GenericStatus::Accepted);
        assert_eq!(tx_id.as_deref(), Some("tx-1"));
        assert_eq!(session.evses[&1].status, ConnectorStatus::Occupied);

        // Second start on the same EVSE is rejected.
        let (status, _) = session.start_transaction(Some(1), "OTHER".into(), 2, "tx-2".into());
        assert_eq!(status, GenericStatus::Rejected);

        assert_eq!(session.stop_transaction("tx-1"), GenericStatus::Accepted);
        assert_eq!(session.evses[&1].status, ConnectorStatus::Available);
        assert_eq!(session.stop_transaction("tx-1"), GenericStatus::Rejected);
    }

    #[test]
    fn profile_stacking_takes_highest_level() {
        let mut session = session();
        assert_eq!(
            session.set_charging_profile(1, profile(1, 0, 22000.0)),
            GenericStatus::Accepted
        );
        assert_eq!(
            session.set_charging_profile(1, profile(2, 5, 7000.0)),
            GenericStatus::Accepted
        );
        assert_eq!(session.evses[&1].active_power_limit_kw(), Some(7.0));
    }

    #[test]
    fn clear_charging_profile_by_id() {
        let mut session = session();
        session.set_charging_profile(1, profile(4, 0, 11000.0));

        assert_eq!(
            session.clear_charging_profile(Some(4), None),
            ClearChargingProfileStatus::Accepted
        );
        assert_eq!(
            session.clear_charging_profile(Some(4), None),
            ClearChargingProfileStatus::Unknown
        );
    }

    #[test]
    fn reservation_flow() {
        let mut session = session();
        let expiry = Utc::now() + chrono::Duration::hours(1);

        assert_eq!(
            session.reserve(9, Some(1), "RES-TOKEN".into(), expiry),
            ReservationStatus::Accepted
        );
        assert_eq!(session.evses[&1].status, ConnectorStatus::Reserved);

        // Already reserved.
        assert_eq!(
            session.reserve(10, Some(1), "OTHER".into(), expiry),
            ReservationStatus::Occupied
        );

        assert_eq!(session.cancel_reservation(9), GenericStatus::Accepted);
        assert_eq!(session.cancel_reservation(9), GenericStatus::Rejected);
    }

    #[test]
    fn change_availability_scheduled_during_transaction() {
        let mut session = session();
        session.start_transaction(Some(1), "T".into(), 1, "tx-1".into());

        assert_eq!(
            session.change_availability(Some(1), OperationalStatus::Inoperative),
            ChangeAvailabilityStatus::Scheduled
        );
        // Still operative until the transaction ends.
        assert!(session.evses[&1].operative);

        // Ending the transaction applies the scheduled change.
        session.stop_transaction("tx-1");
        assert!(!session.evses[&1].operative);
        assert_eq!(session.evses[&1].effective_status(), ConnectorStatus::Unavailable);
    }

    #[test]
    fn operative_change_clears_scheduled_inoperative() {
        let mut session = session();
        session.start_transaction(Some(1), "T".into(), 1, "tx-1".into());
        session.change_availability(Some(1), OperationalStatus::Inoperative);

        // The CSMS changes its mind before the transaction ends.
        assert_eq!(
            session.change_availability(Some(1), OperationalStatus::Operative),
            ChangeAvailabilityStatus::Accepted
        );
        session.stop_transaction("tx-1");
        assert!(session.evses[&1].operative);
    }

    #[test]
    fn reset_respects_running_transaction() {
        let mut session = session();
        session.start_transaction(Some(1), "T".into(), 1, "tx-1".into());

        assert_eq!(session.reset(ResetType::Immediate), ResetStatus::Rejected);
        assert_eq!(session.reset(ResetType::OnIdle), ResetStatus::Scheduled);
        assert_eq!(session.pending_reset(), Some(ResetType::OnIdle));

        session.stop_transaction("tx-1");
        assert_eq!(session.reset(ResetType::Immediate), ResetStatus::Accepted);
    }

    #[test]
    fn inoperative_evse_rejects_start() {
        let mut session = session();
        session.change_availability(Some(1), OperationalStatus::Inoperative);
        let (status, _) = session.start_transaction(None, "T".into(), 1, "tx-1".into());
        assert_eq!(status, GenericStatus::Rejected);
    }
}
