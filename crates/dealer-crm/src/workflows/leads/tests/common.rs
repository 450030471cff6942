use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::leads::assignment::{
    AssignmentStage, BalancerConfig, SalespersonId, SalespersonLoad,
};
use crate::workflows::leads::domain::{CaptureChannel, LeadCapture, LeadId};
use crate::workflows::leads::repository::{
    LeadRecord, LeadRepository, ManagerNotification, NotificationError, NotificationPublisher,
    RepositoryError, RosterRepository,
};
use crate::workflows::leads::scoring::{RawRatings, PILLARS};
use crate::workflows::leads::{lead_router, LeadDeskService};

pub(super) fn member(id: &str, current_load: u32, daily_target: u32) -> SalespersonLoad {
    SalespersonLoad {
        salesperson_id: SalespersonId::new(id),
        name: format!("Salesperson {id}"),
        current_load,
        daily_target,
        on_duty: true,
    }
}

/// Three on-duty salespeople: alice 10/20, bruno 20/20, chloe 15/20.
pub(super) fn sample_roster() -> Vec<SalespersonLoad> {
    vec![
        member("alice", 10, 20),
        member("bruno", 20, 20),
        member("chloe", 15, 20),
    ]
}

pub(super) fn balanced_roster() -> Vec<SalespersonLoad> {
    vec![
        member("alice", 4, 12),
        member("bruno", 5, 12),
        member("chloe", 6, 12),
    ]
}

pub(super) fn uniform_ratings(value: i64) -> RawRatings {
    PILLARS
        .iter()
        .map(|pillar| (i64::from(pillar.id), value))
        .collect()
}

pub(super) fn capture() -> LeadCapture {
    LeadCapture {
        channel: CaptureChannel::Showroom,
        prospect_name: "Camille Renaud".to_string(),
        contact: "+33 6 12 34 56 78".to_string(),
        vehicle_interest: Some("Compact SUV, hybrid".to_string()),
        notes: Some("Lease ends in March".to_string()),
        requested_salesperson: None,
        force: false,
    }
}

pub(super) fn requested_capture(salesperson: &str, force: bool) -> LeadCapture {
    LeadCapture {
        requested_salesperson: Some(SalespersonId::new(salesperson)),
        force,
        ..capture()
    }
}

pub(super) type TestService = LeadDeskService<MemoryLeads, MemoryRoster, MemoryNotifications>;

pub(super) fn build_service(
    roster: Vec<SalespersonLoad>,
) -> (
    TestService,
    Arc<MemoryLeads>,
    Arc<MemoryRoster>,
    Arc<MemoryNotifications>,
) {
    let leads = Arc::new(MemoryLeads::default());
    let roster = Arc::new(MemoryRoster::with_members(roster));
    let notifications = Arc::new(MemoryNotifications::default());
    let service = LeadDeskService::new(
        leads.clone(),
        roster.clone(),
        notifications.clone(),
        BalancerConfig::default(),
    );
    (service, leads, roster, notifications)
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    lead_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryLeads {
    records: Arc<Mutex<BTreeMap<LeadId, LeadRecord>>>,
}

impl LeadRepository for MemoryLeads {
    fn insert(&self, record: LeadRecord) -> Result<LeadRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("lead mutex poisoned");
        if guard.contains_key(&record.lead.lead_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.lead.lead_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: LeadRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("lead mutex poisoned");
        guard.insert(record.lead.lead_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError> {
        let guard = self.records.lock().expect("lead mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn pending(&self, limit: usize) -> Result<Vec<LeadRecord>, RepositoryError> {
        let guard = self.records.lock().expect("lead mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.assignment.stage() == AssignmentStage::NoGuardPending)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRoster {
    members: Arc<Mutex<Vec<SalespersonLoad>>>,
}

impl MemoryRoster {
    pub(super) fn with_members(members: Vec<SalespersonLoad>) -> Self {
        Self {
            members: Arc::new(Mutex::new(members)),
        }
    }

    pub(super) fn load_of(&self, id: &str) -> Option<u32> {
        self.members
            .lock()
            .expect("roster mutex poisoned")
            .iter()
            .find(|member| member.salesperson_id.0 == id)
            .map(|member| member.current_load)
    }

    pub(super) fn bump(&self, id: &str) {
        let mut guard = self.members.lock().expect("roster mutex poisoned");
        if let Some(member) = guard.iter_mut().find(|member| member.salesperson_id.0 == id) {
            member.current_load += 1;
        }
    }
}

impl RosterRepository for MemoryRoster {
    fn roster(&self) -> Result<Vec<SalespersonLoad>, RepositoryError> {
        Ok(self.members.lock().expect("roster mutex poisoned").clone())
    }

    fn replace_roster(&self, roster: Vec<SalespersonLoad>) -> Result<(), RepositoryError> {
        *self.members.lock().expect("roster mutex poisoned") = roster;
        Ok(())
    }

    fn apply_assignment(
        &self,
        salesperson_id: &SalespersonId,
        expected_load: u32,
    ) -> Result<SalespersonLoad, RepositoryError> {
        let mut guard = self.members.lock().expect("roster mutex poisoned");
        let member = guard
            .iter_mut()
            .find(|member| &member.salesperson_id == salesperson_id)
            .ok_or(RepositoryError::NotFound)?;
        if member.current_load != expected_load {
            return Err(RepositoryError::StaleLoad {
                salesperson_id: salesperson_id.clone(),
                expected: expected_load,
                found: member.current_load,
            });
        }
        member.current_load += 1;
        Ok(member.clone())
    }

    fn release_assignment(
        &self,
        salesperson_id: &SalespersonId,
    ) -> Result<SalespersonLoad, RepositoryError> {
        let mut guard = self.members.lock().expect("roster mutex poisoned");
        let member = guard
            .iter_mut()
            .find(|member| &member.salesperson_id == salesperson_id)
            .ok_or(RepositoryError::NotFound)?;
        member.current_load -= 1;
        Ok(member.clone())
    }
}

/// Simulates a concurrent capture landing on `target` right before the first increment.
pub(super) struct RacingRoster {
    pub(super) inner: MemoryRoster,
    pub(super) target: String,
    raced: AtomicBool,
}

impl RacingRoster {
    pub(super) fn new(inner: MemoryRoster, target: &str) -> Self {
        Self {
            inner,
            target: target.to_string(),
            raced: AtomicBool::new(false),
        }
    }
}

impl RosterRepository for RacingRoster {
    fn roster(&self) -> Result<Vec<SalespersonLoad>, RepositoryError> {
        self.inner.roster()
    }

    fn replace_roster(&self, roster: Vec<SalespersonLoad>) -> Result<(), RepositoryError> {
        self.inner.replace_roster(roster)
    }

    fn apply_assignment(
        &self,
        salesperson_id: &SalespersonId,
        expected_load: u32,
    ) -> Result<SalespersonLoad, RepositoryError> {
        if !self.raced.swap(true, Ordering::SeqCst) {
            self.inner.bump(&self.target);
        }
        self.inner.apply_assignment(salesperson_id, expected_load)
    }

    fn release_assignment(
        &self,
        salesperson_id: &SalespersonId,
    ) -> Result<SalespersonLoad, RepositoryError> {
        self.inner.release_assignment(salesperson_id)
    }
}

pub(super) struct UnavailableRoster;

impl RosterRepository for UnavailableRoster {
    fn roster(&self) -> Result<Vec<SalespersonLoad>, RepositoryError> {
        Err(RepositoryError::Unavailable("roster service offline".to_string()))
    }

    fn replace_roster(&self, _roster: Vec<SalespersonLoad>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("roster service offline".to_string()))
    }

    fn apply_assignment(
        &self,
        _salesperson_id: &SalespersonId,
        _expected_load: u32,
    ) -> Result<SalespersonLoad, RepositoryError> {
        Err(RepositoryError::Unavailable("roster service offline".to_string()))
    }

    fn release_assignment(
        &self,
        _salesperson_id: &SalespersonId,
    ) -> Result<SalespersonLoad, RepositoryError> {
        Err(RepositoryError::Unavailable("roster service offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifications {
    events: Arc<Mutex<Vec<ManagerNotification>>>,
}

impl MemoryNotifications {
    pub(super) fn events(&self) -> Vec<ManagerNotification> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .clone()
    }

    pub(super) fn templates(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .map(|event| event.template)
            .collect()
    }
}

/// Lead store whose writes always fail.
pub(super) struct ReadOnlyLeads;

impl LeadRepository for ReadOnlyLeads {
    fn insert(&self, _record: LeadRecord) -> Result<LeadRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("lead store read-only".to_string()))
    }

    fn update(&self, _record: LeadRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("lead store read-only".to_string()))
    }

    fn fetch(&self, _id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError> {
        Ok(None)
    }

    fn pending(&self, _limit: usize) -> Result<Vec<LeadRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct OfflineNotifications;

impl NotificationPublisher for OfflineNotifications {
    fn publish(&self, _notification: ManagerNotification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("mail relay down".to_string()))
    }
}

impl NotificationPublisher for MemoryNotifications {
    fn publish(&self, notification: ManagerNotification) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
