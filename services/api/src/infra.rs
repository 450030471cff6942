use dealer_crm::workflows::leads::{
    AssignmentStage, LeadId, LeadRecord, LeadRepository, ManagerNotification, NotificationError,
    NotificationPublisher, RepositoryError, RosterRepository, SalespersonId, SalespersonLoad,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store poisoned".to_string()))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryLeadRepository {
    records: Arc<Mutex<BTreeMap<LeadId, LeadRecord>>>,
}

impl LeadRepository for InMemoryLeadRepository {
    fn insert(&self, record: LeadRecord) -> Result<LeadRecord, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&record.lead.lead_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.lead.lead_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: LeadRecord) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&record.lead.lead_id) {
            guard.insert(record.lead.lead_id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard.get(id).cloned())
    }

    fn pending(&self, limit: usize) -> Result<Vec<LeadRecord>, RepositoryError> {
        let guard = lock(&self.records)?;
        let mut pending: Vec<LeadRecord> = guard
            .values()
            .filter(|record| record.assignment.stage() == AssignmentStage::NoGuardPending)
            .cloned()
            .collect();
        pending.sort_by_key(|record| record.lead.captured_at);
        pending.truncate(limit);
        Ok(pending)
    }
}

/// Roster whose load counters are only ever incremented through a compare-and-set.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRosterRepository {
    members: Arc<Mutex<Vec<SalespersonLoad>>>,
}

impl RosterRepository for InMemoryRosterRepository {
    fn roster(&self) -> Result<Vec<SalespersonLoad>, RepositoryError> {
        Ok(lock(&self.members)?.clone())
    }

    fn replace_roster(&self, roster: Vec<SalespersonLoad>) -> Result<(), RepositoryError> {
        *lock(&self.members)? = roster;
        Ok(())
    }

    fn apply_assignment(
        &self,
        salesperson_id: &SalespersonId,
        expected_load: u32,
    ) -> Result<SalespersonLoad, RepositoryError> {
        let mut guard = lock(&self.members)?;
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

        member.current_load = member.current_load.saturating_add(1);
        Ok(member.clone())
    }

    fn release_assignment(
        &self,
        salesperson_id: &SalespersonId,
    ) -> Result<SalespersonLoad, RepositoryError> {
        let mut guard = lock(&self.members)?;
        let member = guard
            .iter_mut()
            .find(|member| &member.salesperson_id == salesperson_id)
            .ok_or(RepositoryError::NotFound)?;
        member.current_load = member.current_load.saturating_sub(1);
        Ok(member.clone())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationPublisher {
    events: Arc<Mutex<Vec<ManagerNotification>>>,
}

impl NotificationPublisher for InMemoryNotificationPublisher {
    fn publish(&self, notification: ManagerNotification) -> Result<(), NotificationError> {
        let mut guard = self
            .events
            .lock()
            .map_err(|_| NotificationError::Transport("notification log poisoned".to_string()))?;
        guard.push(notification);
        Ok(())
    }
}

impl InMemoryNotificationPublisher {
    pub(crate) fn events(&self) -> Vec<ManagerNotification> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

/// Parses `ID=VALUE` pairs given on the command line.
pub(crate) fn parse_rating(raw: &str) -> Result<(i64, i64), String> {
    let (id, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected PILLAR=RATING, got '{raw}'"))?;
    let id = id
        .trim()
        .parse::<i64>()
        .map_err(|err| format!("invalid pillar id '{id}' ({err})"))?;
    let value = value
        .trim()
        .parse::<i64>()
        .map_err(|err| format!("invalid rating '{value}' ({err})"))?;
    Ok((id, value))
}
