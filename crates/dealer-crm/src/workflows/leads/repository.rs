use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::assignment::{
    AssignmentRequest, AssignmentStage, LeadAssignmentFlow, SalespersonId, SalespersonLoad,
};
use super::domain::{CapturedLead, LeadId};
use super::scoring::{ProspectScore, RatingSheet, Tier};

/// Repository record holding the lead, its assignment trail and saved ratings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadRecord {
    pub lead: CapturedLead,
    /// Latest assignment request, replayed when a pending lead is retried.
    #[serde(default)]
    pub request: AssignmentRequest,
    pub assignment: LeadAssignmentFlow,
    pub ratings: Option<RatingSheet>,
    pub score: Option<ProspectScore>,
}

impl LeadRecord {
    pub fn new(lead: CapturedLead, request: AssignmentRequest) -> Self {
        Self {
            lead,
            request,
            assignment: LeadAssignmentFlow::captured(),
            ratings: None,
            score: None,
        }
    }

    pub fn status_label(&self) -> &'static str {
        match self.assignment.stage() {
            AssignmentStage::ImbalanceDetected => "awaiting_override",
            stage => stage.label(),
        }
    }

    pub fn assignment_rationale(&self) -> String {
        if let Some(decision) = self.assignment.decision() {
            return decision.summary();
        }
        if let Some(report) = self.assignment.imbalance() {
            return report.summary();
        }
        match self.assignment.stage() {
            AssignmentStage::NoGuardPending => "no salesperson on duty yet".to_string(),
            _ => "awaiting assignment".to_string(),
        }
    }

    pub fn status_view(&self) -> LeadStatusView {
        LeadStatusView {
            lead_id: self.lead.lead_id.clone(),
            status: self.status_label(),
            assignee: self.assignment.assignee().cloned(),
            assignment_rationale: self.assignment_rationale(),
            score: self.score.as_ref().map(|score| score.score),
            tier: self.score.as_ref().map(|score| score.tier),
        }
    }
}

/// Lead storage so the service can be exercised without a database.
pub trait LeadRepository: Send + Sync {
    fn insert(&self, record: LeadRecord) -> Result<LeadRecord, RepositoryError>;
    fn update(&self, record: LeadRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError>;
    /// Leads captured while no salesperson was on duty, oldest first.
    fn pending(&self, limit: usize) -> Result<Vec<LeadRecord>, RepositoryError>;
}

/// Owner of the guard-duty roster and of the shared load counters.
pub trait RosterRepository: Send + Sync {
    fn roster(&self) -> Result<Vec<SalespersonLoad>, RepositoryError>;
    fn replace_roster(&self, roster: Vec<SalespersonLoad>) -> Result<(), RepositoryError>;
    /// Increments the load only if it still equals `expected_load`, so two captures
    /// deciding on the same snapshot cannot both win.
    fn apply_assignment(
        &self,
        salesperson_id: &SalespersonId,
        expected_load: u32,
    ) -> Result<SalespersonLoad, RepositoryError>;
    /// Takes back one applied increment after the lead it was for failed to persist.
    fn release_assignment(
        &self,
        salesperson_id: &SalespersonId,
    ) -> Result<SalespersonLoad, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("load for {salesperson_id} changed (expected {expected}, found {found})")]
    StaleLoad {
        salesperson_id: SalespersonId,
        expected: u32,
        found: u32,
    },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook surfacing assignment outcomes to a sales manager.
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notification: ManagerNotification) -> Result<(), NotificationError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerNotification {
    pub template: String,
    pub lead_id: LeadId,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Public representation of a lead's progress.
#[derive(Debug, Clone, Serialize)]
pub struct LeadStatusView {
    pub lead_id: LeadId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<SalespersonId>,
    pub assignment_rationale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
}
