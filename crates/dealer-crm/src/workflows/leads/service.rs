use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::assignment::{
    validate_roster, AssignmentRequest, AssignmentStage, BalancerConfig, FlowError,
    LeadAssignmentFlow, LoadBalancer, LoadSnapshot, RecommendationOutcome, SalespersonId,
    SalespersonLoad,
};
use super::domain::{CapturedLead, LeadCapture, LeadId};
use super::repository::{
    LeadRecord, LeadRepository, ManagerNotification, NotificationPublisher, RepositoryError,
    RosterRepository,
};
use super::scoring::{PillarScorer, ProspectScore, RatingSheet, RawRatings};
use super::validation::ValidationError;

/// Re-decisions allowed when another capture wins the load increment first.
const MAX_ASSIGNMENT_ATTEMPTS: usize = 3;

/// Service composing the scorer, the balancer and the storage/notification collaborators.
pub struct LeadDeskService<L, R, N> {
    leads: Arc<L>,
    roster: Arc<R>,
    notifications: Arc<N>,
    scorer: Arc<PillarScorer>,
    balancer: Arc<LoadBalancer>,
}

static LEAD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_lead_id() -> LeadId {
    let id = LEAD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    LeadId(format!("lead-{id:06}"))
}

impl<L, R, N> LeadDeskService<L, R, N>
where
    L: LeadRepository + 'static,
    R: RosterRepository + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(leads: Arc<L>, roster: Arc<R>, notifications: Arc<N>, config: BalancerConfig) -> Self {
        Self::with_scorer(leads, roster, notifications, config, PillarScorer::default())
    }

    pub fn with_scorer(
        leads: Arc<L>,
        roster: Arc<R>,
        notifications: Arc<N>,
        config: BalancerConfig,
        scorer: PillarScorer,
    ) -> Self {
        Self {
            leads,
            roster,
            notifications,
            scorer: Arc::new(scorer),
            balancer: Arc::new(LoadBalancer::new(config)),
        }
    }

    pub fn scorer(&self) -> &PillarScorer {
        &self.scorer
    }

    pub fn balancer(&self) -> &LoadBalancer {
        &self.balancer
    }

    /// Record a new lead and route it to a salesperson when one is on duty.
    pub fn capture(&self, capture: LeadCapture) -> Result<LeadRecord, LeadDeskError> {
        capture.validate()?;
        let request = capture.assignment_request();
        let lead = CapturedLead::from_capture(next_lead_id(), capture, Utc::now());
        let mut record = LeadRecord::new(lead, request);

        record.assignment = self.advance(record.assignment.clone(), &record.request)?;
        let stored = self.persist(record, |record| self.leads.insert(record).map(|_| ()))?;
        self.notify(&stored);
        Ok(stored)
    }

    /// Assign an open lead to a chosen salesperson, optionally overriding the balance check.
    pub fn assign(
        &self,
        lead_id: &LeadId,
        salesperson_id: SalespersonId,
        force: bool,
    ) -> Result<LeadRecord, LeadDeskError> {
        let mut record = self.get(lead_id)?;
        let request = AssignmentRequest::Manual {
            salesperson_id,
            force,
        };

        record.assignment = self.advance(record.assignment.clone(), &request)?;
        record.request = request;
        let stored = self.persist(record, |record| self.leads.update(record))?;
        self.notify(&stored);
        Ok(stored)
    }

    /// Re-submit leads captured while nobody was on duty, replaying each lead's own
    /// request. Leads that stay pending are returned unchanged and not re-notified.
    pub fn retry_pending(&self, limit: usize) -> Result<Vec<LeadRecord>, LeadDeskError> {
        let pending = self.leads.pending(limit)?;
        let mut processed = Vec::with_capacity(pending.len());

        for mut record in pending {
            let flow = match self.advance(record.assignment.clone(), &record.request) {
                Err(LeadDeskError::Flow(FlowError::Validation(reason)))
                    if record.request != AssignmentRequest::Recommended =>
                {
                    warn!(lead_id = %record.lead.lead_id, error = %reason, "requested salesperson unavailable, using the recommendation");
                    record.request = AssignmentRequest::Recommended;
                    self.advance(record.assignment.clone(), &record.request)?
                }
                other => other?,
            };
            if flow.stage() == AssignmentStage::NoGuardPending {
                processed.push(record);
                continue;
            }

            record.assignment = flow;
            let stored = self.persist(record, |record| self.leads.update(record))?;
            self.notify(&stored);
            processed.push(stored);
        }

        debug!(count = processed.len(), "pending leads re-evaluated");
        Ok(processed)
    }

    /// Save a prospect's pillar ratings together with the score they produce.
    pub fn rate(&self, lead_id: &LeadId, ratings: &RawRatings) -> Result<LeadRecord, LeadDeskError> {
        let sheet = RatingSheet::from_raw(ratings)?;
        let mut record = self.get(lead_id)?;

        let score = self.scorer.score(&sheet);
        debug!(lead_id = %lead_id, score = score.score, tier = score.tier.label(), "prospect scored");

        record.ratings = Some(sheet);
        record.score = Some(score);
        self.leads.update(record.clone())?;
        Ok(record)
    }

    /// Score ratings without touching storage.
    pub fn preview_score(&self, ratings: &RawRatings) -> Result<ProspectScore, ValidationError> {
        self.scorer.compute_score(ratings)
    }

    pub fn get(&self, lead_id: &LeadId) -> Result<LeadRecord, LeadDeskError> {
        self.leads
            .fetch(lead_id)?
            .ok_or_else(|| LeadDeskError::LeadNotFound(lead_id.clone()))
    }

    pub fn roster_overview(&self) -> Result<RosterOverview, LeadDeskError> {
        let roster = self.roster.roster()?;
        let recommendation = self.balancer.recommend(&roster)?;
        Ok(RosterOverview {
            members: roster.iter().map(SalespersonLoad::snapshot).collect(),
            on_duty: roster.iter().filter(|member| member.on_duty).count(),
            imbalance_threshold: self.balancer.config().imbalance_threshold,
            recommendation,
        })
    }

    /// Install the day's guard-duty roster.
    pub fn replace_roster(
        &self,
        roster: Vec<SalespersonLoad>,
    ) -> Result<RosterOverview, LeadDeskError> {
        validate_roster(&roster)?;
        let on_duty = roster.iter().filter(|member| member.on_duty).count();
        self.roster.replace_roster(roster)?;
        info!(on_duty, "guard-duty roster replaced");
        self.roster_overview()
    }

    fn advance(
        &self,
        flow: LeadAssignmentFlow,
        request: &AssignmentRequest,
    ) -> Result<LeadAssignmentFlow, LeadDeskError> {
        let mut last_conflict = None;

        for attempt in 1..=MAX_ASSIGNMENT_ATTEMPTS {
            let roster = self.roster.roster()?;
            let evaluated = flow.clone().evaluate(&self.balancer, &roster, request)?;

            let Some((selected, previous_load)) = evaluated
                .decision()
                .map(|decision| (decision.selected.clone(), decision.previous_load))
            else {
                return Ok(evaluated);
            };

            match self.roster.apply_assignment(&selected, previous_load) {
                Ok(_) => return Ok(evaluated.finalize()?),
                Err(conflict @ RepositoryError::StaleLoad { .. }) => {
                    warn!(attempt, error = %conflict, "load changed during assignment, re-deciding");
                    last_conflict = Some(conflict);
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(last_conflict
            .unwrap_or_else(|| RepositoryError::Unavailable("assignment not applied".to_string()))
            .into())
    }

    /// Writes the record and hands back the load increment `advance` applied when the
    /// write fails, so a lead that was never stored does not count against anyone.
    fn persist<F>(&self, record: LeadRecord, write: F) -> Result<LeadRecord, LeadDeskError>
    where
        F: FnOnce(LeadRecord) -> Result<(), RepositoryError>,
    {
        let applied = record.assignment.assignee().cloned();

        if let Err(failure) = write(record.clone()) {
            if let Some(salesperson_id) = applied {
                match self.roster.release_assignment(&salesperson_id) {
                    Ok(member) => warn!(
                        lead_id = %record.lead.lead_id,
                        salesperson = %salesperson_id,
                        load = member.current_load,
                        "lead not stored, load increment released"
                    ),
                    Err(release) => tracing::error!(
                        lead_id = %record.lead.lead_id,
                        salesperson = %salesperson_id,
                        error = %release,
                        "lead not stored and load increment could not be released"
                    ),
                }
            }
            return Err(failure.into());
        }

        Ok(record)
    }

    /// Best effort: the lead is already stored, so a failed publish is only logged.
    fn notify(&self, record: &LeadRecord) {
        let lead_id = &record.lead.lead_id;
        let mut details = BTreeMap::new();
        details.insert("channel".to_string(), record.lead.channel.label().to_string());
        details.insert("prospect".to_string(), record.lead.prospect_name.clone());

        let template = match record.assignment.stage() {
            AssignmentStage::NoGuardPending => {
                warn!(lead_id = %lead_id, "lead captured with no salesperson on duty");
                "no_guard_defined"
            }
            AssignmentStage::ImbalanceDetected => {
                if let Some(report) = record.assignment.imbalance() {
                    warn!(lead_id = %lead_id, chosen = %report.chosen, difference = report.difference_after, "manual assignment would unbalance the roster");
                    details.insert("chosen".to_string(), report.chosen.to_string());
                    details.insert(
                        "alternative".to_string(),
                        report.alternative.salesperson_id.to_string(),
                    );
                }
                "imbalance_detected"
            }
            AssignmentStage::AssignedFinal => {
                if let Some(assignee) = record.assignment.assignee() {
                    info!(lead_id = %lead_id, assignee = %assignee, "lead assigned");
                    details.insert("assignee".to_string(), assignee.to_string());
                }
                "lead_assigned"
            }
            _ => return,
        };

        if let Err(failure) = self.notifications.publish(ManagerNotification {
            template: template.to_string(),
            lead_id: lead_id.clone(),
            details,
        }) {
            warn!(lead_id = %lead_id, template, error = %failure, "manager notification not delivered");
        }
    }
}

/// Roster as shown on the sales-manager dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct RosterOverview {
    pub members: Vec<LoadSnapshot>,
    pub on_duty: usize,
    pub imbalance_threshold: u32,
    pub recommendation: RecommendationOutcome,
}

/// Error raised by the lead desk service.
#[derive(Debug, thiserror::Error)]
pub enum LeadDeskError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error("lead {0} not found")]
    LeadNotFound(LeadId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
