use serde::{Deserialize, Serialize};

use super::super::validation::ValidationError;
use super::decision::{
    AssignmentDecision, ImbalanceReport, ManualAssignmentOutcome, RecommendationOutcome,
};
use super::roster::{SalespersonId, SalespersonLoad};
use super::LoadBalancer;

/// Stages one lead goes through between capture and final assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStage {
    Captured,
    NoGuardPending,
    Evaluating,
    Accepted,
    ImbalanceDetected,
    AssignedFinal,
}

impl AssignmentStage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Captured => "captured",
            Self::NoGuardPending => "no_guard_pending",
            Self::Evaluating => "evaluating",
            Self::Accepted => "accepted",
            Self::ImbalanceDetected => "imbalance_detected",
            Self::AssignedFinal => "assigned",
        }
    }
}

/// How the assignee should be picked on evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AssignmentRequest {
    #[default]
    Recommended,
    Manual {
        salesperson_id: SalespersonId,
        #[serde(default)]
        force: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
enum FlowState {
    Captured,
    NoGuardPending,
    Accepted(AssignmentDecision),
    ImbalanceDetected(ImbalanceReport),
    AssignedFinal(AssignmentDecision),
}

impl FlowState {
    fn stage(&self) -> AssignmentStage {
        match self {
            Self::Captured => AssignmentStage::Captured,
            Self::NoGuardPending => AssignmentStage::NoGuardPending,
            Self::Accepted(_) => AssignmentStage::Accepted,
            Self::ImbalanceDetected(_) => AssignmentStage::ImbalanceDetected,
            Self::AssignedFinal(_) => AssignmentStage::AssignedFinal,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("cannot {action} a lead in stage {}", .from.label())]
    InvalidTransition {
        from: AssignmentStage,
        action: &'static str,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Capture-to-assignment state machine for a single lead.
///
/// Holds no roster: every evaluation receives the current snapshot, so a pending lead
/// is simply evaluated again on retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadAssignmentFlow {
    state: FlowState,
    history: Vec<AssignmentStage>,
}

impl Default for LeadAssignmentFlow {
    fn default() -> Self {
        Self::captured()
    }
}

impl LeadAssignmentFlow {
    pub fn captured() -> Self {
        Self {
            state: FlowState::Captured,
            history: vec![AssignmentStage::Captured],
        }
    }

    pub fn stage(&self) -> AssignmentStage {
        self.state.stage()
    }

    /// Every stage visited so far, in order.
    pub fn history(&self) -> &[AssignmentStage] {
        &self.history
    }

    pub fn decision(&self) -> Option<&AssignmentDecision> {
        match &self.state {
            FlowState::Accepted(decision) | FlowState::AssignedFinal(decision) => Some(decision),
            _ => None,
        }
    }

    pub fn imbalance(&self) -> Option<&ImbalanceReport> {
        match &self.state {
            FlowState::ImbalanceDetected(report) => Some(report),
            _ => None,
        }
    }

    pub fn assignee(&self) -> Option<&SalespersonId> {
        match &self.state {
            FlowState::AssignedFinal(decision) => Some(&decision.selected),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(
            self.state,
            FlowState::Captured | FlowState::NoGuardPending | FlowState::ImbalanceDetected(_)
        )
    }

    /// Runs the balancer against `roster`. Allowed from captured, pending, and
    /// imbalance stages; a forced manual request turns an imbalance into acceptance.
    pub fn evaluate(
        mut self,
        balancer: &LoadBalancer,
        roster: &[SalespersonLoad],
        request: &AssignmentRequest,
    ) -> Result<Self, FlowError> {
        if !self.is_open() {
            return Err(FlowError::InvalidTransition {
                from: self.stage(),
                action: "evaluate",
            });
        }

        self.history.push(AssignmentStage::Evaluating);

        // An empty guard holds the lead whatever was requested; the request is replayed later.
        let next = match balancer.recommend(roster)? {
            RecommendationOutcome::NoGuardDefined => FlowState::NoGuardPending,
            RecommendationOutcome::Recommended(recommendation) => {
                let (chosen, force) = match request {
                    AssignmentRequest::Recommended => {
                        (recommendation.recommended.salesperson_id, false)
                    }
                    AssignmentRequest::Manual {
                        salesperson_id,
                        force,
                    } => (salesperson_id.clone(), *force),
                };
                Self::from_manual(balancer.evaluate_manual_assignment(roster, &chosen, force)?)
            }
        };

        self.history.push(next.stage());
        self.state = next;
        Ok(self)
    }

    /// Marks the accepted decision as applied once the caller persisted the increment.
    pub fn finalize(mut self) -> Result<Self, FlowError> {
        match self.state {
            FlowState::Accepted(decision) => {
                self.state = FlowState::AssignedFinal(decision);
                self.history.push(AssignmentStage::AssignedFinal);
                Ok(self)
            }
            other => Err(FlowError::InvalidTransition {
                from: other.stage(),
                action: "finalize",
            }),
        }
    }

    fn from_manual(outcome: ManualAssignmentOutcome) -> FlowState {
        match outcome {
            ManualAssignmentOutcome::Accepted(decision) => FlowState::Accepted(decision),
            ManualAssignmentOutcome::ImbalanceDetected(report) => {
                FlowState::ImbalanceDetected(report)
            }
        }
    }
}
