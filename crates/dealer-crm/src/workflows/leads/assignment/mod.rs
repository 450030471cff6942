//! Guard-duty load balancing: who receives the next captured lead.

mod decision;
mod flow;
mod roster;

pub use decision::{
    AssignmentDecision, ImbalanceReport, ManualAssignmentOutcome, Recommendation,
    RecommendationOutcome, LOWEST_LOAD_JUSTIFICATION,
};
pub use flow::{AssignmentRequest, AssignmentStage, FlowError, LeadAssignmentFlow};
pub use roster::{validate_roster, LoadSnapshot, RosterStatistics, SalespersonId, SalespersonLoad};

use super::validation::ValidationError;
use serde::{Deserialize, Serialize};

/// Spread in leads between the busiest and the idlest on-duty salesperson that a manual
/// assignment may reach without an override.
pub const DEFAULT_IMBALANCE_THRESHOLD: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancerConfig {
    pub imbalance_threshold: u32,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            imbalance_threshold: DEFAULT_IMBALANCE_THRESHOLD,
        }
    }
}

/// Stateless balancer over roster snapshots supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct LoadBalancer {
    config: BalancerConfig,
}

impl LoadBalancer {
    pub fn new(config: BalancerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> BalancerConfig {
        self.config
    }

    pub fn statistics(&self, roster: &[SalespersonLoad]) -> Option<RosterStatistics> {
        RosterStatistics::from_members(roster, self.config.imbalance_threshold)
    }

    pub fn recommend(
        &self,
        roster: &[SalespersonLoad],
    ) -> Result<RecommendationOutcome, ValidationError> {
        validate_roster(roster)?;

        let Some(best) = best_candidate(roster) else {
            return Ok(RecommendationOutcome::NoGuardDefined);
        };
        let Some(statistics) = self.statistics(roster) else {
            return Ok(RecommendationOutcome::NoGuardDefined);
        };

        Ok(RecommendationOutcome::Recommended(Recommendation {
            recommended: best.snapshot(),
            justification: LOWEST_LOAD_JUSTIFICATION.to_string(),
            statistics,
            on_duty: roster
                .iter()
                .filter(|member| member.on_duty)
                .map(SalespersonLoad::snapshot)
                .collect(),
        }))
    }

    /// Checks a requested assignment against the imbalance threshold. Nothing is
    /// mutated: the accepted decision carries the roster as it would look afterwards.
    pub fn evaluate_manual_assignment(
        &self,
        roster: &[SalespersonLoad],
        chosen: &SalespersonId,
        force: bool,
    ) -> Result<ManualAssignmentOutcome, ValidationError> {
        validate_roster(roster)?;

        let member = roster
            .iter()
            .find(|member| &member.salesperson_id == chosen)
            .ok_or_else(|| ValidationError::UnknownSalesperson(chosen.clone()))?;
        if !member.on_duty {
            return Err(ValidationError::SalespersonOffDuty(chosen.clone()));
        }

        let after: Vec<SalespersonLoad> = roster
            .iter()
            .map(|entry| {
                if &entry.salesperson_id == chosen {
                    entry.with_assignment()
                } else {
                    entry.clone()
                }
            })
            .collect();

        let statistics = self
            .statistics(&after)
            .ok_or_else(|| ValidationError::SalespersonOffDuty(chosen.clone()))?;

        let exceeds = statistics.difference > self.config.imbalance_threshold;
        // Only a strictly lighter member is an alternative; a tie at the minimum
        // leaves the spread where it is whoever takes the lead.
        let alternative =
            best_candidate(roster).filter(|best| best.current_load < member.current_load);

        let forced = match (exceeds, alternative) {
            (true, Some(alternative)) if !force => {
                return Ok(ManualAssignmentOutcome::ImbalanceDetected(ImbalanceReport {
                    chosen: chosen.clone(),
                    load_before: member.current_load,
                    load_after: member.current_load.saturating_add(1),
                    difference_after: statistics.difference,
                    threshold: self.config.imbalance_threshold,
                    alternative: alternative.snapshot(),
                    justification: LOWEST_LOAD_JUSTIFICATION.to_string(),
                }));
            }
            (true, Some(_)) => true,
            _ => false,
        };

        Ok(ManualAssignmentOutcome::Accepted(AssignmentDecision {
            selected: chosen.clone(),
            previous_load: member.current_load,
            roster: after,
            statistics,
            forced,
        }))
    }
}

/// Lowest current load, then lowest load percentage. `min_by_key` keeps the first of
/// equal elements, which preserves roster order on full ties.
fn best_candidate(roster: &[SalespersonLoad]) -> Option<&SalespersonLoad> {
    roster
        .iter()
        .filter(|member| member.on_duty)
        .min_by_key(|member| (member.current_load, member.load_percentage()))
}

/// Recommends with the default threshold.
pub fn recommend(roster: &[SalespersonLoad]) -> Result<RecommendationOutcome, ValidationError> {
    LoadBalancer::default().recommend(roster)
}

/// Evaluates a manual assignment with the default threshold.
pub fn evaluate_manual_assignment(
    roster: &[SalespersonLoad],
    chosen: &SalespersonId,
    force: bool,
) -> Result<ManualAssignmentOutcome, ValidationError> {
    LoadBalancer::default().evaluate_manual_assignment(roster, chosen, force)
}
