use serde::{Deserialize, Serialize};

use super::roster::{LoadSnapshot, RosterStatistics, SalespersonId, SalespersonLoad};

pub const LOWEST_LOAD_JUSTIFICATION: &str = "lowest current load";

/// Suggested assignee for a newly captured lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub recommended: LoadSnapshot,
    pub justification: String,
    pub statistics: RosterStatistics,
    pub on_duty: Vec<LoadSnapshot>,
}

/// Result of `recommend`: an empty on-duty roster is an expected outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecommendationOutcome {
    Recommended(Recommendation),
    NoGuardDefined,
}

impl RecommendationOutcome {
    pub fn recommendation(&self) -> Option<&Recommendation> {
        match self {
            Self::Recommended(recommendation) => Some(recommendation),
            Self::NoGuardDefined => None,
        }
    }
}

/// Immutable record of an accepted assignment. The roster reflects the increment the
/// caller still has to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentDecision {
    pub selected: SalespersonId,
    pub previous_load: u32,
    pub roster: Vec<SalespersonLoad>,
    pub statistics: RosterStatistics,
    pub forced: bool,
}

impl AssignmentDecision {
    pub fn selected_load(&self) -> Option<&SalespersonLoad> {
        self.roster
            .iter()
            .find(|member| member.salesperson_id == self.selected)
    }

    pub fn summary(&self) -> String {
        let after = self.previous_load.saturating_add(1);
        if self.forced {
            format!(
                "assigned to {} ({} -> {} leads) despite imbalance of {}",
                self.selected, self.previous_load, after, self.statistics.difference
            )
        } else {
            format!(
                "assigned to {} ({} -> {} leads)",
                self.selected, self.previous_load, after
            )
        }
    }
}

/// Manual assignment that would push the roster past the imbalance threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImbalanceReport {
    pub chosen: SalespersonId,
    pub load_before: u32,
    pub load_after: u32,
    pub difference_after: u32,
    pub threshold: u32,
    pub alternative: LoadSnapshot,
    pub justification: String,
}

impl ImbalanceReport {
    pub fn summary(&self) -> String {
        format!(
            "assigning to {} raises their load {} -> {} and the roster spread to {} (limit {}); {} has the {}",
            self.chosen,
            self.load_before,
            self.load_after,
            self.difference_after,
            self.threshold,
            self.alternative.salesperson_id,
            self.justification
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ManualAssignmentOutcome {
    Accepted(AssignmentDecision),
    ImbalanceDetected(ImbalanceReport),
}
