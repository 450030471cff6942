//! Lead intake, guard-duty assignment, and SPPC prospect scoring.
//!
//! The scorer and the balancer are pure functions over snapshots supplied by the caller.
//! Storage of leads and of the roster load counters, and manager notifications, sit
//! behind the traits in [`repository`] so the service can run against any backend.

pub mod assignment;
pub mod domain;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use assignment::{
    AssignmentDecision, AssignmentRequest, AssignmentStage, BalancerConfig, ImbalanceReport,
    LeadAssignmentFlow, LoadBalancer, LoadSnapshot, ManualAssignmentOutcome, Recommendation,
    RecommendationOutcome, RosterStatistics, SalespersonId, SalespersonLoad,
};
pub use domain::{CaptureChannel, CapturedLead, LeadCapture, LeadId};
pub use repository::{
    LeadRecord, LeadRepository, LeadStatusView, ManagerNotification, NotificationError,
    NotificationPublisher, RepositoryError, RosterRepository,
};
pub use router::lead_router;
pub use scoring::{PillarScorer, ProspectScore, RatingSheet, RawRatings, Tier, TierThresholds};
pub use service::{LeadDeskError, LeadDeskService, RosterOverview};
pub use validation::ValidationError;
