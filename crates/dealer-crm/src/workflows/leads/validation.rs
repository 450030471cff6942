use super::assignment::SalespersonId;

/// Malformed input rejected by the scorer, the balancer, or lead capture.
///
/// Values are never clamped: anything out of range is reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("pillar id {0} is outside 1-15")]
    UnknownPillar(i64),
    #[error("rating {value} for pillar {pillar_id} is outside 0-100")]
    RatingOutOfRange { pillar_id: u8, value: i64 },
    #[error("salesperson {0} is not on the roster")]
    UnknownSalesperson(SalespersonId),
    #[error("salesperson {0} is not on duty")]
    SalespersonOffDuty(SalespersonId),
    #[error("salesperson {0} must have a daily target above zero")]
    InvalidDailyTarget(SalespersonId),
    #[error("salesperson {0} appears more than once on the roster")]
    DuplicateSalesperson(SalespersonId),
    #[error("lead capture is missing {0}")]
    MissingCaptureField(&'static str),
}
