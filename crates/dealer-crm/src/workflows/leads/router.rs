use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::assignment::{
    AssignmentStage, FlowError, ImbalanceReport, SalespersonId, SalespersonLoad,
};
use super::domain::{LeadCapture, LeadId};
use super::repository::{
    LeadRecord, LeadRepository, LeadStatusView, NotificationPublisher, RepositoryError,
    RosterRepository,
};
use super::scoring::{RawRatings, PILLARS};
use super::service::{LeadDeskError, LeadDeskService};

/// Pending leads re-evaluated per retry call.
pub const PENDING_RETRY_BATCH: usize = 50;

#[derive(Debug, Deserialize)]
pub struct RatingsRequest {
    pub ratings: RawRatings,
}

#[derive(Debug, Deserialize)]
pub struct AssignmentBody {
    pub salesperson_id: SalespersonId,
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Deserialize)]
pub struct RosterBody {
    pub roster: Vec<SalespersonLoad>,
}

/// Lead status plus the imbalance details a manager needs to confirm an override.
#[derive(Debug, Serialize)]
pub struct LeadResponse {
    #[serde(flatten)]
    pub status: LeadStatusView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imbalance: Option<ImbalanceReport>,
}

impl From<&LeadRecord> for LeadResponse {
    fn from(record: &LeadRecord) -> Self {
        Self {
            status: record.status_view(),
            imbalance: record.assignment.imbalance().cloned(),
        }
    }
}

/// Router builder exposing lead capture, assignment, and scoring endpoints.
pub fn lead_router<L, R, N>(service: Arc<LeadDeskService<L, R, N>>) -> Router
where
    L: LeadRepository + 'static,
    R: RosterRepository + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route("/api/v1/pillars", get(pillars_handler))
        .route(
            "/api/v1/scoring/preview",
            post(preview_handler::<L, R, N>),
        )
        .route(
            "/api/v1/roster",
            get(roster_handler::<L, R, N>).put(replace_roster_handler::<L, R, N>),
        )
        .route("/api/v1/leads", post(capture_handler::<L, R, N>))
        .route("/api/v1/leads/:lead_id", get(status_handler::<L, R, N>))
        .route(
            "/api/v1/leads/:lead_id/assignment",
            post(assignment_handler::<L, R, N>),
        )
        .route(
            "/api/v1/leads/:lead_id/pillars",
            put(rating_handler::<L, R, N>),
        )
        .route(
            "/api/v1/pending-leads/retry",
            post(retry_handler::<L, R, N>),
        )
        .with_state(service)
}

pub(crate) async fn pillars_handler() -> Response {
    (StatusCode::OK, Json(PILLARS.to_vec())).into_response()
}

pub(crate) async fn preview_handler<L, R, N>(
    State(service): State<Arc<LeadDeskService<L, R, N>>>,
    Json(body): Json<RatingsRequest>,
) -> Response
where
    L: LeadRepository + 'static,
    R: RosterRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.preview_score(&body.ratings) {
        Ok(score) => (StatusCode::OK, Json(score)).into_response(),
        Err(error) => error_response(LeadDeskError::Validation(error)),
    }
}

pub(crate) async fn roster_handler<L, R, N>(
    State(service): State<Arc<LeadDeskService<L, R, N>>>,
) -> Response
where
    L: LeadRepository + 'static,
    R: RosterRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.roster_overview() {
        Ok(overview) => (StatusCode::OK, Json(overview)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn replace_roster_handler<L, R, N>(
    State(service): State<Arc<LeadDeskService<L, R, N>>>,
    Json(body): Json<RosterBody>,
) -> Response
where
    L: LeadRepository + 'static,
    R: RosterRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.replace_roster(body.roster) {
        Ok(overview) => (StatusCode::OK, Json(overview)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn capture_handler<L, R, N>(
    State(service): State<Arc<LeadDeskService<L, R, N>>>,
    Json(capture): Json<LeadCapture>,
) -> Response
where
    L: LeadRepository + 'static,
    R: RosterRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.capture(capture) {
        Ok(record) => lead_response(&record, StatusCode::CREATED),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<L, R, N>(
    State(service): State<Arc<LeadDeskService<L, R, N>>>,
    Path(lead_id): Path<String>,
) -> Response
where
    L: LeadRepository + 'static,
    R: RosterRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.get(&LeadId(lead_id)) {
        Ok(record) => (StatusCode::OK, Json(LeadResponse::from(&record))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn assignment_handler<L, R, N>(
    State(service): State<Arc<LeadDeskService<L, R, N>>>,
    Path(lead_id): Path<String>,
    Json(body): Json<AssignmentBody>,
) -> Response
where
    L: LeadRepository + 'static,
    R: RosterRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.assign(&LeadId(lead_id), body.salesperson_id, body.force) {
        Ok(record) => lead_response(&record, StatusCode::OK),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn rating_handler<L, R, N>(
    State(service): State<Arc<LeadDeskService<L, R, N>>>,
    Path(lead_id): Path<String>,
    Json(body): Json<RatingsRequest>,
) -> Response
where
    L: LeadRepository + 'static,
    R: RosterRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.rate(&LeadId(lead_id), &body.ratings) {
        Ok(record) => {
            let payload = json!({
                "lead_id": record.lead.lead_id,
                "score": record.score,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn retry_handler<L, R, N>(
    State(service): State<Arc<LeadDeskService<L, R, N>>>,
) -> Response
where
    L: LeadRepository + 'static,
    R: RosterRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.retry_pending(PENDING_RETRY_BATCH) {
        Ok(records) => {
            let leads: Vec<LeadResponse> = records.iter().map(LeadResponse::from).collect();
            (StatusCode::OK, Json(json!({ "leads": leads }))).into_response()
        }
        Err(error) => error_response(error),
    }
}

/// 201/200 for assigned leads, 202 while no guard is on duty, 409 pending an override.
fn lead_response(record: &LeadRecord, assigned: StatusCode) -> Response {
    let status = match record.assignment.stage() {
        AssignmentStage::NoGuardPending => StatusCode::ACCEPTED,
        AssignmentStage::ImbalanceDetected => StatusCode::CONFLICT,
        _ => assigned,
    };
    (status, Json(LeadResponse::from(record))).into_response()
}

fn error_response(error: LeadDeskError) -> Response {
    let status = match &error {
        LeadDeskError::Validation(_) | LeadDeskError::Flow(FlowError::Validation(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        LeadDeskError::Flow(FlowError::InvalidTransition { .. })
        | LeadDeskError::Repository(RepositoryError::Conflict)
        | LeadDeskError::Repository(RepositoryError::StaleLoad { .. }) => StatusCode::CONFLICT,
        LeadDeskError::LeadNotFound(_) => StatusCode::NOT_FOUND,
        LeadDeskError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}
