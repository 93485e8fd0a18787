use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use super::domain::{ModerationAction, ModeratorAuthorizer, Report, ReportId, ReportSubmission};
use super::query::ReportQuery;
use super::repository::SnapshotStore;
use super::service::{TriageController, TriageError};

/// Shared handler state: the controller and the credential check for moderator routes.
pub struct TriageRouterState<S, Z> {
    pub controller: Arc<TriageController<S>>,
    pub authorizer: Arc<Z>,
    pub leaderboard_limit: usize,
}

impl<S, Z> Clone for TriageRouterState<S, Z> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
            authorizer: Arc::clone(&self.authorizer),
            leaderboard_limit: self.leaderboard_limit,
        }
    }
}

/// Router builder exposing report intake, the feed, moderation and the leaderboard.
pub fn triage_router<S, Z>(state: TriageRouterState<S, Z>) -> Router
where
    S: SnapshotStore + 'static,
    Z: ModeratorAuthorizer + 'static,
{
    Router::new()
        .route(
            "/api/v1/reports",
            post(submit_handler::<S, Z>).get(list_handler::<S, Z>),
        )
        .route("/api/v1/reports/:report_id", get(report_handler::<S, Z>))
        .route(
            "/api/v1/reports/:report_id/moderation",
            post(moderation_handler::<S, Z>),
        )
        .route("/api/v1/leaderboard", get(leaderboard_handler::<S, Z>))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionView {
    pub(crate) report: Report,
    pub(crate) points_awarded: u32,
    pub(crate) message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModerationRequest {
    pub(crate) action: ModerationAction,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LeaderboardParams {
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

pub(crate) async fn submit_handler<S, Z>(
    State(state): State<TriageRouterState<S, Z>>,
    Json(submission): Json<ReportSubmission>,
) -> Response
where
    S: SnapshotStore + 'static,
    Z: ModeratorAuthorizer + 'static,
{
    match state.controller.submit(submission) {
        Ok(receipt) => {
            let message = receipt.message();
            let view = SubmissionView {
                report: receipt.report,
                points_awarded: receipt.points_awarded,
                message,
            };
            (StatusCode::CREATED, Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<S, Z>(
    State(state): State<TriageRouterState<S, Z>>,
    Query(query): Query<ReportQuery>,
) -> Response
where
    S: SnapshotStore + 'static,
    Z: ModeratorAuthorizer + 'static,
{
    let reports = state.controller.query(&query);
    (StatusCode::OK, Json(reports)).into_response()
}

pub(crate) async fn report_handler<S, Z>(
    State(state): State<TriageRouterState<S, Z>>,
    Path(report_id): Path<String>,
) -> Response
where
    S: SnapshotStore + 'static,
    Z: ModeratorAuthorizer + 'static,
{
    let id = ReportId(report_id);
    match state.controller.find(&id) {
        Some(report) => (StatusCode::OK, Json(report)).into_response(),
        None => error_response(TriageError::NotFound(id)),
    }
}

pub(crate) async fn moderation_handler<S, Z>(
    State(state): State<TriageRouterState<S, Z>>,
    Path(report_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<ModerationRequest>,
) -> Response
where
    S: SnapshotStore + 'static,
    Z: ModeratorAuthorizer + 'static,
{
    let grant = bearer_token(&headers).and_then(|token| state.authorizer.authorize(token));
    let Some(grant) = grant else {
        warn!(report_id = %report_id, "moderation rejected: missing or invalid credential");
        let payload = json!({ "error": "moderator credential required" });
        return (StatusCode::UNAUTHORIZED, Json(payload)).into_response();
    };

    let id = ReportId(report_id);
    match state.controller.moderate(&grant, &id, request.action) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn leaderboard_handler<S, Z>(
    State(state): State<TriageRouterState<S, Z>>,
    Query(params): Query<LeaderboardParams>,
) -> Response
where
    S: SnapshotStore + 'static,
    Z: ModeratorAuthorizer + 'static,
{
    let limit = params.limit.unwrap_or(state.leaderboard_limit);
    let entries = state.controller.leaderboard(limit);
    (StatusCode::OK, Json(entries)).into_response()
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn error_response(err: TriageError) -> Response {
    let status = match &err {
        TriageError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        TriageError::NotFound(_) => StatusCode::NOT_FOUND,
        TriageError::DuplicateId(_) | TriageError::Persistence(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}
