use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::triage::domain::{
    Location, ModeratorAuthorizer, ModeratorGrant, PhotoAttachment, Report, ReportId,
    ReportStatus, ReportSubmission,
};
use crate::triage::repository::{PersistenceError, Snapshot, SnapshotStore};
use crate::triage::scoring::Assessment;
use crate::triage::service::{TriageController, TriagePolicy};
use crate::triage::{triage_router, TriageRouterState};

pub(super) const MODERATOR_TOKEN: &str = "tide-line-token";

/// 86 characters; mentions both keyword families.
pub(super) const DUMPING_DETAILS: &str =
    "Saw a bulldozer illegally dumping oil near the shoreline, filmed for about two minutes";

pub(super) fn strong_submission() -> ReportSubmission {
    ReportSubmission {
        reporter_name: "Alice".to_string(),
        category: "Dumping".to_string(),
        details: DUMPING_DETAILS.to_string(),
        latitude: Some("10.5".to_string()),
        longitude: Some("76.2".to_string()),
        channel: Some("web".to_string()),
        contact_phone: None,
        photo: Some(PhotoAttachment("data:image/jpeg;base64,/9j/4AAQ".to_string())),
    }
}

pub(super) fn bare_submission(reporter: &str) -> ReportSubmission {
    ReportSubmission {
        reporter_name: reporter.to_string(),
        category: "Cutting".to_string(),
        ..ReportSubmission::default()
    }
}

pub(super) fn middling_submission(reporter: &str) -> ReportSubmission {
    ReportSubmission {
        reporter_name: reporter.to_string(),
        category: "Reclamation".to_string(),
        details: "Fresh stumps along the creek".to_string(),
        latitude: Some("9.96".to_string()),
        longitude: Some("76.27".to_string()),
        ..ReportSubmission::default()
    }
}

pub(super) fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 26, hour, minute, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn report(id: &str, reporter: &str, submitted_at: DateTime<Utc>) -> Report {
    Report {
        id: ReportId(id.to_string()),
        submitted_at,
        reporter_name: reporter.to_string(),
        category: "Cutting".to_string(),
        details: String::new(),
        location: Location::default(),
        has_photo: false,
        photo: None,
        channel: None,
        contact_phone: None,
        assessment: Assessment {
            confidence: 40,
            flags: Vec::new(),
            components: Vec::new(),
        },
        status: ReportStatus::Flagged,
    }
}

pub(super) fn grant() -> ModeratorGrant {
    ModeratorGrant::new("river-warden")
}

#[derive(Default)]
pub(super) struct MemorySnapshots {
    snapshot: Mutex<Snapshot>,
    report_writes: Mutex<usize>,
    score_writes: Mutex<usize>,
}

impl MemorySnapshots {
    pub(super) fn seeded(reports: Vec<Report>, scores: BTreeMap<String, u32>) -> Self {
        Self {
            snapshot: Mutex::new(Snapshot { reports, scores }),
            ..Self::default()
        }
    }

    pub(super) fn snapshot(&self) -> Snapshot {
        self.snapshot.lock().expect("snapshot mutex poisoned").clone()
    }

    pub(super) fn report_writes(&self) -> usize {
        *self.report_writes.lock().expect("counter mutex poisoned")
    }

    pub(super) fn score_writes(&self) -> usize {
        *self.score_writes.lock().expect("counter mutex poisoned")
    }
}

impl SnapshotStore for MemorySnapshots {
    fn load(&self) -> Result<Snapshot, PersistenceError> {
        Ok(self.snapshot())
    }

    fn persist_reports(&self, reports: &[Report]) -> Result<(), PersistenceError> {
        self.snapshot.lock().expect("snapshot mutex poisoned").reports = reports.to_vec();
        *self.report_writes.lock().expect("counter mutex poisoned") += 1;
        Ok(())
    }

    fn persist_scores(&self, scores: &BTreeMap<String, u32>) -> Result<(), PersistenceError> {
        self.snapshot.lock().expect("snapshot mutex poisoned").scores = scores.clone();
        *self.score_writes.lock().expect("counter mutex poisoned") += 1;
        Ok(())
    }
}

/// Loads its seeded reports but refuses every write.
#[derive(Default)]
pub(super) struct UnavailableSnapshots {
    reports: Vec<Report>,
}

impl UnavailableSnapshots {
    pub(super) fn seeded(reports: Vec<Report>) -> Self {
        Self { reports }
    }
}

impl SnapshotStore for UnavailableSnapshots {
    fn load(&self) -> Result<Snapshot, PersistenceError> {
        Ok(Snapshot {
            reports: self.reports.clone(),
            scores: BTreeMap::new(),
        })
    }

    fn persist_reports(&self, _reports: &[Report]) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable("disk full".to_string()))
    }

    fn persist_scores(&self, _scores: &BTreeMap<String, u32>) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable("disk full".to_string()))
    }
}

/// Accepts report writes but refuses score writes.
#[derive(Default)]
pub(super) struct ScoresUnavailable {
    inner: MemorySnapshots,
}

impl ScoresUnavailable {
    pub(super) fn seeded(reports: Vec<Report>, scores: BTreeMap<String, u32>) -> Self {
        Self {
            inner: MemorySnapshots::seeded(reports, scores),
        }
    }

    pub(super) fn snapshot(&self) -> Snapshot {
        self.inner.snapshot()
    }

    pub(super) fn report_writes(&self) -> usize {
        self.inner.report_writes()
    }
}

impl SnapshotStore for ScoresUnavailable {
    fn load(&self) -> Result<Snapshot, PersistenceError> {
        self.inner.load()
    }

    fn persist_reports(&self, reports: &[Report]) -> Result<(), PersistenceError> {
        self.inner.persist_reports(reports)
    }

    fn persist_scores(&self, _scores: &BTreeMap<String, u32>) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable("scores volume offline".to_string()))
    }
}

pub(super) struct StaticAuthorizer;

impl ModeratorAuthorizer for StaticAuthorizer {
    fn authorize(&self, credential: &str) -> Option<ModeratorGrant> {
        (credential == MODERATOR_TOKEN).then(grant)
    }
}

pub(super) fn build_controller(
    policy: TriagePolicy,
) -> (TriageController<MemorySnapshots>, Arc<MemorySnapshots>) {
    let snapshots = Arc::new(MemorySnapshots::default());
    let controller =
        TriageController::load(snapshots.clone(), policy).expect("empty snapshot loads");
    (controller, snapshots)
}

pub(super) fn router_state(
    controller: TriageController<MemorySnapshots>,
) -> TriageRouterState<MemorySnapshots, StaticAuthorizer> {
    TriageRouterState {
        controller: Arc::new(controller),
        authorizer: Arc::new(StaticAuthorizer),
        leaderboard_limit: 20,
    }
}

pub(super) fn router_with_controller(controller: TriageController<MemorySnapshots>) -> axum::Router {
    triage_router(router_state(controller))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
