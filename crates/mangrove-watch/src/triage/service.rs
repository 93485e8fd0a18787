use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::domain::{
    Location, ModerationAction, ModeratorGrant, Report, ReportId, ReportStatus, ReportSubmission,
};
use super::ledger::{LeaderboardEntry, ReputationLedger};
use super::query::ReportQuery;
use super::repository::{PersistenceError, SnapshotStore};
use super::scoring::{ScoringEngine, ScoringInput, FLAGGED_BELOW, VALIDATED_AT};
use super::store::{ReportStore, StoreError};

/// Points granted to a reporter when a moderator promotes their report.
pub const PROMOTION_POINTS: u32 = 5;

/// When a moderator promotion pays out the promotion reward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionReward {
    /// Only when the promotion actually moves the report into `Validated`.
    #[default]
    OnStatusChange,
    /// On every promote call, including re-promoting a validated report.
    EveryPromotion,
}

/// Tunable triage behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriagePolicy {
    pub promotion_reward: PromotionReward,
}

impl TriagePolicy {
    fn promotion_points(&self, previous: ReportStatus) -> u32 {
        match self.promotion_reward {
            PromotionReward::EveryPromotion => PROMOTION_POINTS,
            PromotionReward::OnStatusChange if previous != ReportStatus::Validated => {
                PROMOTION_POINTS
            }
            PromotionReward::OnStatusChange => 0,
        }
    }
}

/// Reputation points earned by a fresh submission.
pub fn submission_points(confidence: u8, details_chars: usize, has_photo: bool) -> u32 {
    let base = if confidence >= VALIDATED_AT {
        10
    } else if confidence >= FLAGGED_BELOW {
        6
    } else {
        2
    };
    let detail_bonus = if details_chars >= 80 { 3 } else { 0 };
    let photo_bonus = if has_photo { 5 } else { 0 };
    base + detail_bonus + photo_bonus
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub report: Report,
    pub points_awarded: u32,
}

impl SubmissionReceipt {
    pub fn message(&self) -> String {
        format!(
            "Report submitted. AI confidence: {}%. You earned {} points.",
            self.report.confidence(),
            self.points_awarded
        )
    }
}

/// Result of a moderator action. `status` is `None` once the report is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationOutcome {
    pub report_id: ReportId,
    pub action: ModerationAction,
    pub status: Option<ReportStatus>,
    pub points_awarded: u32,
}

#[derive(Debug, Default)]
struct TriageState {
    store: ReportStore,
    ledger: ReputationLedger,
}

/// Undo record for one in-memory mutation, applied when the snapshot store refuses it.
enum Revert {
    Submission {
        id: ReportId,
        reporter: String,
        previous_total: Option<u32>,
    },
    Status {
        id: ReportId,
        previous: ReportStatus,
        reporter: String,
        previous_total: Option<u32>,
    },
    Deletion {
        index: usize,
        report: Report,
    },
}

impl Revert {
    fn apply(self, state: &mut TriageState) {
        match self {
            Revert::Submission {
                id,
                reporter,
                previous_total,
            } => {
                state.store.delete(&id).ok();
                state.ledger.restore(&reporter, previous_total);
            }
            Revert::Status {
                id,
                previous,
                reporter,
                previous_total,
            } => {
                state.store.update_status(&id, previous).ok();
                state.ledger.restore(&reporter, previous_total);
            }
            Revert::Deletion { index, report } => state.store.restore(index, report),
        }
    }
}

/// Orchestrates scoring, report storage and reputation accounting.
///
/// Every public operation runs under one lock. A mutation is applied in memory, persisted, and
/// reverted if the snapshot store refuses it.
pub struct TriageController<S> {
    snapshots: Arc<S>,
    engine: ScoringEngine,
    policy: TriagePolicy,
    state: Mutex<TriageState>,
}

impl<S> TriageController<S>
where
    S: SnapshotStore + 'static,
{
    /// Build a controller from whatever the snapshot store currently holds.
    pub fn load(snapshots: Arc<S>, policy: TriagePolicy) -> Result<Self, TriageError> {
        let snapshot = snapshots.load()?;
        let store = ReportStore::from_snapshot(snapshot.reports).map_err(|err| {
            error!(error = %err, "persisted snapshot contains repeated report ids");
            TriageError::from(err)
        })?;
        let ledger = ReputationLedger::from_snapshot(snapshot.scores);

        info!(
            reports = store.len(),
            contributors = ledger.len(),
            "triage state loaded"
        );

        Ok(Self {
            snapshots,
            engine: ScoringEngine::new(),
            policy,
            state: Mutex::new(TriageState { store, ledger }),
        })
    }

    pub fn policy(&self) -> TriagePolicy {
        self.policy
    }

    /// Score, store and reward a new report.
    pub fn submit(
        &self,
        submission: ReportSubmission,
    ) -> Result<SubmissionReceipt, TriageError> {
        let has_photo = submission.has_photo();
        let ReportSubmission {
            reporter_name,
            category,
            details,
            latitude,
            longitude,
            channel,
            contact_phone,
            photo,
        } = submission;

        let reporter_name = reporter_name.trim().to_string();
        let category = category.trim().to_string();
        if reporter_name.is_empty() {
            return Err(TriageError::Validation {
                field: "reporter_name",
            });
        }
        if category.is_empty() {
            return Err(TriageError::Validation { field: "category" });
        }
        let details = details.trim().to_string();

        let outcome = self.engine.evaluate(&ScoringInput {
            details: &details,
            has_photo,
            category: &category,
            latitude: latitude.as_deref(),
            longitude: longitude.as_deref(),
        });
        let (assessment, status) = outcome.into_parts();
        let points = submission_points(
            assessment.confidence,
            details.encode_utf16().count(),
            has_photo,
        );

        let report = Report {
            id: ReportId::generate(),
            submitted_at: Utc::now(),
            reporter_name,
            category,
            location: Location::parse(latitude.as_deref(), longitude.as_deref()),
            details,
            has_photo,
            photo: if has_photo { photo } else { None },
            channel: non_empty(channel),
            contact_phone: non_empty(contact_phone),
            assessment,
            status,
        };

        let mut state = self.lock();
        state.store.insert(report.clone()).map_err(|err| {
            error!(error = %err, "generated report id collided with an existing report");
            TriageError::from(err)
        })?;
        let previous_total = state.ledger.total(&report.reporter_name);
        state.ledger.award(&report.reporter_name, points);

        let revert = Revert::Submission {
            id: report.id.clone(),
            reporter: report.reporter_name.clone(),
            previous_total,
        };
        self.persist(&mut state, true, revert)?;

        info!(
            report_id = %report.id,
            confidence = report.confidence(),
            status = report.status.label(),
            points,
            "report submitted"
        );

        Ok(SubmissionReceipt {
            report,
            points_awarded: points,
        })
    }

    /// Apply a moderator action to an existing report.
    pub fn moderate(
        &self,
        grant: &ModeratorGrant,
        id: &ReportId,
        action: ModerationAction,
    ) -> Result<ModerationOutcome, TriageError> {
        let mut state = self.lock();

        let reporter = match state.store.find(id) {
            Some(report) => report.reporter_name.clone(),
            None => {
                warn!(report_id = %id, action = action.label(), "moderation target not found");
                return Err(TriageError::NotFound(id.clone()));
            }
        };

        let previous_total = state.ledger.total(&reporter);

        let (status, points, revert) = match action {
            ModerationAction::Promote => {
                let previous = state.store.update_status(id, ReportStatus::Validated)?;
                let points = self.policy.promotion_points(previous);
                if points > 0 {
                    state.ledger.award(&reporter, points);
                }
                let revert = Revert::Status {
                    id: id.clone(),
                    previous,
                    reporter,
                    previous_total,
                };
                (Some(ReportStatus::Validated), points, revert)
            }
            ModerationAction::Flag => {
                let previous = state.store.update_status(id, ReportStatus::Flagged)?;
                let revert = Revert::Status {
                    id: id.clone(),
                    previous,
                    reporter,
                    previous_total,
                };
                (Some(ReportStatus::Flagged), 0, revert)
            }
            ModerationAction::Delete => {
                let (index, report) = state.store.take(id)?;
                (None, 0, Revert::Deletion { index, report })
            }
        };

        self.persist(&mut state, points > 0, revert)?;

        info!(
            report_id = %id,
            moderator = grant.moderator(),
            action = action.label(),
            points,
            "moderation applied"
        );

        Ok(ModerationOutcome {
            report_id: id.clone(),
            action,
            status,
            points_awarded: points,
        })
    }

    pub fn find(&self, id: &ReportId) -> Option<Report> {
        self.lock().store.find(id).cloned()
    }

    /// All reports, most recent first.
    pub fn list_sorted(&self) -> Vec<Report> {
        self.lock().store.list_sorted().into_iter().cloned().collect()
    }

    /// Sorted reports narrowed by a feed filter.
    pub fn query(&self, query: &ReportQuery) -> Vec<Report> {
        self.lock()
            .store
            .list_sorted()
            .into_iter()
            .filter(|report| query.matches(report))
            .cloned()
            .collect()
    }

    pub fn leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry> {
        self.lock().ledger.top_entries(limit)
    }

    pub fn points_for(&self, name: &str) -> u32 {
        self.lock().ledger.points_for(name)
    }

    /// Write the mutated state, or revert it.
    ///
    /// When the scores write fails after the reports write landed, the reverted reports are
    /// written back so the store never keeps a report whose points were not recorded.
    fn persist(
        &self,
        state: &mut TriageState,
        scores_changed: bool,
        revert: Revert,
    ) -> Result<(), TriageError> {
        if let Err(err) = self.snapshots.persist_reports(state.store.as_slice()) {
            revert.apply(state);
            error!(error = %err, "failed to persist reports");
            return Err(TriageError::Persistence(err));
        }
        if !scores_changed {
            return Ok(());
        }

        if let Err(err) = self.snapshots.persist_scores(state.ledger.scores()) {
            revert.apply(state);
            error!(error = %err, "failed to persist scores");
            if let Err(rollback) = self.snapshots.persist_reports(state.store.as_slice()) {
                error!(
                    error = %rollback,
                    "failed to roll back persisted reports; stored reports are ahead of scores"
                );
            }
            return Err(TriageError::Persistence(err));
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, TriageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

/// Error raised by the triage controller.
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("{field} is required")]
    Validation { field: &'static str },
    #[error("report {0} not found")]
    NotFound(ReportId),
    #[error("report id {0} already exists")]
    DuplicateId(ReportId),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl From<StoreError> for TriageError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::DuplicateId(id) => Self::DuplicateId(id),
            StoreError::NotFound(id) => Self::NotFound(id),
        }
    }
}
