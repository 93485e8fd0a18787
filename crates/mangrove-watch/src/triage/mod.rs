//! Report triage and reputation engine.
//!
//! A submission is scored by [`ScoringEngine`], stored as a [`Report`] in the [`ReportStore`],
//! and rewarded through the [`ReputationLedger`]. [`TriageController`] ties the three together,
//! applies moderator actions and persists every change through a [`SnapshotStore`].

pub mod domain;
pub mod file_store;
pub mod ledger;
pub mod query;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    Location, ModerationAction, ModeratorAuthorizer, ModeratorGrant, PhotoAttachment, Report,
    ReportId, ReportStatus, ReportSubmission,
};
pub use file_store::JsonFileStore;
pub use ledger::{badge_for, Badge, LeaderboardEntry, ReputationLedger};
pub use query::ReportQuery;
pub use repository::{PersistenceError, Snapshot, SnapshotStore};
pub use router::{triage_router, TriageRouterState};
pub use scoring::{Assessment, ReportFlag, ScoringEngine, ScoringInput, ScoringOutcome};
pub use service::{
    submission_points, ModerationOutcome, PromotionReward, SubmissionReceipt, TriageController,
    TriageError, TriagePolicy, PROMOTION_POINTS,
};
pub use store::{ReportStore, StoreError};
