//! End-to-end triage scenarios through the public controller backed by the JSON file store.

use std::sync::Arc;

use mangrove_watch::triage::{
    Badge, JsonFileStore, ModerationAction, ModeratorGrant, PhotoAttachment, ReportFlag,
    ReportStatus, ReportSubmission, SnapshotStore, TriageController, TriagePolicy,
};

fn submission(reporter: &str, details: &str, photo: bool, lat: &str, lng: &str) -> ReportSubmission {
    ReportSubmission {
        reporter_name: reporter.to_string(),
        category: "Cutting".to_string(),
        details: details.to_string(),
        latitude: Some(lat.to_string()),
        longitude: Some(lng.to_string()),
        channel: Some("sms".to_string()),
        contact_phone: Some("+91 98470 00000".to_string()),
        photo: photo.then(|| PhotoAttachment("objects/photo-1.jpg".to_string())),
    }
}

fn open_controller(dir: &std::path::Path) -> TriageController<JsonFileStore> {
    let store = JsonFileStore::open(dir).expect("open store");
    TriageController::load(Arc::new(store), TriagePolicy::default()).expect("load controller")
}

#[test]
fn reports_and_points_survive_a_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let moderator = ModeratorGrant::new("warden");

    let (kept_id, deleted_id) = {
        let controller = open_controller(dir.path());
        let long_details = "Two boats unloading cut mangrove poles at night; backhoe clearing the \
                            bund for reclamation, fresh stumps visible along a 200 metre stretch.";
        let kept = controller
            .submit(submission("Anitha", long_details, true, "9.97", "76.25"))
            .expect("submission accepted");
        assert_eq!(kept.report.status, ReportStatus::Validated);

        let weak = controller
            .submit(submission("Joseph", "saw something", false, "", "76.2"))
            .expect("submission accepted");
        assert_eq!(weak.report.status, ReportStatus::Flagged);
        assert_eq!(
            weak.report.flags(),
            &[
                ReportFlag::MissingCoordinates,
                ReportFlag::LowConfidence,
                ReportFlag::NoPhoto,
            ]
        );

        controller
            .moderate(&moderator, &weak.report.id, ModerationAction::Promote)
            .expect("promotion applied");
        controller
            .moderate(&moderator, &kept.report.id, ModerationAction::Flag)
            .expect("flag applied");

        (kept.report.id, weak.report.id)
    };

    let controller = open_controller(dir.path());
    let kept = controller.find(&kept_id).expect("kept report reloaded");
    assert_eq!(kept.status, ReportStatus::Flagged);
    assert_eq!(kept.channel.as_deref(), Some("sms"));
    assert!(kept.has_photo);

    let promoted = controller.find(&deleted_id).expect("promoted report reloaded");
    assert_eq!(promoted.status, ReportStatus::Validated);
    assert_eq!(promoted.confidence(), 40);

    let joseph_before = controller.points_for("Joseph");
    assert_eq!(joseph_before, 2 + 5);
    controller
        .moderate(&moderator, &deleted_id, ModerationAction::Delete)
        .expect("delete applied");
    assert_eq!(controller.points_for("Joseph"), joseph_before);

    let reloaded = JsonFileStore::open(dir.path())
        .expect("open store")
        .load()
        .expect("snapshot loads");
    assert_eq!(reloaded.reports.len(), 1);
    assert_eq!(reloaded.reports[0].id, kept_id);
    assert_eq!(reloaded.scores.get("Joseph"), Some(&7));

    let board = controller.leaderboard(20);
    assert_eq!(board[0].name, "Anitha");
    assert_eq!(board[0].points, 18);
    assert_eq!(board[0].badge, Badge::Beginner);
}

#[test]
fn contributors_climb_badge_tiers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let controller = open_controller(dir.path());
    let details = "Chainsaw crew felling mangroves for an illegal fish pond, logs loaded on a truck.";

    for _ in 0..6 {
        controller
            .submit(submission("Priya", details, true, "10.1", "76.3"))
            .expect("submission accepted");
    }

    let board = controller.leaderboard(1);
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].points, 6 * 18);
    assert_eq!(board[0].badge, Badge::Champion);
}
