use clap::Args;
use mangrove_watch::config::AppConfig;
use mangrove_watch::error::AppError;
use mangrove_watch::triage::{
    submission_points, JsonFileStore, ScoringEngine, ScoringInput, ScoringOutcome,
    TriageController,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct ScoreArgs {
    /// Free-text description of the incident
    #[arg(long, default_value = "")]
    pub(crate) details: String,
    /// Category label recorded with the report
    #[arg(long, default_value = "Other")]
    pub(crate) category: String,
    /// Treat the report as having a photo attached
    #[arg(long)]
    pub(crate) photo: bool,
    /// Latitude as typed by the reporter
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) lat: Option<String>,
    /// Longitude as typed by the reporter
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) lng: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct LeaderboardArgs {
    /// Data directory holding the snapshot (defaults to APP_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Number of contributors to show (defaults to APP_LEADERBOARD_LIMIT)
    #[arg(long)]
    pub(crate) limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScorePreview {
    #[serde(flatten)]
    pub(crate) outcome: ScoringOutcome,
    pub(crate) points_on_submit: u32,
}

pub(crate) fn preview_score(args: &ScoreArgs) -> ScorePreview {
    let details = args.details.trim();
    let outcome = ScoringEngine::new().evaluate(&ScoringInput {
        details,
        has_photo: args.photo,
        category: &args.category,
        latitude: args.lat.as_deref(),
        longitude: args.lng.as_deref(),
    });
    let points_on_submit =
        submission_points(outcome.confidence, details.chars().count(), args.photo);

    ScorePreview {
        outcome,
        points_on_submit,
    }
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let preview = preview_score(&args);
    let rendered = serde_json::to_string_pretty(&preview).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}

pub(crate) fn run_leaderboard(args: LeaderboardArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let data_dir = args.data_dir.unwrap_or(config.storage.data_dir);
    let limit = args.limit.unwrap_or(config.triage.leaderboard_limit);

    let store = Arc::new(JsonFileStore::open(data_dir)?);
    let controller = TriageController::load(store, config.triage.policy())?;

    let entries = controller.leaderboard(limit);
    if entries.is_empty() {
        println!("No contributors yet.");
        return Ok(());
    }
    for entry in entries {
        println!(
            "#{} {} - {} pts · {}",
            entry.rank, entry.name, entry.points, entry.badge
        );
    }
    Ok(())
}
