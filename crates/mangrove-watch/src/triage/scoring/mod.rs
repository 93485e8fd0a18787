mod policy;
mod rules;

pub use policy::{derive_status, FLAGGED_BELOW, LOW_CONFIDENCE_BELOW, VALIDATED_AT};
pub use rules::{MAX_CONFIDENCE, MIN_CONFIDENCE};

use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::ReportStatus;
use policy::collect_flags;

/// Fields of a submission the heuristic looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringInput<'a> {
    pub details: &'a str,
    pub has_photo: bool,
    pub category: &'a str,
    pub latitude: Option<&'a str>,
    pub longitude: Option<&'a str>,
}

/// Deterministic credibility heuristic for incident reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, input: &ScoringInput<'_>) -> ScoringOutcome {
        let (components, signals) = rules::score_submission(input);
        let status = derive_status(signals.confidence);
        let flags = collect_flags(&signals);

        ScoringOutcome {
            confidence: signals.confidence,
            flags,
            status,
            components,
        }
    }
}

/// Advisory note explaining a weakness in a report's evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportFlag {
    #[serde(rename = "Missing coordinates")]
    MissingCoordinates,
    #[serde(rename = "Low confidence – needs moderator review")]
    LowConfidence,
    #[serde(rename = "No photo attached")]
    NoPhoto,
}

impl ReportFlag {
    pub const fn label(self) -> &'static str {
        match self {
            ReportFlag::MissingCoordinates => "Missing coordinates",
            ReportFlag::LowConfidence => "Low confidence – needs moderator review",
            ReportFlag::NoPhoto => "No photo attached",
        }
    }
}

impl fmt::Display for ReportFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Heuristic factors, kept so every point of a confidence score can be traced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    Base,
    DetailLength,
    Photo,
    EquipmentKeywords,
    ActivityKeywords,
    LatitudeBand,
    Clamp,
}

/// Discrete contribution to a confidence score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub points: i16,
    pub notes: String,
}

/// Full result of a scoring pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringOutcome {
    pub confidence: u8,
    pub flags: Vec<ReportFlag>,
    pub status: ReportStatus,
    pub components: Vec<ScoreComponent>,
}

impl ScoringOutcome {
    /// Splits the outcome into the frozen assessment and the initial triage status.
    pub fn into_parts(self) -> (Assessment, ReportStatus) {
        let assessment = Assessment {
            confidence: self.confidence,
            flags: self.flags,
            components: self.components,
        };
        (assessment, self.status)
    }
}

/// Assessment stored on a report at creation and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub confidence: u8,
    pub flags: Vec<ReportFlag>,
    #[serde(default)]
    pub components: Vec<ScoreComponent>,
}
