use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::scoring::{Assessment, ReportFlag};

/// Identifier wrapper for submitted reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(pub String);

impl ReportId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque reference to a photo stored outside the engine (data URL, object key, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoAttachment(pub String);

/// Raw submission as received from the reporting form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSubmission {
    pub reporter_name: String,
    pub category: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub photo: Option<PhotoAttachment>,
}

impl ReportSubmission {
    /// Attachments with an empty reference count as no photo.
    pub fn has_photo(&self) -> bool {
        self.photo
            .as_ref()
            .map(|attachment| !attachment.0.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Coordinates as far as they could be parsed; either half may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Location {
    pub fn parse(latitude: Option<&str>, longitude: Option<&str>) -> Self {
        Self {
            latitude: latitude.and_then(parse_coordinate),
            longitude: longitude.and_then(parse_coordinate),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Blank, non-numeric and non-finite inputs are all treated as missing.
pub fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Triage state of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
    Submitted,
    Validated,
    Flagged,
}

impl ReportStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReportStatus::Submitted => "Submitted",
            ReportStatus::Validated => "Validated",
            ReportStatus::Flagged => "Flagged",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim() {
            "Submitted" => Some(Self::Submitted),
            "Validated" => Some(Self::Validated),
            "Flagged" => Some(Self::Flagged),
            _ => None,
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single incident submission plus its frozen assessment and current moderation status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub submitted_at: DateTime<Utc>,
    pub reporter_name: String,
    pub category: String,
    pub details: String,
    pub location: Location,
    pub has_photo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<PhotoAttachment>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    pub assessment: Assessment,
    pub status: ReportStatus,
}

impl Report {
    pub fn confidence(&self) -> u8 {
        self.assessment.confidence
    }

    pub fn flags(&self) -> &[ReportFlag] {
        &self.assessment.flags
    }
}

/// Actions a moderator may apply to an existing report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    Promote,
    Flag,
    Delete,
}

impl ModerationAction {
    pub const fn label(self) -> &'static str {
        match self {
            ModerationAction::Promote => "promote",
            ModerationAction::Flag => "flag",
            ModerationAction::Delete => "delete",
        }
    }
}

/// Capability proving the caller was authorized as a moderator by an external check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeratorGrant {
    moderator: String,
}

impl ModeratorGrant {
    pub fn new(moderator: impl Into<String>) -> Self {
        Self {
            moderator: moderator.into(),
        }
    }

    pub fn moderator(&self) -> &str {
        &self.moderator
    }
}

/// Verifies moderator credentials presented at the HTTP boundary.
pub trait ModeratorAuthorizer: Send + Sync {
    fn authorize(&self, credential: &str) -> Option<ModeratorGrant>;
}
