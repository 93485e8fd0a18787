use super::rules::ScoreSignals;
use super::ReportFlag;
use crate::triage::domain::ReportStatus;

/// Scores at or above this value are validated automatically.
pub const VALIDATED_AT: u8 = 70;
/// Scores below this value are flagged automatically.
pub const FLAGGED_BELOW: u8 = 45;
/// Scores below this value carry the low-confidence advisory.
pub const LOW_CONFIDENCE_BELOW: u8 = 50;

/// Initial triage status for a clamped confidence score.
pub fn derive_status(confidence: u8) -> ReportStatus {
    if confidence >= VALIDATED_AT {
        ReportStatus::Validated
    } else if confidence < FLAGGED_BELOW {
        ReportStatus::Flagged
    } else {
        ReportStatus::Submitted
    }
}

pub(crate) fn collect_flags(signals: &ScoreSignals) -> Vec<ReportFlag> {
    let mut flags = Vec::new();
    if signals.coordinates_missing {
        flags.push(ReportFlag::MissingCoordinates);
    }
    if signals.confidence < LOW_CONFIDENCE_BELOW {
        flags.push(ReportFlag::LowConfidence);
    }
    if !signals.has_photo {
        flags.push(ReportFlag::NoPhoto);
    }
    flags
}
