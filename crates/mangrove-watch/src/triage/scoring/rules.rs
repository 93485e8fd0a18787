use super::{ScoreComponent, ScoreFactor, ScoringInput};
use crate::triage::domain::parse_coordinate;

pub const MIN_CONFIDENCE: u8 = 5;
pub const MAX_CONFIDENCE: u8 = 99;

const BASE_SCORE: i16 = 40;
const CHARS_PER_LENGTH_POINT: usize = 20;
const MAX_LENGTH_BONUS: usize = 30;
const PHOTO_BONUS: i16 = 15;
const EQUIPMENT_BONUS: i16 = 10;
const ACTIVITY_BONUS: i16 = 8;
const LATITUDE_BONUS: i16 = 5;
const LATITUDE_BAND_DEGREES: f64 = 35.0;

const EQUIPMENT_TERMS: [&str; 8] = [
    "boat", "chainsaw", "truck", "oil", "dump", "cut", "stump", "logging",
];
const ACTIVITY_TERMS: [&str; 5] = ["illegal", "reclamation", "spoil", "backhoe", "bulldozer"];

pub(crate) struct ScoreSignals {
    pub confidence: u8,
    pub coordinates_missing: bool,
    pub has_photo: bool,
}

pub(crate) fn score_submission(input: &ScoringInput<'_>) -> (Vec<ScoreComponent>, ScoreSignals) {
    let mut components = vec![ScoreComponent {
        factor: ScoreFactor::Base,
        points: BASE_SCORE,
        notes: "base credibility".to_string(),
    }];
    let mut total = BASE_SCORE;

    // Length is measured in UTF-16 code units.
    let length = input.details.trim().encode_utf16().count();
    let length_bonus = (length / CHARS_PER_LENGTH_POINT).min(MAX_LENGTH_BONUS) as i16;
    if length_bonus > 0 {
        components.push(ScoreComponent {
            factor: ScoreFactor::DetailLength,
            points: length_bonus,
            notes: format!("{length} characters of detail"),
        });
        total += length_bonus;
    }

    if input.has_photo {
        components.push(ScoreComponent {
            factor: ScoreFactor::Photo,
            points: PHOTO_BONUS,
            notes: "photo attached".to_string(),
        });
        total += PHOTO_BONUS;
    }

    let lowered = input.details.to_lowercase();
    if let Some(term) = first_match(&lowered, &EQUIPMENT_TERMS) {
        components.push(ScoreComponent {
            factor: ScoreFactor::EquipmentKeywords,
            points: EQUIPMENT_BONUS,
            notes: format!("mentions '{term}'"),
        });
        total += EQUIPMENT_BONUS;
    }
    if let Some(term) = first_match(&lowered, &ACTIVITY_TERMS) {
        components.push(ScoreComponent {
            factor: ScoreFactor::ActivityKeywords,
            points: ACTIVITY_BONUS,
            notes: format!("mentions '{term}'"),
        });
        total += ACTIVITY_BONUS;
    }

    let latitude = input.latitude.and_then(parse_coordinate);
    let longitude = input.longitude.and_then(parse_coordinate);
    if let Some(lat) = latitude.filter(|lat| lat.abs() <= LATITUDE_BAND_DEGREES) {
        components.push(ScoreComponent {
            factor: ScoreFactor::LatitudeBand,
            points: LATITUDE_BONUS,
            notes: format!("latitude {lat} within {LATITUDE_BAND_DEGREES} degrees of the equator"),
        });
        total += LATITUDE_BONUS;
    }

    let clamped = total.clamp(MIN_CONFIDENCE as i16, MAX_CONFIDENCE as i16);
    if clamped != total {
        components.push(ScoreComponent {
            factor: ScoreFactor::Clamp,
            points: clamped - total,
            notes: format!("raw score {total} clamped to {clamped}"),
        });
    }

    let signals = ScoreSignals {
        confidence: clamped as u8,
        coordinates_missing: latitude.is_none() || longitude.is_none(),
        has_photo: input.has_photo,
    };

    (components, signals)
}

fn first_match<'t>(haystack: &str, terms: &[&'t str]) -> Option<&'t str> {
    terms.iter().copied().find(|term| haystack.contains(term))
}
