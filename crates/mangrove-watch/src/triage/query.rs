use serde::Deserialize;

use super::domain::Report;

/// Feed filter: exact status label plus case-insensitive text over reporter, category and status.
///
/// Blank values match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "q")]
    pub text: Option<String>,
}

impl ReportQuery {
    pub fn matches(&self, report: &Report) -> bool {
        let status = report.status.label();

        if let Some(wanted) = self.status.as_deref().filter(|value| !value.is_empty()) {
            if wanted != status {
                return false;
            }
        }

        match self.text.as_deref().filter(|value| !value.is_empty()) {
            None => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                [report.reporter_name.as_str(), report.category.as_str(), status]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
        }
    }
}
