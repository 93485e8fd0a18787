use super::domain::{Report, ReportId, ReportStatus};

/// Error enumeration for report store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("report {0} already exists")]
    DuplicateId(ReportId),
    #[error("report {0} not found")]
    NotFound(ReportId),
}

/// Reports in insertion order, keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportStore {
    reports: Vec<Report>,
}

impl ReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a persisted snapshot, rejecting repeated ids.
    pub fn from_snapshot(reports: Vec<Report>) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for report in reports {
            store.insert(report)?;
        }
        Ok(store)
    }

    pub fn insert(&mut self, report: Report) -> Result<(), StoreError> {
        if self.position(&report.id).is_some() {
            return Err(StoreError::DuplicateId(report.id));
        }
        self.reports.push(report);
        Ok(())
    }

    pub fn find(&self, id: &ReportId) -> Option<&Report> {
        self.reports.iter().find(|report| &report.id == id)
    }

    /// Set a report's status and return the previous one. No other field changes.
    pub fn update_status(
        &mut self,
        id: &ReportId,
        status: ReportStatus,
    ) -> Result<ReportStatus, StoreError> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let report = &mut self.reports[index];
        let previous = report.status;
        report.status = status;
        Ok(previous)
    }

    pub fn delete(&mut self, id: &ReportId) -> Result<Report, StoreError> {
        self.take(id).map(|(_, report)| report)
    }

    /// Remove a report and return it with the slot it occupied.
    pub(crate) fn take(&mut self, id: &ReportId) -> Result<(usize, Report), StoreError> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        Ok((index, self.reports.remove(index)))
    }

    /// Put a report taken with [`ReportStore::take`] back into its slot.
    pub(crate) fn restore(&mut self, index: usize, report: Report) {
        let index = index.min(self.reports.len());
        self.reports.insert(index, report);
    }

    /// Most recent first; equal timestamps keep insertion order.
    pub fn list_sorted(&self) -> Vec<&Report> {
        let mut sorted: Vec<&Report> = self.reports.iter().collect();
        sorted.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        sorted
    }

    pub fn as_slice(&self) -> &[Report] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    fn position(&self, id: &ReportId) -> Option<usize> {
        self.reports.iter().position(|report| &report.id == id)
    }
}
