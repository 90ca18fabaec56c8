use std::sync::RwLock;

use time::OffsetDateTime;

use crate::errors::StoreError;
use crate::report::{seed_reports, Report};
use crate::store::ReportStore;

/// An in-memory store for tests. Mirrors the blob semantics of
/// [`crate::store::JsonStore`] without touching the filesystem.
#[derive(Default)]
pub struct MockStore {
    reports: RwLock<Vec<Report>>,
}

impl MockStore {
    pub fn new() -> Self {
        MockStore::default()
    }

    /// Creates a store already holding the given reports.
    pub fn with_reports(reports: Vec<Report>) -> Self {
        MockStore {
            reports: RwLock::new(reports),
        }
    }
}

impl ReportStore for MockStore {
    fn load(&self) -> Result<Vec<Report>, StoreError> {
        Ok(self.reports.read().expect("mock store lock").clone())
    }

    fn save(&self, reports: &[Report]) -> Result<(), StoreError> {
        *self.reports.write().expect("mock store lock") = reports.to_vec();

        Ok(())
    }

    fn append(&self, report: Report) -> Result<(), StoreError> {
        let mut reports = self.reports.write().expect("mock store lock");

        if reports.iter().any(|r| r.id() == report.id()) {
            return Err(StoreError::DuplicateId(report.id().to_owned()));
        }

        reports.push(report);

        Ok(())
    }

    fn seed_if_empty(&self, now: OffsetDateTime) -> Result<usize, StoreError> {
        let mut reports = self.reports.write().expect("mock store lock");

        if !reports.is_empty() {
            return Ok(0);
        }

        let seeds = seed_reports(now);
        let count = seeds.len();
        *reports = seeds;

        Ok(count)
    }
}
