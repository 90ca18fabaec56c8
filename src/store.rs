use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use slog::{warn, Logger};
use tempfile::NamedTempFile;
use time::OffsetDateTime;

use crate::errors::StoreError;
use crate::report::{seed_reports, Report};

pub mod mock;

/// The persistence seam for the report collection.
///
/// Every operation works on the full collection: the backing slot is
/// a single serialized blob, read and rewritten wholesale. Storage
/// order is insertion order; callers apply presentation order
/// themselves (see [`crate::queries::sort_by_recency`]).
pub trait ReportStore: Send + Sync {
    /// Returns the persisted collection. An absent or malformed blob
    /// yields an empty collection; this never fails hard on bad data.
    fn load(&self) -> Result<Vec<Report>, StoreError>;

    /// Serializes and persists the full collection, overwriting
    /// whatever was there. There is no partial or merge write.
    fn save(&self, reports: &[Report]) -> Result<(), StoreError>;

    /// Read-modify-write insertion of one report. Rejects reference
    /// numbers that are already present.
    fn append(&self, report: Report) -> Result<(), StoreError>;

    /// Populates the collection with the synthetic bootstrap records
    /// when it is empty. Returns the number of records inserted,
    /// which is zero when the collection already had content.
    fn seed_if_empty(&self, now: OffsetDateTime) -> Result<usize, StoreError>;
}

/// The persisted blob, carrying an explicit schema tag so format
/// changes are detected by construction rather than by probing for
/// fields. Anything that fails to decode as a known variant is
/// treated as legacy or garbage by [`JsonStore::load`].
#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "schema")]
enum Blob {
    #[serde(rename = "ethicsline/reports/v2")]
    V2 { reports: Vec<Report> },
}

/// A store that keeps the whole collection in one JSON file.
pub struct JsonStore {
    path: PathBuf,
    logger: Logger,

    // serializes read-modify-write cycles within this process; the
    // single-writer assumption covers everything outside it
    write_lock: Mutex<()>,
}

impl JsonStore {
    /// Creates a new instance over the given blob file. The file does
    /// not have to exist yet.
    pub fn new(path: impl Into<PathBuf>, logger: Logger) -> Self {
        JsonStore {
            path: path.into(),
            logger,
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_env(logger: Logger) -> Result<Self, StoreError> {
        use crate::config::get_variable;

        let path = PathBuf::from(get_variable("ETHICSLINE_STORE_FILE"));

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(JsonStore::new(path, logger))
    }

    fn read_blob(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_blob(&self, reports: &[Report]) -> Result<(), StoreError> {
        let blob = Blob::V2 {
            reports: reports.to_vec(),
        };
        let json = serde_json::to_string(&blob)?;

        let directory = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut file = NamedTempFile::new_in(directory)?;
        file.write_all(json.as_bytes())?;
        file.persist(&self.path)?;

        Ok(())
    }
}

impl ReportStore for JsonStore {
    fn load(&self) -> Result<Vec<Report>, StoreError> {
        let raw = match self.read_blob()? {
            Some(raw) => raw,
            None => return Ok(vec![]),
        };

        match serde_json::from_str(&raw) {
            Ok(Blob::V2 { reports }) => Ok(reports),
            Err(_) => {
                if is_legacy_payload(&raw) {
                    // records predating the schema tag are discarded
                    // wholesale, never repaired per record
                    warn!(self.logger, "legacy report data detected; resetting store"; "path" => %self.path.display());
                    self.save(&[])?;
                } else {
                    warn!(self.logger, "malformed report data; treating store as empty"; "path" => %self.path.display());
                }

                Ok(vec![])
            }
        }
    }

    fn save(&self, reports: &[Report]) -> Result<(), StoreError> {
        self.write_blob(reports)
    }

    fn append(&self, report: Report) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().expect("store write lock poisoned");

        let mut reports = self.load()?;

        if reports.iter().any(|r| r.id() == report.id()) {
            return Err(StoreError::DuplicateId(report.id().to_owned()));
        }

        reports.push(report);
        self.write_blob(&reports)
    }

    fn seed_if_empty(&self, now: OffsetDateTime) -> Result<usize, StoreError> {
        let _guard = self.write_lock.lock().expect("store write lock poisoned");

        if !self.load()?.is_empty() {
            return Ok(0);
        }

        let seeds = seed_reports(now);
        let count = seeds.len();
        self.write_blob(&seeds)?;

        Ok(count)
    }
}

/// An old-format payload was a bare top-level array of records.
fn is_legacy_payload(raw: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(raw)
        .map(|value| value.is_array())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use slog::{o, Discard};
    use time::OffsetDateTime;

    use super::*;
    use crate::report::seed_reports;

    fn test_store(directory: &tempfile::TempDir) -> JsonStore {
        JsonStore::new(
            directory.path().join("reports.json"),
            Logger::root(Discard, o!()),
        )
    }

    #[test]
    fn missing_blob_loads_as_empty() {
        let directory = tempfile::tempdir().expect("create temp dir");
        let store = test_store(&directory);

        assert!(store.load().expect("load missing blob").is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let directory = tempfile::tempdir().expect("create temp dir");
        let store = test_store(&directory);
        let reports = seed_reports(OffsetDateTime::now_utc());

        store.save(&reports).expect("save reports");

        assert_eq!(store.load().expect("load reports"), reports);
    }

    #[test]
    fn append_preserves_insertion_order() {
        let directory = tempfile::tempdir().expect("create temp dir");
        let store = test_store(&directory);
        let reports = seed_reports(OffsetDateTime::now_utc());

        for report in reports.iter().cloned() {
            store.append(report).expect("append report");
        }

        let loaded = store.load().expect("load reports");
        let ids: Vec<&str> = loaded.iter().map(|r| r.id()).collect();
        let expected: Vec<&str> = reports.iter().map(|r| r.id()).collect();

        assert_eq!(ids, expected);
    }

    #[test]
    fn append_rejects_duplicate_ids() {
        let directory = tempfile::tempdir().expect("create temp dir");
        let store = test_store(&directory);
        let reports = seed_reports(OffsetDateTime::now_utc());

        store.append(reports[0].clone()).expect("first append");
        let error = store
            .append(reports[0].clone())
            .expect_err("duplicate append must fail");

        assert!(matches!(error, StoreError::DuplicateId(ref id) if id == reports[0].id()));
    }

    #[test]
    fn seed_if_empty_populates_exactly_six_records() {
        let directory = tempfile::tempdir().expect("create temp dir");
        let store = test_store(&directory);

        let inserted = store
            .seed_if_empty(OffsetDateTime::now_utc())
            .expect("seed empty store");

        assert_eq!(inserted, 6);
        assert_eq!(store.load().expect("load seeds").len(), 6);
    }

    #[test]
    fn seed_if_empty_is_a_noop_on_populated_stores() {
        let directory = tempfile::tempdir().expect("create temp dir");
        let store = test_store(&directory);
        let reports = seed_reports(OffsetDateTime::now_utc());

        store.append(reports[0].clone()).expect("append report");
        let inserted = store
            .seed_if_empty(OffsetDateTime::now_utc())
            .expect("seed populated store");

        assert_eq!(inserted, 0);
        assert_eq!(store.load().expect("load reports").len(), 1);
    }

    #[test]
    fn legacy_array_payload_resets_the_store() {
        let directory = tempfile::tempdir().expect("create temp dir");
        let store = test_store(&directory);

        std::fs::write(
            directory.path().join("reports.json"),
            r#"[{"id":"ETH-2019-00001","submittedAt":"2019-05-01T00:00:00+0000"}]"#,
        )
        .expect("write legacy blob");

        assert!(store.load().expect("load legacy blob").is_empty());

        // the reset is destructive: the blob is now a tagged empty
        // collection, so a reload stays empty without warning again
        let raw =
            std::fs::read_to_string(directory.path().join("reports.json")).expect("reread blob");
        assert!(raw.contains("ethicsline/reports/v2"));
    }

    #[test]
    fn garbage_payload_loads_as_empty() {
        let directory = tempfile::tempdir().expect("create temp dir");
        let store = test_store(&directory);

        std::fs::write(directory.path().join("reports.json"), "not json at all")
            .expect("write garbage");

        assert!(store.load().expect("load garbage blob").is_empty());
    }
}
