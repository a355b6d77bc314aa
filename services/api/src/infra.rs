use kpi_tracker::scorecard::{KpiRecord, RecordRepository, RepositoryError};
use metrics_exporter_prometheus::PrometheusHandle;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Keeps the whole record list as one pretty-printed JSON array.
///
/// A missing file reads as an empty list. Writes go to a sibling temp file
/// that is renamed over the original.
#[derive(Debug, Clone)]
pub(crate) struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "kpi_records.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl RecordRepository for JsonFileRepository {
    fn load_all(&self) -> Result<Vec<KpiRecord>, RepositoryError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored records yet");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn save_all(&self, records: &[KpiRecord]) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(records)?;
        let staging = self.staging_path();
        fs::write(&staging, payload)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

/// Process-local storage for `serve --in-memory`.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRecordRepository {
    records: Arc<Mutex<Vec<KpiRecord>>>,
}

impl InMemoryRecordRepository {
    pub(crate) fn seeded(records: Vec<KpiRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }
}

impl RecordRepository for InMemoryRecordRepository {
    fn load_all(&self) -> Result<Vec<KpiRecord>, RepositoryError> {
        Ok(self.records.lock().expect("repository mutex poisoned").clone())
    }

    fn save_all(&self, records: &[KpiRecord]) -> Result<(), RepositoryError> {
        *self.records.lock().expect("repository mutex poisoned") = records.to_vec();
        Ok(())
    }
}
