use crate::scorecard::domain::KpiRecord;

/// Storage abstraction for the whole record list.
///
/// `save_all` replaces everything stored; adapters must make that atomic.
pub trait RecordRepository: Send + Sync {
    fn load_all(&self) -> Result<Vec<KpiRecord>, RepositoryError>;
    fn save_all(&self, records: &[KpiRecord]) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored records could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
