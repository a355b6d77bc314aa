use axum::response::Response;
use serde_json::Value;
use std::sync::{Arc, Mutex};

use crate::scorecard::domain::{CountData, KpiRecord, RatioData};
use crate::scorecard::normalizer::{normalize, RecordDraft};
use crate::scorecard::store::repository::{RecordRepository, RepositoryError};
use crate::scorecard::store::router::scorecard_router;
use crate::scorecard::store::service::ScorecardService;

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) saved: Arc<Mutex<Vec<KpiRecord>>>,
    pub(super) saves: Arc<Mutex<usize>>,
}

impl MemoryRepository {
    pub(super) fn saved(&self) -> Vec<KpiRecord> {
        self.saved.lock().expect("repository mutex poisoned").clone()
    }

    pub(super) fn save_count(&self) -> usize {
        *self.saves.lock().expect("repository mutex poisoned")
    }
}

impl RecordRepository for MemoryRepository {
    fn load_all(&self) -> Result<Vec<KpiRecord>, RepositoryError> {
        Ok(self.saved())
    }

    fn save_all(&self, records: &[KpiRecord]) -> Result<(), RepositoryError> {
        *self.saved.lock().expect("repository mutex poisoned") = records.to_vec();
        *self.saves.lock().expect("repository mutex poisoned") += 1;
        Ok(())
    }
}

pub(super) struct UnavailableRepository;

impl RecordRepository for UnavailableRepository {
    fn load_all(&self) -> Result<Vec<KpiRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }

    fn save_all(&self, _records: &[KpiRecord]) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }
}

pub(super) fn count_draft(department: &str, statement: &str, achieved: &str) -> RecordDraft {
    RecordDraft {
        department: department.to_string(),
        main_category: Some("KPI".to_string()),
        statement: statement.to_string(),
        target: "200".to_string(),
        method: "Bilangan".to_string(),
        count: Some(CountData {
            achieved: achieved.to_string(),
        }),
        budget_allocated: "1000".to_string(),
        budget_spent: "250".to_string(),
        ..RecordDraft::default()
    }
}

pub(super) fn ratio_draft(department: &str, statement: &str) -> RecordDraft {
    RecordDraft {
        department: department.to_string(),
        main_category: Some("SKU".to_string()),
        statement: statement.to_string(),
        target: "90".to_string(),
        method: "Peratus".to_string(),
        ratio: Some(RatioData {
            numerator: "80".to_string(),
            denominator: "100".to_string(),
            ..RatioData::default()
        }),
        ..RecordDraft::default()
    }
}

pub(super) fn seeded_records() -> Vec<KpiRecord> {
    vec![
        normalize(count_draft("BKP", "Bilangan program dakwah", "250")),
        normalize(ratio_draft("MCP", "Peratus kutipan")),
        normalize(count_draft("BKP", "Bilangan kursus", "50")),
    ]
}

pub(super) fn build_service() -> (Arc<ScorecardService<MemoryRepository>>, MemoryRepository) {
    let repository = MemoryRepository::default();
    let service =
        ScorecardService::with_records(Arc::new(repository.clone()), seeded_records());
    (Arc::new(service), repository)
}

pub(super) fn router_with_service(
    service: Arc<ScorecardService<MemoryRepository>>,
) -> axum::Router {
    scorecard_router(service)
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    serde_json::from_slice(&read_body(response).await).expect("json payload")
}
