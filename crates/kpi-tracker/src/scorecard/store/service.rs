use std::io::Read;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::repository::{RecordRepository, RepositoryError};
use crate::interchange::{
    details_text, DetailsReconstructor, InterchangeError, SpreadsheetExporter, SpreadsheetImporter,
};
use crate::scorecard::access::SessionContext;
use crate::scorecard::domain::{
    is_known_department, KpiRecord, Measurement, RecordId, RecordKey, STAGE_COUNT,
};
use crate::scorecard::normalizer::{normalize, renormalize, RecordDraft};
use crate::scorecard::report::{
    summarize, CategoryFilter, DashboardSummary, ScorePreview, ScoredRecordView,
};
use crate::scorecard::scoring::score;

/// Explicit sign-off for destructive actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Unconfirmed,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Self::Confirmed
        } else {
            Self::Unconfirmed
        }
    }
}

/// Result of a mutation plus whether the list reached storage.
#[derive(Debug, Clone, Serialize)]
pub struct CommitOutcome<T> {
    pub data: T,
    pub persisted: bool,
}

/// Single-field edit, addressed by [`RecordKey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FieldUpdate {
    Target(String),
    CountAchieved(String),
    AchievedDate(String),
    Numerator(String),
    Denominator(String),
    SelectedStage(Option<usize>),
    BudgetAllocated(String),
    BudgetSpent(String),
}

impl FieldUpdate {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Target(_) => "target",
            Self::CountAchieved(_) => "count_achieved",
            Self::AchievedDate(_) => "achieved_date",
            Self::Numerator(_) => "numerator",
            Self::Denominator(_) => "denominator",
            Self::SelectedStage(_) => "selected_stage",
            Self::BudgetAllocated(_) => "budget_allocated",
            Self::BudgetSpent(_) => "budget_spent",
        }
    }

    fn apply(self, record: &mut KpiRecord) -> Result<(), ScorecardError> {
        let field = self.name();
        let method = record.measurement.method_label().to_string();

        let applied = match (self, &mut record.measurement) {
            (Self::Target(value), _) => {
                record.target = value;
                true
            }
            (Self::BudgetAllocated(value), _) => {
                record.budget.allocated = value;
                true
            }
            (Self::BudgetSpent(value), _) => {
                record.budget.spent = value;
                true
            }
            (Self::CountAchieved(value), Measurement::Count(data)) => {
                data.achieved = value;
                true
            }
            (Self::AchievedDate(value), Measurement::Time(data)) => {
                data.achieved_date = value;
                true
            }
            (
                Self::Numerator(value),
                Measurement::Ratio(data) | Measurement::MinimumRatio(data),
            ) => {
                data.numerator = value;
                true
            }
            (
                Self::Denominator(value),
                Measurement::Ratio(data) | Measurement::MinimumRatio(data),
            ) => {
                data.denominator = value;
                true
            }
            (Self::SelectedStage(index), Measurement::StageProgress(data)) => {
                if let Some(index) = index.filter(|index| *index >= STAGE_COUNT) {
                    return Err(ScorecardError::StageOutOfRange {
                        index,
                        stages: STAGE_COUNT,
                    });
                }
                data.selected = index;
                true
            }
            _ => false,
        };

        if applied {
            Ok(())
        } else {
            Err(ScorecardError::FieldNotApplicable { field, method })
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub degraded_rows: Vec<usize>,
    pub score_mismatches: usize,
}

/// Error raised by the scorecard service.
#[derive(Debug, thiserror::Error)]
pub enum ScorecardError {
    #[error("session may not {0}")]
    Forbidden(&'static str),
    #[error("record {0} not found")]
    NotFound(String),
    #[error("unknown department '{0}'")]
    UnknownDepartment(String),
    #[error("field '{field}' does not apply to a '{method}' record")]
    FieldNotApplicable { field: &'static str, method: String },
    #[error("stage {index} does not exist; a ladder has {stages} stages")]
    StageOutOfRange { index: usize, stages: usize },
    #[error("{0} requires explicit confirmation")]
    ConfirmationRequired(&'static str),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Interchange(#[from] InterchangeError),
}

static RECORD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

const RECORD_ID_PREFIX: &str = "kpi-";

fn next_record_id() -> RecordId {
    let id = RECORD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RecordId(format!("{RECORD_ID_PREFIX}{id:06}"))
}

/// Move the sequence past every generated id already in `records`.
fn reserve_loaded_ids(records: &[KpiRecord]) {
    let highest = records
        .iter()
        .filter_map(|record| record.id.as_ref())
        .filter_map(|id| id.0.strip_prefix(RECORD_ID_PREFIX)?.parse::<u64>().ok())
        .max();
    if let Some(highest) = highest {
        RECORD_SEQUENCE.fetch_max(highest.saturating_add(1), Ordering::Relaxed);
    }
}

/// How a replace or delete picks its record.
#[derive(Debug, Clone, Copy)]
enum RecordAddress<'a> {
    Index(usize),
    Id(&'a RecordId),
}

impl RecordAddress<'_> {
    fn locate(self, records: &[KpiRecord]) -> Result<usize, ScorecardError> {
        match self {
            Self::Index(index) if index < records.len() => Ok(index),
            Self::Index(index) => Err(ScorecardError::NotFound(format!("#{index}"))),
            Self::Id(id) => records
                .iter()
                .position(|record| record.id.as_ref() == Some(id))
                .ok_or_else(|| ScorecardError::NotFound(id.to_string())),
        }
    }
}

/// Owns the ordered record list; every mutation goes through [`Self::commit`].
pub struct ScorecardService<R> {
    repository: Arc<R>,
    records: Mutex<Vec<KpiRecord>>,
}

impl<R> ScorecardService<R>
where
    R: RecordRepository + 'static,
{
    /// Start from whatever the repository holds, repairing each record.
    pub fn load(repository: Arc<R>) -> Result<Self, ScorecardError> {
        let records = repository.load_all()?;
        info!(records = records.len(), "scorecard records loaded");
        Ok(Self::with_records(repository, records))
    }

    pub fn with_records(repository: Arc<R>, records: Vec<KpiRecord>) -> Self {
        reserve_loaded_ids(&records);
        Self {
            repository,
            records: Mutex::new(records.into_iter().map(renormalize).collect()),
        }
    }

    pub fn snapshot(&self) -> Vec<KpiRecord> {
        self.lock().clone()
    }

    /// Records the session may see, with their list positions.
    pub fn list(&self, session: &SessionContext) -> Vec<ScoredRecordView> {
        self.lock()
            .iter()
            .enumerate()
            .filter(|(_, record)| session.can_view(record))
            .map(|(index, record)| ScoredRecordView {
                index,
                record: record.clone(),
                score: score(record),
            })
            .collect()
    }

    pub fn create(
        &self,
        session: &SessionContext,
        draft: RecordDraft,
    ) -> Result<CommitOutcome<ScoredRecordView>, ScorecardError> {
        if !session.can_manage() {
            return Err(ScorecardError::Forbidden("create records"));
        }
        let mut record = form_record(draft)?;
        record.id = Some(next_record_id());

        self.commit(|records| {
            records.push(record.clone());
            Ok(ScoredRecordView {
                index: records.len() - 1,
                score: score(&record),
                record,
            })
        })
    }

    pub fn replace(
        &self,
        session: &SessionContext,
        index: usize,
        draft: RecordDraft,
    ) -> Result<CommitOutcome<ScoredRecordView>, ScorecardError> {
        self.replace_at(session, RecordAddress::Index(index), draft)
    }

    pub fn replace_by_id(
        &self,
        session: &SessionContext,
        id: &RecordId,
        draft: RecordDraft,
    ) -> Result<CommitOutcome<ScoredRecordView>, ScorecardError> {
        self.replace_at(session, RecordAddress::Id(id), draft)
    }

    pub fn delete(
        &self,
        session: &SessionContext,
        index: usize,
        confirmation: Confirmation,
    ) -> Result<CommitOutcome<KpiRecord>, ScorecardError> {
        self.delete_at(session, RecordAddress::Index(index), confirmation)
    }

    pub fn delete_by_id(
        &self,
        session: &SessionContext,
        id: &RecordId,
        confirmation: Confirmation,
    ) -> Result<CommitOutcome<KpiRecord>, ScorecardError> {
        self.delete_at(session, RecordAddress::Id(id), confirmation)
    }

    fn replace_at(
        &self,
        session: &SessionContext,
        address: RecordAddress<'_>,
        draft: RecordDraft,
    ) -> Result<CommitOutcome<ScoredRecordView>, ScorecardError> {
        if !session.can_manage() {
            return Err(ScorecardError::Forbidden("replace records"));
        }
        let mut record = form_record(draft)?;

        self.commit(|records| {
            let index = address.locate(records)?;
            let slot = &mut records[index];
            record.id = slot.id.take().or_else(|| Some(next_record_id()));
            *slot = record.clone();
            Ok(ScoredRecordView {
                index,
                score: score(&record),
                record,
            })
        })
    }

    fn delete_at(
        &self,
        session: &SessionContext,
        address: RecordAddress<'_>,
        confirmation: Confirmation,
    ) -> Result<CommitOutcome<KpiRecord>, ScorecardError> {
        if !session.can_manage() {
            return Err(ScorecardError::Forbidden("delete records"));
        }
        if confirmation != Confirmation::Confirmed {
            return Err(ScorecardError::ConfirmationRequired("deleting a record"));
        }

        self.commit(|records| {
            let index = address.locate(records)?;
            Ok(records.remove(index))
        })
    }

    /// Edit one field of the first record matching `key`.
    pub fn update_field(
        &self,
        session: &SessionContext,
        key: &RecordKey,
        update: FieldUpdate,
    ) -> Result<CommitOutcome<ScoredRecordView>, ScorecardError> {
        self.commit(|records| {
            let (index, record) = records
                .iter_mut()
                .enumerate()
                .find(|(_, record)| record.matches_key(key))
                .ok_or_else(|| {
                    ScorecardError::NotFound(format!("{} / {}", key.department, key.statement))
                })?;
            if !session.can_update_fields(record) {
                return Err(ScorecardError::Forbidden("update this record"));
            }

            let mut edited = record.clone();
            update.apply(&mut edited)?;
            *record = renormalize(edited);
            Ok(ScoredRecordView {
                index,
                score: score(record),
                record: record.clone(),
            })
        })
    }

    /// Replace the whole list with the rows of a sheet.
    pub fn import_sheet<D, Rd>(
        &self,
        session: &SessionContext,
        importer: &SpreadsheetImporter<D>,
        reader: Rd,
        confirmation: Confirmation,
    ) -> Result<CommitOutcome<ImportSummary>, ScorecardError>
    where
        D: DetailsReconstructor,
        Rd: Read,
    {
        if !session.can_manage() {
            return Err(ScorecardError::Forbidden("import records"));
        }
        if confirmation != Confirmation::Confirmed {
            return Err(ScorecardError::ConfirmationRequired(
                "importing over the current records",
            ));
        }
        let report = importer.from_reader(reader)?;

        self.commit(|records| {
            let summary = ImportSummary {
                imported: report.records.len(),
                degraded_rows: report.degraded_rows,
                score_mismatches: report.score_mismatches,
            };
            *records = report.records;
            Ok(summary)
        })
    }

    /// CSV bytes of the records the session may see.
    pub fn export_sheet(&self, session: &SessionContext) -> Result<Vec<u8>, ScorecardError> {
        let visible = self.visible(session);
        Ok(SpreadsheetExporter::to_bytes(&visible)?)
    }

    pub fn summary(&self, session: &SessionContext, filter: CategoryFilter) -> DashboardSummary {
        summarize(&self.visible(session), filter)
    }

    fn visible(&self, session: &SessionContext) -> Vec<KpiRecord> {
        self.lock()
            .iter()
            .filter(|record| session.can_view(record))
            .cloned()
            .collect()
    }

    /// Apply `mutate` to the list, then persist the whole list.
    ///
    /// A storage failure is logged and reported through `persisted`; the
    /// in-memory list keeps the change.
    fn commit<T>(
        &self,
        mutate: impl FnOnce(&mut Vec<KpiRecord>) -> Result<T, ScorecardError>,
    ) -> Result<CommitOutcome<T>, ScorecardError> {
        let mut records = self.lock();
        let data = mutate(&mut *records)?;

        let persisted = match self.repository.save_all(records.as_slice()) {
            Ok(()) => true,
            Err(error) => {
                warn!(%error, records = records.len(), "failed to persist scorecard records");
                false
            }
        };

        Ok(CommitOutcome { data, persisted })
    }

    fn lock(&self) -> MutexGuard<'_, Vec<KpiRecord>> {
        self.records.lock().expect("scorecard mutex poisoned")
    }
}

/// Score a draft without storing it.
pub fn preview(draft: RecordDraft) -> ScorePreview {
    let record = normalize(draft);
    ScorePreview {
        score: score(&record),
        details: details_text(&record),
        record,
    }
}

fn form_record(draft: RecordDraft) -> Result<KpiRecord, ScorecardError> {
    let record = normalize(draft);
    if !is_known_department(&record.department) {
        return Err(ScorecardError::UnknownDepartment(record.department));
    }
    Ok(record)
}
