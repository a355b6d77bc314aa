pub mod access;
pub mod domain;
pub mod normalizer;
pub mod numeric;
pub mod report;
pub mod scoring;
pub mod store;

pub use access::{Role, SessionContext};
pub use domain::{
    Budget, CountData, KpiRecord, MainCategory, Measurement, MethodKind, RatioData, RecordId,
    RecordKey, Stage, StageData, TimeData, DEPARTMENTS, STAGE_LADDER,
};
pub use normalizer::{normalize, renormalize, RecordDraft};
pub use report::{summarize, CategoryFilter, DashboardSummary, GroupStats, ScoreBand};
pub use scoring::{score, Score};
pub use store::{
    scorecard_router, CommitOutcome, Confirmation, FieldUpdate, RecordRepository,
    RepositoryError, ScorecardError, ScorecardService,
};
