mod summary;
pub mod views;

pub use summary::summarize;
pub use views::{
    BandCount, CategoryEntry, CategoryFilter, DashboardSummary, DepartmentEntry, GroupStats,
    ScoreBand, ScorePreview, ScoredRecordView,
};
