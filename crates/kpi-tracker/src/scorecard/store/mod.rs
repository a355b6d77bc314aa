//! Record ownership, persistence seam and HTTP surface of the scorecard.

pub mod repository;
pub mod router;
pub mod service;

pub use repository::{RecordRepository, RepositoryError};
pub use router::{scorecard_router, session_from_headers, DEPARTMENT_HEADER, ROLE_HEADER};
pub use service::{
    preview, CommitOutcome, Confirmation, FieldUpdate, ImportSummary, ScorecardError,
    ScorecardService,
};

#[cfg(test)]
mod tests;
