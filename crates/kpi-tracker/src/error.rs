use crate::config::ConfigError;
use crate::interchange::InterchangeError;
use crate::scorecard::store::{RepositoryError, ScorecardError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Interchange(InterchangeError),
    Repository(RepositoryError),
    Scorecard(ScorecardError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Scorecard(err) => scorecard_status(err),
            AppError::Interchange(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn scorecard_status(err: &ScorecardError) -> StatusCode {
    match err {
        ScorecardError::Forbidden(_) => StatusCode::FORBIDDEN,
        ScorecardError::NotFound(_) => StatusCode::NOT_FOUND,
        ScorecardError::ConfirmationRequired(_)
        | ScorecardError::UnknownDepartment(_)
        | ScorecardError::FieldNotApplicable { .. }
        | ScorecardError::StageOutOfRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ScorecardError::Interchange(_) => StatusCode::BAD_REQUEST,
        ScorecardError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Interchange(err) => write!(f, "spreadsheet error: {}", err),
            AppError::Repository(err) => write!(f, "storage error: {}", err),
            AppError::Scorecard(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Interchange(err) => Some(err),
            AppError::Repository(err) => Some(err),
            AppError::Scorecard(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<InterchangeError> for AppError {
    fn from(value: InterchangeError) -> Self {
        Self::Interchange(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Repository(value)
    }
}

impl From<ScorecardError> for AppError {
    fn from(value: ScorecardError) -> Self {
        Self::Scorecard(value)
    }
}
