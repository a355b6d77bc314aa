use std::io::Cursor;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::Deserialize;

use super::repository::RecordRepository;
use super::service::{preview, Confirmation, FieldUpdate, ScorecardError, ScorecardService};
use crate::error::AppError;
use crate::interchange::SpreadsheetImporter;
use crate::scorecard::access::{Role, SessionContext};
use crate::scorecard::domain::{RecordId, RecordKey};
use crate::scorecard::normalizer::RecordDraft;
use crate::scorecard::report::CategoryFilter;

pub const ROLE_HEADER: &str = "x-kpi-role";
pub const DEPARTMENT_HEADER: &str = "x-kpi-department";

/// Router builder exposing the record, sheet and dashboard endpoints.
pub fn scorecard_router<R>(service: Arc<ScorecardService<R>>) -> Router
where
    R: RecordRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/records",
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route("/api/v1/records/fields", patch(update_field_handler::<R>))
        .route("/api/v1/records/export", get(export_handler::<R>))
        .route("/api/v1/records/import", post(import_handler::<R>))
        .route(
            "/api/v1/records/:index",
            put(replace_handler::<R>).delete(delete_handler::<R>),
        )
        .route(
            "/api/v1/records/id/:id",
            put(replace_by_id_handler::<R>).delete(delete_by_id_handler::<R>),
        )
        .route("/api/v1/summary", get(summary_handler::<R>))
        .route("/api/v1/score", post(score_handler))
        .with_state(service)
}

/// Session supplied by the authenticating proxy. No role header means a
/// read-only user.
pub fn session_from_headers(headers: &HeaderMap) -> Result<SessionContext, ScorecardError> {
    let role = match headers.get(ROLE_HEADER) {
        None => Role::User,
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|value| value.parse::<Role>().ok())
            .ok_or(ScorecardError::Forbidden("act with an unrecognised role"))?,
    };
    let assigned_department = headers
        .get(DEPARTMENT_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    Ok(SessionContext {
        role,
        assigned_department,
    })
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ConfirmQuery {
    #[serde(default)]
    confirm: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SummaryQuery {
    #[serde(default)]
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FieldUpdateRequest {
    key: RecordKey,
    update: FieldUpdate,
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<ScorecardService<R>>>,
    headers: HeaderMap,
) -> Result<Response, AppError>
where
    R: RecordRepository + 'static,
{
    let session = session_from_headers(&headers)?;
    Ok(Json(service.list(&session)).into_response())
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<ScorecardService<R>>>,
    headers: HeaderMap,
    Json(draft): Json<RecordDraft>,
) -> Result<Response, AppError>
where
    R: RecordRepository + 'static,
{
    let session = session_from_headers(&headers)?;
    let outcome = service.create(&session, draft)?;
    Ok((StatusCode::CREATED, Json(outcome)).into_response())
}

pub(crate) async fn replace_handler<R>(
    State(service): State<Arc<ScorecardService<R>>>,
    Path(index): Path<usize>,
    headers: HeaderMap,
    Json(draft): Json<RecordDraft>,
) -> Result<Response, AppError>
where
    R: RecordRepository + 'static,
{
    let session = session_from_headers(&headers)?;
    let outcome = service.replace(&session, index, draft)?;
    Ok(Json(outcome).into_response())
}

pub(crate) async fn delete_handler<R>(
    State(service): State<Arc<ScorecardService<R>>>,
    Path(index): Path<usize>,
    Query(query): Query<ConfirmQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError>
where
    R: RecordRepository + 'static,
{
    let session = session_from_headers(&headers)?;
    let outcome = service.delete(&session, index, Confirmation::from(query.confirm))?;
    Ok(Json(outcome).into_response())
}

pub(crate) async fn replace_by_id_handler<R>(
    State(service): State<Arc<ScorecardService<R>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(draft): Json<RecordDraft>,
) -> Result<Response, AppError>
where
    R: RecordRepository + 'static,
{
    let session = session_from_headers(&headers)?;
    let outcome = service.replace_by_id(&session, &RecordId(id), draft)?;
    Ok(Json(outcome).into_response())
}

pub(crate) async fn delete_by_id_handler<R>(
    State(service): State<Arc<ScorecardService<R>>>,
    Path(id): Path<String>,
    Query(query): Query<ConfirmQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError>
where
    R: RecordRepository + 'static,
{
    let session = session_from_headers(&headers)?;
    let outcome =
        service.delete_by_id(&session, &RecordId(id), Confirmation::from(query.confirm))?;
    Ok(Json(outcome).into_response())
}

pub(crate) async fn update_field_handler<R>(
    State(service): State<Arc<ScorecardService<R>>>,
    headers: HeaderMap,
    Json(request): Json<FieldUpdateRequest>,
) -> Result<Response, AppError>
where
    R: RecordRepository + 'static,
{
    let session = session_from_headers(&headers)?;
    let outcome = service.update_field(&session, &request.key, request.update)?;
    Ok(Json(outcome).into_response())
}

pub(crate) async fn export_handler<R>(
    State(service): State<Arc<ScorecardService<R>>>,
    headers: HeaderMap,
) -> Result<Response, AppError>
where
    R: RecordRepository + 'static,
{
    let session = session_from_headers(&headers)?;
    let sheet = service.export_sheet(&session)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"kpi_records.csv\"",
            ),
        ],
        sheet,
    )
        .into_response())
}

pub(crate) async fn import_handler<R>(
    State(service): State<Arc<ScorecardService<R>>>,
    Query(query): Query<ConfirmQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError>
where
    R: RecordRepository + 'static,
{
    let session = session_from_headers(&headers)?;
    let outcome = service.import_sheet(
        &session,
        &SpreadsheetImporter::standard(),
        Cursor::new(body),
        Confirmation::from(query.confirm),
    )?;
    Ok(Json(outcome).into_response())
}

pub(crate) async fn summary_handler<R>(
    State(service): State<Arc<ScorecardService<R>>>,
    Query(query): Query<SummaryQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError>
where
    R: RecordRepository + 'static,
{
    let session = session_from_headers(&headers)?;
    let filter = query
        .category
        .as_deref()
        .unwrap_or_default()
        .parse::<CategoryFilter>()
        .unwrap_or_default();
    Ok(Json(service.summary(&session, filter)).into_response())
}

pub(crate) async fn score_handler(Json(draft): Json<RecordDraft>) -> Response {
    Json(preview(draft)).into_response()
}
