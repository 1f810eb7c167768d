//! HTTP request handlers for the recap API.
//!
//! This module contains the handler functions for all API endpoints.
//! Workbook parsing and export rendering are CPU bound, so both endpoints
//! run their work on the blocking thread pool.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::ConfigLoader;
use crate::error::{RecapError, RecapResult};
use crate::export::{export_recap, exporters_for};
use crate::loader::RecordLoader;
use crate::models::RecordSet;
use crate::pipeline::{
    FilterOptions, FilterSelection, build_recaps_with, filter_options, prepare_records,
};

use super::request::{OptionsRequest, RecapRequest, UploadedFile, decode_files};
use super::response::{ApiError, ApiErrorResponse, DateRecapResponse, RecapResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
///
/// Request bodies are capped at `server.max_body_bytes`.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config().server().max_body_bytes;
    Router::new()
        .route("/options", post(options_handler))
        .route("/recap", post(recap_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Handler for POST /options.
///
/// Loads the uploaded workbooks and returns the values available for each
/// filter column.
async fn options_handler(
    State(state): State<AppState>,
    payload: Result<Json<OptionsRequest>, JsonRejection>,
) -> Response {
    let report_id = Uuid::new_v4();
    info!(report_id = %report_id, "Processing options request");

    let request = match parse_payload(&report_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let files = request.files.len();
    match run_blocking(move || list_options(&request.files, state.config())).await {
        Ok(options) => {
            info!(
                report_id = %report_id,
                files,
                check_dates = options.check_date.len() - 1,
                "Listed filter options"
            );
            json_response(StatusCode::OK, &options)
        }
        Err(err) => error_response(&report_id, err),
    }
}

/// Handler for POST /recap.
///
/// Loads the uploaded workbooks, applies the filters, and returns one recap
/// per check date together with its exports.
async fn recap_handler(
    State(state): State<AppState>,
    payload: Result<Json<RecapRequest>, JsonRejection>,
) -> Response {
    let report_id = Uuid::new_v4();
    info!(report_id = %report_id, "Processing recap request");

    let request = match parse_payload(&report_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    let files = request.files.len();
    match run_blocking(move || perform_recap(&report_id, &request, state.config())).await {
        Ok(response) => {
            info!(
                report_id = %report_id,
                files,
                check_dates = response.recaps.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Recap completed successfully"
            );
            json_response(StatusCode::OK, &response)
        }
        Err(err) => error_response(&report_id, err),
    }
}

/// Runs `task` on the blocking pool. A panic inside the task comes back as
/// a calculation error.
async fn run_blocking<T, F>(task: F) -> RecapResult<T>
where
    F: FnOnce() -> RecapResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(result) => result,
        Err(join_error) => {
            error!(error = %join_error, "Blocking recap task failed");
            Err(RecapError::CalculationError {
                message: format!("Recap task did not complete: {}", join_error),
            })
        }
    }
}

/// Unwraps a JSON body, turning extractor rejections into error responses.
///
/// Bodies over the configured limit get 413; every other rejection is a 400.
fn parse_payload<T: DeserializeOwned>(
    report_id: &Uuid,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, Response> {
    let rejection = match payload {
        Ok(Json(request)) => return Ok(request),
        Err(rejection) => rejection,
    };

    let mut status = StatusCode::BAD_REQUEST;
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(report_id = %report_id, error = %body_text, "JSON data error");
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(report_id = %report_id, error = %err, "JSON syntax error");
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        JsonRejection::BytesRejection(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            warn!(report_id = %report_id, error = %err, "Request body over limit");
            status = StatusCode::PAYLOAD_TOO_LARGE;
            ApiError::new("PAYLOAD_TOO_LARGE", "Request body exceeds the configured size limit")
                .detail("Raise server.max_body_bytes or upload fewer workbooks per request")
        }
        JsonRejection::BytesRejection(err) => {
            warn!(report_id = %report_id, error = %err, "Failed to read request body");
            ApiError::malformed_json(format!("Failed to read request body: {}", err.body_text()))
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };

    Err(ApiErrorResponse { status, error }.into_response())
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: &T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(report_id: &Uuid, err: RecapError) -> Response {
    warn!(report_id = %report_id, error = %err, "Recap request failed");
    ApiErrorResponse::from(err).into_response()
}

fn load_uploads(files: &[UploadedFile], config: &ConfigLoader) -> RecapResult<RecordSet> {
    let sources = decode_files(files)?;
    RecordLoader::new(config.export().sheet_name.as_str()).load_all(&sources)
}

/// Lists filter options over the classified records, so the job names
/// offered are the ones the filter will see.
fn list_options(files: &[UploadedFile], config: &ConfigLoader) -> RecapResult<FilterOptions> {
    let records = load_uploads(files, config)?;
    let prepared = prepare_records(&records, &FilterSelection::all(), config.rules());
    Ok(filter_options(&prepared.records))
}

/// Runs the recap pipeline and every configured exporter.
///
/// Dates are processed in order; an error on one date ends the request.
/// Files already written to the output directory for earlier dates are
/// left in place.
fn perform_recap(
    report_id: &Uuid,
    request: &RecapRequest,
    config: &ConfigLoader,
) -> RecapResult<RecapResponse> {
    let start_time = Instant::now();
    let records = load_uploads(&request.files, config)?;
    let export = config.export();
    let exporters = exporters_for(export);
    let output_dir = export.output_dir.as_deref();

    let mut run = build_recaps_with(&records, &request.filters, config.rules(), |recap| {
        let artifacts = export_recap(recap, &exporters, output_dir)?;
        info!(
            report_id = %report_id,
            check_date = %recap.check_date,
            records = recap.records.len(),
            categories = recap.table.rows().len(),
            total_salary = %recap.table.total().salary,
            total_tax = %recap.table.total().tax,
            exports = artifacts.len(),
            "Recap built for check date"
        );
        Ok(artifacts)
    })?;

    // Report the whole request, workbook parsing included.
    run.audit_trace.duration_us = start_time.elapsed().as_micros() as u64;

    Ok(RecapResponse {
        report_id: report_id.to_string(),
        recaps: run
            .recaps
            .iter()
            .zip(&run.outputs)
            .map(|(recap, artifacts)| DateRecapResponse::new(recap, artifacts))
            .collect(),
        audit_trace: run.audit_trace,
    })
}
