//! API Handlers Module
//!
//! This module contains the request handlers for the triage service.

use axum::{
    debug_handler,
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;
use std::sync::Arc;
use triage_core::error_source::ErrorQuery;
use triage_core::models::Diagnostic;
use triage_core::{TriageError, TriagePipeline};

use crate::models::{
    DiagnoseRequest, DiagnoseResponse, FailureResponse, HealthResponse, SolutionResponse,
    WorkflowResponse,
};

pub const NO_ERROR_FOUND: &str = "No error found for the given criteria";
pub const DIAGNOSTIC_REQUIRED: &str = "Diagnostic data required";

/// Represents the state of the API server
pub struct ApiState {
    /// Both triage stages
    pub pipeline: TriagePipeline,
    /// Name reported by the health check
    pub service_name: String,
}

/// Request-level failure, rendered as a [`FailureResponse`]
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Internal(rejection.body_text())
    }
}

impl From<TriageError> for ApiError {
    fn from(err: TriageError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                FailureResponse {
                    success: false,
                    message: Some(message),
                    error: None,
                },
            ),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                FailureResponse {
                    success: false,
                    message: Some(message),
                    error: None,
                },
            ),
            ApiError::Internal(error) => {
                tracing::error!("Request failed: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    FailureResponse {
                        success: false,
                        message: None,
                        error: Some(error),
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Health check endpoint
#[debug_handler]
pub async fn health_check(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: state.service_name.clone(),
    })
}

/// Stage 1: fetch and correlate an error
#[debug_handler]
pub async fn diagnose(
    State(state): State<Arc<ApiState>>,
    request: Result<Json<DiagnoseRequest>, JsonRejection>,
) -> Result<Json<DiagnoseResponse>, ApiError> {
    let Json(request) = request?;
    tracing::debug!(
        "Diagnose request: transaction={:?} scope={:?}",
        request.transaction_id,
        request.scope_id
    );

    let query = ErrorQuery::from(request);
    match state.pipeline.diagnose(&query).await {
        Some(diagnostic) => Ok(Json(DiagnoseResponse {
            success: true,
            diagnostic,
        })),
        None => Err(ApiError::NotFound(NO_ERROR_FOUND.to_string())),
    }
}

/// Null, `false`, zero and empty strings, arrays or objects carry no diagnostic
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Stage 2: decide and synthesize a fix or an alert for a diagnostic
#[debug_handler]
pub async fn generate_solution(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SolutionResponse>, ApiError> {
    let Json(mut body) = body?;

    let diagnostic = match body.get_mut("diagnostic").map(Value::take) {
        Some(value) if !is_blank(&value) => {
            serde_json::from_value::<Diagnostic>(value).map_err(TriageError::from)?
        }
        _ => return Err(ApiError::BadRequest(DIAGNOSTIC_REQUIRED.to_string())),
    };
    tracing::debug!(
        "Generating solution for {} ({} occurrences)",
        diagnostic.category(),
        diagnostic.occurrence_count()
    );

    let solution = state.pipeline.solve(&diagnostic).await;
    Ok(Json(SolutionResponse::new(solution, diagnostic)))
}

/// Both stages plus a pull request draft
#[debug_handler]
pub async fn run_workflow(
    State(state): State<Arc<ApiState>>,
    request: Result<Json<DiagnoseRequest>, JsonRejection>,
) -> Result<Json<WorkflowResponse>, ApiError> {
    let Json(request) = request?;
    tracing::debug!(
        "Workflow request: transaction={:?} scope={:?}",
        request.transaction_id,
        request.scope_id
    );

    let query = ErrorQuery::from(request.clone());
    match state.pipeline.run(&query).await {
        Some(outcome) => Ok(Json(WorkflowResponse::new(&request, outcome))),
        None => Err(ApiError::NotFound(NO_ERROR_FOUND.to_string())),
    }
}
