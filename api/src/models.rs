//! API Models Module
//!
//! Request and response envelopes for the triage HTTP surface.

use serde::{Deserialize, Serialize};
use triage_core::config::ServerConfig;
use triage_core::error_source::ErrorQuery;
use triage_core::models::{
    AlertSuggestion, CodeFix, Diagnostic, ErrorContext, ErrorSummary, RemediationDecision,
    Solution,
};
use triage_core::pull_request::PullRequestDraft;
use triage_core::WorkflowOutcome;

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Name reported by `/health`
    pub service_name: String,
}

impl From<&ServerConfig> for ApiConfig {
    fn from(server: &ServerConfig) -> Self {
        Self {
            host: server.host.clone(),
            port: server.port,
            service_name: server.service_name.clone(),
        }
    }
}

/// Body of `POST /diagnose` and `POST /workflow`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnoseRequest {
    pub transaction_id: Option<String>,
    pub scope_id: Option<String>,
    pub time_range: Option<String>,
}

impl From<DiagnoseRequest> for ErrorQuery {
    fn from(request: DiagnoseRequest) -> Self {
        ErrorQuery {
            transaction_id: request.transaction_id,
            scope_id: request.scope_id,
            time_range: request.time_range,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnoseResponse {
    pub success: bool,
    pub diagnostic: Diagnostic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionResponse {
    pub success: bool,
    pub solution_type: RemediationDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<CodeFix>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<AlertSuggestion>,
    pub diagnostic: Diagnostic,
}

impl SolutionResponse {
    pub fn new(solution: Solution, diagnostic: Diagnostic) -> Self {
        let solution_type = solution.decision();
        let (fix, alert) = match solution {
            Solution::Fix(fix) => (Some(fix), None),
            Solution::Alert(alert) => (None, Some(alert)),
        };
        Self {
            success: true,
            solution_type,
            fix,
            alert,
            diagnostic,
        }
    }
}

/// Code fix with the pull request drafted for it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowFix {
    #[serde(flatten)]
    pub fix: CodeFix,
    pub pull_request: Option<PullRequestDraft>,
}

/// Runtime context plus where the error lives in source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowContext {
    #[serde(flatten)]
    pub runtime: ErrorContext,
    pub repository: String,
    pub source_file: Option<String>,
    pub source_line: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResponse {
    pub success: bool,
    pub transaction_id: Option<String>,
    pub scope_id: Option<String>,
    pub solution_type: RemediationDecision,
    pub error: ErrorSummary,
    pub context: WorkflowContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<WorkflowFix>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<AlertSuggestion>,
}

impl WorkflowResponse {
    pub fn new(request: &DiagnoseRequest, outcome: WorkflowOutcome) -> Self {
        let solution_type = outcome.solution.decision();
        let (fix, alert) = match outcome.solution {
            Solution::Fix(fix) => (
                Some(WorkflowFix {
                    fix,
                    pull_request: outcome.pull_request,
                }),
                None,
            ),
            Solution::Alert(alert) => (None, Some(alert)),
        };

        let diagnostic = outcome.diagnostic;
        Self {
            success: true,
            transaction_id: request.transaction_id.clone(),
            scope_id: request.scope_id.clone(),
            solution_type,
            error: diagnostic.error,
            context: WorkflowContext {
                runtime: diagnostic.context,
                repository: diagnostic.repository.repository,
                source_file: diagnostic.source.file_path,
                source_line: diagnostic.source.line_number,
            },
            fix,
            alert,
        }
    }
}

/// Failure envelope. `message` for expected outcomes, `error` for faults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}
