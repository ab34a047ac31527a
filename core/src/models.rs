//! Triage data model
//!
//! Records that flow through the two pipeline stages. Everything here is
//! serialized with camelCase field names so the JSON surface matches the
//! collaborator services and the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Placeholder used for unresolved pipeline and repository fields
pub const UNKNOWN: &str = "unknown";

/// A single error record as returned by the error source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawError {
    /// Transaction the error was captured in
    pub transaction_id: Option<String>,
    /// Scope (service/environment) the error was reported under
    pub scope_id: Option<String>,
    /// Error message
    pub message: String,
    /// Error type as reported by the runtime
    #[serde(rename = "type")]
    pub error_type: String,
    /// Raw stack trace text
    pub stack_trace: String,
    /// Compute node the error originated on
    pub deployment_unit: String,
    /// Container that raised the error
    pub container_name: String,
    /// How many times the error has been seen
    pub occurrence_count: u64,
    /// First time the error was seen
    pub first_seen: Option<DateTime<Utc>>,
    /// Most recent time the error was seen
    pub last_seen: Option<DateTime<Utc>>,
    /// Free-form metadata (service, region, version, ...)
    pub metadata: BTreeMap<String, String>,
}

impl RawError {
    /// Service name used to look up the source repository
    pub fn service_hint(&self) -> &str {
        self.metadata
            .get("service")
            .map(String::as_str)
            .or(self.scope_id.as_deref())
            .unwrap_or("")
    }
}

/// CI/CD pipeline that produced a deployment unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineInfo {
    pub pipeline_id: String,
    pub pipeline_name: String,
    pub build_number: String,
    pub repository: String,
    /// False when the deployment unit was not found in the directory
    #[serde(default)]
    pub resolved: bool,
}

impl PipelineInfo {
    /// Sentinel returned for unregistered deployment units
    pub fn unknown() -> Self {
        Self {
            pipeline_id: UNKNOWN.to_string(),
            pipeline_name: "unknown-pipeline".to_string(),
            build_number: "N/A".to_string(),
            repository: "unknown/unknown".to_string(),
            resolved: false,
        }
    }
}

impl Default for PipelineInfo {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Source repository backing a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryInfo {
    pub repository: String,
    pub branch: String,
    pub last_commit: String,
    /// False when no known service matched the hint
    #[serde(default)]
    pub resolved: bool,
}

impl RepositoryInfo {
    /// Sentinel returned when no known service matches
    pub fn unknown() -> Self {
        Self {
            repository: "unknown/unknown".to_string(),
            branch: "main".to_string(),
            last_commit: UNKNOWN.to_string(),
            resolved: false,
        }
    }
}

impl Default for RepositoryInfo {
    fn default() -> Self {
        Self::unknown()
    }
}

/// In-application frame recovered from a stack trace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    #[serde(rename = "file")]
    pub file_path: Option<String>,
    #[serde(rename = "line")]
    pub line_number: Option<String>,
}

impl SourceLocation {
    pub fn is_absent(&self) -> bool {
        self.file_path.is_none() && self.line_number.is_none()
    }
}

/// Fixed error classification used to pick a remediation strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    NullReference,
    UnhandledPromise,
    MathError,
    AccessControl,
    ResourceLeak,
    Timeout,
    #[default]
    RuntimeError,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 7] = [
        ErrorCategory::NullReference,
        ErrorCategory::UnhandledPromise,
        ErrorCategory::MathError,
        ErrorCategory::AccessControl,
        ErrorCategory::ResourceLeak,
        ErrorCategory::Timeout,
        ErrorCategory::RuntimeError,
    ];

    /// Wire name, e.g. `NULL_REFERENCE`
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::NullReference => "NULL_REFERENCE",
            ErrorCategory::UnhandledPromise => "UNHANDLED_PROMISE",
            ErrorCategory::MathError => "MATH_ERROR",
            ErrorCategory::AccessControl => "ACCESS_CONTROL",
            ErrorCategory::ResourceLeak => "RESOURCE_LEAK",
            ErrorCategory::Timeout => "TIMEOUT",
            ErrorCategory::RuntimeError => "RUNTIME_ERROR",
        }
    }

    /// Lower-case wire name, e.g. `null_reference`
    pub fn slug(&self) -> String {
        self.as_str().to_lowercase()
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified error portion of a diagnostic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: String,
    #[serde(default)]
    pub stack: String,
    #[serde(default)]
    pub category: ErrorCategory,
}

/// Runtime context of the error
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorContext {
    pub container_name: String,
    pub role_instance: String,
    pub occurrence_count: u64,
    pub first_occurrence: Option<DateTime<Utc>>,
    pub last_occurrence: Option<DateTime<Utc>>,
}

/// Normalized, self-describing record handed from stage 1 to stage 2
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub error: ErrorSummary,
    #[serde(default)]
    pub context: ErrorContext,
    #[serde(default)]
    pub pipeline: PipelineInfo,
    #[serde(default)]
    pub repository: RepositoryInfo,
    #[serde(default)]
    pub source: SourceLocation,
}

impl Diagnostic {
    pub fn category(&self) -> ErrorCategory {
        self.error.category
    }

    pub fn occurrence_count(&self) -> u64 {
        self.context.occurrence_count
    }
}

/// Kind of response chosen for a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemediationDecision {
    CodeFix,
    AlertSuggestion,
}

impl RemediationDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemediationDecision::CodeFix => "CODE_FIX",
            RemediationDecision::AlertSuggestion => "ALERT_SUGGESTION",
        }
    }
}

impl fmt::Display for RemediationDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proposed source patch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFix {
    pub file: Option<String>,
    pub line: Option<String>,
    pub original_code: String,
    pub fixed_code: String,
    pub explanation: String,
    pub category: ErrorCategory,
    /// Set when the substitution did not fire and the snippet came back unchanged
    pub requires_manual_review: bool,
}

/// Area an operational recommendation applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestionKind {
    Infrastructure,
    Monitoring,
    Operations,
    Configuration,
    Security,
}

/// Recommendation priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// One operational recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub priority: Priority,
    pub action: String,
    pub details: String,
    pub recommended_value: String,
}

/// Operational alert for errors that are not fixed in code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSuggestion {
    pub category: ErrorCategory,
    pub error_message: String,
    pub occurrence_count: u64,
    pub suggestions: Vec<Suggestion>,
}

/// Stage 2 result
#[derive(Debug, Clone, PartialEq)]
pub enum Solution {
    Fix(CodeFix),
    Alert(AlertSuggestion),
}

impl Solution {
    pub fn decision(&self) -> RemediationDecision {
        match self {
            Solution::Fix(_) => RemediationDecision::CodeFix,
            Solution::Alert(_) => RemediationDecision::AlertSuggestion,
        }
    }
}
