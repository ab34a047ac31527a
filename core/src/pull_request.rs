//! Pull request drafts
//!
//! Packages a [`CodeFix`] as a reviewable pull request description. Nothing is
//! pushed anywhere; the draft is returned to the caller.

use crate::models::{CodeFix, Diagnostic};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DRAFT_AUTHOR: &str = "triage-bot";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    pub path: String,
    pub additions: usize,
    pub deletions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestDraft {
    pub repository: String,
    pub base_branch: String,
    pub head_branch: String,
    pub title: String,
    pub description: String,
    pub labels: Vec<String>,
    pub files: Vec<FileChange>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

fn count_lines(code: &str) -> usize {
    if code.is_empty() {
        0
    } else {
        code.split('\n').count()
    }
}

/// `Fix: TypeError - null reference`
pub fn pull_request_title(diagnostic: &Diagnostic) -> String {
    let error_type = if diagnostic.error.error_type.is_empty() {
        "Error"
    } else {
        diagnostic.error.error_type.as_str()
    };
    let category = diagnostic.category().slug().replace('_', " ");
    format!("Fix: {} - {}", error_type, category)
}

fn labels(diagnostic: &Diagnostic) -> Vec<String> {
    vec![
        "automated-fix".to_string(),
        "bug".to_string(),
        diagnostic.category().slug(),
    ]
}

fn description(diagnostic: &Diagnostic, fix: &CodeFix, labels: &[String]) -> String {
    let file = fix.file.as_deref().unwrap_or("unknown");
    let line = fix
        .line
        .as_deref()
        .map(|line| format!(" (Line {})", line))
        .unwrap_or_default();
    let labels = labels
        .iter()
        .map(|label| format!("- `{}`", label))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "## Automated Fix\n\n\
         ### Error Details\n\
         - **Type**: {error_type}\n\
         - **Category**: {category}\n\
         - **Message**: {message}\n\n\
         ### Fix Applied\n\
         {explanation}\n\n\
         ### Changes Made\n\
         **File**: `{file}`{line}\n\n\
         #### Before:\n\
         ```\n{original}\n```\n\n\
         #### After:\n\
         ```\n{fixed}\n```\n\n\
         ### Testing\n\
         - Unit tests for the affected component\n\
         - Integration tests if applicable\n\
         - Manual verification in staging environment\n\n\
         ### Labels\n\
         {labels}\n",
        error_type = diagnostic.error.error_type,
        category = diagnostic.category(),
        message = diagnostic.error.message,
        explanation = fix.explanation,
        file = file,
        line = line,
        original = fix.original_code,
        fixed = fix.fixed_code,
        labels = labels,
    )
}

/// Draft a pull request for `fix` against the diagnostic's repository
pub fn draft_pull_request(
    diagnostic: &Diagnostic,
    fix: &CodeFix,
    created_at: DateTime<Utc>,
) -> PullRequestDraft {
    let labels = labels(diagnostic);
    let files = fix
        .file
        .iter()
        .map(|path| FileChange {
            path: path.clone(),
            additions: count_lines(&fix.fixed_code),
            deletions: count_lines(&fix.original_code),
        })
        .collect();

    PullRequestDraft {
        repository: diagnostic.repository.repository.clone(),
        base_branch: diagnostic.repository.branch.clone(),
        head_branch: format!(
            "fix/{}-{}",
            diagnostic.category().slug(),
            created_at.timestamp_millis()
        ),
        title: pull_request_title(diagnostic),
        description: description(diagnostic, fix, &labels),
        labels,
        files,
        created_by: DRAFT_AUTHOR.to_string(),
        created_at,
    }
}
