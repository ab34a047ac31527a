//! Triage pipeline
//!
//! Wires the two stages together. Stage 1 (`diagnose`) fetches and correlates
//! an error; stage 2 (`solve`) consumes nothing but the resulting
//! [`Diagnostic`], so the two can run in different processes.

use crate::alert::AlertSynthesizer;
use crate::classifier::ErrorClassifier;
use crate::code_context::{CodeContextProvider, HttpCodeContext, StaticCodeContext};
use crate::config::TriageConfig;
use crate::correlator::DiagnosticCorrelator;
use crate::decider::RemediationDecider;
use crate::error_source::{
    ErrorQuery, ErrorSource, ErrorSourceAdapter, HttpErrorSource, InMemoryErrorSource,
};
use crate::models::{Diagnostic, RemediationDecision, Solution};
use crate::patch::PatchSynthesizer;
use crate::pull_request::{draft_pull_request, PullRequestDraft};
use crate::source_locator::SourceLocator;
use crate::topology::{StaticTopology, TopologyResolver};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of running both stages back to back
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub diagnostic: Diagnostic,
    pub solution: Solution,
    /// Present for code fixes whose substitution actually changed the snippet
    pub pull_request: Option<PullRequestDraft>,
}

#[derive(Debug, Clone)]
pub struct TriagePipeline {
    errors: ErrorSourceAdapter,
    correlator: DiagnosticCorrelator,
    decider: RemediationDecider,
    patches: PatchSynthesizer,
    alerts: AlertSynthesizer,
}

impl TriagePipeline {
    pub fn new(
        errors: ErrorSourceAdapter,
        correlator: DiagnosticCorrelator,
        decider: RemediationDecider,
        patches: PatchSynthesizer,
        alerts: AlertSynthesizer,
    ) -> Self {
        Self {
            errors,
            correlator,
            decider,
            patches,
            alerts,
        }
    }

    /// Build a pipeline from configuration. Collaborators without a URL fall
    /// back to the seeded in-memory stand-ins.
    pub fn from_config(config: &TriageConfig) -> Self {
        let error_source: Arc<dyn ErrorSource> = match &config.collaborators.error_source_url {
            Some(url) => {
                info!("Using error source at {}", url);
                Arc::new(HttpErrorSource::new(url.clone()))
            }
            None => {
                warn!("No error source configured, using the in-memory store");
                Arc::new(InMemoryErrorSource::seeded())
            }
        };

        let code_context: Arc<dyn CodeContextProvider> =
            match &config.collaborators.code_context_url {
                Some(url) => {
                    info!("Using code context service at {}", url);
                    Arc::new(HttpCodeContext::new(url.clone()))
                }
                None => {
                    warn!("No code context service configured, using built-in snippets");
                    Arc::new(StaticCodeContext::seeded())
                }
            };

        let correlator = DiagnosticCorrelator::new(
            TopologyResolver::from_static(StaticTopology::new(&config.topology)),
            SourceLocator::new(&config.locator),
            ErrorClassifier::new(),
        );

        Self::new(
            ErrorSourceAdapter::new(error_source),
            correlator,
            RemediationDecider::new(config.remediation.escalation_threshold),
            PatchSynthesizer::new(code_context),
            AlertSynthesizer::new(),
        )
    }

    /// Stage 1. `None` when no error matches the query.
    pub async fn diagnose(&self, query: &ErrorQuery) -> Option<Diagnostic> {
        let error = self.errors.fetch(query).await?;
        Some(self.correlator.correlate(&error))
    }

    pub fn decide(&self, diagnostic: &Diagnostic) -> RemediationDecision {
        self.decider.decide(diagnostic)
    }

    /// Stage 2. Always produces exactly one kind of solution.
    pub async fn solve(&self, diagnostic: &Diagnostic) -> Solution {
        let decision = self.decide(diagnostic);
        info!(
            "Remediation for {} x{}: {}",
            diagnostic.category(),
            diagnostic.occurrence_count(),
            decision
        );

        match decision {
            RemediationDecision::CodeFix => Solution::Fix(self.patches.synthesize(diagnostic).await),
            RemediationDecision::AlertSuggestion => {
                Solution::Alert(self.alerts.synthesize(diagnostic))
            }
        }
    }

    /// Both stages, plus a pull request draft for usable fixes
    pub async fn run(&self, query: &ErrorQuery) -> Option<WorkflowOutcome> {
        let diagnostic = self.diagnose(query).await?;
        let solution = self.solve(&diagnostic).await;

        let pull_request = match &solution {
            Solution::Fix(fix) if !fix.requires_manual_review => {
                Some(draft_pull_request(&diagnostic, fix, Utc::now()))
            }
            _ => None,
        };

        Some(WorkflowOutcome {
            diagnostic,
            solution,
            pull_request,
        })
    }
}

impl Default for TriagePipeline {
    fn default() -> Self {
        Self::from_config(&TriageConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorCategory;

    #[tokio::test]
    async fn test_seeded_null_reference_runs_to_a_draft() {
        let pipeline = TriagePipeline::default();
        let outcome = pipeline
            .run(&ErrorQuery::by_transaction("txn-seed-001"))
            .await
            .unwrap();

        assert_eq!(outcome.diagnostic.category(), ErrorCategory::NullReference);
        assert_eq!(outcome.solution.decision(), RemediationDecision::CodeFix);
        let draft = outcome.pull_request.unwrap();
        assert_eq!(draft.repository, "company/user-service");
    }

    #[tokio::test]
    async fn test_unknown_transaction() {
        let pipeline = TriagePipeline::default();
        assert!(pipeline
            .run(&ErrorQuery::by_transaction("txn-missing"))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_threshold_from_config() {
        let mut config = TriageConfig::default();
        config.remediation.escalation_threshold = 3;
        let pipeline = TriagePipeline::from_config(&config);

        let mut diagnostic = pipeline
            .diagnose(&ErrorQuery::by_transaction("txn-seed-001"))
            .await
            .unwrap();
        diagnostic.error.category = ErrorCategory::Timeout;
        diagnostic.context.occurrence_count = 3;
        assert_eq!(pipeline.decide(&diagnostic), RemediationDecision::CodeFix);
        diagnostic.context.occurrence_count = 2;
        assert_eq!(
            pipeline.decide(&diagnostic),
            RemediationDecision::AlertSuggestion
        );
    }
}
