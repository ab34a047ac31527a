//! Triage Core Module
//!
//! Two-stage error triage. Stage 1 retrieves a production error and correlates
//! it with its deployment pipeline, source repository, in-application source
//! location and error category. Stage 2 decides whether the error deserves a
//! code patch or an operational alert and synthesizes it.

pub mod alert;
pub mod classifier;
pub mod code_context;
pub mod config;
pub mod correlator;
pub mod decider;
pub mod error;
pub mod error_source;
pub mod models;
pub mod patch;
pub mod pipeline;
pub mod pull_request;
pub mod source_locator;
pub mod topology;

pub use alert::AlertSynthesizer;
pub use classifier::ErrorClassifier;
pub use code_context::{CodeContextProvider, HttpCodeContext, StaticCodeContext};
pub use config::TriageConfig;
pub use correlator::DiagnosticCorrelator;
pub use decider::RemediationDecider;
pub use error::{Result, TriageError};
pub use error_source::{ErrorQuery, ErrorSource, ErrorSourceAdapter, HttpErrorSource, InMemoryErrorSource};
pub use models::{
    AlertSuggestion, CodeFix, Diagnostic, ErrorCategory, RawError, RemediationDecision, Solution,
};
pub use patch::PatchSynthesizer;
pub use pipeline::{TriagePipeline, WorkflowOutcome};
pub use pull_request::PullRequestDraft;
pub use source_locator::SourceLocator;
pub use topology::TopologyResolver;
