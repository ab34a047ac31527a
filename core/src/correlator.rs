//! Diagnostic Correlator
//!
//! Stage 1: turns a [`RawError`] into a self-describing [`Diagnostic`] by
//! combining topology lookups, stack trace parsing and classification.

use crate::classifier::ErrorClassifier;
use crate::models::{Diagnostic, ErrorContext, ErrorSummary, RawError};
use crate::source_locator::SourceLocator;
use crate::topology::TopologyResolver;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct DiagnosticCorrelator {
    topology: TopologyResolver,
    locator: SourceLocator,
    classifier: ErrorClassifier,
}

impl DiagnosticCorrelator {
    pub fn new(
        topology: TopologyResolver,
        locator: SourceLocator,
        classifier: ErrorClassifier,
    ) -> Self {
        Self {
            topology,
            locator,
            classifier,
        }
    }

    /// Build the diagnostic for `error`. Pure: the same input always yields
    /// the same diagnostic.
    pub fn correlate(&self, error: &RawError) -> Diagnostic {
        let pipeline = self.topology.resolve_pipeline(&error.deployment_unit);
        let repository = self.topology.resolve_repository(error.service_hint());
        let source = self.locator.locate(&error.stack_trace);
        let category = self.classifier.classify(&error.error_type, &error.message);

        debug!(
            "Correlated error '{}' as {} (pipeline {}, repository {})",
            error.message, category, pipeline.pipeline_name, repository.repository
        );

        Diagnostic {
            error: ErrorSummary {
                message: error.message.clone(),
                error_type: error.error_type.clone(),
                stack: error.stack_trace.clone(),
                category,
            },
            context: ErrorContext {
                container_name: error.container_name.clone(),
                role_instance: error.deployment_unit.clone(),
                occurrence_count: error.occurrence_count,
                first_occurrence: error.first_seen,
                last_occurrence: error.last_seen,
            },
            pipeline,
            repository,
            source,
        }
    }
}
