//! Alert Synthesizer
//!
//! Turns a diagnostic into prioritized operational recommendations from
//! static per-category templates.

use crate::models::{AlertSuggestion, Diagnostic, ErrorCategory, Priority, Suggestion, SuggestionKind};

fn suggestion(
    kind: SuggestionKind,
    priority: Priority,
    action: impl Into<String>,
    details: impl Into<String>,
    recommended_value: impl Into<String>,
) -> Suggestion {
    Suggestion {
        kind,
        priority,
        action: action.into(),
        details: details.into(),
        recommended_value: recommended_value.into(),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlertSynthesizer;

impl AlertSynthesizer {
    pub fn new() -> Self {
        Self
    }

    pub fn synthesize(&self, diagnostic: &Diagnostic) -> AlertSuggestion {
        AlertSuggestion {
            category: diagnostic.category(),
            error_message: diagnostic.error.message.clone(),
            occurrence_count: diagnostic.occurrence_count(),
            suggestions: self.suggestions(diagnostic),
        }
    }

    fn suggestions(&self, diagnostic: &Diagnostic) -> Vec<Suggestion> {
        let occurrences = diagnostic.occurrence_count();

        match diagnostic.category() {
            ErrorCategory::Timeout => vec![
                suggestion(
                    SuggestionKind::Infrastructure,
                    Priority::High,
                    "Increase timeout configuration for payment gateway",
                    format!("Payment gateway timeouts occurring {} times", occurrences),
                    "30s -> 60s",
                ),
                suggestion(
                    SuggestionKind::Monitoring,
                    Priority::Medium,
                    "Set up alert for payment gateway response time",
                    "Alert when response time > 25s",
                    "Alert threshold: 25000ms",
                ),
            ],
            ErrorCategory::ResourceLeak => vec![
                suggestion(
                    SuggestionKind::Operations,
                    Priority::High,
                    format!("Restart container: {}", diagnostic.context.container_name),
                    "Database connections not being properly closed",
                    "Scheduled restart + connection pool monitoring",
                ),
                suggestion(
                    SuggestionKind::Configuration,
                    Priority::Medium,
                    "Review database connection pool settings",
                    "Ensure max connections and idle timeout are configured",
                    "maxConnections: 20, idleTimeout: 30000",
                ),
            ],
            ErrorCategory::AccessControl => vec![suggestion(
                SuggestionKind::Security,
                Priority::High,
                "Review access control policies",
                diagnostic.error.message.clone(),
                "Implement proper authorization checks before data access",
            )],
            _ => vec![suggestion(
                SuggestionKind::Monitoring,
                Priority::Medium,
                "Monitor error frequency",
                format!("Error occurred {} times", occurrences),
                "Set up alert if occurrences > 50 in 1 hour",
            )],
        }
    }
}
