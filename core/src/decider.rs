//! Remediation Decider
//!
//! Chooses between a code fix and an operational alert. Rules are evaluated
//! in order and the first applicable one decides; anything unmatched gets a
//! code fix.
//!
//! Timeouts and resource leaks are alerted on only while they are rare. Once
//! they reach the escalation threshold they are treated as defects and a fix
//! is attempted instead.

use crate::models::{Diagnostic, ErrorCategory, RemediationDecision};

/// Default occurrence count at which timeouts and leaks escalate
pub const DEFAULT_ESCALATION_THRESHOLD: u64 = 10;

/// One row of the decision table
#[derive(Debug, Clone)]
pub struct DecisionRule {
    pub categories: Vec<ErrorCategory>,
    /// Rule applies only while the occurrence count is strictly below this
    pub below_occurrences: Option<u64>,
    pub decision: RemediationDecision,
}

impl DecisionRule {
    fn applies(&self, category: ErrorCategory, occurrences: u64) -> bool {
        self.categories.contains(&category)
            && self.below_occurrences.map_or(true, |limit| occurrences < limit)
    }
}

#[derive(Debug, Clone)]
pub struct RemediationDecider {
    rules: Vec<DecisionRule>,
    fallback: RemediationDecision,
}

impl Default for RemediationDecider {
    fn default() -> Self {
        Self::new(DEFAULT_ESCALATION_THRESHOLD)
    }
}

impl RemediationDecider {
    pub fn new(escalation_threshold: u64) -> Self {
        Self {
            rules: vec![
                DecisionRule {
                    categories: vec![
                        ErrorCategory::NullReference,
                        ErrorCategory::UnhandledPromise,
                        ErrorCategory::MathError,
                    ],
                    below_occurrences: None,
                    decision: RemediationDecision::CodeFix,
                },
                DecisionRule {
                    categories: vec![ErrorCategory::Timeout, ErrorCategory::ResourceLeak],
                    below_occurrences: Some(escalation_threshold),
                    decision: RemediationDecision::AlertSuggestion,
                },
                DecisionRule {
                    categories: vec![ErrorCategory::AccessControl],
                    below_occurrences: None,
                    decision: RemediationDecision::AlertSuggestion,
                },
            ],
            fallback: RemediationDecision::CodeFix,
        }
    }

    pub fn rules(&self) -> &[DecisionRule] {
        &self.rules
    }

    pub fn decide_for(&self, category: ErrorCategory, occurrences: u64) -> RemediationDecision {
        self.rules
            .iter()
            .find(|rule| rule.applies(category, occurrences))
            .map(|rule| rule.decision)
            .unwrap_or(self.fallback)
    }

    pub fn decide(&self, diagnostic: &Diagnostic) -> RemediationDecision {
        self.decide_for(diagnostic.category(), diagnostic.occurrence_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RemediationDecision::{AlertSuggestion, CodeFix};

    #[test]
    fn test_code_fix_categories() {
        let decider = RemediationDecider::default();
        for category in [
            ErrorCategory::NullReference,
            ErrorCategory::UnhandledPromise,
            ErrorCategory::MathError,
        ] {
            for count in [0, 9, 10, 10_000] {
                assert_eq!(decider.decide_for(category, count), CodeFix);
            }
        }
    }

    #[test]
    fn test_timeout_escalates_at_threshold() {
        let decider = RemediationDecider::default();
        assert_eq!(decider.decide_for(ErrorCategory::Timeout, 0), AlertSuggestion);
        assert_eq!(decider.decide_for(ErrorCategory::Timeout, 9), AlertSuggestion);
        assert_eq!(decider.decide_for(ErrorCategory::Timeout, 10), CodeFix);
        assert_eq!(decider.decide_for(ErrorCategory::Timeout, 11), CodeFix);
    }

    #[test]
    fn test_resource_leak_escalates_at_threshold() {
        let decider = RemediationDecider::default();
        assert_eq!(decider.decide_for(ErrorCategory::ResourceLeak, 3), AlertSuggestion);
        assert_eq!(decider.decide_for(ErrorCategory::ResourceLeak, 9), AlertSuggestion);
        assert_eq!(decider.decide_for(ErrorCategory::ResourceLeak, 10), CodeFix);
    }

    #[test]
    fn test_access_control_ignores_count() {
        let decider = RemediationDecider::default();
        for count in [0, 9, 10, 500, u64::MAX] {
            assert_eq!(
                decider.decide_for(ErrorCategory::AccessControl, count),
                AlertSuggestion
            );
        }
    }

    #[test]
    fn test_runtime_error_falls_back_to_fix() {
        let decider = RemediationDecider::default();
        assert_eq!(decider.decide_for(ErrorCategory::RuntimeError, 0), CodeFix);
        assert_eq!(decider.decide_for(ErrorCategory::RuntimeError, 99), CodeFix);
    }

    #[test]
    fn test_custom_threshold() {
        let decider = RemediationDecider::new(3);
        assert_eq!(decider.decide_for(ErrorCategory::Timeout, 2), AlertSuggestion);
        assert_eq!(decider.decide_for(ErrorCategory::Timeout, 3), CodeFix);
    }
}
