//! Error Classifier
//!
//! Maps an error message onto an [`ErrorCategory`] using an ordered keyword
//! rule table. The first rule whose keywords match wins; unmatched messages
//! fall through to [`ErrorCategory::RuntimeError`].

use crate::models::ErrorCategory;

/// How a rule's keywords are combined
#[derive(Debug, Clone, Copy)]
pub enum KeywordMatch {
    /// At least one keyword must appear
    Any(&'static [&'static str]),
    /// Every keyword must appear
    All(&'static [&'static str]),
}

impl KeywordMatch {
    /// `text` must already be lower-cased
    fn matches(&self, text: &str) -> bool {
        match self {
            KeywordMatch::Any(keywords) => keywords.iter().any(|k| text.contains(k)),
            KeywordMatch::All(keywords) => keywords.iter().all(|k| text.contains(k)),
        }
    }
}

/// One (predicate, result) pair of the classification table
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    pub keywords: KeywordMatch,
    pub category: ErrorCategory,
}

/// Priority-ordered classification rules
pub const CLASSIFICATION_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        keywords: KeywordMatch::Any(&["cannot read property", "undefined"]),
        category: ErrorCategory::NullReference,
    },
    ClassificationRule {
        keywords: KeywordMatch::All(&["unhandled", "promise"]),
        category: ErrorCategory::UnhandledPromise,
    },
    ClassificationRule {
        keywords: KeywordMatch::Any(&["division", "divide"]),
        category: ErrorCategory::MathError,
    },
    ClassificationRule {
        keywords: KeywordMatch::Any(&["access denied", "permission"]),
        category: ErrorCategory::AccessControl,
    },
    ClassificationRule {
        keywords: KeywordMatch::Any(&["connection"]),
        category: ErrorCategory::ResourceLeak,
    },
    ClassificationRule {
        keywords: KeywordMatch::Any(&["timeout"]),
        category: ErrorCategory::Timeout,
    },
];

/// Keyword-based error classifier
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    rules: Vec<ClassificationRule>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self {
            rules: CLASSIFICATION_RULES.to_vec(),
        }
    }
}

impl ErrorClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule after the built-in ones
    pub fn with_rule(mut self, rule: ClassificationRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Classify an error. `_error_type` is accepted for callers that have it;
    /// no rule currently looks at it.
    pub fn classify(&self, _error_type: &str, error_message: &str) -> ErrorCategory {
        let message = error_message.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.keywords.matches(&message))
            .map(|rule| rule.category)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(message: &str) -> ErrorCategory {
        ErrorClassifier::new().classify("Error", message)
    }

    #[test]
    fn test_each_rule() {
        assert_eq!(
            classify("TypeError: Cannot read property 'id' of undefined"),
            ErrorCategory::NullReference
        );
        assert_eq!(
            classify("Unhandled rejection in Promise chain"),
            ErrorCategory::UnhandledPromise
        );
        assert_eq!(classify("Division by zero"), ErrorCategory::MathError);
        assert_eq!(classify("cannot divide amount"), ErrorCategory::MathError);
        assert_eq!(
            classify("Access denied: Order does not belong to user"),
            ErrorCategory::AccessControl
        );
        assert_eq!(classify("Permission missing"), ErrorCategory::AccessControl);
        assert_eq!(
            classify("Error: Database connection lost"),
            ErrorCategory::ResourceLeak
        );
        assert_eq!(classify("Request Timeout"), ErrorCategory::Timeout);
        assert_eq!(classify("Something exploded"), ErrorCategory::RuntimeError);
        assert_eq!(classify(""), ErrorCategory::RuntimeError);
    }

    #[test]
    fn test_undefined_wins_regardless_of_type() {
        let classifier = ErrorClassifier::new();
        for error_type in ["TypeError", "DatabaseError", "", "Timeout"] {
            for message in ["UNDEFINED value", "x is Undefined", "connection undefined timeout"] {
                assert_eq!(
                    classifier.classify(error_type, message),
                    ErrorCategory::NullReference
                );
            }
        }
    }

    #[test]
    fn test_rule_order_breaks_ties() {
        // Both the promise rule and the timeout rule match; the promise rule comes first.
        assert_eq!(
            classify("UnhandledPromiseRejectionWarning: Error: Payment gateway timeout"),
            ErrorCategory::UnhandledPromise
        );
        // "unhandled" alone is not enough for the promise rule.
        assert_eq!(classify("unhandled timeout"), ErrorCategory::Timeout);
        assert_eq!(
            classify("connection timeout"),
            ErrorCategory::ResourceLeak
        );
    }

    #[test]
    fn test_appended_rule_runs_last() {
        let classifier = ErrorClassifier::new().with_rule(ClassificationRule {
            keywords: KeywordMatch::Any(&["out of memory"]),
            category: ErrorCategory::ResourceLeak,
        });
        assert_eq!(
            classifier.classify("RangeError", "Out of memory"),
            ErrorCategory::ResourceLeak
        );
        assert_eq!(
            classifier.classify("RangeError", "out of memory: undefined buffer"),
            ErrorCategory::NullReference
        );
    }
}
