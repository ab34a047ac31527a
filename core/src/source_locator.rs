//! Source Locator
//!
//! Recovers the originating in-application file and line from a stack trace.

use crate::config::LocatorConfig;
use crate::models::SourceLocation;
use tracing::debug;

/// Stack trace parser for in-application frames
#[derive(Debug, Clone)]
pub struct SourceLocator {
    source_marker: String,
    app_root_marker: String,
    /// Extension patterns with the trailing colon, e.g. `.js:`
    frame_patterns: Vec<String>,
}

impl Default for SourceLocator {
    fn default() -> Self {
        Self::new(&LocatorConfig::default())
    }
}

impl SourceLocator {
    pub fn new(config: &LocatorConfig) -> Self {
        Self {
            source_marker: config.source_marker.clone(),
            app_root_marker: config.app_root_marker.clone(),
            frame_patterns: config
                .extensions
                .iter()
                .map(|ext| format!("{}:", ext))
                .collect(),
        }
    }

    /// Find the first in-application frame of `stack_trace`.
    ///
    /// Lines are scanned in order; only lines containing the source marker are
    /// considered, and within such a line the first whitespace-separated token
    /// that carries a recognized `<ext>:` pattern is taken. A trace with no such
    /// frame yields an entirely absent location.
    pub fn locate(&self, stack_trace: &str) -> SourceLocation {
        for line in stack_trace.lines() {
            if !line.contains(&self.source_marker) {
                continue;
            }

            let Some(token) = line.split_whitespace().find(|t| self.is_frame_token(t)) else {
                continue;
            };

            let token = token.trim_matches(|c| c == '(' || c == ')');
            let (path, rest) = token.split_once(':').unwrap_or((token, ""));
            let line_number = rest
                .split(':')
                .next()
                .filter(|segment| !segment.is_empty())
                .map(str::to_string);

            let path = match path.rfind(&self.app_root_marker) {
                Some(idx) => &path[idx + self.app_root_marker.len()..],
                None => path,
            };

            debug!("Located source frame {}:{:?}", path, line_number);
            return SourceLocation {
                file_path: Some(path.to_string()),
                line_number,
            };
        }

        SourceLocation::default()
    }

    fn is_frame_token(&self, token: &str) -> bool {
        self.frame_patterns.iter().any(|p| token.contains(p.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locate(trace: &str) -> SourceLocation {
        SourceLocator::default().locate(trace)
    }

    #[test]
    fn test_plain_frame() {
        let location = locate("at /app/src/api/users.js:11:51");
        assert_eq!(location.file_path.as_deref(), Some("src/api/users.js"));
        assert_eq!(location.line_number.as_deref(), Some("11"));
    }

    #[test]
    fn test_parenthesized_frame_after_header() {
        let trace = "Error: Payment gateway timeout\n    at PaymentService.processPayment (/app/src/services/paymentService.js:28:13)";
        let location = locate(trace);
        assert_eq!(
            location.file_path.as_deref(),
            Some("src/services/paymentService.js")
        );
        assert_eq!(location.line_number.as_deref(), Some("28"));
    }

    #[test]
    fn test_empty_trace_is_absent() {
        assert!(locate("").is_absent());
        assert!(locate("\n\n").is_absent());
    }

    #[test]
    fn test_third_party_frames_are_absent() {
        let trace = "Error: boom\n    at Layer.handle (/app/node_modules/express/lib/router/layer.js:95:5)\n    at next (internal/process/task_queues.js:10:1)";
        assert!(locate(trace).is_absent());
    }

    #[test]
    fn test_marker_line_without_frame_keeps_scanning() {
        let trace = "see src/README for details\n    at handler (/app/src/api/orders.ts:42:7)";
        let location = locate(trace);
        assert_eq!(location.file_path.as_deref(), Some("src/api/orders.ts"));
        assert_eq!(location.line_number.as_deref(), Some("42"));
    }

    #[test]
    fn test_path_outside_app_root_is_kept() {
        let location = locate("at /srv/service/src/index.js:3");
        assert_eq!(
            location.file_path.as_deref(),
            Some("/srv/service/src/index.js")
        );
        assert_eq!(location.line_number.as_deref(), Some("3"));
    }

    #[test]
    fn test_missing_line_segment() {
        let location = locate("at /app/src/index.js:");
        assert_eq!(location.file_path.as_deref(), Some("src/index.js"));
        assert_eq!(location.line_number, None);
    }

    #[test]
    fn test_custom_markers() {
        let config = LocatorConfig {
            source_marker: "lib/".to_string(),
            app_root_marker: "/opt/svc/".to_string(),
            extensions: vec![".py".to_string()],
        };
        let locator = SourceLocator::new(&config);
        let location = locator.locate("File /opt/svc/lib/handlers.py:77 in handle");
        assert_eq!(location.file_path.as_deref(), Some("lib/handlers.py"));
        assert_eq!(location.line_number.as_deref(), Some("77"));

        assert!(locator.locate("at /app/src/api/users.js:11:51").is_absent());
    }
}
