//! Error Source Adapter
//!
//! Retrieves a single raw error record for a transaction id, or the most
//! recent record for a scope within a time window. Collaborator failures are
//! logged and reported as "nothing found"; the adapter itself never fails.

pub mod http;
pub mod memory;

use crate::error::Result;
use crate::models::RawError;
use async_trait::async_trait;
use chrono::Duration;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

pub use http::{ErrorRecord, HttpErrorSource};
pub use memory::InMemoryErrorSource;

/// Time window applied when a scope query does not name one
pub const DEFAULT_TIME_RANGE: &str = "24h";

/// Lookup criteria. At most one of the ids is used; the transaction id wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorQuery {
    pub transaction_id: Option<String>,
    pub scope_id: Option<String>,
    pub time_range: Option<String>,
}

impl ErrorQuery {
    pub fn by_transaction(transaction_id: impl Into<String>) -> Self {
        Self {
            transaction_id: Some(transaction_id.into()),
            ..Default::default()
        }
    }

    pub fn by_scope(scope_id: impl Into<String>, time_range: Option<String>) -> Self {
        Self {
            scope_id: Some(scope_id.into()),
            time_range,
            ..Default::default()
        }
    }

    pub fn time_range(&self) -> &str {
        self.time_range
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_TIME_RANGE)
    }
}

/// Parse a window like `30m`, `24h` or `7d`. Unrecognized input means 24 hours.
pub fn parse_time_window(range: &str) -> Duration {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"(\d+)([smhd])").ok());

    let parsed = pattern
        .as_ref()
        .and_then(|re| re.captures(range))
        .and_then(|caps| {
            let value: i64 = caps[1].parse().ok()?;
            match &caps[2] {
                "s" => Duration::try_seconds(value),
                "m" => Duration::try_minutes(value),
                "h" => Duration::try_hours(value),
                "d" => Duration::try_days(value),
                _ => None,
            }
        });

    parsed.unwrap_or_else(|| Duration::hours(24))
}

/// Backend holding error records (monitoring API, in-memory table, ...)
#[async_trait]
pub trait ErrorSource: Send + Sync {
    /// Record captured in the given transaction
    async fn by_transaction(&self, transaction_id: &str) -> Result<Option<RawError>>;

    /// Records for a scope within `time_range`, most recent first
    async fn by_scope(&self, scope_id: &str, time_range: &str) -> Result<Vec<RawError>>;
}

/// Degrading front for an [`ErrorSource`]
#[derive(Clone)]
pub struct ErrorSourceAdapter {
    source: Arc<dyn ErrorSource>,
}

impl ErrorSourceAdapter {
    pub fn new(source: Arc<dyn ErrorSource>) -> Self {
        Self { source }
    }

    /// Fetch the error matching `query`, or `None` when nothing matches, no id
    /// was given, or the backend failed.
    pub async fn fetch(&self, query: &ErrorQuery) -> Option<RawError> {
        let transaction_id = query.transaction_id.as_deref().filter(|id| !id.is_empty());
        let scope_id = query.scope_id.as_deref().filter(|id| !id.is_empty());

        let result = if let Some(transaction_id) = transaction_id {
            debug!("Fetching error for transaction {}", transaction_id);
            self.source.by_transaction(transaction_id).await
        } else if let Some(scope_id) = scope_id {
            let time_range = query.time_range();
            debug!("Fetching errors for scope {} within {}", scope_id, time_range);
            self.source
                .by_scope(scope_id, time_range)
                .await
                .map(|errors| errors.into_iter().next())
        } else {
            debug!("Error query names neither a transaction nor a scope");
            return None;
        };

        match result {
            Ok(error) => error,
            Err(e) => {
                warn!("Error source lookup failed: {}", e);
                None
            }
        }
    }
}

impl std::fmt::Debug for ErrorSourceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorSourceAdapter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TriageError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and answers from a fixed list
    struct ScriptedSource {
        scoped: Vec<RawError>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(scoped: Vec<RawError>) -> Self {
            Self {
                scoped,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                scoped: Vec::new(),
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ErrorSource for ScriptedSource {
        async fn by_transaction(&self, transaction_id: &str) -> Result<Option<RawError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TriageError::Transport {
                    service: "scripted".to_string(),
                    message: "connection refused".to_string(),
                });
            }
            Ok(Some(RawError {
                transaction_id: Some(transaction_id.to_string()),
                message: "by transaction".to_string(),
                ..Default::default()
            }))
        }

        async fn by_scope(&self, _scope_id: &str, _time_range: &str) -> Result<Vec<RawError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TriageError::InvalidResponse {
                    service: "scripted".to_string(),
                    message: "garbage".to_string(),
                });
            }
            Ok(self.scoped.clone())
        }
    }

    fn named(message: &str) -> RawError {
        RawError {
            message: message.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_no_ids_skips_lookup() {
        let source = Arc::new(ScriptedSource::new(vec![named("a")]));
        let adapter = ErrorSourceAdapter::new(source.clone());

        assert!(adapter.fetch(&ErrorQuery::default()).await.is_none());
        let blank = ErrorQuery {
            transaction_id: Some(String::new()),
            scope_id: Some(String::new()),
            time_range: None,
        };
        assert!(adapter.fetch(&blank).await.is_none());
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_scope_picks_first() {
        let source = Arc::new(ScriptedSource::new(vec![named("newest"), named("older")]));
        let adapter = ErrorSourceAdapter::new(source);

        let error = adapter
            .fetch(&ErrorQuery::by_scope("user-service-prod", None))
            .await
            .unwrap();
        assert_eq!(error.message, "newest");
    }

    #[tokio::test]
    async fn test_empty_scope_is_absent() {
        let adapter = ErrorSourceAdapter::new(Arc::new(ScriptedSource::new(Vec::new())));
        assert!(adapter
            .fetch(&ErrorQuery::by_scope("user-service-prod", Some("1h".to_string())))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_transaction_wins_over_scope() {
        let adapter = ErrorSourceAdapter::new(Arc::new(ScriptedSource::new(vec![named("scope")])));
        let query = ErrorQuery {
            transaction_id: Some("txn-1".to_string()),
            scope_id: Some("user-service-prod".to_string()),
            time_range: None,
        };
        let error = adapter.fetch(&query).await.unwrap();
        assert_eq!(error.message, "by transaction");
        assert_eq!(error.transaction_id.as_deref(), Some("txn-1"));
    }

    #[tokio::test]
    async fn test_backend_failure_is_swallowed() {
        let adapter = ErrorSourceAdapter::new(Arc::new(ScriptedSource::failing()));
        assert!(adapter.fetch(&ErrorQuery::by_transaction("txn-1")).await.is_none());
        assert!(adapter
            .fetch(&ErrorQuery::by_scope("scope", None))
            .await
            .is_none());
    }

    #[test]
    fn test_parse_time_window() {
        assert_eq!(parse_time_window("30s"), Duration::seconds(30));
        assert_eq!(parse_time_window("15m"), Duration::minutes(15));
        assert_eq!(parse_time_window("24h"), Duration::hours(24));
        assert_eq!(parse_time_window("7d"), Duration::days(7));
        assert_eq!(parse_time_window("last 2h please"), Duration::hours(2));
        assert_eq!(parse_time_window("forever"), Duration::hours(24));
        assert_eq!(parse_time_window(""), Duration::hours(24));
    }

    #[test]
    fn test_default_time_range() {
        assert_eq!(ErrorQuery::default().time_range(), "24h");
        assert_eq!(
            ErrorQuery::by_scope("s", Some("2h".to_string())).time_range(),
            "2h"
        );
    }
}
