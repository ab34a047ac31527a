//! HTTP error source
//!
//! Talks to a monitoring service exposing
//! `GET /api/errors/transaction/{id}` (one record) and
//! `GET /api/errors/scope/{id}?timeRange=R` (`{"errors": [...]}`).

use super::ErrorSource;
use crate::error::{Result, TriageError};
use crate::models::RawError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

const SERVICE: &str = "error-source";

/// Error record as returned by the monitoring service
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorRecord {
    pub transaction_id: Option<String>,
    pub scope_id: Option<String>,
    pub error: ErrorBody,
    pub container_name: String,
    pub role_instance: String,
    pub occurrence_count: u64,
    pub first_occurrence: Option<DateTime<Utc>>,
    pub last_occurrence: Option<DateTime<Utc>>,
    pub metadata: BTreeMap<String, Value>,
}

/// Nested `error` object of an [`ErrorRecord`]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    pub stack: String,
}

impl From<ErrorRecord> for RawError {
    fn from(record: ErrorRecord) -> Self {
        let metadata = record
            .metadata
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect();

        RawError {
            transaction_id: record.transaction_id,
            scope_id: record.scope_id,
            message: record.error.message,
            error_type: record.error.error_type,
            stack_trace: record.error.stack,
            deployment_unit: record.role_instance,
            container_name: record.container_name,
            occurrence_count: record.occurrence_count,
            first_seen: record.first_occurrence,
            last_seen: record.last_occurrence,
            metadata,
        }
    }
}

/// Decode either a single record or an `{"errors": [...]}` envelope
pub fn decode_records(payload: Value) -> Result<Vec<RawError>> {
    let invalid = |e: serde_json::Error| TriageError::InvalidResponse {
        service: SERVICE.to_string(),
        message: e.to_string(),
    };

    let Value::Object(mut map) = payload else {
        return Err(TriageError::InvalidResponse {
            service: SERVICE.to_string(),
            message: "expected a JSON object".to_string(),
        });
    };

    match map.remove("errors") {
        Some(errors) => {
            let records: Vec<ErrorRecord> = serde_json::from_value(errors).map_err(invalid)?;
            Ok(records.into_iter().map(RawError::from).collect())
        }
        None => {
            let record: ErrorRecord =
                serde_json::from_value(Value::Object(map)).map_err(invalid)?;
            Ok(vec![record.into()])
        }
    }
}

/// Monitoring-service backed [`ErrorSource`]
#[derive(Debug, Clone)]
pub struct HttpErrorSource {
    client: Client,
    base_url: String,
}

impl HttpErrorSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// `{base}/seg/seg/...` with every segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let invalid = || {
            TriageError::Configuration(format!("invalid error source url: {}", self.base_url))
        };
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send `request`; non-success statuses mean "nothing found"
    async fn get(&self, request: reqwest::RequestBuilder) -> Result<Option<Value>> {
        let response = request.send().await.map_err(|e| TriageError::Transport {
            service: SERVICE.to_string(),
            message: e.to_string(),
        })?;

        if !response.status().is_success() {
            debug!("Error source answered {}", response.status());
            return Ok(None);
        }

        let payload = response
            .json::<Value>()
            .await
            .map_err(|e| TriageError::InvalidResponse {
                service: SERVICE.to_string(),
                message: e.to_string(),
            })?;
        Ok(Some(payload))
    }
}

#[async_trait]
impl ErrorSource for HttpErrorSource {
    async fn by_transaction(&self, transaction_id: &str) -> Result<Option<RawError>> {
        let url = self.endpoint(&["api", "errors", "transaction", transaction_id])?;
        match self.get(self.client.get(url)).await? {
            Some(payload) => Ok(decode_records(payload)?.into_iter().next()),
            None => Ok(None),
        }
    }

    async fn by_scope(&self, scope_id: &str, time_range: &str) -> Result<Vec<RawError>> {
        let url = self.endpoint(&["api", "errors", "scope", scope_id])?;
        let request = self.client.get(url).query(&[("timeRange", time_range)]);
        match self.get(request).await? {
            Some(payload) => decode_records(payload),
            None => Ok(Vec::new()),
        }
    }
}
