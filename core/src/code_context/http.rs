//! HTTP code context
//!
//! Fetches source text from a repository service exposing
//! `GET /api/code?path=P[&line=L]` → `{"content": "..."}`.

use super::CodeContextProvider;
use crate::error::{Result, TriageError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

const SERVICE: &str = "code-context";

#[derive(Debug, Deserialize)]
struct CodeResponse {
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpCodeContext {
    client: Client,
    base_url: String,
}

impl HttpCodeContext {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl CodeContextProvider for HttpCodeContext {
    async fn fetch(&self, file_path: &str, line_number: Option<&str>) -> Result<Option<String>> {
        let url = format!("{}/api/code", self.base_url);
        let mut query = vec![("path", file_path)];
        if let Some(line) = line_number {
            query.push(("line", line));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| TriageError::Transport {
                service: SERVICE.to_string(),
                message: e.to_string(),
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!("No source for {} in repository service", file_path);
                Ok(None)
            }
            status if status.is_success() => {
                let body: CodeResponse =
                    response
                        .json()
                        .await
                        .map_err(|e| TriageError::InvalidResponse {
                            service: SERVICE.to_string(),
                            message: e.to_string(),
                        })?;
                Ok(body.content)
            }
            status => Err(TriageError::InvalidResponse {
                service: SERVICE.to_string(),
                message: format!("unexpected status {}", status),
            }),
        }
    }
}
