//! API Server Module
//!
//! This module contains the server setup functionality for the triage service.

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use triage_core::TriagePipeline;

use crate::handlers::{diagnose, generate_solution, health_check, run_workflow, ApiState};
use crate::models::ApiConfig;

/// Routes with shared state and the HTTP middleware stack applied
pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/diagnose", post(diagnose))
        .route("/generate-solution", post(generate_solution))
        .route("/workflow", post(run_workflow))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Main API server
pub struct ApiServer {
    /// Server configuration
    config: ApiConfig,
    /// Shared state
    state: Arc<ApiState>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: ApiConfig, pipeline: TriagePipeline) -> Self {
        let state = Arc::new(ApiState {
            pipeline,
            service_name: config.service_name.clone(),
        });

        Self { config, state }
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Start the API server
    pub async fn start(&self) -> Result<()> {
        info!(
            "Starting triage API server on {}:{}",
            self.config.host, self.config.port
        );

        let listener =
            tokio::net::TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        info!("Triage API server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start API server: {}", e))?;

        Ok(())
    }
}
