//! Triage API Module
//!
//! HTTP endpoints for the triage pipeline: `/diagnose` (stage 1),
//! `/generate-solution` (stage 2), `/workflow` (both) and `/health`.

pub mod handlers;
pub mod models;
pub mod server;

pub use handlers::*;
pub use models::*;
pub use server::*;
