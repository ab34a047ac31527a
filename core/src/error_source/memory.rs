//! In-memory error source
//!
//! Stand-in for the monitoring backend, seeded with the reference records.

use super::{parse_time_window, ErrorSource};
use crate::error::Result;
use crate::models::RawError;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::BTreeMap;

/// Fixed table of error records
#[derive(Debug, Clone, Default)]
pub struct InMemoryErrorSource {
    records: Vec<RawError>,
}

impl InMemoryErrorSource {
    pub fn new(records: Vec<RawError>) -> Self {
        Self { records }
    }

    /// Table holding the three reference production errors, timestamped
    /// relative to now.
    pub fn seeded() -> Self {
        let now = Utc::now();
        let metadata = |region: &str, service: &str, version: &str| {
            BTreeMap::from([
                ("environment".to_string(), "production".to_string()),
                ("region".to_string(), region.to_string()),
                ("service".to_string(), service.to_string()),
                ("version".to_string(), version.to_string()),
            ])
        };

        Self::new(vec![
            RawError {
                transaction_id: Some("txn-seed-001".to_string()),
                scope_id: Some("user-service-prod".to_string()),
                message: "TypeError: Cannot read property 'id' of undefined".to_string(),
                error_type: "TypeError".to_string(),
                stack_trace: "TypeError: Cannot read property 'id' of undefined\n    at /app/src/api/users.js:11:51".to_string(),
                deployment_unit: "aks-nodepool1-12345".to_string(),
                container_name: "user-service-pod-7f8b9c".to_string(),
                occurrence_count: 47,
                first_seen: Some(now - Duration::hours(24)),
                last_seen: Some(now),
                metadata: metadata("eastus", "user-service", "1.2.3"),
            },
            RawError {
                transaction_id: Some("txn-seed-002".to_string()),
                scope_id: Some("payment-service-prod".to_string()),
                message: "UnhandledPromiseRejectionWarning: Error: Payment gateway timeout".to_string(),
                error_type: "UnhandledPromiseRejection".to_string(),
                stack_trace: "Error: Payment gateway timeout\n    at PaymentService.processPayment (/app/src/services/paymentService.js:28:13)".to_string(),
                deployment_unit: "aks-nodepool1-67890".to_string(),
                container_name: "payment-service-pod-a3c4d5".to_string(),
                occurrence_count: 23,
                first_seen: Some(now - Duration::hours(12)),
                last_seen: Some(now),
                metadata: metadata("westus", "payment-service", "2.1.0"),
            },
            RawError {
                transaction_id: Some("txn-seed-003".to_string()),
                scope_id: Some("analytics-service-prod".to_string()),
                message: "Error: Database connection lost".to_string(),
                error_type: "DatabaseError".to_string(),
                stack_trace: "Error: Database connection lost\n    at UserService.deleteUser (/app/src/services/userService.js:65:13)".to_string(),
                deployment_unit: "aks-nodepool1-11223".to_string(),
                container_name: "analytics-service-pod-e2f1g3".to_string(),
                occurrence_count: 12,
                first_seen: Some(now - Duration::hours(6)),
                last_seen: Some(now),
                metadata: metadata("centralus", "analytics-service", "1.0.5"),
            },
        ])
    }

    pub fn records(&self) -> &[RawError] {
        &self.records
    }
}

#[async_trait]
impl ErrorSource for InMemoryErrorSource {
    async fn by_transaction(&self, transaction_id: &str) -> Result<Option<RawError>> {
        Ok(self
            .records
            .iter()
            .find(|r| r.transaction_id.as_deref() == Some(transaction_id))
            .cloned())
    }

    async fn by_scope(&self, scope_id: &str, time_range: &str) -> Result<Vec<RawError>> {
        // A window reaching past the earliest representable instant has no cutoff.
        let cutoff = Utc::now().checked_sub_signed(parse_time_window(time_range));
        let mut matches: Vec<RawError> = self
            .records
            .iter()
            .filter(|r| r.scope_id.as_deref() == Some(scope_id))
            .filter(|r| {
                r.last_seen
                    .is_some_and(|seen| cutoff.map_or(true, |cutoff| seen >= cutoff))
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
        Ok(matches)
    }
}
