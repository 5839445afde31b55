use std::sync::Arc;

use crate::workflow::AuditEntry;

use super::api::WorkflowApi;

#[derive(Clone)]
pub struct AuditTrailReader {
    api: Arc<dyn WorkflowApi>,
}

impl AuditTrailReader {
    pub fn new(api: Arc<dyn WorkflowApi>) -> Self {
        Self { api }
    }

    /// Most recent first; empty on failure.
    pub async fn fetch(&self, work_order_id: i64, limit: i64) -> Vec<AuditEntry> {
        match self.api.audit_trail(work_order_id, limit).await {
            Ok(entries) => entries,
            Err(e) => {
                log::error!("Could not load audit trail for work order {work_order_id}: {e}");
                Vec::new()
            }
        }
    }
}
