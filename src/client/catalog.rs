use std::sync::Arc;

use crate::workflow::{ReportedFacts, TransitionOption};

use super::api::WorkflowApi;

/// Fetches the transition catalog. Fails open: any failure yields an empty
/// catalog so the rest of the page keeps working.
#[derive(Clone)]
pub struct TransitionCatalogResolver {
    api: Arc<dyn WorkflowApi>,
}

impl TransitionCatalogResolver {
    pub fn new(api: Arc<dyn WorkflowApi>) -> Self {
        Self { api }
    }

    pub async fn fetch(&self, work_order_id: i64, facts: &ReportedFacts) -> Vec<TransitionOption> {
        match self.api.available_transitions(work_order_id, facts).await {
            Ok(catalog) => catalog.available_transitions,
            Err(e) => {
                log::warn!("Could not load transitions for work order {work_order_id}, using none: {e}");
                Vec::new()
            }
        }
    }
}
