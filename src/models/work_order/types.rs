use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::workflow::{PrerequisiteFacts, WorkOrderState};

/// A work order as the workflow sees it, with its derived prerequisite facts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkOrder {
    pub id: i64,
    pub number: String,
    pub state: WorkOrderState,
    pub damage_description: Option<String>,
    pub interventions_count: i64,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkOrder {
    pub fn has_damage_description(&self) -> bool {
        self.damage_description
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty())
    }

    pub fn facts(&self) -> PrerequisiteFacts {
        PrerequisiteFacts {
            interventions_count: self.interventions_count,
            has_damage_description: self.has_damage_description(),
        }
    }
}

/// New work order data for creation. Always starts in `draft`.
pub struct NewWorkOrder {
    pub number: String,
    pub damage_description: Option<String>,
}
