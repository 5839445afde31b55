//! Request and response bodies of the `/api/v1` surface, shared by the
//! handlers and the HTTP client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::work_order::WorkOrder;
use crate::workflow::{AuditEntry, ReportedFacts, WorkOrderState};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Work order as returned by `GET /work-orders/{id}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkOrderResponse {
    pub id: i64,
    pub number: String,
    pub state: WorkOrderState,
    pub damage_description: Option<String>,
    pub interventions_count: i64,
    pub has_damage_description: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&WorkOrder> for WorkOrderResponse {
    fn from(w: &WorkOrder) -> Self {
        WorkOrderResponse {
            id: w.id,
            number: w.number.clone(),
            state: w.state,
            damage_description: w.damage_description.clone(),
            interventions_count: w.interventions_count,
            has_damage_description: w.has_damage_description(),
            completed_at: w.completed_at,
        }
    }
}

/// Query string of the catalog endpoint. `has_descrizione` keeps the name
/// existing front ends already send.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CatalogQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interventions_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_descrizione: Option<bool>,
}

impl CatalogQuery {
    pub fn reported_facts(&self) -> ReportedFacts {
        ReportedFacts {
            interventions_count: self.interventions_count,
            has_damage_description: self.has_descrizione,
        }
    }
}

impl From<ReportedFacts> for CatalogQuery {
    fn from(facts: ReportedFacts) -> Self {
        CatalogQuery {
            interventions_count: facts.interventions_count,
            has_descrizione: facts.has_damage_description,
        }
    }
}

/// Body of `POST /work-orders/{id}/transition/{target_state}`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TransitionBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interventions_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_descrizione: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_state: Option<WorkOrderState>,
}

impl TransitionBody {
    pub fn reported_facts(&self) -> ReportedFacts {
        ReportedFacts {
            interventions_count: self.interventions_count,
            has_damage_description: self.has_descrizione,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AuditQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AuditTrailResponse {
    pub work_order_id: i64,
    pub audit_trail: Vec<AuditEntry>,
}
