use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::Role;
use super::rules::Legality;
use super::state::WorkOrderState;

/// Facts the guards are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrerequisiteFacts {
    pub interventions_count: i64,
    pub has_damage_description: bool,
}

/// Facts as reported by a caller. Either may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportedFacts {
    pub interventions_count: Option<i64>,
    pub has_damage_description: Option<bool>,
}

impl From<PrerequisiteFacts> for ReportedFacts {
    fn from(facts: PrerequisiteFacts) -> Self {
        ReportedFacts {
            interventions_count: Some(facts.interventions_count),
            has_damage_description: Some(facts.has_damage_description),
        }
    }
}

/// Where the authority takes guard inputs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FactsPolicy {
    /// Recompute from persisted work-order and intervention records.
    #[default]
    Persisted,
    /// Let caller-reported values override persisted ones.
    ClientReported,
}

impl std::str::FromStr for FactsPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "persisted" | "server" => Ok(FactsPolicy::Persisted),
            "client" | "client_reported" => Ok(FactsPolicy::ClientReported),
            other => Err(format!("Unknown facts policy '{other}'")),
        }
    }
}

/// A user to inform once a transition succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Who executed a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutedBy {
    pub id: i64,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionType {
    #[default]
    Manual,
    Automatic,
    Rollback,
}

impl TransitionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionType::Manual => "manual",
            TransitionType::Automatic => "automatic",
            TransitionType::Rollback => "rollback",
        }
    }
}

/// One executed transition. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub from_state: WorkOrderState,
    pub to_state: WorkOrderState,
    pub executed_by: ExecutedBy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub transition_type: TransitionType,
}

/// Wire classification of a candidate target state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionStatus {
    Allowed,
    BlockedByGuard,
    BlockedByRole,
    Unreachable,
}

/// Legality of moving the work order to `to_state`, as reported by the
/// authority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionOption {
    pub to_state: WorkOrderState,
    pub allowed: bool,
    pub reason_required: bool,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub allowed_roles: Vec<Role>,
    #[serde(default)]
    pub recipients: Vec<Recipient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TransitionStatus>,
}

impl TransitionOption {
    /// Recovers the tagged legality from the flat wire shape. Options from
    /// authorities that do not send `status` are read from `allowed` alone.
    pub fn legality(&self) -> Legality {
        match self.status {
            Some(TransitionStatus::Allowed) => Legality::Allowed,
            Some(TransitionStatus::BlockedByGuard) => Legality::BlockedByGuard(self.explanation.clone()),
            Some(TransitionStatus::BlockedByRole) => Legality::BlockedByRole(self.explanation.clone()),
            Some(TransitionStatus::Unreachable) => Legality::Unreachable,
            None if self.allowed => Legality::Allowed,
            None => Legality::BlockedByGuard(self.explanation.clone()),
        }
    }
}

/// Result of a catalog query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionCatalog {
    pub work_order_id: i64,
    pub current_state: WorkOrderState,
    pub available_transitions: Vec<TransitionOption>,
}

/// A transition to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRequest {
    pub work_order_id: i64,
    pub target_state: WorkOrderState,
    pub reason: Option<String>,
    pub reported_facts: ReportedFacts,
    /// When present, the transition only applies if the work order is still
    /// in this state.
    pub expected_state: Option<WorkOrderState>,
}

/// Returned to the caller after a successful transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub success: bool,
    pub work_order_id: i64,
    pub from_state: WorkOrderState,
    pub to_state: WorkOrderState,
    pub timestamp: DateTime<Utc>,
    pub executed_by: ExecutedBy,
    #[serde(default)]
    pub audit_entry_id: i64,
}

impl TransitionOutcome {
    pub fn from_audit(work_order_id: i64, entry: &AuditEntry) -> Self {
        TransitionOutcome {
            success: true,
            work_order_id,
            from_state: entry.from_state,
            to_state: entry.to_state,
            timestamp: entry.timestamp,
            executed_by: entry.executed_by.clone(),
            audit_entry_id: entry.id,
        }
    }
}
