//! The single source of truth for work-order transitions.
//!
//! Every call re-reads the work order and re-evaluates the transition table;
//! nothing a caller learned from an earlier catalog query is trusted.

use std::sync::Arc;

use crate::models::user::User;
use crate::models::work_order::WorkOrder;

use super::error::WorkflowError;
use super::notify;
use super::rules::{self, Legality};
use super::state::WorkOrderState;
use super::store::{TransitionRecord, WorkflowStore};
use super::types::{
    AuditEntry, FactsPolicy, PrerequisiteFacts, ReportedFacts, TransitionCatalog, TransitionOption,
    TransitionOutcome, TransitionRequest, TransitionType,
};

pub const DEFAULT_AUDIT_LIMIT: i64 = 50;
pub const MAX_AUDIT_LIMIT: i64 = 1000;

pub struct WorkflowAuthority {
    store: Arc<dyn WorkflowStore>,
    facts_policy: FactsPolicy,
}

impl WorkflowAuthority {
    pub fn new(store: Arc<dyn WorkflowStore>, facts_policy: FactsPolicy) -> Self {
        Self { store, facts_policy }
    }

    pub fn store(&self) -> &dyn WorkflowStore {
        self.store.as_ref()
    }

    pub fn facts_policy(&self) -> FactsPolicy {
        self.facts_policy
    }

    pub async fn work_order(&self, id: i64) -> Result<WorkOrder, WorkflowError> {
        self.store
            .find_work_order(id)
            .await?
            .ok_or(WorkflowError::NotFound(id))
    }

    /// Load the acting user fresh, so role changes take effect immediately.
    pub async fn resolve_actor(&self, user_id: i64) -> Result<User, WorkflowError> {
        match self.store.find_user(user_id).await? {
            Some(user) if user.active => Ok(user),
            _ => Err(WorkflowError::UnknownActor(user_id)),
        }
    }

    /// Guard inputs for `work_order` under the configured policy.
    pub fn resolve_facts(&self, work_order: &WorkOrder, reported: &ReportedFacts) -> PrerequisiteFacts {
        let persisted = work_order.facts();
        match self.facts_policy {
            FactsPolicy::Persisted => {
                let mismatch = reported.interventions_count.is_some_and(|n| n != persisted.interventions_count)
                    || reported
                        .has_damage_description
                        .is_some_and(|d| d != persisted.has_damage_description);
                if mismatch {
                    log::warn!(
                        "Work order {}: reported facts {:?} differ from persisted {:?}; using persisted",
                        work_order.id, reported, persisted
                    );
                }
                persisted
            }
            FactsPolicy::ClientReported => PrerequisiteFacts {
                interventions_count: reported
                    .interventions_count
                    .unwrap_or(persisted.interventions_count),
                has_damage_description: reported
                    .has_damage_description
                    .unwrap_or(persisted.has_damage_description),
            },
        }
    }

    /// Report every state other than the current one, in display order,
    /// with its legality for `actor`.
    pub async fn query_transitions(
        &self,
        work_order_id: i64,
        reported: &ReportedFacts,
        actor: &User,
    ) -> Result<TransitionCatalog, WorkflowError> {
        let work_order = self.work_order(work_order_id).await?;
        let facts = self.resolve_facts(&work_order, reported);
        let current = work_order.state;

        let mut options = Vec::new();
        for target in WorkOrderState::ALL.into_iter().filter(|s| *s != current) {
            let legality = rules::evaluate(current, target, &facts, actor.role);
            let option = match rules::find_rule(current, target) {
                Some(rule) => TransitionOption {
                    to_state: target,
                    allowed: legality.is_allowed(),
                    reason_required: rule.reason_required,
                    explanation: legality.explanation(current),
                    allowed_roles: rule.allowed_roles.to_vec(),
                    recipients: self.store.find_recipients(rule.allowed_roles).await?,
                    status: legality.status(),
                },
                None => TransitionOption {
                    to_state: target,
                    allowed: false,
                    reason_required: false,
                    explanation: legality.explanation(current),
                    allowed_roles: Vec::new(),
                    recipients: Vec::new(),
                    status: legality.status(),
                },
            };
            options.push(option);
        }

        Ok(TransitionCatalog {
            work_order_id,
            current_state: current,
            available_transitions: options,
        })
    }

    /// Validate and apply one transition.
    pub async fn execute(
        &self,
        request: &TransitionRequest,
        actor: &User,
    ) -> Result<TransitionOutcome, WorkflowError> {
        let work_order = self.work_order(request.work_order_id).await?;
        let from = work_order.state;
        let to = request.target_state;

        let rule = rules::find_rule(from, to).ok_or(WorkflowError::InvalidTransition { from, to })?;

        if let Some(expected) = request.expected_state {
            if expected != from {
                return Err(WorkflowError::StateConflict(format!(
                    "Work order {} is in state '{from}', not '{expected}'; reload and retry",
                    work_order.id
                )));
            }
        }

        let facts = self.resolve_facts(&work_order, &request.reported_facts);
        match rule.evaluate(&facts, actor.role) {
            Legality::BlockedByRole(message) => return Err(WorkflowError::RoleNotAuthorized(message)),
            Legality::BlockedByGuard(message) => return Err(WorkflowError::PrerequisiteNotMet(message)),
            _ => {}
        }

        if let Some(message) = rules::validate_reason(request.reason.as_deref(), rule.reason_required) {
            return Err(WorkflowError::ReasonRequired(message));
        }
        let reason = rules::normalize_reason(request.reason.as_deref());

        let recipients = self.store.find_recipients(rule.allowed_roles).await?;
        let record = TransitionRecord {
            work_order_id: work_order.id,
            from_state: from,
            to_state: to,
            transition_type: TransitionType::Manual,
            actor: actor.clone(),
            notification: notify::compose(&work_order, to, actor, reason.as_deref()),
            reason,
            recipients,
        };

        let entry = self.store.apply_transition(&record).await?.ok_or_else(|| {
            WorkflowError::StateConflict(format!(
                "Work order {} changed state while the transition was being applied; reload and retry",
                work_order.id
            ))
        })?;

        log::info!(
            "Work order {} moved {} -> {} by user {} ({}), {} recipient(s) notified",
            work_order.id,
            from,
            to,
            actor.id,
            actor.role,
            record.recipients.len()
        );

        Ok(TransitionOutcome::from_audit(work_order.id, &entry))
    }

    /// Most recent first. `limit` defaults to 50 and is clamped to 1..=1000.
    pub async fn audit_trail(&self, work_order_id: i64, limit: Option<i64>) -> Result<Vec<AuditEntry>, WorkflowError> {
        self.work_order(work_order_id).await?;
        let limit = limit.unwrap_or(DEFAULT_AUDIT_LIMIT).clamp(1, MAX_AUDIT_LIMIT);
        self.store.audit_trail(work_order_id, limit).await
    }
}
