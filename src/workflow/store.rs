//! Storage port for the workflow authority.
//!
//! The authority never touches the database directly; it goes through a
//! [`WorkflowStore`], which lets the same rules run against PostgreSQL in
//! production and against an in-memory store in tests.

use async_trait::async_trait;

use crate::models::notification::{Notification, NotificationContent};
use crate::models::user::User;
use crate::models::work_order::WorkOrder;

use super::error::WorkflowError;
use super::role::Role;
use super::state::WorkOrderState;
use super::types::{AuditEntry, Recipient, TransitionType};

/// Everything needed to persist one executed transition.
#[derive(Debug, Clone)]
pub struct TransitionRecord {
    pub work_order_id: i64,
    pub from_state: WorkOrderState,
    pub to_state: WorkOrderState,
    pub transition_type: TransitionType,
    pub actor: User,
    pub reason: Option<String>,
    pub recipients: Vec<Recipient>,
    pub notification: NotificationContent,
}

#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Load a work order with its derived facts.
    async fn find_work_order(&self, id: i64) -> Result<Option<WorkOrder>, WorkflowError>;

    async fn find_user(&self, id: i64) -> Result<Option<User>, WorkflowError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, WorkflowError>;

    /// Active users holding any of `roles`.
    async fn find_recipients(&self, roles: &[Role]) -> Result<Vec<Recipient>, WorkflowError>;

    /// Atomically move the work order from `record.from_state` to
    /// `record.to_state`, append one audit entry and one notification per
    /// recipient.
    ///
    /// Returns `Ok(None)` without writing anything when the work order is no
    /// longer in `record.from_state`.
    async fn apply_transition(&self, record: &TransitionRecord) -> Result<Option<AuditEntry>, WorkflowError>;

    /// Most recent first.
    async fn audit_trail(&self, work_order_id: i64, limit: i64) -> Result<Vec<AuditEntry>, WorkflowError>;

    async fn unread_notifications(&self, user_id: i64) -> Result<Vec<Notification>, WorkflowError>;
}
