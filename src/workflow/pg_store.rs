use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::notification::{self, Notification};
use crate::models::user::{self, User};
use crate::models::work_order::{self, WorkOrder};
use crate::models::audit::{self, NewAuditEntry};

use super::error::WorkflowError;
use super::role::Role;
use super::store::{TransitionRecord, WorkflowStore};
use super::types::{AuditEntry, Recipient};

/// [`WorkflowStore`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgWorkflowStore {
    pool: PgPool,
}

impl PgWorkflowStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkflowStore for PgWorkflowStore {
    async fn find_work_order(&self, id: i64) -> Result<Option<WorkOrder>, WorkflowError> {
        work_order::find_by_id(&self.pool, id).await
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, WorkflowError> {
        user::find_by_id(&self.pool, id).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, WorkflowError> {
        user::find_by_username(&self.pool, username).await
    }

    async fn find_recipients(&self, roles: &[Role]) -> Result<Vec<Recipient>, WorkflowError> {
        let users = user::find_active_by_roles(&self.pool, roles).await?;
        Ok(users.iter().map(User::recipient).collect())
    }

    async fn apply_transition(&self, record: &TransitionRecord) -> Result<Option<AuditEntry>, WorkflowError> {
        let mut tx = self.pool.begin().await?;

        let moved = work_order::compare_and_set_state(
            &mut *tx,
            record.work_order_id,
            record.from_state,
            record.to_state,
        )
        .await?;
        if !moved {
            tx.rollback().await?;
            return Ok(None);
        }

        let executed_by = record.actor.executed_by();
        let entry = audit::create(
            &mut *tx,
            &NewAuditEntry {
                work_order_id: record.work_order_id,
                from_state: record.from_state,
                to_state: record.to_state,
                transition_type: record.transition_type,
                executed_by: &executed_by,
                reason: record.reason.as_deref(),
            },
        )
        .await?;

        let user_ids: Vec<i64> = record.recipients.iter().map(|r| r.id).collect();
        notification::create_for_users(&mut tx, record.work_order_id, &user_ids, &record.notification).await?;

        tx.commit().await?;
        Ok(Some(entry))
    }

    async fn audit_trail(&self, work_order_id: i64, limit: i64) -> Result<Vec<AuditEntry>, WorkflowError> {
        audit::find_for_work_order(&self.pool, work_order_id, limit).await
    }

    async fn unread_notifications(&self, user_id: i64) -> Result<Vec<Notification>, WorkflowError> {
        let mut conn = self.pool.acquire().await?;
        notification::find_unread_for_user(&mut conn, user_id).await
    }
}
