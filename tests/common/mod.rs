//! Shared test infrastructure.
//!
//! Provides an in-memory [`WorkflowStore`] so the authority and the HTTP
//! handlers can be exercised without a database, plus a small garage fixture.
//!
//! # Setup
//! - `Garage::new(policy)` - store, authority and one active user per role
//! - `Garage::work_order(state, interventions)` - insert a work order

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use garage::auth::password::hash_password;
use garage::models::notification::Notification;
use garage::models::user::User;
use garage::models::work_order::WorkOrder;
use garage::workflow::{
    AuditEntry, FactsPolicy, Recipient, Role, TransitionRecord, WorkOrderState, WorkflowAuthority,
    WorkflowError, WorkflowStore,
};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const TEST_PASSWORD: &str = "officina-2026";

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    work_orders: HashMap<i64, WorkOrder>,
    audits: Vec<(i64, AuditEntry)>,
    notifications: Vec<Notification>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn add_user(&self, username: &str, full_name: &str, role: Role, password_hash: &str) -> User {
        let mut inner = self.lock();
        let user = User {
            id: inner.next_id(),
            username: username.to_string(),
            full_name: full_name.to_string(),
            email: format!("{username}@garage.test"),
            role,
            active: true,
            password_hash: password_hash.to_string(),
        };
        inner.users.push(user.clone());
        user
    }

    pub fn add_work_order(&self, state: WorkOrderState, interventions_count: i64, damage: Option<&str>) -> i64 {
        let mut inner = self.lock();
        let id = inner.next_id();
        let now = Utc::now();
        inner.work_orders.insert(
            id,
            WorkOrder {
                id,
                number: format!("WO-TEST-{id:04}"),
                state,
                damage_description: damage.map(String::from),
                interventions_count,
                completed_at: None,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    pub fn set_interventions(&self, work_order_id: i64, count: i64) {
        if let Some(w) = self.lock().work_orders.get_mut(&work_order_id) {
            w.interventions_count = count;
        }
    }

    pub fn set_role(&self, user_id: i64, role: Role) {
        if let Some(u) = self.lock().users.iter_mut().find(|u| u.id == user_id) {
            u.role = role;
        }
    }

    pub fn deactivate(&self, user_id: i64) {
        if let Some(u) = self.lock().users.iter_mut().find(|u| u.id == user_id) {
            u.active = false;
        }
    }

    pub fn state_of(&self, work_order_id: i64) -> Option<WorkOrderState> {
        self.lock().work_orders.get(&work_order_id).map(|w| w.state)
    }

    pub fn get_work_order(&self, work_order_id: i64) -> Option<WorkOrder> {
        self.lock().work_orders.get(&work_order_id).cloned()
    }

    /// Oldest first.
    pub fn audits_for(&self, work_order_id: i64) -> Vec<AuditEntry> {
        self.lock()
            .audits
            .iter()
            .filter(|(id, _)| *id == work_order_id)
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub fn notifications_for(&self, user_id: i64) -> Vec<Notification> {
        self.lock()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn notification_count(&self) -> usize {
        self.lock().notifications.len()
    }
}

#[async_trait]
impl WorkflowStore for MemoryStore {
    async fn find_work_order(&self, id: i64) -> Result<Option<WorkOrder>, WorkflowError> {
        Ok(self.lock().work_orders.get(&id).cloned())
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, WorkflowError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, WorkflowError> {
        Ok(self.lock().users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_recipients(&self, roles: &[Role]) -> Result<Vec<Recipient>, WorkflowError> {
        Ok(self
            .lock()
            .users
            .iter()
            .filter(|u| u.active && roles.contains(&u.role))
            .map(User::recipient)
            .collect())
    }

    async fn apply_transition(&self, record: &TransitionRecord) -> Result<Option<AuditEntry>, WorkflowError> {
        let mut inner = self.lock();
        let now = Utc::now();

        match inner.work_orders.get_mut(&record.work_order_id) {
            Some(w) if w.state == record.from_state => {
                w.state = record.to_state;
                w.updated_at = now;
                if record.to_state == WorkOrderState::Completed {
                    w.completed_at = Some(now);
                }
            }
            _ => return Ok(None),
        }

        let entry = AuditEntry {
            id: inner.next_id(),
            from_state: record.from_state,
            to_state: record.to_state,
            executed_by: record.actor.executed_by(),
            reason: record.reason.clone(),
            timestamp: now,
            transition_type: record.transition_type,
        };
        inner.audits.push((record.work_order_id, entry.clone()));

        for recipient in &record.recipients {
            let id = inner.next_id();
            inner.notifications.push(Notification {
                id,
                user_id: recipient.id,
                work_order_id: record.work_order_id,
                subject: record.notification.subject.clone(),
                message: record.notification.message.clone(),
                read_at: None,
                created_at: now,
            });
        }

        Ok(Some(entry))
    }

    async fn audit_trail(&self, work_order_id: i64, limit: i64) -> Result<Vec<AuditEntry>, WorkflowError> {
        let mut entries = self.audits_for(work_order_id);
        entries.reverse();
        entries.truncate(limit.max(0) as usize);
        Ok(entries)
    }

    async fn unread_notifications(&self, user_id: i64) -> Result<Vec<Notification>, WorkflowError> {
        let mut notifications: Vec<_> = self
            .notifications_for(user_id)
            .into_iter()
            .filter(|n| n.read_at.is_none())
            .collect();
        notifications.reverse();
        Ok(notifications)
    }
}

// ============================================================================
// GARAGE FIXTURE
// ============================================================================

/// Store, authority and one active user per role.
pub struct Garage {
    pub store: Arc<MemoryStore>,
    pub authority: Arc<WorkflowAuthority>,
    pub admin: User,
    pub manager: User,
    pub mechanic: User,
    pub panelbeater: User,
    pub cmm: User,
}

impl Garage {
    pub fn new(policy: FactsPolicy) -> Self {
        Self::build(policy, "unused")
    }

    /// Same as `new`, with real argon2 hashes of [`TEST_PASSWORD`] so the
    /// login route can be exercised.
    pub fn with_passwords(policy: FactsPolicy) -> Self {
        let hash = hash_password(TEST_PASSWORD).expect("Failed to hash test password");
        Self::build(policy, &hash)
    }

    fn build(policy: FactsPolicy, hash: &str) -> Self {
        let store = Arc::new(MemoryStore::default());
        let admin = store.add_user("admin", "Administrator", Role::Admin, hash);
        let manager = store.add_user("giulia", "Giulia Rossi", Role::GeneralManager, hash);
        let mechanic = store.add_user("marco", "Marco Bianchi", Role::Workshop, hash);
        let panelbeater = store.add_user("luca", "Luca Verdi", Role::Bodyshop, hash);
        let cmm = store.add_user("sara", "Sara Neri", Role::Cmm, hash);
        let authority = Arc::new(WorkflowAuthority::new(store.clone(), policy));
        Self {
            store,
            authority,
            admin,
            manager,
            mechanic,
            panelbeater,
            cmm,
        }
    }

    pub fn work_order(&self, state: WorkOrderState, interventions_count: i64) -> i64 {
        self.store
            .add_work_order(state, interventions_count, Some("Front bumper scratched"))
    }
}
