use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use crate::workflow::{AuditEntry, ExecutedBy, Role, TransitionType, WorkOrderState, WorkflowError};

/// Data for one new audit row.
pub struct NewAuditEntry<'a> {
    pub work_order_id: i64,
    pub from_state: WorkOrderState,
    pub to_state: WorkOrderState,
    pub transition_type: TransitionType,
    pub executed_by: &'a ExecutedBy,
    pub reason: Option<&'a str>,
}

/// SQL for audit display: audit row + executor name via JOIN.
/// `user_role` is the role held at execution time, not the current one.
const SELECT_AUDIT_DISPLAY: &str = "\
    SELECT a.id, a.from_state, a.to_state, a.transition_type, \
           a.executed_by, COALESCE(u.full_name, 'unknown') AS executor_name, \
           a.user_role, a.reason, a.created_at \
    FROM work_order_audits a \
    LEFT JOIN users u ON u.id = a.executed_by";

#[derive(sqlx::FromRow)]
struct Row {
    id: i64,
    from_state: String,
    to_state: String,
    transition_type: String,
    executed_by: i64,
    executor_name: String,
    user_role: String,
    reason: Option<String>,
    created_at: DateTime<Utc>,
}

fn row_to_audit_entry(row: Row) -> Result<AuditEntry, WorkflowError> {
    let corrupt = |e: String| WorkflowError::Corrupt(format!("audit entry {}: {e}", row.id));
    let transition_type = match row.transition_type.as_str() {
        "automatic" => TransitionType::Automatic,
        "rollback" => TransitionType::Rollback,
        _ => TransitionType::Manual,
    };
    Ok(AuditEntry {
        id: row.id,
        from_state: row.from_state.parse().map_err(corrupt)?,
        to_state: row.to_state.parse().map_err(corrupt)?,
        executed_by: ExecutedBy {
            id: row.executed_by,
            name: row.executor_name.clone(),
            role: row.user_role.parse::<Role>().map_err(corrupt)?,
        },
        reason: row.reason.clone(),
        timestamp: row.created_at,
        transition_type,
    })
}

/// Fetch the `limit` most recent audit entries for a work order.
pub async fn find_for_work_order<'e, E: PgExecutor<'e>>(
    exec: E,
    work_order_id: i64,
    limit: i64,
) -> Result<Vec<AuditEntry>, WorkflowError> {
    let rows = sqlx::query_as::<_, Row>(&format!(
        "{SELECT_AUDIT_DISPLAY} WHERE a.work_order_id = $1 \
         ORDER BY a.created_at DESC, a.id DESC LIMIT $2"
    ))
    .bind(work_order_id)
    .bind(limit)
    .fetch_all(exec)
    .await?;

    rows.into_iter().map(row_to_audit_entry).collect()
}

/// Create an audit entry and return it as stored.
pub async fn create<'e, E: PgExecutor<'e>>(
    exec: E,
    entry: &NewAuditEntry<'_>,
) -> Result<AuditEntry, WorkflowError> {
    let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
        "INSERT INTO work_order_audits \
             (work_order_id, from_state, to_state, transition_type, executed_by, user_role, reason) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id, created_at",
    )
    .bind(entry.work_order_id)
    .bind(entry.from_state.as_str())
    .bind(entry.to_state.as_str())
    .bind(entry.transition_type.as_str())
    .bind(entry.executed_by.id)
    .bind(entry.executed_by.role.as_str())
    .bind(entry.reason)
    .fetch_one(exec)
    .await?;

    Ok(AuditEntry {
        id,
        from_state: entry.from_state,
        to_state: entry.to_state,
        executed_by: entry.executed_by.clone(),
        reason: entry.reason.map(String::from),
        timestamp: created_at,
        transition_type: entry.transition_type,
    })
}
