use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use crate::workflow::{WorkOrderState, WorkflowError};
use super::types::{NewWorkOrder, WorkOrder};

#[derive(sqlx::FromRow)]
struct Row {
    id: i64,
    number: String,
    state: String,
    damage_description: Option<String>,
    interventions_count: i64,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Find a work order with its intervention count.
pub async fn find_by_id<'e, E: PgExecutor<'e>>(exec: E, id: i64) -> Result<Option<WorkOrder>, WorkflowError> {
    let row = sqlx::query_as::<_, Row>(
        "SELECT w.id, w.number, w.state, w.damage_description, \
                (SELECT COUNT(*) FROM interventions i WHERE i.work_order_id = w.id) AS interventions_count, \
                w.completed_at, w.created_at, w.updated_at \
         FROM work_orders w \
         WHERE w.id = $1",
    )
    .bind(id)
    .fetch_optional(exec)
    .await?;

    row.map(|r| {
        let state = r
            .state
            .parse::<WorkOrderState>()
            .map_err(|e| WorkflowError::Corrupt(format!("work order {}: {e}", r.id)))?;
        Ok(WorkOrder {
            id: r.id,
            number: r.number,
            state,
            damage_description: r.damage_description,
            interventions_count: r.interventions_count,
            completed_at: r.completed_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    })
    .transpose()
}

/// Move a work order from `from` to `to` only if it is still in `from`.
/// Returns false when another writer got there first.
pub async fn compare_and_set_state<'e, E: PgExecutor<'e>>(
    exec: E,
    id: i64,
    from: WorkOrderState,
    to: WorkOrderState,
) -> Result<bool, WorkflowError> {
    let result = sqlx::query(
        "UPDATE work_orders \
         SET state = $3, \
             updated_at = NOW(), \
             completed_at = CASE WHEN $3 = 'completed' THEN NOW() ELSE completed_at END \
         WHERE id = $1 AND state = $2",
    )
    .bind(id)
    .bind(from.as_str())
    .bind(to.as_str())
    .execute(exec)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn create<'e, E: PgExecutor<'e>>(exec: E, work_order: &NewWorkOrder) -> Result<i64, WorkflowError> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO work_orders (number, state, damage_description) \
         VALUES ($1, 'draft', $2) RETURNING id",
    )
    .bind(&work_order.number)
    .bind(&work_order.damage_description)
    .fetch_one(exec)
    .await?;
    Ok(id)
}

/// Record an intervention against a work order. Returns the intervention id.
pub async fn add_intervention<'e, E: PgExecutor<'e>>(
    exec: E,
    work_order_id: i64,
    description: &str,
) -> Result<i64, WorkflowError> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO interventions (work_order_id, description) VALUES ($1, $2) RETURNING id",
    )
    .bind(work_order_id)
    .bind(description)
    .fetch_one(exec)
    .await?;
    Ok(id)
}
