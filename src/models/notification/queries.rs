use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use crate::workflow::WorkflowError;
use super::types::{Notification, NotificationContent};

/// Create one notification per recipient. Returns notification IDs.
pub async fn create_for_users(
    conn: &mut PgConnection,
    work_order_id: i64,
    user_ids: &[i64],
    content: &NotificationContent,
) -> Result<Vec<i64>, WorkflowError> {
    let mut ids = Vec::with_capacity(user_ids.len());

    for &user_id in user_ids {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO notifications (user_id, work_order_id, subject, message) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(user_id)
        .bind(work_order_id)
        .bind(&content.subject)
        .bind(&content.message)
        .fetch_one(&mut *conn)
        .await?;
        ids.push(id);
    }

    Ok(ids)
}

/// Unread notifications for a user, newest first.
pub async fn find_unread_for_user(
    conn: &mut PgConnection,
    user_id: i64,
) -> Result<Vec<Notification>, WorkflowError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        id: i64,
        user_id: i64,
        work_order_id: i64,
        subject: String,
        message: String,
        read_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT id, user_id, work_order_id, subject, message, read_at, created_at \
         FROM notifications \
         WHERE user_id = $1 AND read_at IS NULL \
         ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| Notification {
            id: r.id,
            user_id: r.user_id,
            work_order_id: r.work_order_id,
            subject: r.subject,
            message: r.message,
            read_at: r.read_at,
            created_at: r.created_at,
        })
        .collect())
}
