use sqlx::PgExecutor;

use crate::workflow::{Role, WorkflowError};
use super::types::{NewUser, User};

const SELECT_USER: &str = "\
    SELECT id, username, full_name, email, role, active, password_hash \
    FROM users";

#[derive(sqlx::FromRow)]
struct Row {
    id: i64,
    username: String,
    full_name: String,
    email: String,
    role: String,
    active: bool,
    password_hash: String,
}

impl TryFrom<Row> for User {
    type Error = WorkflowError;

    fn try_from(row: Row) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| WorkflowError::Corrupt(format!("user {}: {e}", row.id)))?;
        Ok(User {
            id: row.id,
            username: row.username,
            full_name: row.full_name,
            email: row.email,
            role,
            active: row.active,
            password_hash: row.password_hash,
        })
    }
}

pub async fn find_by_id<'e, E: PgExecutor<'e>>(exec: E, id: i64) -> Result<Option<User>, WorkflowError> {
    let row = sqlx::query_as::<_, Row>(&format!("{SELECT_USER} WHERE id = $1"))
        .bind(id)
        .fetch_optional(exec)
        .await?;
    row.map(User::try_from).transpose()
}

pub async fn find_by_username<'e, E: PgExecutor<'e>>(
    exec: E,
    username: &str,
) -> Result<Option<User>, WorkflowError> {
    let row = sqlx::query_as::<_, Row>(&format!("{SELECT_USER} WHERE username = $1"))
        .bind(username)
        .fetch_optional(exec)
        .await?;
    row.map(User::try_from).transpose()
}

/// Active users holding any of `roles`, ordered by name.
pub async fn find_active_by_roles<'e, E: PgExecutor<'e>>(
    exec: E,
    roles: &[Role],
) -> Result<Vec<User>, WorkflowError> {
    let codes: Vec<String> = roles.iter().map(|r| r.as_str().to_string()).collect();
    let rows = sqlx::query_as::<_, Row>(&format!(
        "{SELECT_USER} WHERE active = TRUE AND role = ANY($1) ORDER BY full_name, id"
    ))
    .bind(codes)
    .fetch_all(exec)
    .await?;
    rows.into_iter().map(User::try_from).collect()
}

pub async fn count<'e, E: PgExecutor<'e>>(exec: E) -> Result<i64, WorkflowError> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(exec)
        .await?;
    Ok(n)
}

pub async fn create<'e, E: PgExecutor<'e>>(exec: E, user: &NewUser) -> Result<i64, WorkflowError> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (username, full_name, email, role, password_hash) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(&user.username)
    .bind(&user.full_name)
    .bind(&user.email)
    .bind(user.role.as_str())
    .bind(&user.password_hash)
    .fetch_one(exec)
    .await?;
    Ok(id)
}
