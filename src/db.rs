use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::auth::password::hash_password;
use crate::errors::AppError;
use crate::models::user::{self, NewUser};
use crate::models::work_order::{self, NewWorkOrder};
use crate::workflow::Role;

pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    log::info!("Database migrations complete");
    Ok(())
}

/// Create the `admin` account when the user table is empty.
pub async fn seed_admin(pool: &PgPool, password: &str) -> Result<(), AppError> {
    let count = user::count(pool).await?;
    if count > 0 {
        log::info!("Database already has {} user(s), skipping admin seed", count);
        return Ok(());
    }

    let id = user::create(
        pool,
        &NewUser {
            username: "admin".to_string(),
            full_name: "Administrator".to_string(),
            email: "admin@localhost".to_string(),
            role: Role::Admin,
            password_hash: hash_password(password)?,
        },
    )
    .await?;
    log::info!("Seeded admin user (id={})", id);
    Ok(())
}

const DEMO_USERS: &[(&str, &str, Role)] = &[
    ("manager", "Workshop Manager", Role::GeneralManager),
    ("mechanic", "Workshop Mechanic", Role::Workshop),
    ("panelbeater", "Bodyshop Technician", Role::Bodyshop),
];

/// One user per operational role and two draft work orders, one of them
/// with an intervention. Skipped when any work order or demo user exists.
pub async fn seed_demo(pool: &PgPool, password: &str) -> Result<(), AppError> {
    if user::find_by_username(pool, DEMO_USERS[0].0).await?.is_some() {
        log::info!("Demo data already present, skipping demo seed");
        return Ok(());
    }

    let password_hash = hash_password(password)?;
    let mut tx = pool.begin().await?;
    for (username, full_name, role) in DEMO_USERS {
        user::create(
            &mut *tx,
            &NewUser {
                username: username.to_string(),
                full_name: full_name.to_string(),
                email: format!("{username}@localhost"),
                role: *role,
                password_hash: password_hash.clone(),
            },
        )
        .await?;
    }

    let ready = work_order::create(
        &mut *tx,
        &NewWorkOrder {
            number: "WO-DEMO-0001".to_string(),
            damage_description: Some("Rear bumper dented, left tail light broken".to_string()),
        },
    )
    .await?;
    work_order::add_intervention(&mut *tx, ready, "Replace rear bumper").await?;
    work_order::create(
        &mut *tx,
        &NewWorkOrder {
            number: "WO-DEMO-0002".to_string(),
            damage_description: None,
        },
    )
    .await?;
    tx.commit().await?;

    log::info!("Demo seed complete: {} users, 2 work orders", DEMO_USERS.len());
    Ok(())
}
