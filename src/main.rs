use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, middleware, web};

use garage::auth::rate_limit::RateLimiter;
use garage::auth::session::{session_key, session_middleware};
use garage::config::AppConfig;
use garage::workflow::{PgWorkflowStore, WorkflowAuthority};
use garage::{db, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    let pool = db::init_pool(&config.database_url, config.db_max_connections)
        .await
        .map_err(std::io::Error::other)?;
    db::run_migrations(&pool).await.map_err(std::io::Error::other)?;

    if let Some(password) = &config.seed_admin_password {
        db::seed_admin(&pool, password).await.map_err(|e| std::io::Error::other(e.to_string()))?;
        if config.seed_demo {
            db::seed_demo(&pool, password).await.map_err(|e| std::io::Error::other(e.to_string()))?;
        }
    }

    let secret_key = session_key(config.session_key.as_deref());
    let authority = web::Data::new(WorkflowAuthority::new(
        Arc::new(PgWorkflowStore::new(pool)),
        config.facts_policy,
    ));
    let limiter = web::Data::new(RateLimiter::new(
        config.login_max_attempts,
        Duration::from_secs(config.login_window_secs),
    ));

    log::info!(
        "Starting server at http://{} (facts policy: {:?})",
        config.bind_addr,
        config.facts_policy
    );

    let cookie_secure = config.cookie_secure;
    HttpServer::new(move || {
        App::new()
            .wrap(session_middleware(secret_key.clone(), cookie_secure))
            .wrap(middleware::Logger::default())
            .app_data(authority.clone())
            .app_data(limiter.clone())
            .service(web::scope("/api/v1").configure(handlers::configure))
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
