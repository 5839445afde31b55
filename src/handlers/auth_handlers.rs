use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};

use crate::api_types::LoginRequest;
use crate::auth::session::{current_user, get_username, sign_in};
use crate::auth::{password, rate_limit::RateLimiter, validate};
use crate::errors::AppError;
use crate::models::user::UserProfile;
use crate::workflow::WorkflowAuthority;

const BAD_CREDENTIALS: &str = "Invalid username or password";

/// POST /api/v1/login
pub async fn login(
    req: HttpRequest,
    authority: web::Data<WorkflowAuthority>,
    session: Session,
    body: web::Json<LoginRequest>,
    limiter: web::Data<RateLimiter>,
) -> Result<HttpResponse, AppError> {
    // Rate-limit check BEFORE any database access
    let ip = req
        .peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED));

    if limiter.is_blocked(ip) {
        log::warn!("Login blocked for {ip}: too many failures");
        return Err(AppError::RateLimited);
    }

    if validate::validate_username(&body.username).is_some() || body.password.is_empty() {
        limiter.record_failure(ip);
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
    }

    let found = authority
        .store()
        .find_user_by_username(body.username.trim())
        .await?;

    match found {
        Some(u) if u.active && password::verify_password(&body.password, &u.password_hash) => {
            limiter.clear(ip);
            sign_in(&session, &u)?;
            log::info!("User {} ({}) logged in", u.username, u.role);
            Ok(HttpResponse::Ok().json(UserProfile::from(&u)))
        }
        _ => {
            limiter.record_failure(ip);
            Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()))
        }
    }
}

/// POST /api/v1/logout
pub async fn logout(session: Session) -> HttpResponse {
    if let Ok(username) = get_username(&session) {
        log::info!("User {username} logged out");
    }
    session.purge();
    HttpResponse::NoContent().finish()
}

/// GET /api/v1/me
pub async fn me(
    authority: web::Data<WorkflowAuthority>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session, &authority).await?;
    Ok(HttpResponse::Ok().json(UserProfile::from(&user)))
}
