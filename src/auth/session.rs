use actix_session::{Session, SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;

use crate::errors::AppError;
use crate::models::user::User;
use crate::workflow::{WorkflowAuthority, WorkflowError};

pub const USER_ID_KEY: &str = "user_id";
pub const USERNAME_KEY: &str = "username";

pub fn get_user_id(session: &Session) -> Option<i64> {
    session.get::<i64>(USER_ID_KEY).unwrap_or(None)
}

pub fn get_username(session: &Session) -> Result<String, String> {
    match session.get::<String>(USERNAME_KEY) {
        Ok(Some(username)) => Ok(username),
        Ok(None) => Err("No username in session".to_string()),
        Err(e) => Err(format!("Session error: {}", e)),
    }
}

/// Store the authenticated user in the session cookie.
pub fn sign_in(session: &Session, user: &User) -> Result<(), AppError> {
    session.renew();
    session
        .insert(USER_ID_KEY, user.id)
        .and_then(|_| session.insert(USERNAME_KEY, &user.username))
        .map_err(|e| AppError::Session(e.to_string()))
}

/// The user behind the session, re-read from the store so a role change
/// or deactivation applies to the very next request.
pub async fn current_user(session: &Session, authority: &WorkflowAuthority) -> Result<User, AppError> {
    let user_id = get_user_id(session)
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    match authority.resolve_actor(user_id).await {
        Ok(user) => Ok(user),
        Err(WorkflowError::UnknownActor(_)) => {
            session.purge();
            Err(AppError::Unauthorized("Authentication required".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Session encryption key: `SESSION_KEY` when it is 64 bytes or longer,
/// otherwise a random key (sessions are lost on restart).
pub fn session_key(configured: Option<&str>) -> Key {
    match configured {
        Some(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Some(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
            Key::generate()
        }
        None => {
            log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
            Key::generate()
        }
    }
}

pub fn session_middleware(key: Key, secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_secure(secure)
        .cookie_http_only(true)
        .build()
}
