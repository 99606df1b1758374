use actix_session::{Session, SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, time::Duration};

use crate::errors::AppError;
use crate::models::user::SessionUser;

const USER_KEY: &str = "user";

/// Cookie session layer; sessions last one day.
pub fn middleware(key: Key, secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("prism.sid".to_string())
        .cookie_secure(secure)
        .cookie_http_only(true)
        .session_lifecycle(
            actix_session::config::PersistentSession::default().session_ttl(Duration::days(1)),
        )
        .build()
}

pub fn get_user(session: &Session) -> Option<SessionUser> {
    session.get::<SessionUser>(USER_KEY).unwrap_or(None)
}

/// Store the user in a freshly renewed session.
pub fn log_in(session: &Session, user: &SessionUser) -> Result<(), AppError> {
    session.renew();
    session
        .insert(USER_KEY, user)
        .map_err(|e| AppError::Session(e.to_string()))
}

pub fn require_user(session: &Session) -> Result<SessionUser, AppError> {
    get_user(session).ok_or(AppError::Unauthorized)
}

/// Reviewers and admins only.
pub fn require_reviewer(session: &Session) -> Result<SessionUser, AppError> {
    let user = require_user(session)?;
    if user.user_type.can_review() {
        Ok(user)
    } else {
        Err(AppError::PermissionDenied("reviewer role required".to_string()))
    }
}

pub fn require_admin(session: &Session) -> Result<SessionUser, AppError> {
    let user = require_user(session)?;
    if user.user_type.is_admin() {
        Ok(user)
    } else {
        Err(AppError::PermissionDenied("admin role required".to_string()))
    }
}
