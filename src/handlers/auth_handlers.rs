use actix_session::Session;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;

use crate::auth::{password, rate_limit::RateLimiter, session};
use crate::errors::AppError;
use crate::handlers::api_types::{ApiErrorResponse, ApiMessage, LoginRequest, RegisterRequest};
use crate::lifecycle::validate;
use crate::models::new_id;
use crate::models::user::{SessionUser, User, UserType};
use crate::store::{StoreError, UserStore};

fn client_key(req: &HttpRequest) -> String {
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// POST /api/auth/register - Create an account and log it in.
/// Self-registration creates applicants; reviewer and admin accounts need an
/// admin session.
pub async fn register(
    users: web::Data<dyn UserStore>,
    session: Session,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    if body.user_type != UserType::Applicant {
        session::require_admin(&session)?;
    }

    let mut errors = Vec::new();
    errors.extend(validate::validate_email(&body.email));
    errors.extend(validate::validate_password(&body.password));
    if !errors.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiErrorResponse {
            error: "Validation failed".to_string(),
            details: Some(errors.join("; ")),
        }));
    }

    let user = User {
        id: new_id(),
        email: body.email.trim().to_string(),
        password_hash: password::hash_password(&body.password)?,
        user_type: body.user_type,
        created_at: Utc::now(),
    };

    match users.insert_user(&user).await {
        Ok(()) => {}
        Err(StoreError::Duplicate(_)) => {
            return Err(AppError::BadRequest("User already exists".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    let session_user = SessionUser::from(&user);
    // An admin creating an account stays logged in as themselves.
    if session::get_user(&session).is_none() {
        session::log_in(&session, &session_user)?;
    }
    log::info!("Registered {:?} account {}", user.user_type, user.email);

    Ok(HttpResponse::Created().json(session_user))
}

/// POST /api/auth/login
pub async fn login(
    req: HttpRequest,
    users: web::Data<dyn UserStore>,
    limiter: web::Data<RateLimiter>,
    session: Session,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    // Rate-limit check BEFORE any store access
    let client = client_key(&req);
    if limiter.is_blocked(&client) {
        log::warn!("Login blocked for {client}: too many failures");
        return Err(AppError::RateLimited);
    }

    let found = users.find_user_by_email(&body.email).await?;
    match found {
        Some(u) if password::verify_password(&body.password, &u.password_hash) => {
            limiter.clear(&client);
            let session_user = SessionUser::from(&u);
            session::log_in(&session, &session_user)?;
            Ok(HttpResponse::Ok().json(session_user))
        }
        _ => {
            limiter.record_failure(&client);
            Err(AppError::BadRequest("Invalid credentials".to_string()))
        }
    }
}

/// POST /api/auth/logout
pub async fn logout(session: Session) -> Result<HttpResponse, AppError> {
    session.purge();
    Ok(HttpResponse::Ok().json(ApiMessage::new("Logged out")))
}

/// GET /api/auth/me
pub async fn me(session: Session) -> Result<HttpResponse, AppError> {
    let user = session::require_user(&session)?;
    Ok(HttpResponse::Ok().json(user))
}
