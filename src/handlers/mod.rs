pub mod api_types;
pub mod auth_handlers;
pub mod evaluation_handlers;
pub mod proposal_handlers;

use std::sync::Arc;

use actix_web::{
    web, Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::{Next, from_fn},
};

use crate::auth::{middleware::require_auth, rate_limit::RateLimiter};
use crate::errors::AppError;
use crate::lifecycle::LifecycleManager;
use crate::store::UserStore;
use api_types::ApiErrorResponse;

/// CSRF protection for mutation endpoints.
///
/// Rejects POST/PUT/DELETE requests that don't have Content-Type: application/json.
/// Browsers cannot send cross-origin JSON with cookies via simple form POST,
/// so the Content-Type check guards without requiring tokens.
async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let method = req.method().clone();

    if method == actix_web::http::Method::POST
        || method == actix_web::http::Method::PUT
        || method == actix_web::http::Method::DELETE
    {
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("application/json") {
            let response = HttpResponse::BadRequest().json(ApiErrorResponse {
                error: "Content-Type must be application/json for mutation requests".to_string(),
                details: None,
            });
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// Shared application state handed to every worker.
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: LifecycleManager,
    pub users: Arc<dyn UserStore>,
    pub limiter: RateLimiter,
}

impl AppState {
    /// Register state and all `/api` routes.
    pub fn configure(self) -> impl FnOnce(&mut web::ServiceConfig) {
        move |cfg| {
            cfg.app_data(web::Data::new(self.lifecycle))
                .app_data(web::Data::from(self.users))
                .app_data(web::Data::new(self.limiter))
                .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                    AppError::BadRequest(format!("Invalid JSON body: {err}")).into()
                }))
                .service(web::scope("/api").configure(routes));
        }
    }
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .wrap(from_fn(require_json_content_type))
            .route("/register", web::post().to(auth_handlers::register))
            .route("/login", web::post().to(auth_handlers::login))
            .route("/logout", web::post().to(auth_handlers::logout))
            .route("/me", web::get().to(auth_handlers::me)),
    );
    // /summary BEFORE /{id} to avoid routing conflict
    cfg.service(
        web::scope("/proposals")
            .wrap(from_fn(require_auth))
            .wrap(from_fn(require_json_content_type))
            .route("", web::get().to(proposal_handlers::list))
            .route("", web::post().to(proposal_handlers::create))
            .route("/summary", web::get().to(proposal_handlers::summary))
            .route("/{id}", web::get().to(proposal_handlers::read))
            .route("/{id}", web::put().to(proposal_handlers::update))
            .route("/{id}", web::delete().to(proposal_handlers::delete))
            .route("/{id}/actions", web::post().to(proposal_handlers::action))
            .route("/{id}/evaluation", web::get().to(proposal_handlers::evaluation)),
    );
    cfg.service(
        web::scope("/evaluations")
            .wrap(from_fn(require_auth))
            .wrap(from_fn(require_json_content_type))
            .route("", web::get().to(evaluation_handlers::list))
            .route("", web::post().to(evaluation_handlers::create))
            .route("/{id}", web::get().to(evaluation_handlers::read))
            .route("/{id}", web::put().to(evaluation_handlers::update))
            .route("/{id}", web::delete().to(evaluation_handlers::delete)),
    );
}
