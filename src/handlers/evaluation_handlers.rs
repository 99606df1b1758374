use actix_session::Session;
use actix_web::{web, HttpResponse};

use crate::auth::session::{require_admin, require_reviewer};
use crate::errors::AppError;
use crate::handlers::api_types::{ApiMessage, AttachEvaluationRequest};
use crate::lifecycle::LifecycleManager;
use crate::models::evaluation::EvaluationInput;

/// POST /api/evaluations - Attach an evaluation; the proposal moves to under-review.
pub async fn create(
    lifecycle: web::Data<LifecycleManager>,
    session: Session,
    body: web::Json<AttachEvaluationRequest>,
) -> Result<HttpResponse, AppError> {
    require_reviewer(&session)?;
    let body = body.into_inner();
    let (_, evaluation) = lifecycle
        .attach_evaluation(&body.proposal_id, body.evaluation)
        .await?;
    Ok(HttpResponse::Created().json(evaluation))
}

/// GET /api/evaluations
pub async fn list(
    lifecycle: web::Data<LifecycleManager>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_reviewer(&session)?;
    Ok(HttpResponse::Ok().json(lifecycle.list_evaluations().await?))
}

/// GET /api/evaluations/{id}
pub async fn read(
    lifecycle: web::Data<LifecycleManager>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_reviewer(&session)?;
    Ok(HttpResponse::Ok().json(lifecycle.find_evaluation(&path).await?))
}

/// PUT /api/evaluations/{id} - Administrative correction.
pub async fn update(
    lifecycle: web::Data<LifecycleManager>,
    session: Session,
    path: web::Path<String>,
    body: web::Json<EvaluationInput>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    let evaluation = lifecycle.update_evaluation(&path, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(evaluation))
}

/// DELETE /api/evaluations/{id}
pub async fn delete(
    lifecycle: web::Data<LifecycleManager>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    lifecycle.delete_evaluation(&path).await?;
    Ok(HttpResponse::Ok().json(ApiMessage::new("Evaluation deleted")))
}
