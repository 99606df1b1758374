use actix_session::Session;
use actix_web::{web, HttpResponse};
use std::collections::HashMap;

use crate::auth::session::{require_admin, require_reviewer, require_user};
use crate::errors::AppError;
use crate::handlers::api_types::{
    ActionRequest, ApiMessage, PaginatedResponse, ProposalDetailResponse,
};
use crate::lifecycle::{LifecycleError, LifecycleManager};
use crate::models::proposal::{ProposalDraft, ProposalUpdate};
use crate::models::user::SessionUser;
use crate::models::workflow::{self, ProposalStatus, ReviewerAction};
use crate::store::ProposalFilter;

const DEFAULT_PER_PAGE: i64 = 25;
const MAX_PER_PAGE: i64 = 100;
/// Highest page whose offset still fits in an `i64`.
const MAX_PAGE: i64 = i64::MAX / MAX_PER_PAGE;

/// Applicants only see what they submitted.
fn can_view(user: &SessionUser, submitted_by: &str) -> bool {
    user.user_type.can_review() || user.email.eq_ignore_ascii_case(submitted_by)
}

/// GET /api/proposals - List proposals with optional status filter.
/// Query params: status (filter), page (default 1), per_page (default 25).
pub async fn list(
    lifecycle: web::Data<LifecycleManager>,
    session: Session,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&session)?;

    let status = query
        .get("status")
        .filter(|s| !s.is_empty() && s.as_str() != "all")
        .map(|s| s.parse::<ProposalStatus>())
        .transpose()
        .map_err(AppError::BadRequest)?;
    let page = query
        .get("page")
        .and_then(|p| p.parse::<i64>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_PAGE);
    let per_page = query
        .get("per_page")
        .and_then(|p| p.parse::<i64>().ok())
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);

    let filter = ProposalFilter {
        status,
        submitted_by: (!user.user_type.can_review()).then(|| user.email.clone()),
    };
    let result = lifecycle.list_proposals(&filter, page, per_page).await?;

    Ok(HttpResponse::Ok().json(PaginatedResponse {
        items: result.items,
        page,
        per_page,
        total: result.total,
    }))
}

/// GET /api/proposals/summary - Count per status for the reviewer dashboard.
pub async fn summary(
    lifecycle: web::Data<LifecycleManager>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_reviewer(&session)?;
    let counts = lifecycle.status_summary().await?;
    Ok(HttpResponse::Ok().json(counts))
}

/// POST /api/proposals - Submit a new proposal as the logged-in user.
pub async fn create(
    lifecycle: web::Data<LifecycleManager>,
    session: Session,
    body: web::Json<ProposalDraft>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&session)?;
    let mut draft = body.into_inner();
    draft.submitted_by = user.email;

    let proposal = lifecycle.submit_proposal(draft).await?;
    Ok(HttpResponse::Created().json(proposal))
}

/// GET /api/proposals/{id} - Proposal plus, for reviewers, its evaluation and
/// the actions currently available.
pub async fn read(
    lifecycle: web::Data<LifecycleManager>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&session)?;
    let proposal = lifecycle.find_proposal(&path).await?;
    if !can_view(&user, &proposal.submitted_by) {
        return Err(AppError::PermissionDenied("not your proposal".to_string()));
    }

    let (evaluation, allowed_actions) = if user.user_type.can_review() {
        let evaluation = lifecycle.evaluation_for(&proposal.id).await?;
        let actions = if evaluation.is_some() {
            workflow::allowed_actions(proposal.status)
        } else {
            Vec::new()
        };
        (evaluation, actions)
    } else {
        (None, Vec::new())
    };

    Ok(HttpResponse::Ok().json(ProposalDetailResponse {
        proposal,
        evaluation,
        allowed_actions,
    }))
}

/// PUT /api/proposals/{id} - Administrative edit of descriptive fields.
pub async fn update(
    lifecycle: web::Data<LifecycleManager>,
    session: Session,
    path: web::Path<String>,
    body: web::Json<ProposalUpdate>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    let proposal = lifecycle.update_details(&path, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(proposal))
}

/// DELETE /api/proposals/{id} - Administrative override.
pub async fn delete(
    lifecycle: web::Data<LifecycleManager>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let admin = require_admin(&session)?;
    lifecycle.delete_proposal(&path).await?;
    log::info!("Proposal {} deleted by {}", path.as_str(), admin.email);
    Ok(HttpResponse::Ok().json(ApiMessage::new("Proposal deleted")))
}

/// POST /api/proposals/{id}/actions - Apply a reviewer decision.
pub async fn action(
    lifecycle: web::Data<LifecycleManager>,
    session: Session,
    path: web::Path<String>,
    body: web::Json<ActionRequest>,
) -> Result<HttpResponse, AppError> {
    let reviewer = require_reviewer(&session)?;
    let proposal_id = path.into_inner();

    let action = match body.action.parse::<ReviewerAction>() {
        Ok(a) => a,
        Err(_) => {
            let current = lifecycle.find_proposal(&proposal_id).await?;
            return Err(LifecycleError::InvalidTransition {
                from: current.status,
                action: body.action.clone(),
            }
            .into());
        }
    };

    let proposal = lifecycle
        .apply_reviewer_action(&proposal_id, action, &body.rationale, &reviewer.email)
        .await?;
    Ok(HttpResponse::Ok().json(proposal))
}

/// GET /api/proposals/{id}/evaluation
pub async fn evaluation(
    lifecycle: web::Data<LifecycleManager>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_reviewer(&session)?;
    let evaluation = lifecycle
        .evaluation_for(&path)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(evaluation))
}
