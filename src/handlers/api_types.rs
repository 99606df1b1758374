use serde::{Deserialize, Serialize};

use crate::models::evaluation::{EvaluationInput, ProposalEvaluation};
use crate::models::proposal::Proposal;
use crate::models::user::UserType;
use crate::models::workflow::AvailableAction;

/// Generic paginated response wrapper for list endpoints.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T: Serialize> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct ApiMessage {
    pub msg: String,
}

impl ApiMessage {
    pub fn new(msg: impl Into<String>) -> Self {
        ApiMessage { msg: msg.into() }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default = "default_user_type")]
    pub user_type: UserType,
}

fn default_user_type() -> UserType {
    UserType::Applicant
}

#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /api/proposals/{id}/actions`.
#[derive(Deserialize, Debug)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    pub rationale: String,
}

/// Body of `POST /api/evaluations`: the evaluation plus the proposal it belongs to.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AttachEvaluationRequest {
    pub proposal_id: String,
    #[serde(flatten)]
    pub evaluation: EvaluationInput,
}

/// Proposal detail as shown in the review panel.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDetailResponse {
    #[serde(flatten)]
    pub proposal: Proposal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<ProposalEvaluation>,
    pub allowed_actions: Vec<AvailableAction>,
}
