//! Persistence collaborators for proposals, evaluations and users.
//!
//! Writes that change a proposal are conditional: the caller passes the
//! status and version it read, and the store refuses the write with
//! [`StoreError::Conflict`] if the stored record has moved on since.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::models::evaluation::ProposalEvaluation;
use crate::models::proposal::Proposal;
use crate::models::user::User;
use crate::models::workflow::ProposalStatus;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("stored record changed since it was read")]
    Conflict,
    #[error("duplicate record: {0}")]
    Duplicate(String),
    #[error("record not found")]
    NotFound,
    #[error("invalid stored record: {0}")]
    InvalidRecord(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The status and version a caller last observed for a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expected {
    pub status: ProposalStatus,
    pub version: i64,
}

impl Expected {
    pub fn of(proposal: &Proposal) -> Self {
        Expected {
            status: proposal.status,
            version: proposal.version,
        }
    }
}

/// Optional list filters; `None` matches everything.
#[derive(Debug, Clone, Default)]
pub struct ProposalFilter {
    pub status: Option<ProposalStatus>,
    pub submitted_by: Option<String>,
}

/// One page of proposals, newest first.
#[derive(Debug, Clone)]
pub struct ProposalPage {
    pub items: Vec<Proposal>,
    pub total: i64,
}

/// Rows to skip for a 1-based page; saturates instead of overflowing.
pub(crate) fn page_offset(page: i64, per_page: i64) -> i64 {
    page.max(1).saturating_sub(1).saturating_mul(per_page.max(0))
}

#[async_trait]
pub trait ProposalStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Proposal>, StoreError>;

    async fn list(
        &self,
        filter: &ProposalFilter,
        page: i64,
        per_page: i64,
    ) -> Result<ProposalPage, StoreError>;

    async fn count_by_status(&self, status: ProposalStatus) -> Result<i64, StoreError>;

    /// Insert a new proposal.
    async fn insert(&self, proposal: &Proposal) -> Result<(), StoreError>;

    /// Replace a proposal only if its stored status and version still match.
    async fn update(&self, proposal: &Proposal, expected: Expected) -> Result<(), StoreError>;

    /// Remove a proposal and any evaluation attached to it.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    async fn find_evaluation_by_proposal_id(
        &self,
        proposal_id: &str,
    ) -> Result<Option<ProposalEvaluation>, StoreError>;

    async fn find_evaluation_by_id(
        &self,
        id: &str,
    ) -> Result<Option<ProposalEvaluation>, StoreError>;

    async fn list_evaluations(&self) -> Result<Vec<ProposalEvaluation>, StoreError>;

    /// Store a new evaluation and update its proposal in one unit.
    /// Fails with `Duplicate` if the proposal already has one and with
    /// `Conflict` if the proposal no longer matches `expected`.
    async fn attach_evaluation(
        &self,
        evaluation: &ProposalEvaluation,
        proposal: &Proposal,
        expected: Expected,
    ) -> Result<(), StoreError>;

    async fn update_evaluation(&self, evaluation: &ProposalEvaluation) -> Result<(), StoreError>;

    async fn delete_evaluation(&self, id: &str) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert a user; `Duplicate` if the email is already registered.
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;
}
