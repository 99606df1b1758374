//! The proposal lifecycle manager: the only code allowed to change a
//! proposal's status.

pub mod validate;

use std::sync::Arc;

use chrono::Utc;

use crate::models::evaluation::{EvaluationInput, ProposalEvaluation};
use crate::models::new_id;
use crate::models::proposal::{
    DocumentType, Proposal, ProposalDocument, ProposalDraft, ProposalUpdate, ReviewNote,
};
use crate::models::workflow::{self, ProposalStatus, ReviewerAction};
use crate::notify::{Notifier, StatusEvent};
use crate::store::{Expected, ProposalFilter, ProposalPage, ProposalStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("not found")]
    NotFound,
    #[error("proposal {0} already has an evaluation")]
    AlreadyEvaluated(String),
    #[error("proposal {0} has no evaluation yet")]
    NoEvaluationYet(String),
    #[error("cannot {action} a proposal that is {from}")]
    InvalidTransition {
        from: ProposalStatus,
        action: String,
    },
    #[error("proposal {0} was modified concurrently; reload and retry")]
    ConcurrentModification(String),
    #[error(transparent)]
    Store(StoreError),
}

impl LifecycleError {
    fn validation(errors: Vec<String>) -> Result<(), LifecycleError> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(LifecycleError::Validation(errors))
        }
    }
}

impl From<workflow::InvalidTransition> for LifecycleError {
    fn from(e: workflow::InvalidTransition) -> Self {
        LifecycleError::InvalidTransition {
            from: e.from,
            action: e.action.to_string(),
        }
    }
}

/// Map a conditional-write failure on proposal `id` to the lifecycle view.
fn write_error(id: &str, e: StoreError) -> LifecycleError {
    match e {
        StoreError::Conflict => LifecycleError::ConcurrentModification(id.to_string()),
        StoreError::NotFound => LifecycleError::NotFound,
        other => LifecycleError::Store(other),
    }
}

impl From<StoreError> for LifecycleError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => LifecycleError::NotFound,
            other => LifecycleError::Store(other),
        }
    }
}

/// Counts of proposals per status.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StatusCount {
    pub status: ProposalStatus,
    pub count: i64,
}

#[derive(Clone)]
pub struct LifecycleManager {
    store: Arc<dyn ProposalStore>,
    notifier: Arc<dyn Notifier>,
}

impl LifecycleManager {
    pub fn new(store: Arc<dyn ProposalStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    fn emit(&self, proposal: &Proposal, rationale: Option<String>) {
        self.notifier.notify(StatusEvent {
            proposal_id: proposal.id.clone(),
            new_status: proposal.status,
            rationale,
        });
    }

    /// Create a `pending` proposal from a complete draft.
    pub async fn submit_proposal(&self, draft: ProposalDraft) -> Result<Proposal, LifecycleError> {
        LifecycleError::validation(validate::validate_draft(&draft))?;

        let now = Utc::now();
        let today = now.format("%Y-%m-%d").to_string();

        let documents: Vec<ProposalDocument> = draft
            .documents
            .into_iter()
            .map(|d| ProposalDocument {
                id: d.id.filter(|id| !id.trim().is_empty()).unwrap_or_else(new_id),
                name: d.name.trim().to_string(),
                doc_type: d.doc_type,
                file_name: d.file_name.trim().to_string(),
                file_size: d.file_size,
                uploaded_date: d
                    .uploaded_date
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| today.clone()),
            })
            .collect();

        // The main file is the proposal document, falling back to the first upload.
        let file_name = documents
            .iter()
            .find(|d| d.doc_type == DocumentType::Proposal)
            .or_else(|| documents.first())
            .map(|d| d.file_name.clone())
            .unwrap_or_default();

        let project_title = draft.project_title.trim().to_string();
        let submitted_by = draft.submitted_by.trim().to_string();
        let title = match draft.title.trim() {
            "" => project_title.clone(),
            t => t.to_string(),
        };
        let principal_investigator = match draft.principal_investigator.trim() {
            "" => submitted_by.clone(),
            pi => pi.to_string(),
        };

        let proposal = Proposal {
            id: new_id(),
            title,
            project_title,
            submitted_by,
            principal_investigator,
            submitted_date: now,
            status: ProposalStatus::Pending,
            file_name,
            duration: draft.duration.trim().to_string(),
            funding_requested: draft.funding_requested.trim().to_string(),
            research_area: draft.research_area.trim().to_string(),
            keywords: clean_keywords(draft.keywords),
            abstract_text: draft.abstract_text.trim().to_string(),
            co_investigators: draft.co_investigators,
            documents,
            review_notes: Vec::new(),
            version: 0,
        };

        self.store.insert(&proposal).await?;
        log::info!(
            "Proposal {} submitted by {} ({} documents)",
            proposal.id,
            proposal.submitted_by,
            proposal.documents.len()
        );
        self.emit(&proposal, None);
        Ok(proposal)
    }

    /// Attach the one evaluation a proposal may have and open it for review.
    pub async fn attach_evaluation(
        &self,
        proposal_id: &str,
        input: EvaluationInput,
    ) -> Result<(Proposal, ProposalEvaluation), LifecycleError> {
        LifecycleError::validation(validate::validate_evaluation(&input))?;

        let current = self
            .store
            .find_by_id(proposal_id)
            .await?
            .ok_or(LifecycleError::NotFound)?;

        if self
            .store
            .find_evaluation_by_proposal_id(proposal_id)
            .await?
            .is_some()
        {
            return Err(LifecycleError::AlreadyEvaluated(proposal_id.to_string()));
        }

        // An under-review proposal without an evaluation had it deleted by an
        // admin; a replacement reopens the reviewer actions.
        match current.status {
            ProposalStatus::Pending | ProposalStatus::UnderReview => {}
            status => {
                log::warn!(
                    "Evaluation for proposal {} refused: status is {}",
                    proposal_id,
                    status
                );
                return Err(LifecycleError::InvalidTransition {
                    from: status,
                    action: "attach an evaluation to".to_string(),
                });
            }
        }

        let evaluation = ProposalEvaluation::from_input(new_id(), proposal_id.to_string(), input);
        let mut updated = current.clone();
        updated.status = ProposalStatus::UnderReview;
        updated.version += 1;

        self.store
            .attach_evaluation(&evaluation, &updated, Expected::of(&current))
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(_) => {
                    LifecycleError::AlreadyEvaluated(proposal_id.to_string())
                }
                other => write_error(proposal_id, other),
            })?;

        log::info!(
            "Evaluation {} attached to proposal {}; now {}",
            evaluation.id,
            proposal_id,
            updated.status
        );
        if updated.status != current.status {
            self.emit(&updated, None);
        }
        Ok((updated, evaluation))
    }

    /// Apply a reviewer decision to a proposal under review.
    pub async fn apply_reviewer_action(
        &self,
        proposal_id: &str,
        action: ReviewerAction,
        rationale: &str,
        reviewer: &str,
    ) -> Result<Proposal, LifecycleError> {
        LifecycleError::validation(
            validate::validate_rationale(action, rationale)
                .into_iter()
                .collect(),
        )?;

        let current = self
            .store
            .find_by_id(proposal_id)
            .await?
            .ok_or(LifecycleError::NotFound)?;

        if self
            .store
            .find_evaluation_by_proposal_id(proposal_id)
            .await?
            .is_none()
        {
            return Err(LifecycleError::NoEvaluationYet(proposal_id.to_string()));
        }

        let next = workflow::transition(current.status, action).inspect_err(|_| {
            log::warn!(
                "Rejected '{}' on proposal {} in status {}",
                action,
                proposal_id,
                current.status
            );
        })?;

        let rationale = rationale.trim().to_string();
        let mut updated = current.clone();
        updated.status = next;
        updated.version += 1;
        updated.review_notes.push(ReviewNote {
            action,
            rationale: rationale.clone(),
            from_status: current.status,
            to_status: next,
            reviewer: reviewer.to_string(),
            created_at: Utc::now(),
        });

        self.store
            .update(&updated, Expected::of(&current))
            .await
            .map_err(|e| write_error(proposal_id, e))?;

        log::info!(
            "Proposal {}: {} by {} ({} -> {})",
            proposal_id,
            action,
            reviewer,
            current.status,
            next
        );
        self.emit(&updated, (!rationale.is_empty()).then_some(rationale));
        Ok(updated)
    }

    /// Administrative edit of descriptive fields; never touches status.
    pub async fn update_details(
        &self,
        proposal_id: &str,
        update: ProposalUpdate,
    ) -> Result<Proposal, LifecycleError> {
        LifecycleError::validation(validate::validate_update(&update))?;

        let current = self
            .store
            .find_by_id(proposal_id)
            .await?
            .ok_or(LifecycleError::NotFound)?;

        let mut updated = current.clone();
        if let Some(v) = update.title {
            updated.title = v.trim().to_string();
        }
        if let Some(v) = update.project_title {
            updated.project_title = v.trim().to_string();
        }
        if updated.title.is_empty() {
            updated.title = updated.project_title.clone();
        }
        if let Some(v) = update.principal_investigator {
            updated.principal_investigator = v.trim().to_string();
        }
        if let Some(v) = update.duration {
            updated.duration = v.trim().to_string();
        }
        if let Some(v) = update.funding_requested {
            updated.funding_requested = v.trim().to_string();
        }
        if let Some(v) = update.research_area {
            updated.research_area = v.trim().to_string();
        }
        if let Some(v) = update.keywords {
            updated.keywords = clean_keywords(v);
        }
        if let Some(v) = update.abstract_text {
            updated.abstract_text = v.trim().to_string();
        }
        if let Some(v) = update.co_investigators {
            updated.co_investigators = v;
        }
        updated.version += 1;

        self.store
            .update(&updated, Expected::of(&current))
            .await
            .map_err(|e| write_error(proposal_id, e))?;
        log::info!("Proposal {} details updated", proposal_id);
        Ok(updated)
    }

    /// Administrative delete; the proposal's evaluation goes with it.
    pub async fn delete_proposal(&self, proposal_id: &str) -> Result<(), LifecycleError> {
        if !self.store.delete(proposal_id).await? {
            return Err(LifecycleError::NotFound);
        }
        log::info!("Proposal {} deleted", proposal_id);
        Ok(())
    }

    pub async fn update_evaluation(
        &self,
        evaluation_id: &str,
        input: EvaluationInput,
    ) -> Result<ProposalEvaluation, LifecycleError> {
        LifecycleError::validation(validate::validate_evaluation(&input))?;
        let mut evaluation = self
            .store
            .find_evaluation_by_id(evaluation_id)
            .await?
            .ok_or(LifecycleError::NotFound)?;
        evaluation.apply(input);
        self.store.update_evaluation(&evaluation).await?;
        log::info!("Evaluation {} updated", evaluation_id);
        Ok(evaluation)
    }

    pub async fn delete_evaluation(&self, evaluation_id: &str) -> Result<(), LifecycleError> {
        if !self.store.delete_evaluation(evaluation_id).await? {
            return Err(LifecycleError::NotFound);
        }
        log::info!("Evaluation {} deleted", evaluation_id);
        Ok(())
    }

    pub async fn find_proposal(&self, proposal_id: &str) -> Result<Proposal, LifecycleError> {
        self.store
            .find_by_id(proposal_id)
            .await?
            .ok_or(LifecycleError::NotFound)
    }

    pub async fn list_proposals(
        &self,
        filter: &ProposalFilter,
        page: i64,
        per_page: i64,
    ) -> Result<ProposalPage, LifecycleError> {
        Ok(self.store.list(filter, page, per_page).await?)
    }

    pub async fn status_summary(&self) -> Result<Vec<StatusCount>, LifecycleError> {
        let mut counts = Vec::with_capacity(ProposalStatus::ALL.len());
        for status in ProposalStatus::ALL {
            let count = self.store.count_by_status(status).await?;
            counts.push(StatusCount { status, count });
        }
        Ok(counts)
    }

    pub async fn evaluation_for(
        &self,
        proposal_id: &str,
    ) -> Result<Option<ProposalEvaluation>, LifecycleError> {
        Ok(self.store.find_evaluation_by_proposal_id(proposal_id).await?)
    }

    pub async fn find_evaluation(
        &self,
        evaluation_id: &str,
    ) -> Result<ProposalEvaluation, LifecycleError> {
        self.store
            .find_evaluation_by_id(evaluation_id)
            .await?
            .ok_or(LifecycleError::NotFound)
    }

    pub async fn list_evaluations(&self) -> Result<Vec<ProposalEvaluation>, LifecycleError> {
        Ok(self.store.list_evaluations().await?)
    }
}

fn clean_keywords(keywords: Vec<String>) -> Vec<String> {
    keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}
