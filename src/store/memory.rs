use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    Expected, ProposalFilter, ProposalPage, ProposalStore, StoreError, UserStore, page_offset,
};
use crate::models::evaluation::ProposalEvaluation;
use crate::models::proposal::Proposal;
use crate::models::user::User;
use crate::models::workflow::ProposalStatus;

#[derive(Default)]
struct Inner {
    proposals: HashMap<String, Proposal>,
    evaluations: HashMap<String, ProposalEvaluation>,
    users: HashMap<String, User>,
}

/// In-process store used when no database is configured, and by tests.
/// A single lock covers all maps so multi-record writes are atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_expected(stored: &Proposal, expected: Expected) -> Result<(), StoreError> {
    if stored.status != expected.status || stored.version != expected.version {
        return Err(StoreError::Conflict);
    }
    Ok(())
}

#[async_trait]
impl ProposalStore for MemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Proposal>, StoreError> {
        Ok(self.inner.read().await.proposals.get(id).cloned())
    }

    async fn list(
        &self,
        filter: &ProposalFilter,
        page: i64,
        per_page: i64,
    ) -> Result<ProposalPage, StoreError> {
        let inner = self.inner.read().await;
        let mut matching: Vec<&Proposal> = inner
            .proposals
            .values()
            .filter(|p| filter.status.is_none_or(|s| p.status == s))
            .filter(|p| {
                filter
                    .submitted_by
                    .as_deref()
                    .is_none_or(|by| p.submitted_by.eq_ignore_ascii_case(by))
            })
            .collect();
        matching.sort_by(|a, b| {
            b.submitted_date
                .cmp(&a.submitted_date)
                .then_with(|| a.id.cmp(&b.id))
        });

        let total = matching.len() as i64;
        let offset = usize::try_from(page_offset(page, per_page)).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(usize::try_from(per_page).unwrap_or(0))
            .cloned()
            .collect();
        Ok(ProposalPage { items, total })
    }

    async fn count_by_status(&self, status: ProposalStatus) -> Result<i64, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.proposals.values().filter(|p| p.status == status).count() as i64)
    }

    async fn insert(&self, proposal: &Proposal) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.proposals.contains_key(&proposal.id) {
            return Err(StoreError::Duplicate(proposal.id.clone()));
        }
        inner.proposals.insert(proposal.id.clone(), proposal.clone());
        Ok(())
    }

    async fn update(&self, proposal: &Proposal, expected: Expected) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .proposals
            .get_mut(&proposal.id)
            .ok_or(StoreError::NotFound)?;
        check_expected(stored, expected)?;
        *stored = proposal.clone();
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let removed = inner.proposals.remove(id).is_some();
        if removed {
            inner.evaluations.retain(|_, e| e.proposal_id != id);
        }
        Ok(removed)
    }

    async fn find_evaluation_by_proposal_id(
        &self,
        proposal_id: &str,
    ) -> Result<Option<ProposalEvaluation>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .evaluations
            .values()
            .find(|e| e.proposal_id == proposal_id)
            .cloned())
    }

    async fn find_evaluation_by_id(
        &self,
        id: &str,
    ) -> Result<Option<ProposalEvaluation>, StoreError> {
        Ok(self.inner.read().await.evaluations.get(id).cloned())
    }

    async fn list_evaluations(&self) -> Result<Vec<ProposalEvaluation>, StoreError> {
        let inner = self.inner.read().await;
        let mut items: Vec<ProposalEvaluation> = inner.evaluations.values().cloned().collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn attach_evaluation(
        &self,
        evaluation: &ProposalEvaluation,
        proposal: &Proposal,
        expected: Expected,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner
            .evaluations
            .values()
            .any(|e| e.proposal_id == evaluation.proposal_id)
        {
            return Err(StoreError::Duplicate(evaluation.proposal_id.clone()));
        }
        let stored = inner
            .proposals
            .get_mut(&proposal.id)
            .ok_or(StoreError::NotFound)?;
        check_expected(stored, expected)?;
        *stored = proposal.clone();
        inner
            .evaluations
            .insert(evaluation.id.clone(), evaluation.clone());
        Ok(())
    }

    async fn update_evaluation(&self, evaluation: &ProposalEvaluation) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .evaluations
            .get_mut(&evaluation.id)
            .ok_or(StoreError::NotFound)?;
        *stored = evaluation.clone();
        Ok(())
    }

    async fn delete_evaluation(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.evaluations.remove(id).is_some())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let key = email.trim().to_lowercase();
        Ok(self.inner.read().await.users.get(&key).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let key = user.email.trim().to_lowercase();
        let mut inner = self.inner.write().await;
        if inner.users.contains_key(&key) {
            return Err(StoreError::Duplicate(user.email.clone()));
        }
        inner.users.insert(key, user.clone());
        Ok(())
    }
}
