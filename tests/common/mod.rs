//! Shared test infrastructure: stores, notifiers, fixtures and app state.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use async_trait::async_trait;
use chrono::Utc;

use prism::auth::password;
use prism::auth::rate_limit::RateLimiter;
use prism::handlers::AppState;
use prism::lifecycle::LifecycleManager;
use prism::models::evaluation::{
    EvaluationInput, EvaluationMetric, ProposalEvaluation, Recommendation,
};
use prism::models::proposal::{DocumentDraft, DocumentType, Proposal, ProposalDraft};
use prism::models::user::{User, UserType};
use prism::models::workflow::ProposalStatus;
use prism::notify::{Notifier, StatusEvent};
use prism::store::{
    Expected, MemoryStore, ProposalFilter, ProposalPage, ProposalStore, StoreError, UserStore,
};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const APPLICANT_EMAIL: &str = "applicant@example.com";
pub const OTHER_APPLICANT_EMAIL: &str = "other@example.com";
pub const REVIEWER_EMAIL: &str = "reviewer@example.com";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const TEST_PASSWORD: &str = "password123";

// ============================================================================
// NOTIFIER
// ============================================================================

/// Keeps every event for later inspection.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<StatusEvent>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: StatusEvent) {
        self.events.lock().unwrap().push(event);
    }
}

// ============================================================================
// STALE-READ STORE
// ============================================================================

/// Wraps a store and, once frozen, keeps answering `find_by_id` with the
/// snapshot taken at freeze time. Models a reviewer acting on a stale read.
pub struct StaleReadStore {
    inner: Arc<MemoryStore>,
    frozen: Mutex<HashMap<String, Proposal>>,
}

impl StaleReadStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            frozen: Mutex::new(HashMap::new()),
        }
    }

    pub async fn freeze(&self, id: &str) {
        let snapshot = self.inner.find_by_id(id).await.unwrap().unwrap();
        self.frozen.lock().unwrap().insert(id.to_string(), snapshot);
    }
}

#[async_trait]
impl ProposalStore for StaleReadStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Proposal>, StoreError> {
        let frozen = self.frozen.lock().unwrap().get(id).cloned();
        match frozen {
            Some(p) => Ok(Some(p)),
            None => self.inner.find_by_id(id).await,
        }
    }

    async fn list(
        &self,
        filter: &ProposalFilter,
        page: i64,
        per_page: i64,
    ) -> Result<ProposalPage, StoreError> {
        self.inner.list(filter, page, per_page).await
    }

    async fn count_by_status(&self, status: ProposalStatus) -> Result<i64, StoreError> {
        self.inner.count_by_status(status).await
    }

    async fn insert(&self, proposal: &Proposal) -> Result<(), StoreError> {
        self.inner.insert(proposal).await
    }

    async fn update(&self, proposal: &Proposal, expected: Expected) -> Result<(), StoreError> {
        self.inner.update(proposal, expected).await
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.inner.delete(id).await
    }

    async fn find_evaluation_by_proposal_id(
        &self,
        proposal_id: &str,
    ) -> Result<Option<ProposalEvaluation>, StoreError> {
        self.inner.find_evaluation_by_proposal_id(proposal_id).await
    }

    async fn find_evaluation_by_id(
        &self,
        id: &str,
    ) -> Result<Option<ProposalEvaluation>, StoreError> {
        self.inner.find_evaluation_by_id(id).await
    }

    async fn list_evaluations(&self) -> Result<Vec<ProposalEvaluation>, StoreError> {
        self.inner.list_evaluations().await
    }

    async fn attach_evaluation(
        &self,
        evaluation: &ProposalEvaluation,
        proposal: &Proposal,
        expected: Expected,
    ) -> Result<(), StoreError> {
        self.inner.attach_evaluation(evaluation, proposal, expected).await
    }

    async fn update_evaluation(&self, evaluation: &ProposalEvaluation) -> Result<(), StoreError> {
        self.inner.update_evaluation(evaluation).await
    }

    async fn delete_evaluation(&self, id: &str) -> Result<bool, StoreError> {
        self.inner.delete_evaluation(id).await
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub fn document(name: &str, doc_type: DocumentType) -> DocumentDraft {
    DocumentDraft {
        id: None,
        name: name.to_string(),
        doc_type,
        file_name: format!("{}.pdf", name.to_lowercase().replace(' ', "_")),
        file_size: "2.4 MB".to_string(),
        uploaded_date: None,
    }
}

/// A draft that passes validation, with exactly three documents.
pub fn complete_draft() -> ProposalDraft {
    ProposalDraft {
        title: String::new(),
        project_title: "AI-Based Methane Detection in Underground Mines".to_string(),
        submitted_by: APPLICANT_EMAIL.to_string(),
        principal_investigator: "Dr. Rajesh Kumar".to_string(),
        duration: "24 months".to_string(),
        funding_requested: "₹45,00,000".to_string(),
        research_area: "Mining Safety".to_string(),
        keywords: vec![" methane ".to_string(), "".to_string(), "IoT".to_string()],
        abstract_text: "A sensor network for early methane detection.".to_string(),
        co_investigators: vec![],
        documents: vec![
            document("Research Proposal", DocumentType::Proposal),
            document("Budget Breakdown", DocumentType::Budget),
            document("PI CV", DocumentType::Cv),
        ],
    }
}

pub fn evaluation_input() -> EvaluationInput {
    EvaluationInput {
        ai_summary: "Well-scoped proposal with clear safety impact.".to_string(),
        key_strengths: vec!["Strong team".to_string()],
        areas_of_concern: vec!["Timeline is tight".to_string()],
        metrics: vec![
            EvaluationMetric {
                name: "Innovation".to_string(),
                score: 8.5,
                max_score: 10.0,
                description: "Novelty of approach".to_string(),
            },
            EvaluationMetric {
                name: "Feasibility".to_string(),
                score: 7.0,
                max_score: 10.0,
                description: "Likelihood of delivery".to_string(),
            },
        ],
        overall_score: 8.2,
        alignment_score: 92.0,
        recommendation: Recommendation::StronglyRecommend,
        recommendation_reason: "Directly addresses a safety priority.".to_string(),
        suggested_improvements: Some(vec!["Add a pilot phase".to_string()]),
    }
}

// ============================================================================
// SETUP
// ============================================================================

pub struct TestEnv {
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub lifecycle: LifecycleManager,
}

/// Lifecycle manager over a fresh in-memory store.
pub fn setup_lifecycle() -> TestEnv {
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let lifecycle = LifecycleManager::new(store.clone(), notifier.clone());
    TestEnv {
        store,
        notifier,
        lifecycle,
    }
}

/// Submit the standard draft and attach an evaluation, leaving it under review.
pub async fn proposal_under_review(lifecycle: &LifecycleManager) -> Proposal {
    let proposal = lifecycle.submit_proposal(complete_draft()).await.unwrap();
    let (proposal, _) = lifecycle
        .attach_evaluation(&proposal.id, evaluation_input())
        .await
        .unwrap();
    proposal
}

/// App state with one user of each role already registered.
pub async fn setup_app_state() -> (AppState, TestEnv) {
    let env = setup_lifecycle();
    for (email, user_type) in [
        (APPLICANT_EMAIL, UserType::Applicant),
        (OTHER_APPLICANT_EMAIL, UserType::Applicant),
        (REVIEWER_EMAIL, UserType::Reviewer),
        (ADMIN_EMAIL, UserType::Admin),
    ] {
        let user = User {
            id: prism::models::new_id(),
            email: email.to_string(),
            password_hash: password::hash_password(TEST_PASSWORD).unwrap(),
            user_type,
            created_at: Utc::now(),
        };
        env.store.insert_user(&user).await.unwrap();
    }

    let state = AppState {
        lifecycle: env.lifecycle.clone(),
        users: env.store.clone(),
        limiter: RateLimiter::new(3, Duration::from_secs(60)),
    };
    (state, env)
}

/// The session cookie set by a login or register response.
pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Cookie<'static> {
    resp.response()
        .cookies()
        .find(|c| c.name() == "prism.sid")
        .map(|c| c.into_owned())
        .expect("response did not set a session cookie")
}
