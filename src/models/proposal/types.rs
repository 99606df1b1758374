use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::workflow::{ProposalStatus, ReviewerAction};

/// Kind of supporting document attached to a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    Proposal,
    Budget,
    Cv,
    SupportLetter,
    Other,
}

/// Metadata for an uploaded document. Bytes live outside the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDocument {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub file_name: String,
    pub file_size: String,
    pub uploaded_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoInvestigator {
    pub name: String,
    pub institution: String,
    pub department: String,
    pub email: String,
}

/// Audit note recorded with every reviewer action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewNote {
    pub action: ReviewerAction,
    pub rationale: String,
    pub from_status: ProposalStatus,
    pub to_status: ProposalStatus,
    pub reviewer: String,
    pub created_at: DateTime<Utc>,
}

/// A submitted research proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: String,
    pub title: String,
    pub project_title: String,
    pub submitted_by: String,
    pub principal_investigator: String,
    pub submitted_date: DateTime<Utc>,
    pub status: ProposalStatus,
    pub file_name: String,
    pub duration: String,
    pub funding_requested: String,
    pub research_area: String,
    pub keywords: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub co_investigators: Vec<CoInvestigator>,
    pub documents: Vec<ProposalDocument>,
    pub review_notes: Vec<ReviewNote>,
    /// Incremented on every persisted update; used for conditional writes.
    pub version: i64,
}

/// Document metadata as sent by the upload form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub file_name: String,
    #[serde(default)]
    pub file_size: String,
    #[serde(default)]
    pub uploaded_date: Option<String>,
}

/// Input for `submit_proposal`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProposalDraft {
    pub title: String,
    pub project_title: String,
    pub submitted_by: String,
    pub principal_investigator: String,
    pub duration: String,
    pub funding_requested: String,
    pub research_area: String,
    pub keywords: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub co_investigators: Vec<CoInvestigator>,
    pub documents: Vec<DocumentDraft>,
}

/// Administrative edit of descriptive fields. Status is deliberately absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProposalUpdate {
    pub title: Option<String>,
    pub project_title: Option<String>,
    pub principal_investigator: Option<String>,
    pub duration: Option<String>,
    pub funding_requested: Option<String>,
    pub research_area: Option<String>,
    pub keywords: Option<Vec<String>>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub co_investigators: Option<Vec<CoInvestigator>>,
}
