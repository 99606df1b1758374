use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProposalStatus {
    Pending,
    UnderReview,
    Reviewed,
    Approved,
    Rejected,
}

impl ProposalStatus {
    pub const ALL: [ProposalStatus; 5] = [
        ProposalStatus::Pending,
        ProposalStatus::UnderReview,
        ProposalStatus::Reviewed,
        ProposalStatus::Approved,
        ProposalStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::UnderReview => "under-review",
            ProposalStatus::Reviewed => "reviewed",
            ProposalStatus::Approved => "approved",
            ProposalStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProposalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProposalStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown proposal status '{s}'"))
    }
}

/// A decision a reviewer can take on a proposal under review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewerAction {
    Approve,
    Conditional,
    Reject,
    RequestInfo,
}

impl ReviewerAction {
    pub const ALL: [ReviewerAction; 4] = [
        ReviewerAction::Approve,
        ReviewerAction::Conditional,
        ReviewerAction::Reject,
        ReviewerAction::RequestInfo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewerAction::Approve => "approve",
            ReviewerAction::Conditional => "conditional",
            ReviewerAction::Reject => "reject",
            ReviewerAction::RequestInfo => "request-info",
        }
    }

    /// Every action except approval must carry a non-blank rationale.
    pub fn requires_rationale(&self) -> bool {
        !matches!(self, ReviewerAction::Approve)
    }

    /// Human-readable label for UI buttons and notifications.
    pub fn label(&self) -> &'static str {
        match self {
            ReviewerAction::Approve => "Approve",
            ReviewerAction::Conditional => "Conditional Approval",
            ReviewerAction::Reject => "Reject",
            ReviewerAction::RequestInfo => "Request Information",
        }
    }
}

impl fmt::Display for ReviewerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewerAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReviewerAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| format!("Unknown reviewer action '{s}'"))
    }
}

/// Information about an available action for rendering the review panel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AvailableAction {
    pub action: ReviewerAction,
    pub label: String,
    pub to_status: ProposalStatus,
    pub requires_rationale: bool,
}
