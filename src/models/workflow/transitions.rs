use super::types::{AvailableAction, ProposalStatus, ReviewerAction};

/// A reviewer action that the transition table refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: ProposalStatus,
    pub action: ReviewerAction,
}

/// Map (current status, reviewer action) to the next status.
///
/// Reviewer actions only fire from `under-review`. The move from `pending` to
/// `under-review` is driven by attaching an evaluation, not by this table.
pub fn transition(
    current: ProposalStatus,
    action: ReviewerAction,
) -> Result<ProposalStatus, InvalidTransition> {
    match (current, action) {
        (ProposalStatus::UnderReview, ReviewerAction::Approve) => Ok(ProposalStatus::Approved),
        (ProposalStatus::UnderReview, ReviewerAction::Conditional) => Ok(ProposalStatus::Reviewed),
        (ProposalStatus::UnderReview, ReviewerAction::Reject) => Ok(ProposalStatus::Rejected),
        (ProposalStatus::UnderReview, ReviewerAction::RequestInfo) => {
            Ok(ProposalStatus::UnderReview)
        }
        (from, action) => Err(InvalidTransition { from, action }),
    }
}

/// All reviewer actions the table accepts from `current`, in button order.
pub fn allowed_actions(current: ProposalStatus) -> Vec<AvailableAction> {
    ReviewerAction::ALL
        .into_iter()
        .filter_map(|action| {
            transition(current, action).ok().map(|to_status| AvailableAction {
                action,
                label: action.label().to_string(),
                to_status,
                requires_rationale: action.requires_rationale(),
            })
        })
        .collect()
}
