use crate::models::evaluation::EvaluationInput;
use crate::models::proposal::{CoInvestigator, ProposalDraft, ProposalUpdate};
use crate::models::workflow::ReviewerAction;

/// Documents a proposal must carry before it can enter the review queue.
pub const MIN_DOCUMENTS: usize = 3;

const MAX_SHORT: usize = 300;
const MAX_LONG: usize = 10_000;

/// Validate an email: must contain '@' and '.', max 254 chars.
pub fn validate_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Some("Email is required".to_string());
    }
    if trimmed.len() > 254 {
        return Some("Email must be at most 254 characters".to_string());
    }
    if !trimmed.contains('@') || !trimmed.contains('.') {
        return Some("Email must be a valid address (contain '@' and '.')".to_string());
    }
    None
}

/// Validate a password: min 8 chars.
pub fn validate_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    if password.len() < 8 {
        return Some("Password must be at least 8 characters".to_string());
    }
    None
}

/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.chars().count() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate an optional text field with a max length (empty is OK).
pub fn validate_optional(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    if value.trim().chars().count() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

fn validate_co_investigators(list: &[CoInvestigator], errors: &mut Vec<String>) {
    for (i, ci) in list.iter().enumerate() {
        let n = i + 1;
        errors.extend(validate_required(&ci.name, &format!("Co-investigator {n} name"), MAX_SHORT));
        errors.extend(validate_required(
            &ci.institution,
            &format!("Co-investigator {n} institution"),
            MAX_SHORT,
        ));
        errors.extend(validate_required(
            &ci.department,
            &format!("Co-investigator {n} department"),
            MAX_SHORT,
        ));
        if let Some(e) = validate_email(&ci.email) {
            errors.push(format!("Co-investigator {n}: {e}"));
        }
    }
}

/// Every problem with a submission draft, in form order.
pub fn validate_draft(draft: &ProposalDraft) -> Vec<String> {
    let mut errors = Vec::new();
    errors.extend(validate_required(&draft.submitted_by, "Submitted by", MAX_SHORT));
    errors.extend(validate_optional(&draft.title, "Title", MAX_SHORT));
    errors.extend(validate_required(&draft.project_title, "Project title", MAX_SHORT));
    errors.extend(validate_optional(
        &draft.principal_investigator,
        "Principal investigator",
        MAX_SHORT,
    ));
    errors.extend(validate_required(&draft.duration, "Duration", MAX_SHORT));
    errors.extend(validate_required(&draft.funding_requested, "Funding requested", MAX_SHORT));
    errors.extend(validate_required(&draft.research_area, "Research area", MAX_SHORT));
    errors.extend(validate_required(&draft.abstract_text, "Abstract", MAX_LONG));
    for keyword in &draft.keywords {
        errors.extend(validate_optional(keyword, "Keyword", 100));
    }
    validate_co_investigators(&draft.co_investigators, &mut errors);

    if draft.documents.len() < MIN_DOCUMENTS {
        errors.push(format!(
            "At least {MIN_DOCUMENTS} documents are required (got {})",
            draft.documents.len()
        ));
    }
    for (i, doc) in draft.documents.iter().enumerate() {
        let n = i + 1;
        errors.extend(validate_required(&doc.name, &format!("Document {n} name"), MAX_SHORT));
        errors.extend(validate_required(
            &doc.file_name,
            &format!("Document {n} file name"),
            MAX_SHORT,
        ));
    }
    errors
}

/// Fields present in an administrative edit must still satisfy the draft rules.
pub fn validate_update(update: &ProposalUpdate) -> Vec<String> {
    let mut errors = Vec::new();
    let required = [
        (&update.project_title, "Project title", MAX_SHORT),
        (&update.duration, "Duration", MAX_SHORT),
        (&update.funding_requested, "Funding requested", MAX_SHORT),
        (&update.research_area, "Research area", MAX_SHORT),
        (&update.abstract_text, "Abstract", MAX_LONG),
    ];
    for (value, name, max) in required {
        if let Some(v) = value {
            errors.extend(validate_required(v, name, max));
        }
    }
    if let Some(title) = &update.title {
        errors.extend(validate_optional(title, "Title", MAX_SHORT));
    }
    if let Some(pi) = &update.principal_investigator {
        errors.extend(validate_optional(pi, "Principal investigator", MAX_SHORT));
    }
    if let Some(list) = &update.co_investigators {
        validate_co_investigators(list, &mut errors);
    }
    errors
}

pub fn validate_evaluation(input: &EvaluationInput) -> Vec<String> {
    let mut errors = Vec::new();
    errors.extend(validate_required(&input.ai_summary, "AI summary", MAX_LONG));
    errors.extend(validate_required(
        &input.recommendation_reason,
        "Recommendation reason",
        MAX_LONG,
    ));
    if !(0.0..=10.0).contains(&input.overall_score) {
        errors.push("Overall score must be between 0 and 10".to_string());
    }
    if !(0.0..=100.0).contains(&input.alignment_score) {
        errors.push("Alignment score must be between 0 and 100".to_string());
    }
    for (i, metric) in input.metrics.iter().enumerate() {
        let n = i + 1;
        errors.extend(validate_required(&metric.name, &format!("Metric {n} name"), MAX_SHORT));
        if !(metric.max_score > 0.0) {
            errors.push(format!("Metric {n} max score must be positive"));
        } else if !(0.0..=metric.max_score).contains(&metric.score) {
            errors.push(format!(
                "Metric {n} score must be between 0 and {}",
                metric.max_score
            ));
        }
    }
    errors
}

/// Rationale is mandatory for every action except approval.
pub fn validate_rationale(action: ReviewerAction, rationale: &str) -> Option<String> {
    if action.requires_rationale() && rationale.trim().is_empty() {
        return Some(format!("A rationale is required for '{action}'"));
    }
    validate_optional(rationale, "Rationale", MAX_LONG)
}
