use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recommendation {
    StronglyRecommend,
    Recommend,
    Conditional,
    NotRecommend,
}

/// One scored criterion of an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationMetric {
    pub name: String,
    pub score: f64,
    pub max_score: f64,
    pub description: String,
}

/// Assessment attached to exactly one proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalEvaluation {
    pub id: String,
    pub proposal_id: String,
    pub ai_summary: String,
    pub key_strengths: Vec<String>,
    pub areas_of_concern: Vec<String>,
    pub metrics: Vec<EvaluationMetric>,
    /// 0 to 10.
    pub overall_score: f64,
    /// 0 to 100, alignment with the funding programme's guidelines.
    pub alignment_score: f64,
    pub recommendation: Recommendation,
    pub recommendation_reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_improvements: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

/// Evaluation payload pushed by the external evaluation process.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationInput {
    pub ai_summary: String,
    #[serde(default)]
    pub key_strengths: Vec<String>,
    #[serde(default)]
    pub areas_of_concern: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<EvaluationMetric>,
    pub overall_score: f64,
    pub alignment_score: f64,
    pub recommendation: Recommendation,
    pub recommendation_reason: String,
    #[serde(default)]
    pub suggested_improvements: Option<Vec<String>>,
}

impl ProposalEvaluation {
    pub fn from_input(id: String, proposal_id: String, input: EvaluationInput) -> Self {
        ProposalEvaluation {
            id,
            proposal_id,
            ai_summary: input.ai_summary,
            key_strengths: input.key_strengths,
            areas_of_concern: input.areas_of_concern,
            metrics: input.metrics,
            overall_score: input.overall_score,
            alignment_score: input.alignment_score,
            recommendation: input.recommendation,
            recommendation_reason: input.recommendation_reason,
            suggested_improvements: input.suggested_improvements,
            created_at: Utc::now(),
        }
    }

    /// Replace the assessed content, keeping identity and creation time.
    pub fn apply(&mut self, input: EvaluationInput) {
        self.ai_summary = input.ai_summary;
        self.key_strengths = input.key_strengths;
        self.areas_of_concern = input.areas_of_concern;
        self.metrics = input.metrics;
        self.overall_score = input.overall_score;
        self.alignment_score = input.alignment_score;
        self.recommendation = input.recommendation;
        self.recommendation_reason = input.recommendation_reason;
        self.suggested_improvements = input.suggested_improvements;
    }
}
