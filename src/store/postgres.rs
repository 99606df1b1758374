use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use super::{
    Expected, ProposalFilter, ProposalPage, ProposalStore, StoreError, UserStore, page_offset,
};
use crate::models::evaluation::ProposalEvaluation;
use crate::models::proposal::Proposal;
use crate::models::user::{User, UserType};
use crate::models::workflow::ProposalStatus;

/// Postgres-backed store. Bodies are JSONB; status and version columns carry
/// the conditional-write check.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn proposal_exists(&self, id: &str) -> Result<bool, StoreError> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM proposals WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn user_type_str(t: UserType) -> &'static str {
    match t {
        UserType::Applicant => "applicant",
        UserType::Reviewer => "reviewer",
        UserType::Admin => "admin",
    }
}

fn parse_user_type(s: &str) -> Result<UserType, StoreError> {
    match s {
        "admin" => Ok(UserType::Admin),
        "reviewer" => Ok(UserType::Reviewer),
        "applicant" => Ok(UserType::Applicant),
        other => {
            log::warn!("Unknown user_type '{other}' in users table");
            Err(StoreError::InvalidRecord(format!("unknown user_type '{other}'")))
        }
    }
}

#[async_trait]
impl ProposalStore for PgStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Proposal>, StoreError> {
        let row: Option<(Json<Proposal>,)> =
            sqlx::query_as("SELECT doc FROM proposals WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|r| r.0.0))
    }

    async fn list(
        &self,
        filter: &ProposalFilter,
        page: i64,
        per_page: i64,
    ) -> Result<ProposalPage, StoreError> {
        let status = filter.status.map(|s| s.as_str());
        let submitted_by = filter.submitted_by.as_deref();
        let offset = page_offset(page, per_page);

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM proposals \
             WHERE ($1::TEXT IS NULL OR status = $1) \
               AND ($2::TEXT IS NULL OR LOWER(doc->>'submittedBy') = LOWER($2))",
        )
        .bind(status)
        .bind(submitted_by)
        .fetch_one(&self.pool)
        .await?;

        let rows: Vec<(Json<Proposal>,)> = sqlx::query_as(
            "SELECT doc FROM proposals \
             WHERE ($1::TEXT IS NULL OR status = $1) \
               AND ($2::TEXT IS NULL OR LOWER(doc->>'submittedBy') = LOWER($2)) \
             ORDER BY submitted_date DESC, id ASC \
             LIMIT $3 OFFSET $4",
        )
        .bind(status)
        .bind(submitted_by)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(ProposalPage {
            items: rows.into_iter().map(|r| r.0.0).collect(),
            total: total.0,
        })
    }

    async fn count_by_status(&self, status: ProposalStatus) -> Result<i64, StoreError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM proposals WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    async fn insert(&self, proposal: &Proposal) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO proposals (id, status, version, submitted_date, doc) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&proposal.id)
        .bind(proposal.status.as_str())
        .bind(proposal.version)
        .bind(proposal.submitted_date)
        .bind(Json(proposal))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Duplicate(proposal.id.clone())
            } else {
                StoreError::Database(e)
            }
        })?;
        Ok(())
    }

    async fn update(&self, proposal: &Proposal, expected: Expected) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE proposals SET status = $2, version = $3, doc = $4 \
             WHERE id = $1 AND status = $5 AND version = $6",
        )
        .bind(&proposal.id)
        .bind(proposal.status.as_str())
        .bind(proposal.version)
        .bind(Json(proposal))
        .bind(expected.status.as_str())
        .bind(expected.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return if self.proposal_exists(&proposal.id).await? {
                Err(StoreError::Conflict)
            } else {
                Err(StoreError::NotFound)
            };
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        // evaluations go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM proposals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_evaluation_by_proposal_id(
        &self,
        proposal_id: &str,
    ) -> Result<Option<ProposalEvaluation>, StoreError> {
        let row: Option<(Json<ProposalEvaluation>,)> =
            sqlx::query_as("SELECT doc FROM evaluations WHERE proposal_id = $1")
                .bind(proposal_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|r| r.0.0))
    }

    async fn find_evaluation_by_id(
        &self,
        id: &str,
    ) -> Result<Option<ProposalEvaluation>, StoreError> {
        let row: Option<(Json<ProposalEvaluation>,)> =
            sqlx::query_as("SELECT doc FROM evaluations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|r| r.0.0))
    }

    async fn list_evaluations(&self) -> Result<Vec<ProposalEvaluation>, StoreError> {
        let rows: Vec<(Json<ProposalEvaluation>,)> =
            sqlx::query_as("SELECT doc FROM evaluations ORDER BY created_at ASC, id ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|r| r.0.0).collect())
    }

    async fn attach_evaluation(
        &self,
        evaluation: &ProposalEvaluation,
        proposal: &Proposal,
        expected: Expected,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO evaluations (id, proposal_id, created_at, doc) VALUES ($1, $2, $3, $4)",
        )
        .bind(&evaluation.id)
        .bind(&evaluation.proposal_id)
        .bind(evaluation.created_at)
        .bind(Json(evaluation))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Duplicate(evaluation.proposal_id.clone())
            } else {
                StoreError::Database(e)
            }
        })?;

        let result = sqlx::query(
            "UPDATE proposals SET status = $2, version = $3, doc = $4 \
             WHERE id = $1 AND status = $5 AND version = $6",
        )
        .bind(&proposal.id)
        .bind(proposal.status.as_str())
        .bind(proposal.version)
        .bind(Json(proposal))
        .bind(expected.status.as_str())
        .bind(expected.version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // dropping the transaction rolls back the evaluation insert
            return Err(StoreError::Conflict);
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update_evaluation(&self, evaluation: &ProposalEvaluation) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE evaluations SET doc = $2 WHERE id = $1")
            .bind(&evaluation.id)
            .bind(Json(evaluation))
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_evaluation(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM evaluations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: String,
            email: String,
            password_hash: String,
            user_type: String,
            created_at: DateTime<Utc>,
        }

        let row = sqlx::query_as::<_, Row>(
            "SELECT id, email, password_hash, user_type, created_at \
             FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| {
            Ok(User {
                user_type: parse_user_type(&r.user_type)?,
                id: r.id,
                email: r.email,
                password_hash: r.password_hash,
                created_at: r.created_at,
            })
        })
        .transpose()
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, user_type, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&user.id)
        .bind(user.email.trim())
        .bind(&user.password_hash)
        .bind(user_type_str(user.user_type))
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Duplicate(user.email.clone())
            } else {
                StoreError::Database(e)
            }
        })?;
        Ok(())
    }
}
