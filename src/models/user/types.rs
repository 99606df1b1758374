use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Portal role. Applicants submit, reviewers decide, admins may do both plus
/// administrative edits and deletions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[serde(alias = "user")]
    Applicant,
    Reviewer,
    Admin,
}

impl UserType {
    pub fn can_review(&self) -> bool {
        matches!(self, UserType::Reviewer | UserType::Admin)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserType::Admin)
    }
}

/// Internal user record for authentication, including the password hash.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub user_type: UserType,
    pub created_at: DateTime<Utc>,
}

/// What the session and `/api/auth/me` expose about a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub user_type: UserType,
}

impl From<&User> for SessionUser {
    fn from(u: &User) -> Self {
        SessionUser {
            id: u.id.clone(),
            email: u.email.clone(),
            user_type: u.user_type,
        }
    }
}
