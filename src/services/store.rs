use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    ApplicationRecord, ApplicationSummary, Credentials, InternshipPosting, NewUser, UserProfile,
};

/// Errors that can occur when talking to a storage backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Storage backend used by every handler
///
/// Implementations must keep wishlist entries unique per (user, posting)
/// pair and must not deduplicate applications.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for logs
    fn backend(&self) -> &'static str;

    /// Insert a new user. Fails with `Conflict` when the email is taken
    /// (compared case-insensitively).
    async fn create_user(&self, user: NewUser) -> Result<UserProfile, StoreError>;

    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, StoreError>;

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Replace a user's skills. Returns `None` for an unknown user.
    async fn update_skills(
        &self,
        user_id: &str,
        skills: &[String],
    ) -> Result<Option<UserProfile>, StoreError>;

    /// Insert the catalog if it is empty. Returns the number of postings written.
    async fn seed_postings(&self, postings: &[InternshipPosting]) -> Result<usize, StoreError>;

    /// Catalog in insertion order
    async fn list_postings(&self) -> Result<Vec<InternshipPosting>, StoreError>;

    async fn get_posting(
        &self,
        internship_id: &str,
    ) -> Result<Option<InternshipPosting>, StoreError>;

    /// Returns `true` if a new entry was created, `false` if it already existed
    async fn add_to_wishlist(&self, user_id: &str, internship_id: &str) -> Result<bool, StoreError>;

    /// Returns `true` if an entry was removed
    async fn remove_from_wishlist(
        &self,
        user_id: &str,
        internship_id: &str,
    ) -> Result<bool, StoreError>;

    /// Wishlisted postings in catalog order
    async fn wishlist_postings(
        &self,
        user_id: &str,
    ) -> Result<Vec<InternshipPosting>, StoreError>;

    /// Wishlisted posting ids in catalog order. Ids no longer in the
    /// catalog come last, sorted.
    async fn wishlist_ids(&self, user_id: &str) -> Result<Vec<String>, StoreError>;

    async fn create_application(
        &self,
        user_id: &str,
        internship_id: &str,
    ) -> Result<ApplicationRecord, StoreError>;

    /// Applications joined with their postings, newest first
    async fn list_applications(&self, user_id: &str) -> Result<Vec<ApplicationSummary>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}

/// User record as kept by the document-style backends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredUser {
    #[serde(flatten)]
    pub profile: UserProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

impl StoredUser {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            user_id: self.profile.id.clone(),
            name: self.profile.name.clone(),
            email: self.profile.email.clone(),
            password_hash: self.password_hash.clone(),
        }
    }
}

impl From<NewUser> for StoredUser {
    fn from(user: NewUser) -> Self {
        Self {
            profile: user.profile(),
            password_hash: user.password_hash,
        }
    }
}

/// Email comparison key
#[inline]
pub(crate) fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Order wishlisted ids the way `Store::wishlist_ids` promises
pub(crate) fn order_by_catalog(ids: &[String], catalog: &[InternshipPosting]) -> Vec<String> {
    let mut ordered: Vec<String> = catalog
        .iter()
        .filter(|p| ids.contains(&p.id))
        .map(|p| p.id.clone())
        .collect();

    let mut orphans: Vec<String> = ids
        .iter()
        .filter(|id| !catalog.iter().any(|p| &p.id == *id))
        .cloned()
        .collect();
    orphans.sort();
    ordered.extend(orphans);

    ordered
}

/// Join applications to the catalog, newest first. Applications whose
/// posting is gone are skipped.
pub(crate) fn summarize_applications(
    applications: &[ApplicationRecord],
    catalog: &[InternshipPosting],
) -> Vec<ApplicationSummary> {
    let mut summaries: Vec<(DateTime<Utc>, usize, ApplicationSummary)> = applications
        .iter()
        .enumerate()
        .filter_map(|(seq, app)| {
            catalog
                .iter()
                .find(|p| p.id == app.internship_id)
                .map(|posting| {
                    (
                        app.application_date,
                        seq,
                        ApplicationSummary {
                            title: posting.title.clone(),
                            company: posting.company.clone(),
                            application_date: app.application_date,
                            status: app.status.clone(),
                        },
                    )
                })
        })
        .collect();

    // Newest first; later inserts win timestamp ties
    summaries.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
    summaries.into_iter().map(|(_, _, summary)| summary).collect()
}
