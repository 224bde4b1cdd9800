use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::{
    ApplicationRecord, ApplicationSummary, Credentials, InternshipPosting, NewUser, UserProfile,
    WishlistEntry,
};
use crate::services::store::{
    email_key, order_by_catalog, summarize_applications, Store, StoreError, StoredUser,
};

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<StoredUser>,
    postings: Vec<InternshipPosting>,
    wishlist: Vec<WishlistEntry>,
    applications: Vec<ApplicationRecord>,
}

/// In-process store for tests and local development
///
/// Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn create_user(&self, user: NewUser) -> Result<UserProfile, StoreError> {
        let mut state = self.state.write().await;

        let key = email_key(&user.email);
        if state.users.iter().any(|u| email_key(&u.profile.email) == key) {
            return Err(StoreError::Conflict(format!("Email already registered: {}", user.email)));
        }
        if state.users.iter().any(|u| u.profile.id == user.id) {
            return Err(StoreError::Conflict(format!("User id already exists: {}", user.id)));
        }

        let stored = StoredUser::from(user);
        let profile = stored.profile.clone();
        state.users.push(stored);

        Ok(profile)
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, StoreError> {
        let state = self.state.read().await;
        let key = email_key(email);
        Ok(state
            .users
            .iter()
            .find(|u| email_key(&u.profile.email) == key)
            .map(StoredUser::credentials))
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.profile.id == user_id)
            .map(|u| u.profile.clone()))
    }

    async fn update_skills(
        &self,
        user_id: &str,
        skills: &[String],
    ) -> Result<Option<UserProfile>, StoreError> {
        let mut state = self.state.write().await;
        Ok(state
            .users
            .iter_mut()
            .find(|u| u.profile.id == user_id)
            .map(|u| {
                u.profile.skills = skills.to_vec();
                u.profile.clone()
            }))
    }

    async fn seed_postings(&self, postings: &[InternshipPosting]) -> Result<usize, StoreError> {
        let mut state = self.state.write().await;
        if !state.postings.is_empty() {
            return Ok(0);
        }
        state.postings = postings.to_vec();
        Ok(postings.len())
    }

    async fn list_postings(&self) -> Result<Vec<InternshipPosting>, StoreError> {
        Ok(self.state.read().await.postings.clone())
    }

    async fn get_posting(
        &self,
        internship_id: &str,
    ) -> Result<Option<InternshipPosting>, StoreError> {
        let state = self.state.read().await;
        Ok(state.postings.iter().find(|p| p.id == internship_id).cloned())
    }

    async fn add_to_wishlist(
        &self,
        user_id: &str,
        internship_id: &str,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let exists = state
            .wishlist
            .iter()
            .any(|w| w.user_id == user_id && w.internship_id == internship_id);
        if exists {
            return Ok(false);
        }

        state.wishlist.push(WishlistEntry {
            user_id: user_id.to_string(),
            internship_id: internship_id.to_string(),
        });
        Ok(true)
    }

    async fn remove_from_wishlist(
        &self,
        user_id: &str,
        internship_id: &str,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let before = state.wishlist.len();
        state
            .wishlist
            .retain(|w| !(w.user_id == user_id && w.internship_id == internship_id));
        Ok(state.wishlist.len() < before)
    }

    async fn wishlist_postings(&self, user_id: &str) -> Result<Vec<InternshipPosting>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .postings
            .iter()
            .filter(|p| {
                state
                    .wishlist
                    .iter()
                    .any(|w| w.user_id == user_id && w.internship_id == p.id)
            })
            .cloned()
            .collect())
    }

    async fn wishlist_ids(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        let state = self.state.read().await;
        let ids: Vec<String> = state
            .wishlist
            .iter()
            .filter(|w| w.user_id == user_id)
            .map(|w| w.internship_id.clone())
            .collect();
        Ok(order_by_catalog(&ids, &state.postings))
    }

    async fn create_application(
        &self,
        user_id: &str,
        internship_id: &str,
    ) -> Result<ApplicationRecord, StoreError> {
        let record = ApplicationRecord::new(user_id, internship_id);
        self.state.write().await.applications.push(record.clone());
        Ok(record)
    }

    async fn list_applications(
        &self,
        user_id: &str,
    ) -> Result<Vec<ApplicationSummary>, StoreError> {
        let state = self.state.read().await;
        let mine: Vec<ApplicationRecord> = state
            .applications
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        Ok(summarize_applications(&mine, &state.postings))
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(id: &str, email: &str) -> NewUser {
        NewUser {
            id: id.to_string(),
            name: format!("User {}", id),
            email: email.to_string(),
            skills: vec!["React".to_string()],
            password_hash: Some("hash".to_string()),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_user(new_user("1", "ana@example.com")).await.unwrap();

        let err = store.create_user(new_user("2", "ANA@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_skills_unknown_user() {
        let store = MemoryStore::new();
        let result = store.update_skills("ghost", &["Go".to_string()]).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_seed_only_once() {
        let store = MemoryStore::new();
        let catalog = crate::core::default_catalog().unwrap();

        assert_eq!(store.seed_postings(&catalog).await.unwrap(), catalog.len());
        assert_eq!(store.seed_postings(&catalog[..1]).await.unwrap(), 0);
        assert_eq!(store.list_postings().await.unwrap().len(), catalog.len());
    }

    #[tokio::test]
    async fn test_remove_missing_wishlist_entry() {
        let store = MemoryStore::new();
        assert!(!store.remove_from_wishlist("u1", "p1").await.unwrap());
    }
}
