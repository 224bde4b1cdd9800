use async_trait::async_trait;
use redis::aio::ConnectionManager;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::models::{
    ApplicationRecord, ApplicationSummary, Credentials, InternshipPosting, NewUser, UserProfile,
};
use crate::services::store::{
    email_key, order_by_catalog, summarize_applications, Store, StoreError, StoredUser,
};

/// Key builder for the key-value layout
pub struct StoreKey;

impl StoreKey {
    /// JSON user document
    pub fn user(user_id: &str) -> String {
        format!("user:{}", user_id)
    }

    /// Email to user id index
    pub fn user_email(email: &str) -> String {
        format!("user_email:{}", email_key(email))
    }

    /// JSON array with the whole catalog
    pub fn internships() -> &'static str {
        "internships"
    }

    /// Set of wishlisted posting ids
    pub fn wishlist(user_id: &str) -> String {
        format!("wishlist:{}", user_id)
    }

    /// List of JSON application records
    pub fn applications(user_id: &str) -> String {
        format!("applications:{}", user_id)
    }
}

/// Redis-backed store using a document-per-key layout
pub struct RedisStore {
    redis: Arc<tokio::sync::Mutex<ConnectionManager>>,
}

impl RedisStore {
    pub async fn new(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Arc::new(tokio::sync::Mutex::new(redis)),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let mut conn = self.redis.lock().await;
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut *conn).await?;
        drop(conn);

        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        let mut conn = self.redis.lock().await;
        let _: () = redis::cmd("SET").arg(key).arg(json).query_async(&mut *conn).await?;
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<StoredUser>, StoreError> {
        self.get_json(&StoreKey::user(user_id)).await
    }

    /// Drop the email index entry claimed by `create_user`
    async fn release_email(&self, email: &str) -> Result<(), StoreError> {
        let mut conn = self.redis.lock().await;
        let _: i64 = redis::cmd("DEL")
            .arg(StoreKey::user_email(email))
            .query_async(&mut *conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Store for RedisStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn create_user(&self, user: NewUser) -> Result<UserProfile, StoreError> {
        let stored = StoredUser::from(user);
        let json = serde_json::to_string(&stored)?;
        let email_index = StoreKey::user_email(&stored.profile.email);

        let mut conn = self.redis.lock().await;

        // SET NX on the email index is the uniqueness check
        let claimed: Option<String> = redis::cmd("SET")
            .arg(&email_index)
            .arg(&stored.profile.id)
            .arg("NX")
            .query_async(&mut *conn)
            .await?;

        if claimed.is_none() {
            return Err(StoreError::Conflict(format!(
                "Email already registered: {}",
                stored.profile.email
            )));
        }

        let written: Result<(), redis::RedisError> = redis::cmd("SET")
            .arg(StoreKey::user(&stored.profile.id))
            .arg(json)
            .query_async(&mut *conn)
            .await;
        drop(conn);

        if let Err(e) = written {
            // The index must not point at a user that was never written
            if let Err(release) = self.release_email(&stored.profile.email).await {
                tracing::error!(
                    "Failed to release {} after user write error: {}",
                    email_index,
                    release
                );
            }
            return Err(e.into());
        }

        Ok(stored.profile)
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, StoreError> {
        let mut conn = self.redis.lock().await;
        let user_id: Option<String> = redis::cmd("GET")
            .arg(StoreKey::user_email(email))
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        match user_id {
            Some(id) => Ok(self.get_user(&id).await?.map(|u| u.credentials())),
            None => Ok(None),
        }
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.get_user(user_id).await?.map(|u| u.profile))
    }

    async fn update_skills(
        &self,
        user_id: &str,
        skills: &[String],
    ) -> Result<Option<UserProfile>, StoreError> {
        let Some(mut user) = self.get_user(user_id).await? else {
            return Ok(None);
        };

        user.profile.skills = skills.to_vec();
        self.set_json(&StoreKey::user(user_id), &user).await?;

        Ok(Some(user.profile))
    }

    async fn seed_postings(&self, postings: &[InternshipPosting]) -> Result<usize, StoreError> {
        let json = serde_json::to_string(postings)?;
        let mut conn = self.redis.lock().await;
        let written: Option<String> = redis::cmd("SET")
            .arg(StoreKey::internships())
            .arg(json)
            .arg("NX")
            .query_async(&mut *conn)
            .await?;

        Ok(if written.is_some() { postings.len() } else { 0 })
    }

    async fn list_postings(&self) -> Result<Vec<InternshipPosting>, StoreError> {
        Ok(self
            .get_json::<Vec<InternshipPosting>>(StoreKey::internships())
            .await?
            .unwrap_or_default())
    }

    async fn get_posting(
        &self,
        internship_id: &str,
    ) -> Result<Option<InternshipPosting>, StoreError> {
        Ok(self
            .list_postings()
            .await?
            .into_iter()
            .find(|p| p.id == internship_id))
    }

    async fn add_to_wishlist(
        &self,
        user_id: &str,
        internship_id: &str,
    ) -> Result<bool, StoreError> {
        let mut conn = self.redis.lock().await;
        let added: i64 = redis::cmd("SADD")
            .arg(StoreKey::wishlist(user_id))
            .arg(internship_id)
            .query_async(&mut *conn)
            .await?;

        Ok(added > 0)
    }

    async fn remove_from_wishlist(
        &self,
        user_id: &str,
        internship_id: &str,
    ) -> Result<bool, StoreError> {
        let mut conn = self.redis.lock().await;
        let removed: i64 = redis::cmd("SREM")
            .arg(StoreKey::wishlist(user_id))
            .arg(internship_id)
            .query_async(&mut *conn)
            .await?;

        Ok(removed > 0)
    }

    async fn wishlist_postings(&self, user_id: &str) -> Result<Vec<InternshipPosting>, StoreError> {
        let ids: HashSet<String> = self.wishlist_ids(user_id).await?.into_iter().collect();

        Ok(self
            .list_postings()
            .await?
            .into_iter()
            .filter(|p| ids.contains(&p.id))
            .collect())
    }

    async fn wishlist_ids(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.redis.lock().await;
        let members: Vec<String> = redis::cmd("SMEMBERS")
            .arg(StoreKey::wishlist(user_id))
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        let catalog = self.list_postings().await?;
        Ok(order_by_catalog(&members, &catalog))
    }

    async fn create_application(
        &self,
        user_id: &str,
        internship_id: &str,
    ) -> Result<ApplicationRecord, StoreError> {
        let record = ApplicationRecord::new(user_id, internship_id);
        let json = serde_json::to_string(&record)?;

        let mut conn = self.redis.lock().await;
        let _: i64 = redis::cmd("RPUSH")
            .arg(StoreKey::applications(user_id))
            .arg(json)
            .query_async(&mut *conn)
            .await?;

        Ok(record)
    }

    async fn list_applications(
        &self,
        user_id: &str,
    ) -> Result<Vec<ApplicationSummary>, StoreError> {
        let mut conn = self.redis.lock().await;
        let raw: Vec<String> = redis::cmd("LRANGE")
            .arg(StoreKey::applications(user_id))
            .arg(0)
            .arg(-1)
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        let applications = raw
            .iter()
            .map(|json| serde_json::from_str::<ApplicationRecord>(json))
            .collect::<Result<Vec<_>, _>>()?;

        let catalog = self.list_postings().await?;
        Ok(summarize_applications(&applications, &catalog))
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        let mut conn = self.redis.lock().await;
        let pong: String = redis::cmd("PING").query_async(&mut *conn).await?;
        Ok(pong == "PONG")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_key_builder() {
        assert_eq!(StoreKey::user("u1"), "user:u1");
        assert_eq!(StoreKey::user_email(" Ana@Example.com"), "user_email:ana@example.com");
        assert_eq!(StoreKey::internships(), "internships");
        assert_eq!(StoreKey::wishlist("u1"), "wishlist:u1");
        assert_eq!(StoreKey::applications("u1"), "applications:u1");
    }

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_wishlist_add_is_idempotent() {
        let store = RedisStore::new("redis://127.0.0.1:6379")
            .await
            .expect("Failed to connect");

        let user_id = uuid::Uuid::new_v4().to_string();
        store.add_to_wishlist(&user_id, "1").await.unwrap();
        assert!(!store.add_to_wishlist(&user_id, "1").await.unwrap());
        assert!(store.remove_from_wishlist(&user_id, "1").await.unwrap());
    }

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_released_email_can_register_again() {
        let store = RedisStore::new("redis://127.0.0.1:6379")
            .await
            .expect("Failed to connect");

        let email = format!("{}@example.com", uuid::Uuid::new_v4());
        let new_user = |id: &str| NewUser {
            id: id.to_string(),
            name: "Ana".to_string(),
            email: email.clone(),
            skills: vec![],
            password_hash: None,
        };

        let first = uuid::Uuid::new_v4().to_string();
        store.create_user(new_user(&first)).await.unwrap();
        assert!(matches!(
            store.create_user(new_user("other")).await,
            Err(StoreError::Conflict(_))
        ));

        // Same state a failed document write leaves after rollback
        store.release_email(&email).await.unwrap();
        assert!(store.find_credentials(&email).await.unwrap().is_none());

        let second = uuid::Uuid::new_v4().to_string();
        store.create_user(new_user(&second)).await.unwrap();
        let credentials = store.find_credentials(&email).await.unwrap().unwrap();
        assert_eq!(credentials.user_id, second);
    }
}
