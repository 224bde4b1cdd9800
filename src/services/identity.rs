use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::models::{Identity, Session};
use crate::services::store::{Store, StoreError};

/// Errors that can occur while registering, logging in or validating tokens
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rejected by identity provider: {0}")]
    Rejected(String),

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Token error: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),

    #[error("Session token lifetime out of range")]
    TokenLifetime,

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),
}

/// Account created by an identity provider, before the profile is stored
#[derive(Debug, Clone)]
pub struct RegisteredUser {
    pub user_id: String,
    /// Present only when this service keeps the password itself
    pub password_hash: Option<String>,
}

/// Verifies who a caller is
///
/// Handlers never treat a bearer token as a user id; they go through
/// `validate`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Short provider name for logs
    fn provider(&self) -> &'static str;

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisteredUser, IdentityError>;

    async fn login(&self, email: &str, password: &str) -> Result<Session, IdentityError>;

    async fn validate(&self, token: &str) -> Result<Identity, IdentityError>;

    /// Undo `register` when the profile could not be stored
    async fn delete_user(&self, user_id: &str) -> Result<(), IdentityError>;
}

/// JWT claims for locally issued session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Identity provider backed by our own store
///
/// Passwords are stored as argon2 hashes; sessions are HS256 JWTs.
pub struct LocalIdentity {
    store: Arc<dyn Store>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// `None` when the configured lifetime does not fit a `chrono::Duration`
    token_ttl: Option<chrono::Duration>,
}

impl LocalIdentity {
    pub fn new(store: Arc<dyn Store>, jwt_secret: &str, token_ttl_secs: u64) -> Self {
        Self {
            store,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            token_ttl: i64::try_from(token_ttl_secs)
                .ok()
                .and_then(chrono::Duration::try_seconds),
        }
    }

    /// Issue a session token for a user
    pub fn issue_token(
        &self,
        user_id: &str,
        name: &str,
        email: &str,
    ) -> Result<String, IdentityError> {
        let now = chrono::Utc::now();
        let expires = self
            .token_ttl
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(IdentityError::TokenLifetime)?;
        let claims = Claims {
            sub: user_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    fn provider(&self) -> &'static str {
        "local"
    }

    async fn register(
        &self,
        _name: &str,
        _email: &str,
        password: &str,
    ) -> Result<RegisteredUser, IdentityError> {
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| IdentityError::PasswordHash(e.to_string()))??;

        Ok(RegisteredUser {
            user_id: uuid::Uuid::new_v4().to_string(),
            password_hash: Some(password_hash),
        })
    }

    async fn login(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let credentials = self.store.find_credentials(email).await?;

        // Unknown emails and accounts created through an external provider
        // still pay for one verify
        let stored_hash = credentials
            .as_ref()
            .and_then(|c| c.password_hash.clone())
            .unwrap_or_else(|| DUMMY_PASSWORD_HASH.to_string());

        let password = password.to_string();
        let verified =
            tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
                .await
                .map_err(|e| IdentityError::PasswordHash(e.to_string()))??;

        let credentials = match credentials {
            Some(credentials) if verified && credentials.password_hash.is_some() => credentials,
            Some(credentials) => {
                tracing::debug!("Password mismatch for {}", credentials.user_id);
                return Err(IdentityError::InvalidCredentials);
            }
            None => return Err(IdentityError::InvalidCredentials),
        };

        let access_token =
            self.issue_token(&credentials.user_id, &credentials.name, &credentials.email)?;

        Ok(Session {
            access_token,
            user_name: credentials.name,
        })
    }

    async fn validate(&self, token: &str) -> Result<Identity, IdentityError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| IdentityError::Unauthorized(e.to_string()))?;

        Ok(Identity {
            user_id: data.claims.sub,
            email: Some(data.claims.email),
            name: Some(data.claims.name),
        })
    }

    /// Profiles and credentials live in the same store, so there is no
    /// separate account to remove
    async fn delete_user(&self, _user_id: &str) -> Result<(), IdentityError> {
        Ok(())
    }
}

/// Well-formed argon2id hash that no password is expected to match. Verified
/// against when a login misses, so unknown emails cost the same as wrong
/// passwords.
const DUMMY_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$\
    c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Hash a password with a fresh random salt (PHC string format)
pub fn hash_password(password: &str) -> Result<String, IdentityError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| IdentityError::PasswordHash(e.to_string()))
}

/// Check a password against a stored PHC hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, IdentityError> {
    let parsed = PasswordHash::new(hash).map_err(|e| IdentityError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::services::MemoryStore;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter2").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("hunter2", "not-a-hash"),
            Err(IdentityError::PasswordHash(_))
        ));
    }

    #[test]
    fn test_dummy_hash_is_well_formed() {
        assert!(!verify_password("hunter2", DUMMY_PASSWORD_HASH).unwrap());
        assert!(!verify_password("", DUMMY_PASSWORD_HASH).unwrap());
    }

    #[tokio::test]
    async fn test_oversized_ttl_fails_without_panicking() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let identity = LocalIdentity::new(store.clone(), SECRET, 10_000_000_000_000);

        assert!(matches!(
            identity.issue_token("u1", "Ana", "ana@example.com"),
            Err(IdentityError::TokenLifetime)
        ));

        let registered = identity.register("Ana", "ana@example.com", "hunter2").await.unwrap();
        store
            .create_user(NewUser {
                id: registered.user_id,
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                skills: vec![],
                password_hash: registered.password_hash,
            })
            .await
            .unwrap();

        assert!(matches!(
            identity.login("ana@example.com", "hunter2").await,
            Err(IdentityError::TokenLifetime)
        ));
    }

    #[tokio::test]
    async fn test_login_without_local_hash_rejected() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        store
            .create_user(NewUser {
                id: "remote-1".to_string(),
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                skills: vec![],
                password_hash: None,
            })
            .await
            .unwrap();

        let identity = LocalIdentity::new(store, SECRET, 3600);
        assert!(matches!(
            identity.login("ana@example.com", "anything").await,
            Err(IdentityError::InvalidCredentials)
        ));
        assert!(identity.delete_user("remote-1").await.is_ok());
    }

    #[tokio::test]
    async fn test_token_roundtrip() {
        let identity = LocalIdentity::new(Arc::new(MemoryStore::new()), SECRET, 3600);
        let token = identity.issue_token("u1", "Ana", "ana@example.com").unwrap();

        let caller = identity.validate(&token).await.unwrap();
        assert_eq!(caller.user_id, "u1");
        assert_eq!(caller.name.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn test_raw_user_id_is_not_a_token() {
        let identity = LocalIdentity::new(Arc::new(MemoryStore::new()), SECRET, 3600);
        let result = identity.validate("0b7c4c1e-4d4f-4a53-9b0e-3f6f2a1d9c11").await;
        assert!(matches!(result, Err(IdentityError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_token_from_other_secret_rejected() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let ours = LocalIdentity::new(store.clone(), SECRET, 3600);
        let theirs = LocalIdentity::new(store, "another-secret", 3600);

        let token = theirs.issue_token("u1", "Ana", "ana@example.com").unwrap();
        assert!(matches!(ours.validate(&token).await, Err(IdentityError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let identity = LocalIdentity::new(Arc::new(MemoryStore::new()), SECRET, 3600);
        let past = chrono::Utc::now() - chrono::Duration::hours(2);
        let claims = Claims {
            sub: "u1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            iat: past.timestamp(),
            exp: past.timestamp() + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(identity.validate(&token).await, Err(IdentityError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_login_flow() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let identity = LocalIdentity::new(store.clone(), SECRET, 3600);

        let registered = identity.register("Ana", "ana@example.com", "hunter2").await.unwrap();
        store
            .create_user(NewUser {
                id: registered.user_id.clone(),
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                skills: vec![],
                password_hash: registered.password_hash,
            })
            .await
            .unwrap();

        let session = identity.login("ANA@example.com", "hunter2").await.unwrap();
        assert_eq!(session.user_name, "Ana");
        let caller = identity.validate(&session.access_token).await.unwrap();
        assert_eq!(caller.user_id, registered.user_id);

        assert!(matches!(
            identity.login("ana@example.com", "wrong").await,
            Err(IdentityError::InvalidCredentials)
        ));
        assert!(matches!(
            identity.login("nobody@example.com", "hunter2").await,
            Err(IdentityError::InvalidCredentials)
        ));
    }
}
