use std::sync::Arc;
use thiserror::Error;

use crate::config::{AuthProvider, AuthSettings, CatalogSettings, StorageBackend, StorageSettings};
use crate::core::catalog::{default_catalog, load_catalog, CatalogError};
use crate::services::{
    IdentityError, IdentityProvider, LocalIdentity, MemoryStore, PostgresStore, RedisStore, Store,
    StoreError, SupabaseIdentity,
};

/// Upper bound for `auth.token_ttl_secs` (one year)
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Errors that abort startup
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Identity provider error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Connect the configured storage backend
pub async fn build_store(settings: &StorageSettings) -> Result<Arc<dyn Store>, StartupError> {
    let store: Arc<dyn Store> = match settings.backend {
        StorageBackend::Postgres => {
            let url = settings
                .database_url
                .as_deref()
                .ok_or_else(|| {
                    StartupError::Config("storage.database_url is required for postgres".into())
                })?;

            Arc::new(
                PostgresStore::from_settings(
                    url,
                    settings.max_connections,
                    settings.min_connections,
                    settings.acquire_timeout_secs,
                    settings.idle_timeout_secs,
                )
                .await?,
            )
        }
        StorageBackend::Redis => {
            let url = settings
                .redis_url
                .as_deref()
                .ok_or_else(|| {
                    StartupError::Config("storage.redis_url is required for redis".into())
                })?;

            Arc::new(RedisStore::new(url).await?)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    tracing::info!("Storage backend initialized: {}", store.backend());

    Ok(store)
}

/// Build the configured identity provider
pub fn build_identity(
    settings: &AuthSettings,
    store: Arc<dyn Store>,
) -> Result<Arc<dyn IdentityProvider>, StartupError> {
    let identity: Arc<dyn IdentityProvider> = match settings.provider {
        AuthProvider::Local => {
            if settings.token_ttl_secs == 0 || settings.token_ttl_secs > MAX_TOKEN_TTL_SECS {
                return Err(StartupError::Config(format!(
                    "auth.token_ttl_secs must be between 1 and {}, got {}",
                    MAX_TOKEN_TTL_SECS, settings.token_ttl_secs
                )));
            }

            let secret = match settings.jwt_secret.as_deref() {
                Some(secret) if !secret.is_empty() => secret.to_string(),
                _ => {
                    tracing::warn!(
                        "auth.jwt_secret not set; generated an ephemeral secret, \
                         sessions end on restart"
                    );
                    format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
                }
            };

            Arc::new(LocalIdentity::new(store, &secret, settings.token_ttl_secs))
        }
        AuthProvider::Supabase => {
            let supabase = &settings.supabase;
            if supabase.url.is_empty() || supabase.service_role_key.is_empty() {
                return Err(StartupError::Config(
                    "auth.supabase.url and auth.supabase.service_role_key are required \
                     for supabase"
                        .into(),
                ));
            }

            Arc::new(SupabaseIdentity::new(
                supabase.url.clone(),
                supabase.service_role_key.clone(),
                supabase.anon_key.clone(),
            )?)
        }
    };

    tracing::info!("Identity provider initialized: {}", identity.provider());

    Ok(identity)
}

/// Seed the catalog into an empty store
///
/// Returns the number of postings written; zero when the store already
/// had a catalog.
pub async fn seed_catalog(
    store: &dyn Store,
    settings: &CatalogSettings,
) -> Result<usize, StartupError> {
    let postings = match &settings.seed_file {
        Some(path) => load_catalog(path)?,
        None => default_catalog()?,
    };

    let written = store.seed_postings(&postings).await?;

    if written > 0 {
        tracing::info!("Seeded catalog with {} postings", written);
    } else {
        tracing::info!("Catalog already present, seed skipped");
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SupabaseSettings;

    #[tokio::test]
    async fn test_build_memory_store() {
        let store = build_store(&StorageSettings::default()).await.unwrap();
        assert_eq!(store.backend(), "memory");
    }

    #[tokio::test]
    async fn test_postgres_requires_url() {
        let settings = StorageSettings {
            backend: StorageBackend::Postgres,
            ..Default::default()
        };
        assert!(matches!(build_store(&settings).await, Err(StartupError::Config(_))));
    }

    #[test]
    fn test_supabase_requires_keys() {
        let settings = AuthSettings {
            provider: AuthProvider::Supabase,
            supabase: SupabaseSettings {
                url: "https://x.supabase.co".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let result = build_identity(&settings, Arc::new(MemoryStore::new()));
        assert!(matches!(result, Err(StartupError::Config(_))));
    }

    #[test]
    fn test_local_identity_without_secret() {
        let identity =
            build_identity(&AuthSettings::default(), Arc::new(MemoryStore::new())).unwrap();
        assert_eq!(identity.provider(), "local");
    }

    #[test]
    fn test_token_ttl_bounds() {
        for ttl in [0, MAX_TOKEN_TTL_SECS + 1, 10_000_000_000_000, u64::MAX] {
            let settings = AuthSettings {
                token_ttl_secs: ttl,
                ..Default::default()
            };
            let result = build_identity(&settings, Arc::new(MemoryStore::new()));
            assert!(matches!(result, Err(StartupError::Config(_))), "ttl {} accepted", ttl);
        }

        let settings = AuthSettings {
            token_ttl_secs: MAX_TOKEN_TTL_SECS,
            ..Default::default()
        };
        assert!(build_identity(&settings, Arc::new(MemoryStore::new())).is_ok());
    }

    #[tokio::test]
    async fn test_seed_default_catalog_once() {
        let store = MemoryStore::new();
        let settings = CatalogSettings::default();

        assert_eq!(seed_catalog(&store, &settings).await.unwrap(), 8);
        assert_eq!(seed_catalog(&store, &settings).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_seed_from_missing_file() {
        let store = MemoryStore::new();
        let settings = CatalogSettings {
            seed_on_startup: true,
            seed_file: Some("no/such/catalog.json".to_string()),
        };
        assert!(matches!(
            seed_catalog(&store, &settings).await,
            Err(StartupError::Catalog(_))
        ));
    }
}
