use std::sync::Arc;
use std::time::Duration;

use crate::models::InternshipPosting;
use crate::services::store::{Store, StoreError};

const CATALOG_KEY: &str = "catalog";

/// In-memory cache in front of the catalog
///
/// The catalog is immutable at runtime, so a cached copy is always
/// equivalent to a fresh read. A TTL of zero turns caching off.
pub struct CatalogCache {
    store: Arc<dyn Store>,
    cache: Option<moka::future::Cache<String, Arc<Vec<InternshipPosting>>>>,
}

impl CatalogCache {
    pub fn new(store: Arc<dyn Store>, ttl_secs: u64) -> Self {
        let cache = (ttl_secs > 0).then(|| {
            moka::future::CacheBuilder::new(1)
                .time_to_live(Duration::from_secs(ttl_secs))
                .build()
        });

        Self { store, cache }
    }

    /// Cache that always reads through to the store
    pub fn disabled(store: Arc<dyn Store>) -> Self {
        Self::new(store, 0)
    }

    /// Current catalog, from cache when possible
    pub async fn postings(&self) -> Result<Arc<Vec<InternshipPosting>>, StoreError> {
        let Some(cache) = &self.cache else {
            return Ok(Arc::new(self.store.list_postings().await?));
        };

        if let Some(postings) = cache.get(CATALOG_KEY).await {
            tracing::trace!("Catalog cache hit");
            return Ok(postings);
        }

        let postings = Arc::new(self.store.list_postings().await?);
        cache.insert(CATALOG_KEY.to_string(), postings.clone()).await;
        tracing::trace!("Catalog cache filled with {} postings", postings.len());

        Ok(postings)
    }

    pub fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryStore;

    #[tokio::test]
    async fn test_cached_catalog_matches_store() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let catalog = crate::core::default_catalog().unwrap();
        store.seed_postings(&catalog).await.unwrap();

        let cache = CatalogCache::new(store.clone(), 60);
        assert!(cache.is_enabled());

        let first = cache.postings().await.unwrap();
        let second = cache.postings().await.unwrap();
        assert_eq!(first.as_slice(), catalog.as_slice());
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_disabled_cache_reads_through() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let cache = CatalogCache::disabled(store.clone());
        assert!(!cache.is_enabled());
        assert!(cache.postings().await.unwrap().is_empty());

        let catalog = crate::core::default_catalog().unwrap();
        store.seed_postings(&catalog).await.unwrap();
        assert_eq!(cache.postings().await.unwrap().len(), catalog.len());
    }
}
