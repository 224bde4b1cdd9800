// Service exports
pub mod cache;
pub mod identity;
pub mod memory;
pub mod postgres;
pub mod redis_store;
pub mod store;
pub mod supabase;

pub use cache::CatalogCache;
pub use identity::{IdentityError, IdentityProvider, LocalIdentity, RegisteredUser};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use redis_store::{RedisStore, StoreKey};
pub use store::{Store, StoreError};
pub use supabase::SupabaseIdentity;
