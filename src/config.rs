use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3001 }

/// Which storage backend serves the API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Redis,
    #[default]
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

/// Who verifies passwords and session tokens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    #[default]
    Local,
    Supabase,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub provider: AuthProvider,
    pub jwt_secret: Option<String>,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    #[serde(default)]
    pub supabase: SupabaseSettings,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            provider: AuthProvider::default(),
            jwt_secret: None,
            token_ttl_secs: default_token_ttl(),
            supabase: SupabaseSettings::default(),
        }
    }
}

fn default_token_ttl() -> u64 { 86_400 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupabaseSettings {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub service_role_key: String,
    pub anon_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Zero disables the catalog cache
    #[serde(default = "default_catalog_ttl")]
    pub catalog_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            catalog_ttl_secs: default_catalog_ttl(),
        }
    }
}

fn default_catalog_ttl() -> u64 { 300 }

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    #[serde(default = "default_true")]
    pub seed_on_startup: bool,
    /// JSON array of postings; the built-in catalog is used when unset
    pub seed_file: Option<String>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            seed_on_startup: true,
            seed_file: None,
        }
    }
}

fn default_true() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with INTERN_)
    /// 5. Well-known variables such as DATABASE_URL and JWT_SECRET
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., INTERN_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("INTERN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }
}

/// Conventional variable names and the keys they override
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("DATABASE_URL", "storage.database_url"),
    ("REDIS_URL", "storage.redis_url"),
    ("JWT_SECRET", "auth.jwt_secret"),
    ("SUPABASE_URL", "auth.supabase.url"),
    ("SUPABASE_SERVICE_ROLE_KEY", "auth.supabase.service_role_key"),
    ("SUPABASE_ANON_KEY", "auth.supabase.anon_key"),
    ("LOG_LEVEL", "logging.level"),
    ("LOG_FORMAT", "logging.format"),
];

/// Apply conventional environment variables on top of the loaded config
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    let mut builder = Config::builder().add_source(settings);

    for (var, key) in ENV_OVERRIDES {
        if let Ok(value) = std::env::var(var) {
            builder = builder.set_override(*key, value)?;
        }
    }

    builder.build()
}
