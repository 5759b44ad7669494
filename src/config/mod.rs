use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub api_server: ServerConfig,
    pub visits: VisitConfig,
    pub cors: CorsConfig,
    pub frontend: FrontendConfig,
    /// Name reported by the `/api/` identity probe
    pub platform_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitConfig {
    /// Repeat visits from one identity inside this window are not counted
    #[serde(default = "VisitConfig::default_dedupe_window_secs")]
    pub dedupe_window_secs: u64,
    /// Upper bound for any single ledger call
    #[serde(default = "VisitConfig::default_storage_timeout_ms")]
    pub storage_timeout_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed to call `/api/*`. Empty means any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Path to the built single-page site. API-only when unset.
    pub static_dir: Option<String>,
}

impl VisitConfig {
    pub const fn default_dedupe_window_secs() -> u64 {
        86_400
    }

    pub const fn default_storage_timeout_ms() -> u64 {
        5_000
    }
}

impl Default for VisitConfig {
    fn default() -> Self {
        Self {
            dedupe_window_secs: Self::default_dedupe_window_secs(),
            storage_timeout_ms: Self::default_storage_timeout_ms(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend_str =
            std::env::var("DATABASE_BACKEND").unwrap_or_else(|_| "sqlite".to_string());

        let backend = match backend_str.to_lowercase().as_str() {
            "postgres" | "postgresql" => DatabaseBackend::Postgres,
            "sqlite" => DatabaseBackend::Sqlite,
            other => {
                tracing::warn!(
                    "Unknown DATABASE_BACKEND '{other}', falling back to 'sqlite'. Supported values: sqlite, postgres"
                );
                DatabaseBackend::Sqlite
            }
        };

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./footfall.db?mode=rwc".to_string());

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        let api_host = std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let api_port = std::env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("API_PORT must be a valid port number")?;

        let dedupe_window_secs = match std::env::var("VISIT_DEDUPE_WINDOW_SECS") {
            Ok(v) => v
                .parse::<u64>()
                .context("VISIT_DEDUPE_WINDOW_SECS must be a number of seconds")?,
            Err(_) => VisitConfig::default_dedupe_window_secs(),
        };

        let storage_timeout_ms = match std::env::var("VISIT_STORAGE_TIMEOUT_MS") {
            Ok(v) => v
                .parse::<u64>()
                .context("VISIT_STORAGE_TIMEOUT_MS must be a number of milliseconds")?,
            Err(_) => VisitConfig::default_storage_timeout_ms(),
        };

        let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| parse_list(&v))
            .unwrap_or_default();

        let platform_name =
            std::env::var("PLATFORM_NAME").unwrap_or_else(|_| "Cloudflare".to_string());

        let frontend_static_dir = std::env::var("FRONTEND_STATIC_DIR").ok();

        Ok(Config {
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections,
            },
            api_server: ServerConfig {
                host: api_host,
                port: api_port,
            },
            visits: VisitConfig {
                dedupe_window_secs,
                storage_timeout_ms,
            },
            cors: CorsConfig { allowed_origins },
            frontend: FrontendConfig {
                static_dir: frontend_static_dir,
            },
            platform_name,
        })
    }
}

/// Split a comma separated env value, dropping empty entries
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
