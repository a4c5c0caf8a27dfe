use std::time::Duration;

/// Store service configuration loaded from environment variables.
#[derive(Debug)]
pub struct StoreConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HS256 secret used to sign and verify access tokens.
    pub jwt_secret: String,
    /// TCP port for the HTTP server (default 5000). Env var: `STORE_PORT`.
    pub store_port: u16,
    /// Directory uploaded images are written to and served from (default `uploads`).
    pub upload_dir: String,
    /// Allowed CORS origin. Any origin when unset.
    pub cors_origin: Option<String>,
    pub llm: LlmConfig,
    /// Lifetime of the builder catalog snapshot and reply caches.
    pub builder_cache_ttl: Duration,
}

/// Chat-completions endpoint settings for the PC builder.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    /// `None` disables the remote call; the builder always falls back.
    pub api_key: Option<String>,
    pub model: String,
    pub max_attempts: u32,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            store_port: parse_env("STORE_PORT").unwrap_or(5000),
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_owned()),
            cors_origin: non_empty_env("CORS_ORIGIN"),
            llm: LlmConfig {
                api_url: std::env::var("LLM_API_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_owned()),
                api_key: non_empty_env("LLM_API_KEY"),
                model: std::env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_owned()),
                max_attempts: parse_env("LLM_MAX_ATTEMPTS").unwrap_or(3).max(1),
            },
            builder_cache_ttl: Duration::from_secs(
                parse_env("BUILDER_CACHE_TTL_SECS").unwrap_or(300),
            ),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
