//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Database configuration (PostgreSQL)
    pub database: DatabaseSettings,

    /// Redis configuration
    pub redis: RedisSettings,

    /// JWT authentication settings
    pub jwt: JwtSettings,

    /// Snowflake ID generator settings
    pub snowflake: SnowflakeSettings,

    /// Rate limiting configuration
    pub rate_limit: RateLimitSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// WebSocket chat configuration
    pub websocket: WebSocketSettings,

    /// SMTP mail configuration
    pub smtp: SmtpSettings,

    /// External lookup proxy configuration (Wikipedia / GPT)
    pub lookup: LookupSettings,

    /// Aggregate statistics cache configuration
    pub stats: StatsSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// PostgreSQL database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,
}

/// Redis configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    /// Redis connection URL
    pub url: String,
}

/// JWT authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens
    pub secret: String,

    /// Access token expiry in minutes
    pub access_token_expiry_minutes: i64,

    /// Refresh token expiry in days
    pub refresh_token_expiry_days: i64,

    /// Password reset token expiry in minutes
    pub password_reset_expiry_minutes: i64,
}

/// Snowflake ID generator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeSettings {
    /// Machine/worker ID (0-31)
    pub machine_id: u16,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    /// Requests per window for general API routes
    pub api_requests_per_minute: u32,

    /// Requests per window for auth routes (stricter)
    pub auth_requests_per_minute: u32,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

/// WebSocket chat configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketSettings {
    /// Maximum message size in bytes
    pub max_message_size: usize,

    /// Heartbeat interval in milliseconds
    pub heartbeat_interval_ms: u64,

    /// Connection timeout for identify in seconds
    pub identify_timeout_secs: u64,
}

/// SMTP mail configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    /// SMTP relay host
    pub host: String,

    /// SMTP port
    pub port: u16,

    /// SMTP username
    pub username: String,

    /// SMTP password
    pub password: String,

    /// Sender address for outgoing mail
    pub from_address: String,

    /// Base URL used in password reset links
    pub frontend_url: String,

    /// Disable actual delivery (log-only), used in development and tests
    pub disabled: bool,
}

/// External lookup proxy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupSettings {
    /// Wikipedia REST API base URL
    pub wikipedia_base_url: String,

    /// OpenAI-compatible chat completion endpoint
    pub gpt_base_url: String,

    /// API key for the GPT endpoint
    pub gpt_api_key: String,

    /// Model name passed to the GPT endpoint
    pub gpt_model: String,

    /// Outbound request timeout in seconds
    pub timeout_secs: u64,
}

/// Aggregate statistics cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsSettings {
    /// Cache TTL in seconds for the /stats payload
    pub cache_ttl_secs: u64,

    /// How many resources the "top by likes" listing returns
    pub top_resources_limit: i64,
}

/// Minimum required length for JWT secret (256 bits = 32 bytes)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if JWT secret is too short.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout", 30)?
            .set_default("jwt.access_token_expiry_minutes", 15)?
            .set_default("jwt.refresh_token_expiry_days", 7)?
            .set_default("jwt.password_reset_expiry_minutes", 30)?
            .set_default("snowflake.machine_id", 1)?
            .set_default("rate_limit.api_requests_per_minute", 300)?
            .set_default("rate_limit.auth_requests_per_minute", 20)?
            .set_default("cors.allowed_origins", vec!["http://localhost:3000"])?
            .set_default("websocket.max_message_size", 65536_i64)? // 64KB
            .set_default("websocket.heartbeat_interval_ms", 45000_i64)?
            .set_default("websocket.identify_timeout_secs", 30_i64)?
            .set_default("smtp.host", "localhost")?
            .set_default("smtp.port", 587)?
            .set_default("smtp.username", "")?
            .set_default("smtp.password", "")?
            .set_default("smtp.from_address", "noreply@kportal.dev")?
            .set_default("smtp.frontend_url", "http://localhost:3000")?
            .set_default("smtp.disabled", true)?
            .set_default("lookup.wikipedia_base_url", "https://en.wikipedia.org")?
            .set_default("lookup.gpt_base_url", "https://api.openai.com/v1")?
            .set_default("lookup.gpt_api_key", "")?
            .set_default("lookup.gpt_model", "gpt-4o-mini")?
            .set_default("lookup.timeout_secs", 10)?
            .set_default("stats.cache_ttl_secs", 60)?
            .set_default("stats.top_resources_limit", 10)?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Load from environment variables
            // APP__SERVER__PORT=3000 -> server.port = 3000
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            // Map simple environment variables
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("redis.url", std::env::var("REDIS_URL").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("smtp.host", std::env::var("SMTP_HOST").ok())?
            .set_override_option("smtp.username", std::env::var("SMTP_USERNAME").ok())?
            .set_override_option("smtp.password", std::env::var("SMTP_PASSWORD").ok())?
            .set_override_option("lookup.gpt_api_key", std::env::var("GPT_API_KEY").ok())?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| {
                // Validate JWT secret length for security
                if settings.jwt.secret.len() < MIN_JWT_SECRET_LENGTH {
                    return Err(ConfigError::Message(format!(
                        "JWT secret must be at least {} characters for security. Current length: {}",
                        MIN_JWT_SECRET_LENGTH,
                        settings.jwt.secret.len()
                    )));
                }
                Ok(settings)
            })
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
