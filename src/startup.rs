//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::config::Settings;
use crate::infrastructure::cache::{self, JsonCache};
use crate::infrastructure::database;
use crate::infrastructure::email::Mailer;
use crate::infrastructure::external::{GptClient, WikipediaClient};
use crate::presentation::http::routes;
use crate::presentation::middleware::{cors, logging};
use crate::presentation::websocket::gateway::Gateway;
use crate::shared::snowflake::SnowflakeGenerator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub redis: ConnectionManager,
    pub cache: JsonCache,
    pub snowflake: Arc<SnowflakeGenerator>,
    pub gateway: Arc<Gateway>,
    pub mailer: Arc<Mailer>,
    pub wikipedia: WikipediaClient,
    pub gpt: GptClient,
    pub settings: Arc<Settings>,
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        // Database pool and migrations
        let db = database::create_pool(&settings.database).await?;
        database::run_migrations(&db).await?;
        tracing::info!("Database connection pool created");

        // Redis
        let redis = cache::create_redis_client(&settings.redis).await?;
        let json_cache = JsonCache::new(redis.clone());
        tracing::info!("Redis connection established");

        // Snowflake ID generator
        let snowflake = Arc::new(SnowflakeGenerator::new(
            settings.snowflake.machine_id as u64,
            0u64,
        ));

        // WebSocket gateway
        let gateway = Arc::new(Gateway::new(settings.websocket.heartbeat_interval_ms));

        // Notification mailer
        let mailer = Arc::new(Mailer::new(settings.smtp.clone())?);

        // Outbound HTTP clients share one connection pool
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(settings.lookup.timeout_secs))
            .build()?;
        let wikipedia = WikipediaClient::new(http.clone(), settings.lookup.wikipedia_base_url.clone());
        let gpt = GptClient::new(
            http,
            settings.lookup.gpt_base_url.clone(),
            settings.lookup.gpt_api_key.clone(),
            settings.lookup.gpt_model.clone(),
        );

        let state = AppState {
            db,
            redis,
            cache: json_cache,
            snowflake,
            gateway,
            mailer,
            wikipedia,
            gpt,
            settings: Arc::new(settings.clone()),
        };

        let router = routes::create_router(state.clone())
            .layer(logging::create_trace_layer())
            .layer(cors::create_cors_layer(&settings.cors));

        let addr = SocketAddr::from(([0, 0, 0, 0], settings.server.port));
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}
