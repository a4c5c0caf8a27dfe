use std::path::PathBuf;
use std::time::Duration;

use sea_orm::Database;
use tracing::info;

use neurarig_auth_types::identity::JwtSecret;

use neurarig_store::config::StoreConfig;
use neurarig_store::infra::cache::MokaBuilderCache;
use neurarig_store::infra::llm::OpenAiChatClient;
use neurarig_store::router::build_router;
use neurarig_store::state::AppState;
use neurarig_store::usecase::builder::RetryPolicy;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    neurarig_core::tracing::init_tracing();

    let config = StoreConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let upload_dir = PathBuf::from(&config.upload_dir);
    tokio::fs::create_dir_all(&upload_dir)
        .await
        .expect("failed to create upload directory");

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("failed to build HTTP client");
    let llm = OpenAiChatClient::from_config(http, &config.llm);
    if llm.is_none() {
        info!("LLM_API_KEY not set, builder will answer from the catalog only");
    }

    let state = AppState {
        db,
        jwt_secret: JwtSecret::new(config.jwt_secret.as_str()),
        upload_dir,
        llm,
        llm_retry: RetryPolicy {
            max_attempts: config.llm.max_attempts,
            ..RetryPolicy::default()
        },
        builder_cache: MokaBuilderCache::new(config.builder_cache_ttl),
    };

    let router = build_router(state, config.cors_origin.as_deref());
    let addr = format!("0.0.0.0:{}", config.store_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("store service listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}
