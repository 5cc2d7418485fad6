use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use chat_translate::routes::{
    create_translate_router, health_check, ping, AppState, TranslateState,
};
use chat_translate::services::{
    FileUsageStore, GoogleTranslateProvider, RedisUsageStore, TranslationProvider, UsageGate,
    UsageStore,
};
use chat_translate::utils::{init_logger, HttpClient};
use chat_translate::{RedisPool, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file from project root (../.env) or current directory (.env)
    dotenvy::from_path("../.env")
        .or_else(|_| dotenvy::from_path(".env"))
        .ok();

    // Load configuration first (needed for logger initialization)
    let settings = Settings::new()?;

    init_logger(&settings)?;

    info!("🚀 Chat translation service starting...");

    if let Err(e) = settings.validate() {
        error!("❌ Configuration validation failed: {}", e);
        return Err(anyhow::anyhow!("Invalid configuration: {}", e));
    }
    info!("✅ Configuration validated");

    // Usage store
    let store: Box<dyn UsageStore> = match settings.usage.backend.as_str() {
        "redis" => {
            let redis = RedisPool::new(&settings)?;
            if let Err(e) = redis.ping().await {
                error!("❌ Redis connection failed: {}", e);
                return Err(anyhow::anyhow!("Failed to connect to Redis: {}", e));
            }
            info!("🔌 Redis usage store at key '{}'", settings.usage.redis_key);
            Box::new(RedisUsageStore::new(
                Arc::new(redis),
                settings.usage.redis_key.clone(),
            ))
        }
        _ => {
            info!("📁 File usage store at {}", settings.usage.file_path);
            Box::new(FileUsageStore::new(&settings.usage.file_path))
        }
    };

    let usage_gate = Arc::new(UsageGate::new(store, settings.usage.monthly_quota));
    usage_gate
        .initialize()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize usage tracking: {}", e))?;
    info!(
        "📒 Usage gate ready (monthly quota: {} characters)",
        usage_gate.quota()
    );

    // Translation provider
    let provider: Option<Arc<dyn TranslationProvider>> = match settings.translation_api_key() {
        Some(api_key) => {
            let http_client = HttpClient::new(&settings)?;
            info!("🌐 Google Translate provider initialized");
            Some(Arc::new(GoogleTranslateProvider::new(
                http_client,
                settings.translation.endpoint.clone(),
                api_key,
            )))
        }
        None => {
            warn!("⚠️  Translation API key is not configured; /api/messages/translate will fail");
            None
        }
    };

    let health_state = Arc::new(AppState {
        usage_gate: usage_gate.clone(),
        translation_configured: provider.is_some(),
    });

    let translate_state = TranslateState {
        usage_gate,
        provider,
    };

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/ping", get(ping))
        .with_state(health_state)
        .nest("/api", create_translate_router(translate_state))
        .layer(cors_layer(&settings.server.cors_origins))
        .layer(TraceLayer::new_for_http());

    let bind_addr = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", bind_addr, e))?;

    info!("🚀 Server ready on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("👋 Shutting down...");

    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("⚠️  Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Signal received, starting graceful shutdown");
}
