use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::services::UsageGate;

/// Application state shared across health handlers
#[derive(Clone)]
pub struct AppState {
    pub usage_gate: Arc<UsageGate>,
    pub translation_configured: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub components: HealthComponents,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthComponents {
    pub usage_store: ComponentStatus,
    pub translation: ComponentStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub status: String,
    pub message: Option<String>,
}

/// Health check handler
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let backend = state.usage_gate.backend();
    let usage_store = match state.usage_gate.snapshot().await {
        Ok(_) => ComponentStatus {
            status: "healthy".to_string(),
            message: Some(format!("{} backend", backend)),
        },
        Err(e) => ComponentStatus {
            status: "unhealthy".to_string(),
            message: Some(format!("{} backend: {}", backend, e)),
        },
    };

    // Quota checks still work without a provider, so this never degrades health
    let translation = if state.translation_configured {
        ComponentStatus {
            status: "healthy".to_string(),
            message: None,
        }
    } else {
        ComponentStatus {
            status: "disabled".to_string(),
            message: Some("Translation API key is not configured".to_string()),
        }
    };

    let (overall_status, status_code) = if usage_store.status == "healthy" {
        ("healthy", StatusCode::OK)
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };

    let response = HealthResponse {
        status: overall_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        components: HealthComponents {
            usage_store,
            translation,
        },
    };

    (status_code, Json(response))
}

/// Simple ping handler
pub async fn ping() -> &'static str {
    "pong"
}
