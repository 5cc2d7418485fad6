// Translation routes
//
// - POST /messages/translate - translate one chat message, charged against the monthly quota
// - GET /messages/translate/usage - this month's usage, no charge

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::models::UsageSnapshot;
use crate::services::{TranslationProvider, UsageGate};
use crate::utils::error::{AppError, Result};

/// Translation router state
#[derive(Clone)]
pub struct TranslateState {
    pub usage_gate: Arc<UsageGate>,
    /// `None` when no provider credentials are configured
    pub provider: Option<Arc<dyn TranslationProvider>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub text: Option<String>,
    pub target_lang: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub translated_text: String,
    pub remaining: i64,
}

/// Create translation routes
pub fn create_router(state: TranslateState) -> Router {
    Router::new()
        .route("/messages/translate", post(handle_translate))
        .route("/messages/translate/usage", get(handle_usage))
        .with_state(state)
}

/// Length as the chat frontend measures it (UTF-16 code units)
pub fn billable_length(text: &str) -> u64 {
    text.encode_utf16().count() as u64
}

/// POST /messages/translate
async fn handle_translate(
    State(state): State<TranslateState>,
    payload: std::result::Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<TranslateResponse>> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let (text, target_lang) = match (request.text, request.target_lang) {
        (Some(text), Some(lang)) if !text.is_empty() && !lang.is_empty() => (text, lang),
        _ => {
            return Err(AppError::BadRequest(
                "Text and target language are required".to_string(),
            ))
        }
    };

    let provider = state.provider.as_ref().ok_or_else(|| {
        error!("❌ Translation API key is not configured");
        AppError::TranslationNotConfigured
    })?;

    let char_count = billable_length(&text);
    let decision = state.usage_gate.check_and_update_usage(char_count).await?;
    if !decision.allowed {
        return Err(AppError::QuotaExceeded {
            remaining: decision.remaining,
        });
    }

    let translated_text = provider
        .translate(&text, &target_lang)
        .await
        .map_err(|e| {
            // Characters already charged stay charged
            warn!(
                "⚠️  {} translation failed after charging {} characters: {}",
                provider.name(),
                char_count,
                e
            );
            e
        })?;

    info!(
        "📨 Translated {} characters to {} via {}",
        char_count,
        target_lang,
        provider.name()
    );

    Ok(Json(TranslateResponse {
        translated_text,
        remaining: decision.remaining,
    }))
}

/// GET /messages/translate/usage
async fn handle_usage(State(state): State<TranslateState>) -> Result<Json<UsageSnapshot>> {
    let snapshot = state.usage_gate.snapshot().await?;
    Ok(Json(snapshot))
}
