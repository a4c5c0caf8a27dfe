use axum::{Json, extract::State};
use serde::Deserialize;

use crate::domain::builder::{BuilderReply, ChatMessage};
use crate::error::StoreError;
use crate::state::AppState;
use crate::usecase::builder::{BuilderChatUseCase, ChatInput};

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    /// Cents.
    pub budget: Option<i64>,
}

// ── POST /api/builder/chat ───────────────────────────────────────────────────

pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<BuilderReply>, StoreError> {
    let usecase = BuilderChatUseCase {
        products: state.product_repo(),
        cache: state.builder_cache.clone(),
        llm: state.llm.clone(),
        retry: state.llm_retry,
    };
    let reply = usecase
        .execute(ChatInput {
            message: body.message,
            history: body.history,
            budget: body.budget,
        })
        .await?;
    Ok(Json(reply))
}
