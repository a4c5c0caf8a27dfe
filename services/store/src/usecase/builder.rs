use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::builder::{
    BuilderReply, ChatMessage, ChatRole, ReplySource, extract_categories, extract_products,
    fallback_picks, fallback_reply, parse_budget, reply_cache_key, system_prompt,
};
use crate::domain::repository::{BuilderCache, LlmPort, ProductRepository};
use crate::domain::types::CatalogEntry;
use crate::error::StoreError;

/// Longest accepted user message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;
/// Most recent history entries forwarded to the model.
pub const MAX_HISTORY: usize = 10;

/// Exponential backoff: `base_delay`, then doubled after every failed attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Run `op` until it succeeds or attempts run out; the last error is returned.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut delay = self.base_delay;
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= max_attempts => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        attempt,
                        max_attempts,
                        retry_in_ms = delay.as_millis() as u64,
                        "llm call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                    attempt += 1;
                }
            }
        }
    }
}

// ── BuilderChat ──────────────────────────────────────────────────────────────

pub struct ChatInput {
    pub message: String,
    pub history: Vec<ChatMessage>,
    /// Budget in cents; parsed from the message when absent.
    pub budget: Option<i64>,
}

pub struct BuilderChatUseCase<P: ProductRepository, C: BuilderCache, L: LlmPort> {
    pub products: P,
    pub cache: C,
    /// `None` when no API key is configured.
    pub llm: Option<L>,
    pub retry: RetryPolicy,
}

impl<P: ProductRepository, C: BuilderCache, L: LlmPort> BuilderChatUseCase<P, C, L> {
    pub async fn execute(&self, input: ChatInput) -> Result<BuilderReply, StoreError> {
        let message = input.message.trim();
        if message.is_empty() {
            return Err(StoreError::invalid_input("message is required"));
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(StoreError::invalid_input(format!(
                "message must be at most {MAX_MESSAGE_CHARS} characters"
            )));
        }
        if input.budget.is_some_and(|b| b <= 0) {
            return Err(StoreError::invalid_input("budget must be positive"));
        }
        let budget = input.budget.or_else(|| parse_budget(message));
        let history = trim_history(input.history);

        // Conversations with history are never cached.
        let cache_key = history
            .is_empty()
            .then(|| reply_cache_key(message, budget));
        if let Some(key) = cache_key.as_deref() {
            if let Some(mut hit) = self.cache.reply(key) {
                hit.source = ReplySource::Cache;
                return Ok(hit);
            }
        }

        let snapshot = self.snapshot().await?;

        let Some(llm) = self.llm.as_ref() else {
            tracing::debug!("llm not configured, using fallback");
            return Ok(fallback(message, &snapshot, budget));
        };

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::new(
            ChatRole::System,
            system_prompt(&snapshot, budget),
        ));
        messages.extend(history);
        messages.push(ChatMessage::new(ChatRole::User, message));

        let messages = messages.as_slice();
        let text = match self.retry.run(move || llm.complete(messages)).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "llm unavailable after retries, using fallback");
                return Ok(fallback(message, &snapshot, budget));
            }
        };

        let products = extract_products(&text, &snapshot);
        let categories = extract_categories(&text, &products, &snapshot);
        let reply = BuilderReply {
            reply: text,
            products: products.into_iter().cloned().collect(),
            categories,
            source: ReplySource::Llm,
        };
        if let Some(key) = cache_key {
            self.cache.store_reply(key, reply.clone());
        }
        Ok(reply)
    }

    async fn snapshot(&self) -> Result<Arc<Vec<CatalogEntry>>, StoreError> {
        if let Some(snapshot) = self.cache.snapshot() {
            return Ok(snapshot);
        }
        let snapshot = Arc::new(self.products.catalog_snapshot().await?);
        self.cache.store_snapshot(Arc::clone(&snapshot));
        Ok(snapshot)
    }
}

/// Drop system entries and blanks, keep the last [`MAX_HISTORY`].
fn trim_history(history: Vec<ChatMessage>) -> Vec<ChatMessage> {
    let mut kept: Vec<ChatMessage> = history
        .into_iter()
        .filter(|m| m.role != ChatRole::System)
        .filter(|m| !m.content.trim().is_empty())
        .collect();
    if kept.len() > MAX_HISTORY {
        kept.drain(..kept.len() - MAX_HISTORY);
    }
    kept
}

fn fallback(message: &str, snapshot: &[CatalogEntry], budget: Option<i64>) -> BuilderReply {
    let picks = fallback_picks(message, snapshot, budget);
    let mut categories: Vec<String> = Vec::new();
    for pick in &picks {
        if !categories.contains(&pick.category) {
            categories.push(pick.category.clone());
        }
    }
    BuilderReply {
        reply: fallback_reply(&picks, budget),
        products: picks,
        categories,
        source: ReplySource::Fallback,
    }
}
