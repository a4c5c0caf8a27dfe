//! PC-builder reply handling: prompt assembly, budget parsing, extraction of
//! recommended products from free text, and the local fallback picker.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use neurarig_domain::catalog::format_price;

use crate::domain::types::CatalogEntry;

/// Most products a fallback reply recommends.
pub const FALLBACK_MAX_PICKS: usize = 8;

/// Shortest message word used as a fallback keyword.
const MIN_KEYWORD_LEN: usize = 3;

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .expect("uuid pattern")
});

static DOLLAR_SIGN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s*(\d[\d,]*(?:\.\d{1,2})?)").expect("dollar pattern"));

static DOLLAR_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d[\d,]*(?:\.\d{1,2})?)\s*(?:dollars?|usd|bucks)\b")
        .expect("dollar word pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One chat-completions message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Where a builder reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    Llm,
    Cache,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuilderReply {
    pub reply: String,
    pub products: Vec<CatalogEntry>,
    pub categories: Vec<String>,
    pub source: ReplySource,
}

/// Lowercase with whitespace runs collapsed to one space.
pub fn normalize_message(message: &str) -> String {
    message
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reply-cache key for a history-free request.
pub fn reply_cache_key(message: &str, budget: Option<i64>) -> String {
    match budget {
        Some(cents) => format!("{}|{cents}", normalize_message(message)),
        None => format!("{}|", normalize_message(message)),
    }
}

/// Budget in cents mentioned in `message` (`$1,500`, `1500 dollars`, `1500 usd`).
pub fn parse_budget(message: &str) -> Option<i64> {
    DOLLAR_SIGN_RE
        .captures(message)
        .or_else(|| DOLLAR_WORD_RE.captures(message))
        .and_then(|caps| amount_to_cents(caps.get(1)?.as_str()))
        .filter(|cents| *cents > 0)
}

fn amount_to_cents(amount: &str) -> Option<i64> {
    let cleaned: String = amount.chars().filter(|c| *c != ',').collect();
    let (whole, frac) = cleaned.split_once('.').unwrap_or((cleaned.as_str(), ""));
    let dollars: i64 = whole.parse().ok()?;
    let cents: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().ok()? * 10,
        _ => frac[..2].parse().ok()?,
    };
    dollars.checked_mul(100)?.checked_add(cents)
}

/// One inventory line of the system prompt.
pub fn catalog_line(entry: &CatalogEntry) -> String {
    format!(
        "ID: {} | {} | {} | {} | {} | stock {}",
        entry.id,
        entry.name,
        entry.category,
        entry.brand,
        format_price(entry.price),
        entry.stock
    )
}

pub fn system_prompt(snapshot: &[CatalogEntry], budget: Option<i64>) -> String {
    let mut prompt = String::from(
        "You are the NeuraRig PC building assistant. Recommend compatible components \
         using only the in-stock inventory listed below. Whenever you mention a product, \
         include its ID exactly as written. Keep answers short and practical.\n\nInventory:\n",
    );
    for entry in snapshot {
        prompt.push_str(&catalog_line(entry));
        prompt.push('\n');
    }
    if let Some(cents) = budget {
        prompt.push_str(&format!(
            "\nThe customer's budget is {}. Keep the build total within it.\n",
            format_price(cents)
        ));
    }
    prompt
}

/// Products recommended by `reply`.
///
/// UUIDs of known products win, in order of first occurrence. Without any,
/// product names mentioned verbatim (case-insensitive) are used, in order of
/// appearance.
pub fn extract_products<'a>(reply: &str, snapshot: &'a [CatalogEntry]) -> Vec<&'a CatalogEntry> {
    let mut seen = HashSet::new();
    let by_id: Vec<&CatalogEntry> = UUID_RE
        .find_iter(reply)
        .filter_map(|m| m.as_str().parse::<Uuid>().ok())
        .filter_map(|id| snapshot.iter().find(|e| e.id == id))
        .filter(|e| seen.insert(e.id))
        .collect();
    if !by_id.is_empty() {
        return by_id;
    }

    let lower = reply.to_lowercase();
    let mut by_name: Vec<(usize, &CatalogEntry)> = snapshot
        .iter()
        .filter(|e| !e.name.trim().is_empty())
        .filter_map(|e| lower.find(&e.name.to_lowercase()).map(|pos| (pos, e)))
        .collect();
    by_name.sort_by_key(|(pos, _)| *pos);
    by_name
        .into_iter()
        .map(|(_, e)| e)
        .filter(|e| seen.insert(e.id))
        .collect()
}

/// Category names of the extracted products, then any other snapshot
/// category mentioned in `reply`. Distinct, case-insensitively.
pub fn extract_categories(
    reply: &str,
    products: &[&CatalogEntry],
    snapshot: &[CatalogEntry],
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut categories: Vec<String> = products
        .iter()
        .filter(|e| seen.insert(e.category.to_lowercase()))
        .map(|e| e.category.clone())
        .collect();

    let lower = reply.to_lowercase();
    let mut mentioned: Vec<(usize, &str)> = snapshot
        .iter()
        .map(|e| e.category.as_str())
        .filter(|c| !c.trim().is_empty())
        .filter_map(|c| lower.find(&c.to_lowercase()).map(|pos| (pos, c)))
        .collect();
    mentioned.sort_by_key(|(pos, _)| *pos);
    for (_, category) in mentioned {
        if seen.insert(category.to_lowercase()) {
            categories.push(category.to_owned());
        }
    }
    categories
}

/// Local recommendation used when the LLM is unavailable.
///
/// Keywords (message words of at least three characters) are matched against
/// name, category and brand; with no match the whole snapshot is considered.
/// Candidates go by rating (high first) then price (low first), one per
/// category, skipping anything that would push the total over `budget`.
pub fn fallback_picks(
    message: &str,
    snapshot: &[CatalogEntry],
    budget: Option<i64>,
) -> Vec<CatalogEntry> {
    let keywords: Vec<String> = message
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_KEYWORD_LEN)
        .map(str::to_owned)
        .collect();

    let matches = |e: &CatalogEntry| {
        let haystack = format!("{} {} {}", e.name, e.category, e.brand).to_lowercase();
        keywords.iter().any(|k| haystack.contains(k.as_str()))
    };

    let mut candidates: Vec<&CatalogEntry> = snapshot.iter().filter(|e| matches(*e)).collect();
    if candidates.is_empty() {
        candidates = snapshot.iter().collect();
    }
    candidates.sort_by(|a, b| {
        b.rating
            .total_cmp(&a.rating)
            .then_with(|| a.price.cmp(&b.price))
    });

    let mut picks = Vec::new();
    let mut used_categories = HashSet::new();
    let mut spent = 0i64;
    for entry in candidates {
        if picks.len() == FALLBACK_MAX_PICKS {
            break;
        }
        if used_categories.contains(&entry.category.to_lowercase()) {
            continue;
        }
        let next = spent.checked_add(entry.price);
        if budget.is_some_and(|b| next.is_none_or(|total| total > b)) {
            continue;
        }
        used_categories.insert(entry.category.to_lowercase());
        spent = spent.saturating_add(entry.price);
        picks.push(entry.clone());
    }
    picks
}

pub fn fallback_reply(picks: &[CatalogEntry], budget: Option<i64>) -> String {
    if picks.is_empty() {
        return "I couldn't find in-stock components that fit this request right now. \
                Try describing the parts you need or adjusting your budget."
            .to_owned();
    }
    let mut reply = String::from(
        "Our assistant is busy at the moment, so here is a starting point picked from \
         what's in stock:\n",
    );
    for pick in picks {
        reply.push_str(&format!(
            "- {} ({}, {}): {}\n",
            pick.name,
            pick.category,
            pick.brand,
            format_price(pick.price)
        ));
    }
    let total = picks.iter().fold(0i64, |sum, p| sum.saturating_add(p.price));
    reply.push_str(&format!("Estimated total: {}", format_price(total)));
    if let Some(cents) = budget {
        reply.push_str(&format!(" (budget {})", format_price(cents)));
    }
    reply
}
