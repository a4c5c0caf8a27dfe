//! Catalog domain types: category spec schemas, product specs, sorting.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pagination::Sort;

/// Value type of a category specification field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecKind {
    Text,
    Number,
    Select,
    Checkbox,
}

/// One field of a category's specification schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SpecKind,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// A concrete specification value carried by a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpec {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Reasons a category spec schema is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpecSchemaError {
    #[error("specification name must not be empty")]
    EmptyName,
    #[error("duplicate specification name: {0:?}")]
    DuplicateName(String),
    #[error("select specification {0:?} needs at least one option")]
    MissingOptions(String),
}

/// Validate a category's spec schema.
///
/// Names are trimmed and compared case-insensitively; `select` fields must
/// list at least one option.
pub fn validate_spec_schema(specs: &[SpecDefinition]) -> Result<(), SpecSchemaError> {
    let mut seen = HashSet::new();
    for spec in specs {
        let name = spec.name.trim();
        if name.is_empty() {
            return Err(SpecSchemaError::EmptyName);
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(SpecSchemaError::DuplicateName(name.to_owned()));
        }
        if spec.kind == SpecKind::Select && spec.options.iter().all(|o| o.trim().is_empty()) {
            return Err(SpecSchemaError::MissingOptions(name.to_owned()));
        }
    }
    Ok(())
}

/// Sort order for the `GET /api/products` listing endpoint.
///
/// Requires a custom `Deserialize` impl because the wire format is a single
/// hyphenated string (e.g. `"price-asc"`) rather than a nested enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSortBy {
    CreatedAt(Sort),
    Price(Sort),
    RatingDesc,
    NameAsc,
}

impl Default for ProductSortBy {
    fn default() -> Self {
        Self::CreatedAt(Sort::Desc)
    }
}

impl ProductSortBy {
    const VARIANTS: &'static [&'static str] = &[
        "newest",
        "oldest",
        "price-asc",
        "price-desc",
        "rating-desc",
        "name-asc",
    ];

    pub fn from_kebab_case(s: &str) -> Option<Self> {
        match s {
            "newest" => Some(Self::CreatedAt(Sort::Desc)),
            "oldest" => Some(Self::CreatedAt(Sort::Asc)),
            "price-asc" => Some(Self::Price(Sort::Asc)),
            "price-desc" => Some(Self::Price(Sort::Desc)),
            "rating-desc" => Some(Self::RatingDesc),
            "name-asc" => Some(Self::NameAsc),
            _ => None,
        }
    }

    pub fn as_kebab_case(self) -> &'static str {
        match self {
            Self::CreatedAt(Sort::Desc) => "newest",
            Self::CreatedAt(Sort::Asc) => "oldest",
            Self::Price(Sort::Asc) => "price-asc",
            Self::Price(Sort::Desc) => "price-desc",
            Self::RatingDesc => "rating-desc",
            Self::NameAsc => "name-asc",
        }
    }
}

impl<'de> Deserialize<'de> for ProductSortBy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_kebab_case(&s)
            .ok_or_else(|| serde::de::Error::unknown_variant(&s, Self::VARIANTS))
    }
}

impl Serialize for ProductSortBy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_kebab_case())
    }
}

/// Format a price in cents as US dollars, e.g. `129999` → `"$1,299.99"`.
pub fn format_price(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let dollars = (cents / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, c) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}${grouped}.{:02}", cents % 100)
}
