pub mod brand;
pub mod builder;
pub mod cart;
pub mod catalog_import;
pub mod category;
pub mod order;
pub mod product;
pub mod upload;
pub mod user;

use std::future::Future;

use neurarig_domain::slug::{SlugCandidates, slugify};

use crate::error::StoreError;

/// Upper bound on `-N` suffixes tried before giving up.
const MAX_SLUG_ATTEMPTS: usize = 1000;

/// First slug derived from `name` for which `taken` reports `false`.
pub(crate) async fn first_free_slug<F, Fut>(name: &str, mut taken: F) -> Result<String, StoreError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool, StoreError>>,
{
    for candidate in SlugCandidates::new(slugify(name)).take(MAX_SLUG_ATTEMPTS) {
        if !taken(candidate.clone()).await? {
            return Ok(candidate);
        }
    }
    Err(StoreError::Internal(anyhow::anyhow!(
        "no free slug for {name:?} after {MAX_SLUG_ATTEMPTS} attempts"
    )))
}

/// Trimmed value, or `None` when blank.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
