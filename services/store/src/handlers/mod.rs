pub mod brand;
pub mod builder;
pub mod cart;
pub mod category;
pub mod health;
pub mod order;
pub mod product;
pub mod upload;
pub mod user;

use serde::Deserialize;
use uuid::Uuid;

use neurarig_auth_types::identity::Identity;
use neurarig_domain::pagination::PageRequest;

use crate::error::StoreError;

/// Reject non-admin callers with `FORBIDDEN`. Runs before any store access.
pub(crate) fn require_admin(identity: &Identity) -> Result<(), StoreError> {
    if identity.is_admin() {
        Ok(())
    } else {
        Err(StoreError::Forbidden)
    }
}

/// Path id that must be a UUID; anything else cannot name a record.
pub(crate) fn parse_id(raw: &str, not_found: StoreError) -> Result<Uuid, StoreError> {
    raw.parse().map_err(|_| not_found)
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct PageQuery {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

impl PageQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::from_parts(self.per_page, self.page)
    }
}
