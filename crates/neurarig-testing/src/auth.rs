//! Mock auth helpers for integration tests.
//!
//! Mints a real HS256 token for a chosen identity so router tests exercise
//! the same `Identity` extractor production requests go through.

use axum::http::{HeaderMap, HeaderValue, header};
use uuid::Uuid;

use neurarig_auth_types::token::issue_access_token;
use neurarig_domain::user::UserRole;

/// Configurable identity injected into test requests.
pub struct MockAuth {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl MockAuth {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn user() -> Self {
        Self::new(Uuid::now_v7(), UserRole::User)
    }

    pub fn admin() -> Self {
        Self::new(Uuid::now_v7(), UserRole::Admin)
    }

    /// Signed bearer token for this identity.
    pub fn token(&self, secret: &str) -> String {
        issue_access_token(self.user_id, self.role, secret)
            .expect("issue test token")
            .0
    }

    /// `Authorization` header value, e.g. for `TestRequest::add_header`.
    pub fn bearer(&self, secret: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", self.token(secret)))
            .expect("bearer header value")
    }

    /// Headers as a client holding this identity would send them.
    pub fn headers(&self, secret: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::AUTHORIZATION, self.bearer(secret));
        map
    }
}
