//! Bearer-token identity extractor.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

use neurarig_domain::user::UserRole;

use crate::token::validate_access_token;

/// HS256 signing secret, pulled out of router state via [`FromRef`].
#[derive(Clone)]
pub struct JwtSecret(Arc<str>);

impl JwtSecret {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JwtSecret(..)")
    }
}

/// Caller identity taken from `Authorization: Bearer <jwt>`.
///
/// Returns 401 if the header is absent or the token fails validation.
/// Role enforcement (403) is done by handlers after extraction.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// True when the caller owns the resource or is an administrator.
    pub fn owns_or_admin(&self, owner_id: Uuid) -> bool {
        self.user_id == owner_id || self.is_admin()
    }
}

impl<S> FromRequestParts<S> for Identity
where
    JwtSecret: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // Validate synchronously and hand back a 'static future; `async fn` here
    // would capture `parts` and trip E0195 against axum-core's signature.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let secret = JwtSecret::from_ref(state);
        let identity = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .and_then(|auth| validate_access_token(auth.token(), secret.as_str()).ok())
            .map(|info| Self {
                user_id: info.user_id,
                role: info.role,
            });

        async move { identity.ok_or(StatusCode::UNAUTHORIZED) }
    }
}
