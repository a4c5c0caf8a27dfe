//! JWT access-token issuance and validation.

#[cfg(any(feature = "issuer", test))]
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "issuer", test))]
use serde::Serialize;
use uuid::Uuid;

use neurarig_domain::user::UserRole;

/// Seven days.
pub const ACCESS_TOKEN_EXP: u64 = 604_800;

/// Caller identity carried by a valid access token.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub user_id: Uuid,
    pub role: UserRole,
    /// Unix seconds.
    pub expires_at: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("failed to encode token")]
    Encoding,
}

/// Claims of a store access token: `sub` is the user id, `role` the
/// [`UserRole`] wire value, `exp` the expiry in unix seconds.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "issuer", test), derive(Serialize))]
pub struct StoreClaims {
    pub sub: String,
    pub role: u8,
    pub exp: u64,
}

impl StoreClaims {
    fn into_info(self) -> Result<TokenInfo, AuthError> {
        let user_id = Uuid::parse_str(&self.sub).map_err(|_| AuthError::Malformed)?;
        let role = UserRole::from_u8(self.role).ok_or(AuthError::Malformed)?;
        Ok(TokenInfo {
            user_id,
            role,
            expires_at: self.exp,
        })
    }
}

#[cfg(any(feature = "issuer", test))]
fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn hs256() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "sub"]);
    validation
}

/// Verify signature and expiry of a bearer token and read the caller out of it.
pub fn validate_access_token(token: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    decode::<StoreClaims>(token, &key, &hs256())
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            _ => AuthError::Malformed,
        })?
        .claims
        .into_info()
}

/// Sign a token for `user_id` valid for [`ACCESS_TOKEN_EXP`] seconds.
/// Returns the token and its expiry.
#[cfg(any(feature = "issuer", test))]
pub fn issue_access_token(
    user_id: Uuid,
    role: UserRole,
    secret: &str,
) -> Result<(String, u64), AuthError> {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let claims = StoreClaims {
        sub: user_id.to_string(),
        role: role.as_u8(),
        exp: now_secs() + ACCESS_TOKEN_EXP,
    };
    let key = EncodingKey::from_secret(secret.as_bytes());
    let token = encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|_| AuthError::Encoding)?;
    Ok((token, claims.exp))
}
