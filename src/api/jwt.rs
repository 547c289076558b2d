//! Owner identity validation
//!
//! Dashboard callers authenticate with JWTs issued by an external identity
//! provider. This service only validates them against the shared secret and
//! extracts the owner id from the `sub` claim — no tokens are issued here.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::info;

/// Global cached validator instance
///
/// `None` when no jwt_secret is configured — the dashboard API is then
/// disabled wholesale (requests get 404).
static OWNER_VALIDATOR: OnceLock<Option<OwnerTokenValidator>> = OnceLock::new();

/// Get the cached OwnerTokenValidator instance
pub fn get_owner_validator() -> Option<&'static OwnerTokenValidator> {
    OWNER_VALIDATOR
        .get_or_init(|| {
            let config = crate::config::get_config();
            if config.auth.jwt_secret.is_empty() {
                None
            } else {
                Some(OwnerTokenValidator::new(&config.auth.jwt_secret))
            }
        })
        .as_ref()
}

/// Claims the external identity provider puts into owner tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct OwnerClaims {
    /// Owner id, used to scope every CRUD query
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

/// Validates externally-issued owner tokens
pub struct OwnerTokenValidator {
    decoding_key: DecodingKey,
}

impl OwnerTokenValidator {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Validate a bearer token, returning the owner id on success
    pub fn validate(&self, token: &str) -> Option<String> {
        match decode::<OwnerClaims>(token, &self.decoding_key, &Validation::default()) {
            Ok(data) if !data.claims.sub.is_empty() => Some(data.claims.sub),
            Ok(_) => {
                info!("Owner token rejected: empty sub claim");
                None
            }
            Err(e) => {
                info!("Owner token validation failed: {}", e);
                None
            }
        }
    }
}
