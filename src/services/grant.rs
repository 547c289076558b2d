//! Access grants for password-gated links
//!
//! A grant is a signed proof that a visitor passed password verification
//! for one specific short code. The HTTP layer carries it in a
//! `pwd_<code>` cookie; the resolver only ever sees it as an explicit
//! token argument, never as ambient session state.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{info, trace, warn};

use crate::config::AuthConfig;
use crate::utils::generate_secure_token;

/// Grant token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct GrantClaims {
    /// The short code this grant unlocks
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub token_type: String,
}

/// Issues and validates access-grant tokens
pub struct GrantService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_hours: u64,
}

impl GrantService {
    pub fn new(secret: &str, ttl_hours: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_hours,
        }
    }

    /// Create GrantService from config
    ///
    /// An empty grant_secret gets a random value; grants then die with
    /// the process, which only costs visitors a re-prompt.
    pub fn from_config(config: &AuthConfig) -> Self {
        let secret = if config.grant_secret.is_empty() {
            warn!("Grant secret not configured, generating a random one (grants won't survive restarts)");
            generate_secure_token(32)
        } else {
            config.grant_secret.clone()
        };

        Self::new(&secret, config.grant_ttl_hours)
    }

    /// Issue a grant scoped to one short code
    pub fn issue(&self, short_code: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = GrantClaims {
            sub: short_code.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.ttl_hours as i64)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: "grant".to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Validate a grant token against a short code
    ///
    /// Checks signature, expiry, token type, and that the grant was issued
    /// for this exact code — a grant for one code never unlocks another.
    pub fn verify(&self, token: &str, short_code: &str) -> bool {
        let token_data = match decode::<GrantClaims>(token, &self.decoding_key, &Validation::default()) {
            Ok(data) => data,
            Err(e) => {
                trace!("Grant validation failed: {}", e);
                return false;
            }
        };

        if token_data.claims.token_type != "grant" {
            info!("Grant rejected: wrong token type");
            return false;
        }

        if token_data.claims.sub != short_code {
            info!(
                "Grant rejected: issued for '{}', presented for '{}'",
                token_data.claims.sub, short_code
            );
            return false;
        }

        true
    }

    pub fn ttl_hours(&self) -> u64 {
        self.ttl_hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> GrantService {
        GrantService::new("test-secret", 24)
    }

    #[test]
    fn test_issue_and_verify() {
        let svc = service();
        let token = svc.issue("vip").unwrap();
        assert!(svc.verify(&token, "vip"));
    }

    #[test]
    fn test_grant_is_code_scoped() {
        let svc = service();
        let token = svc.issue("vip").unwrap();
        assert!(!svc.verify(&token, "other"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let svc = service();
        let token = svc.issue("vip").unwrap();
        let other = GrantService::new("different-secret", 24);
        assert!(!other.verify(&token, "vip"));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(!service().verify("not.a.token", "vip"));
    }

    #[test]
    fn test_expired_grant_rejected() {
        // jsonwebtoken 默认 60s leeway，用远超 leeway 的过期时间构造
        let svc = service();
        let now = Utc::now();
        let claims = GrantClaims {
            sub: "vip".to_string(),
            iat: (now - Duration::hours(26)).timestamp(),
            exp: (now - Duration::hours(2)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: "grant".to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(!svc.verify(&token, "vip"));
    }
}
