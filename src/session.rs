//! Session token issuance and verification.
//!
//! Sessions are ephemeral signed credentials, never persisted server-side:
//! possession of a valid, unexpired, correctly-signed token is the sole
//! authorization check for protected operations.
//!
//! # Example
//!
//! ```rust,ignore
//! use keyway::{SessionConfig, SessionIssuer};
//!
//! let issuer = SessionIssuer::new(
//!     SessionConfig::new("your-signing-key-32-bytes-min!!!", "my-app")
//! )?;
//!
//! let session = issuer.issue(&identity)?;
//! let claims = issuer.authenticate(&session.token)?;
//! assert_eq!(claims.sub, identity.email);
//! ```

use crate::error::{KeywayError, Result};
use crate::identity::Identity;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Configuration for session token issuance.
#[derive(Clone)]
pub struct SessionConfig {
    /// Secret key for HS256 signing. Process-wide, loaded once at startup,
    /// never rotated within a process lifetime.
    signing_key: Vec<u8>,
    /// Token issuer (iss claim).
    pub issuer: String,
    /// Session lifetime (default: 1 hour).
    pub ttl: Duration,
}

impl SessionConfig {
    /// Create config with an HS256 signing key and issuer name.
    pub fn new(signing_key: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            signing_key: signing_key.into().into_bytes(),
            issuer: issuer.into(),
            ttl: Duration::from_secs(60 * 60),
        }
    }

    /// Set the session lifetime.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub(crate) fn signing_key_len(&self) -> usize {
        self.signing_key.len()
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        // Signing key intentionally empty: ConfigBuilder::build rejects it,
        // forcing every deployment to configure its own
        SessionConfig::new("", "keyway")
    }
}

// The signing key never appears in debug output
impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("signing_key_len", &self.signing_key.len())
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the identity's email address.
    pub sub: String,
    /// Issuer.
    pub iss: String,
    /// Expiration time (unix timestamp).
    pub exp: u64,
    /// Issued at (unix timestamp).
    pub iat: u64,
    /// Unique token identifier.
    pub jti: String,
}

/// An issued session credential.
#[derive(Debug, Clone, Serialize)]
pub struct SessionToken {
    /// Signed token asserting the identity binding.
    pub token: String,
    /// Seconds until expiry.
    pub expires_in: u64,
    /// Token type (always "Bearer").
    pub token_type: &'static str,
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct SessionIssuer {
    config: SessionConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionIssuer {
    /// Create a new session issuer with the given configuration.
    pub fn new(config: SessionConfig) -> Result<Self> {
        if config.signing_key.is_empty() {
            return Err(KeywayError::config("session signing key must not be empty"));
        }

        let encoding_key = EncodingKey::from_secret(&config.signing_key);
        let decoding_key = DecodingKey::from_secret(&config.signing_key);

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.clone()]);
        validation.validate_exp = true;
        // Zero leeway: expiry is exact
        validation.leeway = 0;

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        })
    }

    /// Issue a session token bound to a verified identity.
    pub fn issue(&self, identity: &Identity) -> Result<SessionToken> {
        self.issue_at(identity, current_timestamp())
    }

    /// Issue with a specific issuance timestamp (useful for testing expiry).
    pub fn issue_at(&self, identity: &Identity, issued_at: u64) -> Result<SessionToken> {
        let claims = SessionClaims {
            sub: identity.email.clone(),
            iss: self.config.issuer.clone(),
            exp: issued_at + self.config.ttl.as_secs(),
            iat: issued_at,
            jti: generate_jti(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| KeywayError::internal(format!("Failed to encode session token: {}", e)))?;

        Ok(SessionToken {
            token,
            expires_in: self.config.ttl.as_secs(),
            token_type: "Bearer",
        })
    }

    /// Verify a session token, returning its claims.
    ///
    /// Read-only: checks signature, issuer, and expiry. Fails with
    /// `TokenExpired` for a stale token and `TokenInvalid` for anything else.
    pub fn authenticate(&self, token: &str) -> Result<SessionClaims> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => KeywayError::TokenExpired,
                _ => KeywayError::token_invalid(e.to_string()),
            })
    }
}

// EncodingKey/DecodingKey carry the secret and have no Debug of their own
impl fmt::Debug for SessionIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionIssuer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn generate_jti() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
