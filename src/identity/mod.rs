//! Identity records and the store boundary.
//!
//! An [`Identity`] is the durable record behind an enrolled email address.
//! It is constructed in memory during enrollment and only persisted after
//! the first successful code verification.

mod memory;
mod store;

pub use memory::InMemoryIdentityStore;
pub use store::IdentityStore;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A durable identity record.
///
/// Invariants, enforced by the enrollment flow and the store:
/// - `email` is unique across all records (case-insensitive).
/// - `secret` is generated once and never rotated.
/// - `verified` transitions false to true exactly once and never reverts.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Email address as originally entered (display value).
    pub email: String,
    /// Base32-encoded TOTP secret. Immutable after persistence.
    pub secret: String,
    /// Whether a code has ever been successfully verified for this record.
    pub verified: bool,
    /// Set when the record is first persisted.
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Create an unverified in-memory record. Not persisted by construction.
    pub fn new(email: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            secret: secret.into(),
            verified: false,
            created_at: Utc::now(),
        }
    }

    /// Storage key for an email address: lowercased and trimmed.
    ///
    /// The original-case email stays on the record as the display value.
    pub fn storage_key(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Secret-less projection safe to return over the transport.
    pub fn to_public(&self) -> PublicIdentity {
        PublicIdentity {
            email: self.email.clone(),
            verified: self.verified,
            created_at: self.created_at,
        }
    }
}

/// An identity with the TOTP secret stripped.
#[derive(Debug, Clone, Serialize)]
pub struct PublicIdentity {
    pub email: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}
