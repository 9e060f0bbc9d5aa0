//! Request and response types for the transport boundary.

use crate::enrollment::CompletionAttempt;
use crate::totp::TotpSetup;
use serde::{Deserialize, Serialize};

/// Check whether an email is already enrolled.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckIdentityRequest {
    /// Email address to look up.
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckIdentityResponse {
    /// Whether a record exists for this email.
    pub exists: bool,
}

/// Start enrollment for a new email address.
#[derive(Debug, Clone, Deserialize)]
pub struct BeginEnrollmentRequest {
    /// Email address to enroll.
    pub email: String,
}

/// Provisioning material for the caller. Nothing is persisted yet; the
/// secret must be echoed back on the first verification.
#[derive(Debug, Clone, Serialize)]
pub struct BeginEnrollmentResponse {
    /// Base32-encoded TOTP secret (also the manual-entry code).
    pub secret: String,
    /// otpauth:// provisioning URI.
    pub uri: String,
    /// QR code as base64-encoded PNG.
    pub qr_code: String,
}

impl From<TotpSetup> for BeginEnrollmentResponse {
    fn from(setup: TotpSetup) -> Self {
        Self {
            secret: setup.secret,
            uri: setup.uri,
            qr_code: setup.qr_code_base64,
        }
    }
}

/// Submit a code, either for an enrolled identity or to complete a pending
/// enrollment (in which case `pending_secret` carries the echoed secret).
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteAuthenticationRequest {
    /// Email address being authenticated.
    pub email: String,
    /// Six-digit authenticator code.
    pub code: String,
    /// Present only for first-time enrollment completion.
    pub pending_secret: Option<String>,
}

impl CompleteAuthenticationRequest {
    /// Translate the wire shape into the coordinator's tagged union.
    pub fn attempt(&self) -> CompletionAttempt {
        match &self.pending_secret {
            Some(secret) => CompletionAttempt::NewIdentity {
                pending_secret: secret.clone(),
            },
            None => CompletionAttempt::Existing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_without_pending_secret_is_existing() {
        let req = CompleteAuthenticationRequest {
            email: "a@x.com".to_string(),
            code: "123456".to_string(),
            pending_secret: None,
        };
        assert!(matches!(req.attempt(), CompletionAttempt::Existing));
    }

    #[test]
    fn test_attempt_with_pending_secret_is_new_identity() {
        let req: CompleteAuthenticationRequest = serde_json::from_value(serde_json::json!({
            "email": "a@x.com",
            "code": "123456",
            "pending_secret": "JBSWY3DPEHPK3PXP",
        }))
        .unwrap();

        match req.attempt() {
            CompletionAttempt::NewIdentity { pending_secret } => {
                assert_eq!(pending_secret, "JBSWY3DPEHPK3PXP");
            }
            other => panic!("expected NewIdentity, got {:?}", other),
        }
    }
}
