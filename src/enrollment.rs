//! Enrollment and authentication coordination.
//!
//! Drives the identity state machine: an unknown email is offered enrollment
//! material, a known email is asked for a code, and a successful verification
//! in either case ends with a session token.
//!
//! Enrollment is deliberately two-step with no server-side pending state:
//! `begin_enrollment` returns the generated secret to the caller without
//! persisting anything, and the caller echoes it back on the first
//! `complete_authentication`. A record becomes durable only after that first
//! successful verification.

use crate::error::{KeywayError, Result};
use crate::identity::{Identity, IdentityStore, PublicIdentity};
use crate::session::{SessionIssuer, SessionToken};
use crate::totp::{TotpManager, TotpSetup};

/// How a caller is completing authentication.
///
/// Replaces branching on the presence of an optional secret parameter with
/// an explicit tagged union.
#[derive(Debug, Clone)]
pub enum CompletionAttempt {
    /// The identity is already enrolled; verify against the stored secret.
    Existing,
    /// First-time completion: verify against the pending secret the caller
    /// received from `begin_enrollment` and is echoing back.
    NewIdentity {
        /// Base32 secret returned by `begin_enrollment`.
        pending_secret: String,
    },
}

/// Orchestrates enrollment, verification, and session issuance.
///
/// All collaborators are injected at construction; there is no ambient
/// process state.
pub struct EnrollmentFlow<S: IdentityStore> {
    store: S,
    totp: TotpManager,
    sessions: SessionIssuer,
}

impl<S: IdentityStore> EnrollmentFlow<S> {
    pub fn new(store: S, totp: TotpManager, sessions: SessionIssuer) -> Self {
        Self {
            store,
            totp,
            sessions,
        }
    }

    /// Whether a record exists for this email. No mutation.
    pub async fn check_identity(&self, email: &str) -> Result<bool> {
        Ok(self.store.find(email).await?.is_some())
    }

    /// Start enrollment for a new email address.
    ///
    /// Returns provisioning material (secret, URI, QR code) without
    /// persisting anything. Fails with `AlreadyEnrolled` if a record exists.
    pub async fn begin_enrollment(&self, email: &str) -> Result<TotpSetup> {
        if self.store.find(email).await?.is_some() {
            return Err(KeywayError::AlreadyEnrolled);
        }

        let setup = self.totp.generate_setup(email.trim())?;
        tracing::info!(email = %Identity::storage_key(email), "enrollment started");
        Ok(setup)
    }

    /// Verify a code and mint a session token.
    ///
    /// For an existing identity the code is checked against the stored
    /// secret, flipping `verified` on first success. For a first-time
    /// completion the code is checked against the caller-held pending secret
    /// and the record is persisted with `verified = true`; a verification
    /// failure persists nothing. If two first-time completions race, the
    /// store's uniqueness constraint lets exactly one through and the loser
    /// observes `AlreadyEnrolled`.
    pub async fn complete_authentication(
        &self,
        email: &str,
        code: &str,
        attempt: CompletionAttempt,
    ) -> Result<SessionToken> {
        let code = code.trim();

        let identity = match attempt {
            CompletionAttempt::Existing => {
                let identity = self
                    .store
                    .find(email)
                    .await?
                    .ok_or(KeywayError::UnknownIdentity)?;

                if !self.totp.verify(&identity.secret, code, &identity.email)? {
                    tracing::debug!(email = %Identity::storage_key(email), "code rejected");
                    return Err(KeywayError::InvalidCode);
                }

                if !identity.verified {
                    self.store.mark_verified(email).await?;
                }
                identity
            }
            CompletionAttempt::NewIdentity { pending_secret } => {
                if !self.totp.verify(&pending_secret, code, email)? {
                    tracing::debug!(email = %Identity::storage_key(email), "code rejected");
                    return Err(KeywayError::InvalidCode);
                }

                let mut identity = Identity::new(email.trim(), pending_secret);
                identity.verified = true;

                match self.store.insert(identity.clone()).await {
                    Ok(()) => {}
                    Err(KeywayError::DuplicateIdentity) => {
                        // Lost the first-time completion race
                        return Err(KeywayError::AlreadyEnrolled);
                    }
                    Err(e) => return Err(e),
                }
                tracing::info!(email = %Identity::storage_key(email), "enrollment completed");
                identity
            }
        };

        self.sessions.issue(&identity)
    }

    /// Resolve a session token to its identity, secret stripped.
    pub async fn current_identity(&self, token: &str) -> Result<PublicIdentity> {
        let claims = self.sessions.authenticate(token)?;
        let identity = self
            .store
            .find(&claims.sub)
            .await?
            .ok_or(KeywayError::UnknownIdentity)?;
        Ok(identity.to_public())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::InMemoryIdentityStore;
    use crate::session::SessionConfig;
    use crate::totp::TotpConfig;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn flow() -> EnrollmentFlow<InMemoryIdentityStore> {
        EnrollmentFlow::new(
            InMemoryIdentityStore::new(),
            TotpManager::new(TotpConfig::new("TestApp")),
            SessionIssuer::new(SessionConfig::new(
                "test-signing-key-32-bytes-long!!",
                "keyway-test",
            ))
            .unwrap(),
        )
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    fn code_for(flow: &EnrollmentFlow<InMemoryIdentityStore>, secret: &str, email: &str) -> String {
        flow.totp.generate_at(secret, email, now()).unwrap()
    }

    #[tokio::test]
    async fn test_check_identity_unknown() {
        let flow = flow();
        assert!(!flow.check_identity("a@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_begin_enrollment_returns_material_without_persisting() {
        let flow = flow();
        let setup = flow.begin_enrollment("a@x.com").await.unwrap();

        assert!(setup.uri.starts_with("otpauth://totp/"));
        assert!(!flow.check_identity("a@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_first_time_completion_persists_verified_record() {
        let flow = flow();
        let setup = flow.begin_enrollment("a@x.com").await.unwrap();

        let code = code_for(&flow, &setup.secret, "a@x.com");
        let session = flow
            .complete_authentication(
                "a@x.com",
                &code,
                CompletionAttempt::NewIdentity {
                    pending_secret: setup.secret.clone(),
                },
            )
            .await
            .unwrap();

        assert!(!session.token.is_empty());
        let record = flow.store.find("a@x.com").await.unwrap().unwrap();
        assert!(record.verified);
        assert_eq!(record.secret, setup.secret);
    }

    #[tokio::test]
    async fn test_failed_first_time_completion_persists_nothing() {
        let flow = flow();
        let setup = flow.begin_enrollment("a@x.com").await.unwrap();

        let err = flow
            .complete_authentication(
                "a@x.com",
                "000000",
                CompletionAttempt::NewIdentity {
                    pending_secret: setup.secret,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, KeywayError::InvalidCode));
        assert!(!flow.check_identity("a@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_begin_enrollment_rejects_enrolled_email() {
        let flow = flow();
        let setup = flow.begin_enrollment("a@x.com").await.unwrap();
        let code = code_for(&flow, &setup.secret, "a@x.com");
        flow.complete_authentication(
            "a@x.com",
            &code,
            CompletionAttempt::NewIdentity {
                pending_secret: setup.secret,
            },
        )
        .await
        .unwrap();

        let err = flow.begin_enrollment("a@x.com").await.unwrap_err();
        assert!(matches!(err, KeywayError::AlreadyEnrolled));
    }

    #[tokio::test]
    async fn test_existing_completion_unknown_identity() {
        let flow = flow();
        let err = flow
            .complete_authentication("ghost@x.com", "123456", CompletionAttempt::Existing)
            .await
            .unwrap_err();
        assert!(matches!(err, KeywayError::UnknownIdentity));
    }

    #[tokio::test]
    async fn test_existing_completion_flips_verified_once() {
        let flow = flow();
        let setup = flow.totp.generate_setup("a@x.com").unwrap();
        flow.store
            .insert(Identity::new("a@x.com", setup.secret.clone()))
            .await
            .unwrap();

        let code = code_for(&flow, &setup.secret, "a@x.com");
        flow.complete_authentication("a@x.com", &code, CompletionAttempt::Existing)
            .await
            .unwrap();

        assert!(flow.store.find("a@x.com").await.unwrap().unwrap().verified);
    }

    #[tokio::test]
    async fn test_existing_completion_wrong_code() {
        let flow = flow();
        let setup = flow.totp.generate_setup("a@x.com").unwrap();
        flow.store
            .insert(Identity::new("a@x.com", setup.secret))
            .await
            .unwrap();

        let err = flow
            .complete_authentication("a@x.com", "000000", CompletionAttempt::Existing)
            .await
            .unwrap_err();
        assert!(matches!(err, KeywayError::InvalidCode));
    }

    #[tokio::test]
    async fn test_current_identity_round_trip() {
        let flow = flow();
        let setup = flow.begin_enrollment("a@x.com").await.unwrap();
        let code = code_for(&flow, &setup.secret, "a@x.com");
        let session = flow
            .complete_authentication(
                "a@x.com",
                &code,
                CompletionAttempt::NewIdentity {
                    pending_secret: setup.secret,
                },
            )
            .await
            .unwrap();

        let me = flow.current_identity(&session.token).await.unwrap();
        assert_eq!(me.email, "a@x.com");
        assert!(me.verified);
    }
}
