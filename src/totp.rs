//! TOTP (Time-based One-Time Password) secret generation and verification.
//!
//! Covers both halves of the second factor: generating a fresh shared secret
//! with its `otpauth://` provisioning URI, and checking candidate codes
//! against a secret within a bounded clock-skew window.

use crate::error::{KeywayError, Result};
use totp_rs::{Algorithm, Secret, TOTP};

/// Configuration for TOTP generation and verification.
#[derive(Debug, Clone)]
pub struct TotpConfig {
    /// Issuer name shown in authenticator apps (e.g., "MyApp").
    pub issuer: String,
    /// Number of digits in the code (default: 6).
    pub digits: usize,
    /// Time step in seconds (default: 30).
    pub step: u64,
    /// Accepted clock-skew window in steps on either side of now (default: 1,
    /// i.e. the previous, current, and next 30-second step all verify).
    pub skew: u8,
    /// Algorithm (default: SHA1 for authenticator-app compatibility).
    pub algorithm: Algorithm,
}

impl Default for TotpConfig {
    fn default() -> Self {
        Self {
            issuer: "Keyway".to_string(),
            digits: 6,
            step: 30,
            skew: 1,
            algorithm: Algorithm::SHA1,
        }
    }
}

impl TotpConfig {
    /// Create a new TOTP config with the given issuer name.
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            ..Default::default()
        }
    }

    /// Set the skew window in time steps.
    pub fn skew(mut self, skew: u8) -> Self {
        self.skew = skew;
        self
    }

    /// Set the time step in seconds.
    pub fn step(mut self, step: u64) -> Self {
        self.step = step;
        self
    }
}

/// Provisioning material returned when setting up TOTP for an identity.
///
/// Nothing is persisted at this point; the caller echoes the secret back on
/// the first verification.
#[derive(Debug)]
pub struct TotpSetup {
    /// Base32-encoded secret (160 bits of OS randomness).
    pub secret: String,
    /// Provisioning URI (otpauth://totp/...) for authenticator apps.
    pub uri: String,
    /// QR code as base64-encoded PNG (for embedding in img src).
    pub qr_code_base64: String,
}

/// Generates enrollment secrets and verifies time-stepped codes.
#[derive(Clone)]
pub struct TotpManager {
    config: TotpConfig,
}

impl TotpManager {
    /// Create a new TOTP manager with the given configuration.
    pub fn new(config: TotpConfig) -> Self {
        Self { config }
    }

    /// Generate provisioning material for a new enrollment.
    ///
    /// Pure generation: the secret comes from the OS CSPRNG and nothing is
    /// stored. Returns the base32 secret, URI, and QR code for scanning.
    pub fn generate_setup(&self, account_name: &str) -> Result<TotpSetup> {
        let secret = Secret::generate_secret();
        let secret_base32 = secret.to_encoded().to_string();

        let totp = self.build_totp(&secret_base32, account_name)?;
        let uri = totp.get_url();

        let qr_code = totp
            .get_qr_base64()
            .map_err(|e| KeywayError::internal(format!("Failed to generate QR code: {}", e)))?;

        Ok(TotpSetup {
            secret: secret_base32,
            uri,
            qr_code_base64: qr_code,
        })
    }

    /// Verify a candidate code against a stored secret at the current time.
    ///
    /// Candidates that are not exactly six ASCII digits are rejected before
    /// any HMAC is computed. Code comparison within the skew window is
    /// constant-time.
    pub fn verify(&self, secret: &str, code: &str, account_name: &str) -> Result<bool> {
        if !self.is_candidate_shape(code) {
            return Ok(false);
        }

        let totp = self.build_totp(secret, account_name)?;

        match totp.check_current(code) {
            Ok(valid) => Ok(valid),
            Err(e) => {
                tracing::warn!(error = %e, "TOTP verification error (system time issue?)");
                // Return false rather than error - we don't want to leak
                // information about why verification failed
                Ok(false)
            }
        }
    }

    /// Verify against a specific unix timestamp (useful for testing skew).
    pub fn verify_at(
        &self,
        secret: &str,
        code: &str,
        account_name: &str,
        time: u64,
    ) -> Result<bool> {
        if !self.is_candidate_shape(code) {
            return Ok(false);
        }
        let totp = self.build_totp(secret, account_name)?;
        Ok(totp.check(code, time))
    }

    /// Generate the code for a specific unix timestamp (useful for testing).
    #[cfg(test)]
    pub fn generate_at(&self, secret: &str, account_name: &str, time: u64) -> Result<String> {
        let totp = self.build_totp(secret, account_name)?;
        Ok(totp.generate(time))
    }

    fn is_candidate_shape(&self, code: &str) -> bool {
        code.len() == self.config.digits && code.bytes().all(|b| b.is_ascii_digit())
    }

    fn build_totp(&self, secret: &str, account_name: &str) -> Result<TOTP> {
        if secret.is_empty() {
            return Err(KeywayError::invalid_secret("secret must not be empty"));
        }

        let secret_bytes = Secret::Encoded(secret.to_string())
            .to_bytes()
            .map_err(|e| KeywayError::invalid_secret(format!("not valid base32: {:?}", e)))?;

        TOTP::new(
            self.config.algorithm,
            self.config.digits,
            self.config.skew,
            self.config.step,
            secret_bytes,
            Some(self.config.issuer.clone()),
            account_name.to_string(),
        )
        .map_err(|e| KeywayError::invalid_secret(format!("{:?}", e)))
    }
}
