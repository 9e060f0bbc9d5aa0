//! Keyway - email + TOTP second-factor authentication
//!
//! Keyway authenticates users by email identification plus a Time-based
//! One-Time Password second factor, issuing a signed session token on
//! success. It is built on Axum and Tokio with pluggable identity storage.
//!
//! # Features
//!
//! - **Enrollment**: random 160-bit secrets with `otpauth://` URIs and QR codes
//! - **Verification**: 30-second time steps with a bounded clock-skew window
//! - **Sessions**: HS256-signed tokens with a fixed 1-hour expiry
//! - **Storage**: `IdentityStore` trait with an in-memory implementation
//! - **Transport**: axum router exposing the four auth operations
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use keyway::{
//!     ConfigBuilder, EnrollmentFlow, InMemoryIdentityStore, SessionIssuer, TotpManager,
//! };
//!
//! #[tokio::main]
//! async fn main() -> keyway::Result<()> {
//!     keyway::init_tracing();
//!
//!     let config = ConfigBuilder::new().from_env().build()?;
//!     let flow = Arc::new(EnrollmentFlow::new(
//!         InMemoryIdentityStore::new(),
//!         TotpManager::new(config.totp.clone()),
//!         SessionIssuer::new(config.session.clone())?,
//!     ));
//!
//!     let router = keyway::http::router(flow);
//!     let listener = tokio::net::TcpListener::bind(config.server.addr().unwrap())
//!         .await
//!         .unwrap();
//!     axum::serve(listener, router).await.unwrap();
//!     Ok(())
//! }
//! ```

mod config;
pub mod enrollment;
mod error;
pub mod http;
pub mod identity;
pub mod session;
pub mod totp;
pub mod utils;

// Re-exports for public API
pub use config::{Config, ConfigBuilder, LoggingConfig, ServerConfig};
pub use enrollment::{CompletionAttempt, EnrollmentFlow};
pub use error::{KeywayError, Result};
pub use identity::{Identity, IdentityStore, InMemoryIdentityStore, PublicIdentity};
pub use session::{SessionClaims, SessionConfig, SessionIssuer, SessionToken};
pub use totp::{TotpConfig, TotpManager, TotpSetup};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// This should be called early in your application, typically in main().
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "keyway=debug")
/// - `KEYWAY_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = std::env::var("KEYWAY_LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Initialize tracing from a built [`Config`], applying its logging section.
///
/// Unlike [`init_tracing`], the level and JSON toggle come from
/// `config.logging` rather than environment variables, so deployments that
/// load everything through [`ConfigBuilder`] get one source of truth.
pub fn init_tracing_with_config(config: &Config) {
    let env_filter = EnvFilter::new(&config.logging.level);

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
