use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{KeywayError, Result};
use crate::session::SessionConfig;
use crate::totp::TotpConfig;
use crate::utils::get_env_with_prefix;

/// Main configuration for a Keyway service.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub totp: TotpConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            totp: TotpConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServerConfig {
    pub fn addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Builder for Config with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    pub fn with_totp(mut self, totp: TotpConfig) -> Self {
        self.config.totp = totp;
        self
    }

    pub fn with_signing_key(mut self, key: impl Into<String>) -> Self {
        let issuer = self.config.session.issuer.clone();
        let ttl = self.config.session.ttl;
        self.config.session = SessionConfig::new(key, issuer).ttl(ttl);
        self
    }

    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.config.session = session;
        self
    }

    /// Load configuration from environment variables with KEYWAY_ prefix
    pub fn from_env(mut self) -> Self {
        if let Some(host) = get_env_with_prefix("HOST") {
            self.config.server.host = host;
        }
        // Check KEYWAY_PORT first, fall back to PORT (for Railway/Heroku compatibility)
        if let Some(port) = get_env_with_prefix("PORT") {
            if let Ok(p) = port.parse() {
                self.config.server.port = p;
            }
        }
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = get_env_with_prefix("LOG_JSON") {
            self.config.logging.json = json.parse().unwrap_or(false);
        }

        if let Some(issuer) = get_env_with_prefix("TOTP_ISSUER") {
            self.config.totp.issuer = issuer;
        }
        if let Some(skew) = get_env_with_prefix("TOTP_SKEW") {
            if let Ok(s) = skew.parse() {
                self.config.totp.skew = s;
            }
        }

        let session_issuer = get_env_with_prefix("SESSION_ISSUER")
            .unwrap_or_else(|| self.config.session.issuer.clone());
        let ttl = get_env_with_prefix("SESSION_TTL_SECONDS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(self.config.session.ttl);
        if let Some(key) = get_env_with_prefix("SESSION_SIGNING_KEY") {
            self.config.session = SessionConfig::new(key, session_issuer).ttl(ttl);
        } else {
            self.config.session.issuer = session_issuer;
            self.config.session.ttl = ttl;
        }

        self
    }

    /// Build the configuration, validating all settings
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration is invalid:
    /// - Invalid server address (host:port) or zero port
    /// - Unknown log level
    /// - TOTP settings incompatible with authenticator apps
    /// - Missing or too-short session signing key
    pub fn build(self) -> Result<Config> {
        self.config.server.addr().map_err(|e| {
            KeywayError::config(format!(
                "Invalid server address {}:{} - {}",
                self.config.server.host, self.config.server.port, e
            ))
        })?;

        if self.config.server.port == 0 {
            return Err(KeywayError::config("Server port must be greater than 0"));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.config.logging.level.to_lowercase().as_str()) {
            return Err(KeywayError::config(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.config.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        // The provisioning URI format is fixed by authenticator-app interop
        if self.config.totp.digits != 6 {
            return Err(KeywayError::config(
                "TOTP codes must be 6 digits for authenticator-app compatibility",
            ));
        }
        if self.config.totp.step == 0 {
            return Err(KeywayError::config("TOTP step must be greater than 0"));
        }

        if self.config.session.signing_key_len() < 32 {
            return Err(KeywayError::config(
                "Session signing key must be at least 32 bytes",
            ));
        }
        if self.config.session.ttl.is_zero() {
            return Err(KeywayError::config(
                "Session TTL must be greater than 0",
            ));
        }

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
