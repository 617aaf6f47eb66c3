//! Application configuration
//!
//! Centralized configuration management using the `config` crate. Settings
//! are loaded once at startup (defaults, then optional config files, then
//! environment variables) and injected into the components that need them —
//! no consumer reads the settings store directly.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    pub connection: ConnectionConfig,

    #[validate(nested)]
    pub lookup: LookupConfig,

    #[serde(default)]
    pub popup: PopupConfig,
}

/// Event bus connection configuration
///
/// The event channel is plaintext `ws://` in the reference deployment; the
/// upstream bus does not support TLS on this interface, and the client makes
/// no attempt to upgrade the URL. Known limitation.
#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ConnectionConfig {
    /// HTTP endpoint of the auth handshake
    #[serde(default)]
    #[validate(length(min = 1, message = "auth_url must not be empty"))]
    pub auth_url: String,

    /// Websocket endpoint of the event stream
    #[serde(default)]
    #[validate(length(min = 1, message = "event_url must not be empty"))]
    pub event_url: String,

    /// Account login
    #[serde(default)]
    #[validate(length(min = 1, message = "login must not be empty"))]
    pub login: String,

    /// Account password
    #[serde(default)]
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,

    /// Account realm
    #[serde(default)]
    #[validate(length(min = 1, message = "realm must not be empty"))]
    pub realm: String,

    /// Algorithm used for the credential hash sent during the handshake
    #[serde(default)]
    pub credential_hash_algorithm: HashAlgorithm,

    /// Initial reconnection delay in milliseconds
    #[serde(default = "default_reconnect_initial_delay")]
    pub reconnect_initial_delay_ms: u64,

    /// Maximum reconnection delay in milliseconds
    #[serde(default = "default_reconnect_max_delay")]
    pub reconnect_max_delay_ms: u64,
}

fn default_reconnect_initial_delay() -> u64 {
    1000
}

fn default_reconnect_max_delay() -> u64 {
    60000
}

impl ConnectionConfig {
    /// Credential hash sent in the auth handshake: `hash("login:password")`
    pub fn credential_digest(&self) -> String {
        self.credential_hash_algorithm
            .digest(&format!("{}:{}", self.login, self.password))
    }
}

/// Caller info service configuration
#[derive(Debug, Deserialize, Clone, Validate)]
pub struct LookupConfig {
    /// HTTP endpoint of the caller info service
    #[serde(default)]
    #[validate(length(min = 1, message = "info_url must not be empty"))]
    pub info_url: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_lookup_timeout")]
    pub timeout_ms: u64,
}

fn default_lookup_timeout() -> u64 {
    5000
}

/// Popup behavior configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PopupConfig {
    /// Close the popup as soon as the call hangs up
    #[serde(default = "default_close_on_hangup")]
    pub close_on_hangup: bool,

    /// Seconds after answer before an open popup is auto-dismissed
    #[serde(default = "default_dismiss_after")]
    pub dismiss_after_secs: u64,
}

fn default_close_on_hangup() -> bool {
    true
}

fn default_dismiss_after() -> u64 {
    15
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            close_on_hangup: true,
            dismiss_after_secs: 15,
        }
    }
}

/// Supported credential hash algorithms
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Md5,
    Sha256,
}

impl HashAlgorithm {
    /// Lowercase hex digest of `input`
    pub fn digest(&self, input: &str) -> String {
        match self {
            HashAlgorithm::Md5 => {
                use md5::{Digest, Md5};
                to_hex(&Md5::digest(input.as_bytes()))
            }
            HashAlgorithm::Sha256 => {
                use sha2::{Digest, Sha256};
                to_hex(&Sha256::digest(input.as_bytes()))
            }
        }
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

impl AppConfig {
    /// Load configuration from defaults, optional config files, and
    /// `INFORMER__`-prefixed environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("connection.credential_hash_algorithm", "md5")?
            .set_default("connection.reconnect_initial_delay_ms", 1000)?
            .set_default("connection.reconnect_max_delay_ms", 60000)?
            .set_default("lookup.timeout_ms", 5000)?
            .set_default("popup.close_on_hangup", true)?
            .set_default("popup.dismiss_after_secs", 15)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with INFORMER_ prefix
            .add_source(
                Environment::with_prefix("INFORMER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Check that every required field is present, before any connection
    /// is attempted; the error names the offending fields
    pub fn validate(&self) -> crate::AppResult<()> {
        Validate::validate(self).map_err(crate::AppError::from)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("INFORMER").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
