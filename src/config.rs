//! Configuration management for Bond.
//!
//! Settings come from the process environment, optionally seeded from env
//! files at startup:
//!
//! 1. `default.env` is loaded without overriding variables already set.
//! 2. `.env` is loaded on top, overriding everything (including the process
//!    environment).
//! 3. Values are then read through [`resolve`], which strips surrounding
//!    double quotes and normalizes boolean spellings.
//!
//! # Environment Variables
//!
//! - `PORT` - Port to listen on (default: 8080)
//! - `SSL` - Serve HTTPS using `certificate.pem` / `key.pem` (default: false)
//! - `SECRET` - Shared secret every image request must present (required)
//! - `MAX_SIZE` - Largest accepted image size in pixels (required)
//! - `RECOVERY_LEVEL` - LOW, MEDIUM, HIGH or HIGHEST (required)
//! - `ENABLE_LOGS` - Log every request (default: false)
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use bond::config::ServiceConfig;
//!
//! let env = HashMap::from([
//!     ("SECRET", "abc123"),
//!     ("MAX_SIZE", "500"),
//!     ("RECOVERY_LEVEL", "high"),
//!     ("SSL", "\"off\""),
//! ]);
//!
//! let config = ServiceConfig::from_lookup(|key| env.get(key).map(|v| v.to_string())).unwrap();
//! assert_eq!(config.max_size, 500);
//! assert!(!config.ssl);
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::qr::RecoveryLevel;

// =============================================================================
// Default Values
// =============================================================================

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Env file loaded first, never overriding existing variables.
pub const DEFAULT_ENV_FILE: &str = "default.env";

/// Env file loaded last, overriding everything.
pub const LOCAL_ENV_FILE: &str = ".env";

/// TLS certificate chain used when `SSL` is enabled.
pub const TLS_CERT_FILE: &str = "certificate.pem";

/// TLS private key used when `SSL` is enabled.
pub const TLS_KEY_FILE: &str = "key.pem";

/// Normalized form of a truthy setting.
pub const TRUE: &str = "TRUE";

/// Normalized form of a falsy setting.
pub const FALSE: &str = "FALSE";

// =============================================================================
// CLI Arguments
// =============================================================================

/// Bond - QR codes over HTTP.
///
/// Without arguments, starts the server. All settings are read from the
/// environment (see `default.env` and `.env`).
#[derive(Parser, Debug, Clone)]
#[command(name = "bond")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Probe the /health endpoint of a server running on this host and exit.
    ///
    /// Exits with 0 and prints OK when the server answers 200, exits with 1
    /// otherwise.
    #[arg(long)]
    pub healthcheck: bool,
}

/// What the binary has been asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server
    Serve,
    /// Probe a running server and exit
    Healthcheck,
}

impl Cli {
    /// Convert parsed arguments into the command to run.
    pub fn into_command(self) -> Command {
        if self.healthcheck {
            Command::Healthcheck
        } else {
            Command::Serve
        }
    }
}

// =============================================================================
// Env Files
// =============================================================================

/// Outcome of [`load_env_files`], kept so it can be logged once tracing is up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFiles {
    /// Path of the loaded `default.env`, if any
    pub defaults: Option<PathBuf>,

    /// Path of the loaded `.env`, if any
    pub local: Option<PathBuf>,
}

impl EnvFiles {
    /// Report which files were loaded.
    ///
    /// A missing `.env` is reported at INFO level; the process environment is
    /// used as-is.
    pub fn log(&self) {
        match &self.defaults {
            Some(path) => debug!("Loaded defaults from {}", path.display()),
            None => debug!("No {} loaded", DEFAULT_ENV_FILE),
        }

        match &self.local {
            Some(path) => info!("Loaded settings from {}", path.display()),
            None => info!("No .env file provided, continuing with system environment"),
        }
    }
}

/// Load `default.env`, then `.env` with override semantics, from the working
/// directory.
///
/// Neither file is required. Nothing is logged here, so the files can be
/// read before the subscriber (and its `RUST_LOG` filter) is set up; call
/// [`EnvFiles::log`] afterwards.
pub fn load_env_files() -> EnvFiles {
    load_env_files_from(Path::new("."))
}

/// Load `default.env` and `.env` from `dir`.
pub fn load_env_files_from(dir: &Path) -> EnvFiles {
    EnvFiles {
        defaults: dotenvy::from_path(dir.join(DEFAULT_ENV_FILE))
            .ok()
            .map(|()| dir.join(DEFAULT_ENV_FILE)),
        local: dotenvy::from_path_override(dir.join(LOCAL_ENV_FILE))
            .ok()
            .map(|()| dir.join(LOCAL_ENV_FILE)),
    }
}

// =============================================================================
// Value Resolution
// =============================================================================

/// Look up `key` and normalize its value.
///
/// - Unset keys yield `fallback`, untouched.
/// - Set values lose any surrounding `"` characters.
/// - `0`, `off`, `false` (any case) become [`FALSE`]; `1`, `on`, `true`
///   become [`TRUE`]. Anything else passes through.
pub fn resolve<F>(lookup: &F, key: &str, fallback: Option<&str>) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return fallback.map(str::to_string);
    };

    let value = raw.trim_matches('"');

    let normalized = match value.to_ascii_lowercase().as_str() {
        "0" | "off" | "false" => FALSE,
        "1" | "on" | "true" => TRUE,
        _ => value,
    };

    Some(normalized.to_string())
}

/// Resolve a boolean setting; only the normalized [`TRUE`] counts as set.
pub fn resolve_flag<F>(lookup: &F, key: &str, fallback: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let fallback = if fallback { TRUE } else { FALSE };
    resolve(lookup, key, Some(fallback)).as_deref() == Some(TRUE)
}

/// Process environment lookup used outside of tests.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn resolve_port<F>(lookup: &F) -> Result<u16, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let default = DEFAULT_PORT.to_string();
    let value = resolve(lookup, "PORT", Some(default.as_str())).unwrap_or(default);

    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConfigError::InvalidPort { value }),
    }
}

// =============================================================================
// Service Configuration
// =============================================================================

/// Everything the server needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Port to listen on
    pub port: u16,

    /// Serve HTTPS instead of HTTP
    pub ssl: bool,

    /// Shared secret required on every image request
    pub secret: String,

    /// Largest accepted `size` (inclusive)
    pub max_size: u32,

    /// Error-correction level for every rendered code
    pub recovery_level: RecoveryLevel,

    /// Log every request
    pub enable_logs: bool,
}

impl ServiceConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(process_env)
    }

    /// Read the configuration through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = resolve_port(&lookup)?;
        let ssl = resolve_flag(&lookup, "SSL", false);
        let enable_logs = resolve_flag(&lookup, "ENABLE_LOGS", false);

        let secret =
            resolve(&lookup, "SECRET", None).ok_or(ConfigError::Missing { key: "SECRET" })?;

        let max_size = resolve(&lookup, "MAX_SIZE", None)
            .ok_or(ConfigError::Missing { key: "MAX_SIZE" })?;
        let max_size = match max_size.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => return Err(ConfigError::InvalidMaxSize { value: max_size }),
        };

        let recovery_level = resolve(&lookup, "RECOVERY_LEVEL", None).ok_or(
            ConfigError::Missing {
                key: "RECOVERY_LEVEL",
            },
        )?;
        let recovery_level = recovery_level
            .parse::<RecoveryLevel>()
            .map_err(|e| ConfigError::InvalidRecoveryLevel { value: e.0 })?;

        Ok(Self {
            port,
            ssl,
            secret,
            max_size,
            recovery_level,
            enable_logs,
        })
    }

    /// Validate settings that parse fine but cannot be served safely.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        Ok(())
    }

    /// Get the server bind address, listening on all interfaces.
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// URL scheme the server answers on.
    pub fn scheme(&self) -> &'static str {
        if self.ssl {
            "https"
        } else {
            "http"
        }
    }
}

// =============================================================================
// Healthcheck Configuration
// =============================================================================

/// The subset of settings the self-check needs to reach the local server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthcheckConfig {
    /// Port the local server listens on
    pub port: u16,

    /// Whether the local server speaks HTTPS
    pub ssl: bool,
}

impl HealthcheckConfig {
    /// Read the probe settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(process_env)
    }

    /// Read the probe settings through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            port: resolve_port(&lookup)?,
            ssl: resolve_flag(&lookup, "SSL", false),
        })
    }

    /// Health endpoint of the server on this host.
    pub fn url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{}://localhost:{}/health", scheme, self.port)
    }
}

// =============================================================================
// Tests
// =============================================================================
