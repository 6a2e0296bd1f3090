use thiserror::Error;

/// Errors raised while resolving configuration at startup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required setting is not present in the environment
    #[error("Missing required setting {key}")]
    Missing { key: &'static str },

    /// PORT is not a valid TCP port number
    #[error("Invalid PORT: {value:?} (expected 1-65535)")]
    InvalidPort { value: String },

    /// MAX_SIZE is not a positive integer
    #[error("Invalid MAX_SIZE: {value:?} (expected a positive integer)")]
    InvalidMaxSize { value: String },

    /// RECOVERY_LEVEL does not name a known level
    #[error("Invalid RECOVERY_LEVEL: {value:?} (expected LOW, MEDIUM, HIGH or HIGHEST)")]
    InvalidRecoveryLevel { value: String },

    /// SECRET is set but empty
    #[error("SECRET must not be empty")]
    EmptySecret,
}

/// Errors produced while rendering a QR code image
#[derive(Debug, Clone, Error)]
pub enum EncodeError {
    /// The content cannot be represented as a QR symbol (usually too long)
    #[error("QR symbol error: {0}")]
    Symbol(String),

    /// Rasterizing or PNG encoding failed
    #[error("Image encoding error: {0}")]
    Image(String),
}

/// Errors raised while loading the TLS certificate and key
#[derive(Debug, Error)]
pub enum TlsError {
    /// Certificate or key file could not be read
    #[error("Couldn't access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The certificate file contains no certificate
    #[error("No certificate found in {0}")]
    NoCertificate(String),

    /// The key file contains no private key
    #[error("No private key found in {0}")]
    NoPrivateKey(String),

    /// rustls rejected the certificate/key pair
    #[error("Invalid TLS configuration: {0}")]
    Rustls(#[from] rustls::Error),
}

/// Failures of the self-check probe
#[derive(Debug, Error)]
pub enum HealthcheckError {
    /// The request never produced a response (refused, timed out, TLS failure)
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with something other than 200
    #[error("status {0}")]
    Status(u16),
}
