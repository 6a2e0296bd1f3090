//! TLS setup for HTTPS serving.
//!
//! When `SSL` is enabled the server reads a PEM certificate chain and private
//! key from fixed paths (`certificate.pem` and `key.pem` in the working
//! directory) and serves through rustls with the ring provider.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tracing::debug;

use crate::error::TlsError;

/// Build a rustls server configuration from PEM files.
///
/// # Errors
///
/// - [`TlsError::Io`] if either file cannot be read
/// - [`TlsError::NoCertificate`] / [`TlsError::NoPrivateKey`] if a file holds
///   no usable PEM block
/// - [`TlsError::Rustls`] if the key does not fit the certificate
pub fn load_server_config(
    cert_path: impl AsRef<Path>,
    key_path: impl AsRef<Path>,
) -> Result<rustls::ServerConfig, TlsError> {
    let cert_path = cert_path.as_ref();
    let key_path = key_path.as_ref();

    let cert_chain = read_certificates(cert_path)?;
    let private_key = read_private_key(key_path)?;

    debug!(
        certificates = cert_chain.len(),
        "Loaded TLS certificate chain from {}",
        cert_path.display()
    );

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let mut config = rustls::ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_single_cert(cert_chain, private_key)?;

    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(config)
}

/// Load the certificate and key into a config `axum-server` can serve with.
pub fn load_rustls_config(
    cert_path: impl AsRef<Path>,
    key_path: impl AsRef<Path>,
) -> Result<RustlsConfig, TlsError> {
    let config = load_server_config(cert_path, key_path)?;
    Ok(RustlsConfig::from_config(Arc::new(config)))
}

fn open(path: &Path) -> Result<BufReader<File>, TlsError> {
    let file = File::open(path).map_err(|source| TlsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(BufReader::new(file))
}

fn read_certificates(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let mut reader = open(path)?;

    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Io {
            path: path.display().to_string(),
            source,
        })?;

    if certs.is_empty() {
        return Err(TlsError::NoCertificate(path.display().to_string()));
    }

    Ok(certs)
}

fn read_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, TlsError> {
    let mut reader = open(path)?;

    rustls_pemfile::private_key(&mut reader)
        .map_err(|source| TlsError::Io {
            path: path.display().to_string(),
            source,
        })?
        .ok_or_else(|| TlsError::NoPrivateKey(path.display().to_string()))
}

// =============================================================================
// Tests
// =============================================================================
