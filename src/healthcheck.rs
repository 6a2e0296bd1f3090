//! Self-check against a server running on the same host.
//!
//! `bond --healthcheck` asks an already running `bond` for `/health` and turns
//! the answer into an exit code, so container orchestrators can probe the
//! service with the binary they already ship.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;

use crate::config::HealthcheckConfig;
use crate::error::HealthcheckError;

/// How long the probe waits for the whole request.
pub const HEALTHCHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Probe the local server's health endpoint once.
///
/// Succeeds only on `200 OK`. The server certificate is not verified: the
/// probe always targets `localhost`, which production certificates rarely
/// name.
pub async fn probe(config: &HealthcheckConfig) -> Result<(), HealthcheckError> {
    probe_url(&config.url()).await
}

/// Probe an explicit health URL once.
pub async fn probe_url(url: &str) -> Result<(), HealthcheckError> {
    let client = reqwest::Client::builder()
        .timeout(HEALTHCHECK_TIMEOUT)
        .danger_accept_invalid_certs(true)
        .build()?;

    debug!("Probing {}", url);
    let response = client.get(url).send().await?;

    match response.status() {
        StatusCode::OK => Ok(()),
        status => Err(HealthcheckError::Status(status.as_u16())),
    }
}
