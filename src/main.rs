//! Bond - QR codes over HTTP.
//!
//! This binary either runs the HTTP server or, with `--healthcheck`, probes
//! a server already running on this host.

use std::net::SocketAddr;
use std::process::ExitCode;

use axum_server::Handle;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bond::{
    config::{self, Cli, Command, HealthcheckConfig, ServiceConfig},
    healthcheck,
    qr::PngQrEncoder,
    server::{self, create_router, load_rustls_config, RouterConfig},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve => run_serve().await,
        Command::Healthcheck => run_healthcheck().await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve() -> ExitCode {
    // Before init_logging: the env files may set RUST_LOG
    let env_files = config::load_env_files();
    init_logging();
    env_files.log();

    let config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Bond v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Protocol: {}", config.scheme());
    info!("  Max size: {}px", config.max_size);
    info!("  Recovery level: {}", config.recovery_level);
    info!(
        "  Request logs: {}",
        if config.enable_logs { "enabled" } else { "disabled" }
    );

    let tls = if config.ssl {
        match load_rustls_config(config::TLS_CERT_FILE, config::TLS_KEY_FILE) {
            Ok(tls) => Some(tls),
            Err(e) => {
                error!("Failed to load TLS certificate: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        None
    };

    let router = create_router(PngQrEncoder::new(), build_router_config(&config));

    let addr: SocketAddr = match config.bind_address().parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid bind address {}: {}", config.bind_address(), e);
            return ExitCode::FAILURE;
        }
    };

    info!("Server starting on port {}", config.port);

    if let Err(e) = server::serve(router, addr, tls, Handle::new()).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bond=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the service configuration.
fn build_router_config(config: &ServiceConfig) -> RouterConfig {
    RouterConfig::new(config.secret.clone(), config.max_size, config.recovery_level)
        .with_tracing(config.enable_logs)
}

// =============================================================================
// Healthcheck Command
// =============================================================================

async fn run_healthcheck() -> ExitCode {
    config::load_env_files();

    let config = match HealthcheckConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Health check failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match healthcheck::probe(&config).await {
        Ok(()) => {
            println!("OK");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Health check failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
