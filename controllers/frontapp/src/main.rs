//! FrontApp Controller
//!
//! Materializes a Caddy-served front-end from a single `FrontApp` intent.
//!
//! For every FrontApp this controller keeps four children in place: a
//! ConfigMap with the Caddyfile, a Deployment running the image, a
//! ClusterIP Service and an Ingress for the public host.

mod backoff;
mod client;
mod config;
mod controller;
mod differ;
mod error;
mod reconciler;
mod template;
mod watcher;

#[cfg(test)]
mod mock;
#[cfg(test)]
mod test_utils;

use crate::config::Config;
use crate::error::ControllerError;
use controller::Controller;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Process-wide crypto provider for kube's rustls client
    let _ = rustls::crypto::ring::default_provider().install_default();

    info!("Starting FrontApp Controller");

    let config = Config::from_env()?;

    info!("Configuration:");
    info!("  Namespace: {}", config.namespace.as_deref().unwrap_or("all namespaces"));
    info!("  Concurrency: {}", config.concurrency);
    info!("  Debounce: {:?}", config.debounce);

    // Initialize and run controller
    let controller = Controller::new(config).await?;
    controller.run().await?;

    info!("FrontApp Controller stopped");
    Ok(())
}
