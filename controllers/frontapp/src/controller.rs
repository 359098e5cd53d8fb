//! Main controller implementation.
//!
//! This module contains the `Controller` struct that connects to the
//! cluster, checks that the FrontApp CRD is installed, and runs the
//! watcher until a termination signal arrives.

use crate::config::Config;
use crate::error::ControllerError;
use crate::watcher;
use crds::FrontApp;
use kube::Client;
use kube::api::ListParams;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Main controller for FrontApp management.
pub struct Controller {
    client: Client,
    config: Config,
    cancel: CancellationToken,
}

impl Controller {
    /// Creates a new controller instance.
    pub async fn new(config: Config) -> Result<Self, ControllerError> {
        info!("Initializing FrontApp Controller");

        let client = Client::try_default().await?;

        // Fail fast when the CRD is missing instead of watching forever
        let front_apps = config.api::<FrontApp>(client.clone());
        if let Err(e) = front_apps.list(&ListParams::default().limit(1)).await {
            error!("FrontApp CRD is not queryable: {}", e);
            info!("Installation: cargo run --bin crdgen | kubectl apply -f -");
            return Err(ControllerError::Watch(format!("FrontApp CRD is not queryable: {}", e)));
        }

        Ok(Self {
            client,
            config,
            cancel: CancellationToken::new(),
        })
    }

    /// Runs the controller until shutdown.
    pub async fn run(self) -> Result<(), ControllerError> {
        info!("FrontApp Controller running");

        let signals = tokio::spawn(cancel_on_signal(self.cancel.clone()));
        let result = watcher::run(self.client, &self.config, self.cancel.clone()).await;
        signals.abort();

        result
    }
}

/// Cancels `cancel` on SIGINT or SIGTERM.
async fn cancel_on_signal(cancel: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!("Failed to listen for Ctrl-C: {}", e);
                return;
            }
            info!("Received SIGINT, shutting down");
        }
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
    cancel.cancel();
}
