//! Registration with the controller runtime.
//!
//! FrontApps are the primary kind; ConfigMaps, Deployments, Services and
//! Ingresses owned by a FrontApp are watched as children, so any change or
//! deletion of a child requeues its owner. Delete events of FrontApps are
//! dropped before they reach the queue: the garbage collector removes the
//! children through their owner references.
//!
//! Per-key serialization, queue coalescing and debounce are provided by
//! `kube_runtime::Controller`.

use crate::backoff::{BackoffTracker, FibonacciBackoff};
use crate::client::{KubeClusterClient, ObjectKey};
use crate::config::Config;
use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crds::FrontApp;
use futures::{StreamExt, TryStreamExt, future};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Service};
use k8s_openapi::api::networking::v1::Ingress;
use kube::Client;
use kube_runtime::controller::{Action, Config as ControllerConfig};
use kube_runtime::{Controller, WatchStreamExt, reflector, watcher};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Shared state handed to every reconcile invocation.
#[derive(Debug)]
pub struct Context {
    reconciler: Reconciler<KubeClusterClient>,
    backoff: BackoffTracker,
    cancel: CancellationToken,
}

impl Context {
    /// Creates the context for a controller run.
    pub fn new(client: Client, cancel: CancellationToken) -> Self {
        Self {
            reconciler: Reconciler::new(KubeClusterClient::new(client)),
            backoff: BackoffTracker::new(FibonacciBackoff::default()),
            cancel,
        }
    }
}

/// Whether a FrontApp watch event should trigger a reconcile.
///
/// Deletes are dropped; child deletes are not filtered.
pub fn keep_primary_event(event: &watcher::Event<FrontApp>) -> bool {
    !matches!(event, watcher::Event::Delete(_))
}

/// Registers the FrontApp controller and runs it until `cancel` fires.
pub async fn run(
    client: Client,
    config: &Config,
    cancel: CancellationToken,
) -> Result<(), ControllerError> {
    let front_apps = config.api::<FrontApp>(client.clone());

    let (reader, writer) = reflector::store();
    let primary = watcher(front_apps, watcher::Config::default())
        .default_backoff()
        .reflect(writer)
        .try_filter(|event| future::ready(keep_primary_event(event)))
        .touched_objects();

    let controller_config = ControllerConfig::default()
        .debounce(config.debounce)
        .concurrency(config.concurrency);

    let ctx = Arc::new(Context::new(client.clone(), cancel.clone()));

    info!("Starting FrontApp watcher");
    Controller::for_stream(primary, reader)
        .owns(config.api::<ConfigMap>(client.clone()), watcher::Config::default())
        .owns(config.api::<Deployment>(client.clone()), watcher::Config::default())
        .owns(config.api::<Service>(client.clone()), watcher::Config::default())
        .owns(config.api::<Ingress>(client), watcher::Config::default())
        .with_config(controller_config)
        .graceful_shutdown_on(cancel.cancelled_owned())
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((obj, _)) => debug!("Reconciled FrontApp {}", obj),
                Err(e) => warn!("FrontApp controller error: {}", e),
            }
        })
        .await;
    info!("FrontApp watcher stopped");

    Ok(())
}

async fn reconcile(app: Arc<FrontApp>, ctx: Arc<Context>) -> Result<Action, ControllerError> {
    let key = ObjectKey::of(app.as_ref()).ok_or_else(|| {
        ControllerError::Watch("FrontApp event without name or namespace".to_string())
    })?;
    let action = ctx.reconciler.reconcile(&key, &ctx.cancel).await?;
    ctx.backoff.reset(&key.to_string());
    Ok(action)
}

fn error_policy(app: Arc<FrontApp>, error: &ControllerError, ctx: Arc<Context>) -> Action {
    let key = ObjectKey::of(app.as_ref())
        .map_or_else(|| "<unknown>".to_string(), |key| key.to_string());
    if !error.is_retryable() {
        info!("Reconciliation of FrontApp {} stopped: {}", key, error);
        return Action::await_change();
    }
    let delay = ctx.backoff.next_delay(&key);
    warn!("Reconciliation of FrontApp {} failed: {}; retrying in {:?}", key, error, delay);
    Action::requeue(delay)
}
