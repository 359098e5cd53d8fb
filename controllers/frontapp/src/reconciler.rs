//! Reconciliation logic for FrontApp CRDs.
//!
//! A cycle reads the FrontApp, renders its four children and, in a fixed
//! order, creates each missing child or updates it when its significant
//! field drifted. The first error ends the cycle; retries are left to the
//! runtime's error policy.

use crate::client::{ClusterClient, ClusterObject, ObjectKey};
use crate::differ::{self, SignificantField};
use crate::error::ControllerError;
use crate::template::{self, ChildKind};
use crds::FrontApp;
use kube::Resource;
use kube_runtime::controller::Action;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// What a cycle did to one child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildOutcome {
    /// The child did not exist and was created
    Created,
    /// The child's significant field drifted and it was replaced
    Updated,
    /// The child matched, nothing was written
    Unchanged,
}

/// Reconciles FrontApp resources.
///
/// Holds no state besides the client; everything lives in the cluster.
#[derive(Debug)]
pub struct Reconciler<C> {
    client: C,
}

impl<C: ClusterClient> Reconciler<C> {
    /// Creates a new reconciler instance.
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Runs one reconcile cycle for the FrontApp at `key`.
    ///
    /// A missing FrontApp is not an error: its children carry owner
    /// references and are removed by the garbage collector.
    pub async fn reconcile(
        &self,
        key: &ObjectKey,
        cancel: &CancellationToken,
    ) -> Result<Action, ControllerError> {
        let primary_kind = FrontApp::kind(&());
        let primary = self.client.get::<FrontApp>(key);
        let Some(app) = call(cancel, "get", &primary_kind, key, primary).await? else {
            debug!("FrontApp {} not found, nothing to reconcile", key);
            return Ok(Action::await_change());
        };

        info!("Reconciling FrontApp {}", key);

        for kind in ChildKind::RECONCILE_ORDER {
            let outcome = match kind {
                ChildKind::ConfigMap => {
                    let desired = template::config_map(&app)?;
                    self.reconcile_child(&app, key, desired, differ::CONFIG_MAP, cancel).await?
                }
                ChildKind::Deployment => {
                    let desired = template::deployment(&app)?;
                    self.reconcile_child(&app, key, desired, differ::DEPLOYMENT, cancel).await?
                }
                ChildKind::Service => {
                    let desired = template::service(&app)?;
                    self.reconcile_child(&app, key, desired, differ::SERVICE, cancel).await?
                }
                ChildKind::Ingress => {
                    let desired = template::ingress(&app)?;
                    self.reconcile_child(&app, key, desired, differ::INGRESS, cancel).await?
                }
            };
            debug!("{} {}: {:?}", kind, key, outcome);
        }

        Ok(Action::await_change())
    }

    /// Creates `desired` if the child is missing, or replaces it if `field`
    /// drifted. Kinds without a significant field are only ever created.
    ///
    /// A live child without our controller reference is adopted with one
    /// update that only touches its owner references. A live child
    /// controlled by someone else is refused.
    pub async fn reconcile_child<K: ClusterObject>(
        &self,
        owner: &FrontApp,
        key: &ObjectKey,
        mut desired: K,
        field: Option<SignificantField<K>>,
        cancel: &CancellationToken,
    ) -> Result<ChildOutcome, ControllerError> {
        let kind = K::kind(&());

        let live = call(cancel, "get", &kind, key, self.client.get::<K>(key)).await?;
        let Some(live) = live else {
            set_controller_reference(owner, &mut desired, &kind, key)?;
            info!("Creating {} {}", kind, key);
            call(cancel, "create", &kind, key, self.client.create(key, &desired)).await?;
            return Ok(ChildOutcome::Created);
        };

        let mut adopted = live.clone();
        set_controller_reference(owner, &mut adopted, &kind, key)?;
        let adopting = adopted.meta().owner_references != live.meta().owner_references;
        let drifted = differ::needs_update(field.as_ref(), &live, &desired);

        let update = match (drifted, &field) {
            (true, Some(field)) => {
                info!("Updating {} {}: {} changed", kind, key, field.path);
                let meta = desired.meta_mut();
                meta.owner_references = adopted.meta().owner_references.clone();
                meta.resource_version = live.meta().resource_version.clone();
                desired
            }
            _ if adopting => {
                info!("Adopting {} {}", kind, key);
                adopted
            }
            _ => return Ok(ChildOutcome::Unchanged),
        };
        call(cancel, "update", &kind, key, self.client.replace(key, &update)).await?;
        Ok(ChildOutcome::Updated)
    }
}

/// Awaits a cluster call unless `cancel` fires first.
async fn call<T, E>(
    cancel: &CancellationToken,
    verb: &'static str,
    kind: &str,
    key: &ObjectKey,
    request: impl Future<Output = Result<T, E>>,
) -> Result<T, ControllerError>
where
    E: std::error::Error + Send + Sync + 'static,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ControllerError::Cancelled),
        result = request => result.map_err(|source| ControllerError::Cluster {
            verb,
            kind: kind.to_string(),
            key: key.to_string(),
            source: Box::new(source),
        }),
    }
}

/// Stamps `owner` as the controlling owner of `child`.
///
/// The garbage collector deletes the child once the FrontApp is gone.
fn set_controller_reference<K: Resource>(
    owner: &FrontApp,
    child: &mut K,
    kind: &str,
    key: &ObjectKey,
) -> Result<(), ControllerError> {
    let refused = |reason: String| ControllerError::Ownership {
        kind: kind.to_string(),
        key: key.to_string(),
        reason,
    };
    let mut owner_ref = owner
        .controller_owner_ref(&())
        .ok_or_else(|| refused("FrontApp has no uid yet".to_string()))?;
    owner_ref.block_owner_deletion = Some(true);
    if owner.meta().namespace != child.meta().namespace {
        return Err(refused("cross-namespace owner references are disallowed".to_string()));
    }
    let refs = child.meta_mut().owner_references.get_or_insert_with(Vec::new);
    if let Some(other) = refs
        .iter()
        .find(|r| r.controller == Some(true) && r.uid != owner_ref.uid)
    {
        return Err(refused(format!("already controlled by {} {}", other.kind, other.name)));
    }
    refs.retain(|r| r.uid != owner_ref.uid);
    refs.push(owner_ref);
    Ok(())
}

#[cfg(test)]
#[path = "reconciler_test.rs"]
mod tests;
