//! Child object rendering.
//!
//! Every FrontApp implies four children named after it and living in its
//! namespace: a ConfigMap holding the Caddyfile, a Deployment running the
//! front-end image, a ClusterIP Service in front of it and an Ingress
//! routing the public host to the Service.
//!
//! Children are built as typed `k8s-openapi` objects. The YAML files under
//! `skeletons/` describe the same objects field for field and are kept as a
//! readable reference; the tests decode them and compare against the builders.

mod caddyfile;
mod config_map;
mod deployment;
mod ingress;
mod service;

pub use caddyfile::caddyfile;
pub use config_map::{CADDYFILE_KEY, config_map};
pub use deployment::deployment;
pub use ingress::ingress;
pub use service::service;

use crate::error::ControllerError;
use crds::FrontApp;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;
use std::fmt;

/// Port served by the Caddy container, the Service and the Ingress backend.
pub const HTTP_PORT: i32 = 80;

/// The child kinds managed per FrontApp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildKind {
    /// Caddy configuration document
    ConfigMap,
    /// Stateless workload running the front-end image
    Deployment,
    /// Cluster-internal endpoint
    Service,
    /// External HTTP route
    Ingress,
}

impl ChildKind {
    /// Order in which children are reconciled within one cycle.
    ///
    /// The Deployment mounts the ConfigMap, so the ConfigMap goes first;
    /// Service and Ingress only route to the pods.
    pub const RECONCILE_ORDER: [ChildKind; 4] = [
        ChildKind::ConfigMap,
        ChildKind::Deployment,
        ChildKind::Service,
        ChildKind::Ingress,
    ];

    /// Kubernetes kind name.
    pub fn as_str(self) -> &'static str {
        match self {
            ChildKind::ConfigMap => "ConfigMap",
            ChildKind::Deployment => "Deployment",
            ChildKind::Service => "Service",
            ChildKind::Ingress => "Ingress",
        }
    }
}

impl fmt::Display for ChildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name and namespace shared by a FrontApp and all of its children.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Identity<'a> {
    pub(crate) name: &'a str,
    pub(crate) namespace: &'a str,
}

impl<'a> Identity<'a> {
    /// Reads the identity of `app`, failing if it is not fully named.
    pub(crate) fn of(app: &'a FrontApp, kind: ChildKind) -> Result<Self, ControllerError> {
        let name = app
            .metadata
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ControllerError::Render {
                kind: kind.as_str(),
                reason: "FrontApp has no name".to_string(),
            })?;
        let namespace = app
            .metadata
            .namespace
            .as_deref()
            .filter(|namespace| !namespace.is_empty())
            .ok_or_else(|| ControllerError::Render {
                kind: kind.as_str(),
                reason: format!("FrontApp {} has no namespace", name),
            })?;
        Ok(Self { name, namespace })
    }

    /// Metadata of a child: same name, same namespace, nothing else.
    pub(crate) fn object_meta(&self) -> ObjectMeta {
        ObjectMeta {
            name: Some(self.name.to_string()),
            namespace: Some(self.namespace.to_string()),
            ..Default::default()
        }
    }

    /// `app: <name>` selector labels.
    pub(crate) fn app_labels(&self) -> BTreeMap<String, String> {
        BTreeMap::from([("app".to_string(), self.name.to_string())])
    }
}
