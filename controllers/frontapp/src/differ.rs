//! Child drift detection.
//!
//! Each child kind has at most one significant field. A live child is
//! updated only when that field differs byte-for-byte from the rendered
//! one; labels added by other controllers, server-defaulted fields and
//! resource versions are ignored. The table below is the full set of
//! fields this controller propagates from the FrontApp spec.

use crate::template::CADDYFILE_KEY;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Service};
use k8s_openapi::api::networking::v1::Ingress;
use std::fmt;

/// The field of a child kind whose drift triggers an update.
pub struct SignificantField<K> {
    /// Human-readable path of the field, for logs
    pub path: &'static str,
    /// Reads the field, `None` when it is absent
    pub extract: fn(&K) -> Option<&str>,
}

impl<K> fmt::Debug for SignificantField<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignificantField").field("path", &self.path).finish()
    }
}

impl<K> SignificantField<K> {
    /// Whether `live` and `desired` disagree on this field.
    ///
    /// An absent field compares equal to an empty one.
    pub fn differs(&self, live: &K, desired: &K) -> bool {
        (self.extract)(live).unwrap_or_default() != (self.extract)(desired).unwrap_or_default()
    }
}

/// Whether a live child must be updated to match the desired one.
///
/// Kinds without a significant field are never updated after creation.
pub fn needs_update<K>(field: Option<&SignificantField<K>>, live: &K, desired: &K) -> bool {
    field.is_some_and(|field| field.differs(live, desired))
}

/// ConfigMap: `data["Caddyfile"]`
pub const CONFIG_MAP: Option<SignificantField<ConfigMap>> = Some(SignificantField {
    path: "data[\"Caddyfile\"]",
    extract: caddyfile,
});

/// Deployment: image of the first container
pub const DEPLOYMENT: Option<SignificantField<Deployment>> = Some(SignificantField {
    path: "spec.template.spec.containers[0].image",
    extract: first_container_image,
});

/// Service: nothing in the FrontApp spec affects it
pub const SERVICE: Option<SignificantField<Service>> = None;

/// Ingress: host of the first rule
pub const INGRESS: Option<SignificantField<Ingress>> = Some(SignificantField {
    path: "spec.rules[0].host",
    extract: first_rule_host,
});

fn caddyfile(cm: &ConfigMap) -> Option<&str> {
    cm.data.as_ref()?.get(CADDYFILE_KEY).map(String::as_str)
}

fn first_container_image(deploy: &Deployment) -> Option<&str> {
    deploy
        .spec
        .as_ref()?
        .template
        .spec
        .as_ref()?
        .containers
        .first()?
        .image
        .as_deref()
}

fn first_rule_host(ingress: &Ingress) -> Option<&str> {
    ingress.spec.as_ref()?.rules.as_ref()?.first()?.host.as_deref()
}
