//! Controller configuration.
//!
//! Read once from environment variables at startup.

use crate::error::ControllerError;
use k8s_openapi::NamespaceResourceScope;
use kube::{Api, Client, Resource};
use std::env;
use std::time::Duration;

/// Namespace to watch; all namespaces when unset
pub const WATCH_NAMESPACE: &str = "WATCH_NAMESPACE";
/// Maximum number of FrontApps reconciled in parallel
pub const RECONCILE_CONCURRENCY: &str = "RECONCILE_CONCURRENCY";
/// Seconds to wait after the last event before reconciling
pub const RECONCILE_DEBOUNCE_SECS: &str = "RECONCILE_DEBOUNCE_SECS";

const DEFAULT_CONCURRENCY: u16 = 4;
const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(1);

/// Runtime settings of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Namespace to watch, `None` for the whole cluster
    pub namespace: Option<String>,
    /// Parallel reconciles across distinct keys
    pub concurrency: u16,
    /// Event debounce window
    pub debounce: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: None,
            concurrency: DEFAULT_CONCURRENCY,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl Config {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ControllerError> {
        let defaults = Self::default();
        let namespace = lookup(WATCH_NAMESPACE).filter(|ns| !ns.trim().is_empty());
        let concurrency = match lookup(RECONCILE_CONCURRENCY) {
            Some(raw) => match raw.trim().parse::<u16>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ControllerError::InvalidConfig(format!(
                        "{} must be a positive integer, got {:?}",
                        RECONCILE_CONCURRENCY, raw
                    )));
                }
            },
            None => defaults.concurrency,
        };
        let debounce = match lookup(RECONCILE_DEBOUNCE_SECS) {
            Some(raw) => raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|e| {
                ControllerError::InvalidConfig(format!(
                    "{} must be a number of seconds, got {:?}: {}",
                    RECONCILE_DEBOUNCE_SECS, raw, e
                ))
            })?,
            None => defaults.debounce,
        };
        Ok(Self {
            namespace,
            concurrency,
            debounce,
        })
    }

    /// API handle for `K`, scoped to the watched namespace.
    pub fn api<K>(&self, client: Client) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        match &self.namespace {
            Some(namespace) => Api::namespaced(client, namespace),
            None => Api::all(client),
        }
    }
}
