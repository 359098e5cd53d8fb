//! Cluster client seam.
//!
//! The reconciler talks to the cluster only through `ClusterClient`, so
//! reconcile cycles can be exercised against an in-memory cluster in unit
//! tests. `KubeClusterClient` is the production implementation over
//! `kube::Api`.

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use kube::api::PostParams;
use kube::{Api, Client, Resource};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// Namespaced object the controller reads or writes.
pub trait ClusterObject:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + fmt::Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
}

impl<K> ClusterObject for K where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + fmt::Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static
{
}

/// `namespace/name` of a FrontApp, which is also the key of each of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    /// Namespace of the object
    pub namespace: String,
    /// Name of the object
    pub name: String,
}

impl ObjectKey {
    /// Creates a key from its parts.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Key of `obj`, if it carries both a name and a namespace.
    pub fn of<K: Resource>(obj: &K) -> Option<Self> {
        let meta = obj.meta();
        Some(Self::new(meta.namespace.clone()?, meta.name.clone()?))
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Get/create/replace operations the reconciler needs from the cluster.
///
/// A missing object is `Ok(None)` from `get`, never an error.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Error returned by the underlying client
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reads the object of kind `K` at `key`.
    async fn get<K: ClusterObject>(&self, key: &ObjectKey) -> Result<Option<K>, Self::Error>;

    /// Creates `obj` at `key`.
    async fn create<K: ClusterObject>(&self, key: &ObjectKey, obj: &K) -> Result<K, Self::Error>;

    /// Replaces the object at `key` with `obj`.
    async fn replace<K: ClusterObject>(&self, key: &ObjectKey, obj: &K) -> Result<K, Self::Error>;
}

/// `ClusterClient` backed by the Kubernetes API server.
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl fmt::Debug for KubeClusterClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeClusterClient").finish_non_exhaustive()
    }
}

impl KubeClusterClient {
    /// Creates a client over an existing Kubernetes connection.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api<K: ClusterObject>(&self, namespace: &str) -> Api<K> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    type Error = kube::Error;

    async fn get<K: ClusterObject>(&self, key: &ObjectKey) -> Result<Option<K>, Self::Error> {
        self.api::<K>(&key.namespace).get_opt(&key.name).await
    }

    async fn create<K: ClusterObject>(&self, key: &ObjectKey, obj: &K) -> Result<K, Self::Error> {
        self.api::<K>(&key.namespace)
            .create(&PostParams::default(), obj)
            .await
    }

    async fn replace<K: ClusterObject>(&self, key: &ObjectKey, obj: &K) -> Result<K, Self::Error> {
        self.api::<K>(&key.namespace)
            .replace(&key.name, &PostParams::default(), obj)
            .await
    }
}
