//! In-memory `ClusterClient` for unit testing
//!
//! Objects are stored as JSON keyed by kind and `namespace/name`. Every
//! create and replace is recorded so tests can assert on the exact writes a
//! reconcile cycle performed. Failures can be injected per verb and kind.

use crate::client::{ClusterClient, ClusterObject, ObjectKey};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Error returned by the mock cluster
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MockError {
    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("conflict on {0}: resourceVersion is stale")]
    Conflict(String),

    #[error("injected failure: {0}")]
    Injected(String),
}

/// Cluster verbs recorded by the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Create,
    Replace,
}

/// One write performed against the mock cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Write {
    pub verb: Verb,
    pub kind: String,
    pub key: ObjectKey,
}

impl Write {
    pub fn new(verb: Verb, kind: &str, key: &ObjectKey) -> Self {
        Self { verb, kind: kind.to_string(), key: key.clone() }
    }
}

type StoreKey = (String, ObjectKey);

/// Mock cluster for testing
#[derive(Debug, Clone, Default)]
pub struct MockClusterClient {
    objects: Arc<Mutex<BTreeMap<StoreKey, serde_json::Value>>>,
    writes: Arc<Mutex<Vec<Write>>>,
    failures: Arc<Mutex<HashMap<(Verb, String), MockError>>>,
    next_resource_version: Arc<Mutex<u64>>,
    cancel_hooks: Arc<Mutex<Vec<(Verb, String, CancellationToken)>>>,
}

fn kind_of<K: ClusterObject>() -> String {
    K::kind(&()).to_string()
}

impl MockClusterClient {
    /// Create an empty mock cluster
    pub fn new() -> Self {
        Self::default()
    }

    fn bump_resource_version(&self) -> String {
        let mut next = self.next_resource_version.lock().unwrap();
        *next += 1;
        next.to_string()
    }

    fn injected(&self, verb: Verb, kind: &str) -> Result<(), MockError> {
        match self.failures.lock().unwrap().get(&(verb, kind.to_string())) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn store<K: ClusterObject>(&self, key: &ObjectKey, obj: &K) -> K {
        let mut stored = obj.clone();
        stored.meta_mut().resource_version = Some(self.bump_resource_version());
        let value = serde_json::to_value(&stored).unwrap();
        self.objects.lock().unwrap().insert((kind_of::<K>(), key.clone()), value);
        stored
    }

    /// Add an object to the mock store without recording a write (for test setup)
    pub fn insert<K: ClusterObject>(&self, obj: &K) -> K {
        let key = ObjectKey::of(obj).unwrap();
        self.store(&key, obj)
    }

    /// Read an object from the mock store without going through the client
    pub fn fetch<K: ClusterObject>(&self, key: &ObjectKey) -> Option<K> {
        self.objects
            .lock()
            .unwrap()
            .get(&(kind_of::<K>(), key.clone()))
            .map(|value| serde_json::from_value(value.clone()).unwrap())
    }

    /// Remove an object from the mock store, as an out-of-band delete would
    pub fn remove<K: ClusterObject>(&self, key: &ObjectKey) {
        self.objects.lock().unwrap().remove(&(kind_of::<K>(), key.clone()));
    }

    /// Number of objects of kind `K` in the store
    pub fn count<K: ClusterObject>(&self) -> usize {
        let kind = kind_of::<K>();
        self.objects.lock().unwrap().keys().filter(|(k, _)| *k == kind).count()
    }

    /// Make every `verb` on `kind` fail with `error`
    pub fn fail_on(&self, verb: Verb, kind: &str, error: MockError) {
        self.failures.lock().unwrap().insert((verb, kind.to_string()), error);
    }

    /// Stop failing injected verbs
    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    /// Cancel `token` right after a successful `verb` on `kind`
    pub fn cancel_after(&self, verb: Verb, kind: &str, token: &CancellationToken) {
        self.cancel_hooks.lock().unwrap().push((verb, kind.to_string(), token.clone()));
    }

    fn record(&self, verb: Verb, kind: &str, key: &ObjectKey) {
        self.writes.lock().unwrap().push(Write::new(verb, kind, key));
        for (hook_verb, hook_kind, token) in self.cancel_hooks.lock().unwrap().iter() {
            if *hook_verb == verb && hook_kind == kind {
                token.cancel();
            }
        }
    }

    /// Writes recorded so far, in order
    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }

    /// Forget the recorded writes
    pub fn clear_writes(&self) {
        self.writes.lock().unwrap().clear();
    }
}

#[async_trait]
impl ClusterClient for MockClusterClient {
    type Error = MockError;

    async fn get<K: ClusterObject>(&self, key: &ObjectKey) -> Result<Option<K>, Self::Error> {
        self.injected(Verb::Get, &kind_of::<K>())?;
        Ok(self.fetch(key))
    }

    async fn create<K: ClusterObject>(&self, key: &ObjectKey, obj: &K) -> Result<K, Self::Error> {
        let kind = kind_of::<K>();
        self.injected(Verb::Create, &kind)?;
        if self.fetch::<K>(key).is_some() {
            return Err(MockError::AlreadyExists(format!("{} {}", kind, key)));
        }
        let stored = self.store(key, obj);
        self.record(Verb::Create, &kind, key);
        Ok(stored)
    }

    async fn replace<K: ClusterObject>(&self, key: &ObjectKey, obj: &K) -> Result<K, Self::Error> {
        let kind = kind_of::<K>();
        self.injected(Verb::Replace, &kind)?;
        let Some(live) = self.fetch::<K>(key) else {
            return Err(MockError::NotFound(format!("{} {}", kind, key)));
        };
        if let Some(version) = &obj.meta().resource_version {
            if live.meta().resource_version.as_ref() != Some(version) {
                return Err(MockError::Conflict(format!("{} {}", kind, key)));
            }
        }
        let stored = self.store(key, obj);
        self.record(Verb::Replace, &kind, key);
        Ok(stored)
    }
}
