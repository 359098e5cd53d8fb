//! Controller-specific error types.
//!
//! Every failure of a reconcile cycle is surfaced to the runtime as one of
//! these variants; the runtime's error policy decides on the requeue.

use thiserror::Error;

/// Boxed source error from a cluster client implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur in the FrontApp Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// A child object could not be rendered from the FrontApp
    #[error("Failed to render {kind}: {reason}")]
    Render {
        /// Child kind being rendered
        kind: &'static str,
        /// What was wrong with the input
        reason: String,
    },

    /// The FrontApp could not be stamped as controlling owner of a child
    #[error("Failed to set owner reference on {kind} {key}: {reason}")]
    Ownership {
        /// Child kind being stamped
        kind: String,
        /// namespace/name of the child
        key: String,
        /// Why the owner reference was refused
        reason: String,
    },

    /// A get/create/update against the cluster failed
    #[error("Failed to {verb} {kind} {key}: {source}")]
    Cluster {
        /// Cluster verb that failed
        verb: &'static str,
        /// Kind of the object involved
        kind: String,
        /// namespace/name of the object involved
        key: String,
        /// Underlying client error
        #[source]
        source: BoxError,
    },

    /// Kubernetes client bootstrap error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// The cycle was cancelled before it finished
    #[error("Reconciliation cancelled")]
    Cancelled,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}

impl ControllerError {
    /// Whether the runtime should requeue the key after this error.
    ///
    /// Cancellation only happens on shutdown, so there is nothing to retry.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ControllerError::Cancelled)
    }
}
