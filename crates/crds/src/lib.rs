//! FrontApp CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the FrontApp controller.

pub mod front_app;

pub use front_app::*;
