//! Test utilities for unit testing the renderer and reconciler
//!
//! This module provides helpers for creating test data and setting up test scenarios.

use crds::{FrontApp, FrontAppSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Helper to create a test FrontApp CRD with a UID, as if read from the API server
pub fn create_test_front_app(
    name: &str,
    namespace: &str,
    image: &str,
    reverse_proxy: &str,
    url: &str,
) -> FrontApp {
    FrontApp {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            uid: Some(format!("uid-{}-{}", namespace, name)),
            ..Default::default()
        },
        spec: FrontAppSpec {
            image: Some(image.to_string()),
            reverse_proxy: Some(reverse_proxy.to_string()),
            url: Some(url.to_string()),
        },
        status: None,
    }
}

/// The `demo` FrontApp in `default` used across the scenario tests
pub fn demo_front_app() -> FrontApp {
    create_test_front_app("demo", "default", "nginx:alpine", "www.example.com", "www.demo.com")
}
