//! FrontApp CRD
//!
//! Declares a front-end application served by Caddy: the image to run, the
//! public host it is exposed on, and the upstream API address that `/api/*`
//! requests are proxied to.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// API group of the FrontApp kind.
pub const GROUP: &str = "frontier.demo.com";

/// Served version of the FrontApp kind.
pub const VERSION: &str = "v1";

#[derive(CustomResource, Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[kube(
    group = "frontier.demo.com",
    version = "v1",
    kind = "FrontApp",
    namespaced,
    status = "FrontAppStatus",
    shortname = "fa"
)]
#[serde(rename_all = "camelCase")]
pub struct FrontAppSpec {
    /// Container image serving the front-end assets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Upstream API address for the Caddyfile `reverse_proxy` directive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse_proxy: Option<String>,

    /// Public host name of the front app
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Observed state of a FrontApp.
///
/// Reserved; the controller does not write status yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FrontAppStatus {}

impl FrontAppSpec {
    /// Image reference, empty when unset.
    pub fn image(&self) -> &str {
        self.image.as_deref().unwrap_or_default()
    }

    /// Upstream API address, empty when unset.
    pub fn reverse_proxy(&self) -> &str {
        self.reverse_proxy.as_deref().unwrap_or_default()
    }

    /// Public host name, empty when unset.
    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::{CustomResourceExt, Resource};
    use serde_json::json;

    #[test]
    fn test_spec_uses_camel_case_and_omits_unset_fields() {
        let spec = FrontAppSpec {
            image: Some("nginx:alpine".to_string()),
            reverse_proxy: Some("www.example.com".to_string()),
            url: None,
        };
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value, json!({"image": "nginx:alpine", "reverseProxy": "www.example.com"}));
    }

    #[test]
    fn test_spec_fields_are_optional() {
        let spec: FrontAppSpec = serde_json::from_value(json!({})).unwrap();
        assert_eq!(spec, FrontAppSpec::default());
        assert_eq!(spec.image(), "");
        assert_eq!(spec.reverse_proxy(), "");
        assert_eq!(spec.url(), "");
    }

    #[test]
    fn test_kind_metadata() {
        assert_eq!(FrontApp::kind(&()), "FrontApp");
        assert_eq!(FrontApp::group(&()), GROUP);
        assert_eq!(FrontApp::version(&()), VERSION);
        assert_eq!(FrontApp::api_version(&()), "frontier.demo.com/v1");
        assert_eq!(FrontApp::plural(&()), "frontapps");
    }

    #[test]
    fn test_sample_manifest_decodes() {
        let app: FrontApp =
            serde_yaml::from_str(include_str!("../../../config/samples/frontapp.yaml")).unwrap();
        assert_eq!(app.metadata.name.as_deref(), Some("demo"));
        assert_eq!(app.spec.image(), "nginx:alpine");
        assert_eq!(app.spec.reverse_proxy(), "www.example.com");
        assert_eq!(app.spec.url(), "www.demo.com");
    }

    #[test]
    fn test_crd_is_namespaced_with_status_subresource() {
        let crd = FrontApp::crd();
        assert_eq!(crd.metadata.name.as_deref(), Some("frontapps.frontier.demo.com"));
        assert_eq!(crd.spec.scope, "Namespaced");
        let version = &crd.spec.versions[0];
        assert!(version.subresources.as_ref().and_then(|s| s.status.as_ref()).is_some());
    }
}
