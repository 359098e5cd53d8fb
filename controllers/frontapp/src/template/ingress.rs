//! Ingress routing the public host to the Service.

use super::{ChildKind, HTTP_PORT, Identity};
use crate::error::ControllerError;
use crds::FrontApp;
use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
    IngressServiceBackend, IngressSpec, ServiceBackendPort,
};

/// Renders the Ingress of `app`: `host = url`, path `/` to the Service.
pub fn ingress(app: &FrontApp) -> Result<Ingress, ControllerError> {
    let id = Identity::of(app, ChildKind::Ingress)?;
    let path = HTTPIngressPath {
        path: Some("/".to_string()),
        path_type: "ImplementationSpecific".to_string(),
        backend: IngressBackend {
            service: Some(IngressServiceBackend {
                name: id.name.to_string(),
                port: Some(ServiceBackendPort {
                    number: Some(HTTP_PORT),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        },
    };
    Ok(Ingress {
        metadata: id.object_meta(),
        spec: Some(IngressSpec {
            rules: Some(vec![IngressRule {
                host: app.spec.url.clone(),
                http: Some(HTTPIngressRuleValue { paths: vec![path] }),
            }]),
            ..Default::default()
        }),
        ..Default::default()
    })
}
