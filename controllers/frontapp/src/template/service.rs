//! ClusterIP Service in front of the Deployment.

use super::{ChildKind, HTTP_PORT, Identity};
use crate::error::ControllerError;
use crds::FrontApp;
use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

/// Renders the Service of `app`.
pub fn service(app: &FrontApp) -> Result<Service, ControllerError> {
    let id = Identity::of(app, ChildKind::Service)?;
    Ok(Service {
        metadata: id.object_meta(),
        spec: Some(ServiceSpec {
            ports: Some(vec![ServicePort {
                name: Some(id.name.to_string()),
                port: HTTP_PORT,
                protocol: Some("TCP".to_string()),
                target_port: Some(IntOrString::Int(HTTP_PORT)),
                ..Default::default()
            }]),
            selector: Some(id.app_labels()),
            session_affinity: Some("None".to_string()),
            type_: Some("ClusterIP".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    })
}
