//! Deployment running the front-end image behind Caddy.

use super::{ChildKind, HTTP_PORT, Identity};
use crate::error::ControllerError;
use crds::FrontApp;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    ConfigMapVolumeSource, Container, ContainerPort, PodSpec, PodTemplateSpec,
    ResourceRequirements, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use std::collections::BTreeMap;

const CADDY_VOLUME: &str = "caddy";
const CADDY_CONFIG_DIR: &str = "/etc/caddy";

/// Renders the Deployment of `app`.
///
/// One replica, one container on port 80 with the ConfigMap mounted
/// read-only at `/etc/caddy`.
pub fn deployment(app: &FrontApp) -> Result<Deployment, ControllerError> {
    let id = Identity::of(app, ChildKind::Deployment)?;
    let container = Container {
        name: id.name.to_string(),
        image: app.spec.image.clone(),
        ports: Some(vec![ContainerPort {
            container_port: HTTP_PORT,
            protocol: Some("TCP".to_string()),
            ..Default::default()
        }]),
        volume_mounts: Some(vec![VolumeMount {
            name: CADDY_VOLUME.to_string(),
            mount_path: CADDY_CONFIG_DIR.to_string(),
            read_only: Some(true),
            ..Default::default()
        }]),
        resources: Some(resources()),
        ..Default::default()
    };
    Ok(Deployment {
        metadata: id.object_meta(),
        spec: Some(DeploymentSpec {
            replicas: Some(1),
            selector: LabelSelector {
                match_labels: Some(id.app_labels()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(id.app_labels()),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![container],
                    volumes: Some(vec![Volume {
                        name: CADDY_VOLUME.to_string(),
                        config_map: Some(ConfigMapVolumeSource {
                            name: id.name.to_string().into(),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }]),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    })
}

fn resources() -> ResourceRequirements {
    let quantities = |memory: &str, cpu: &str| {
        BTreeMap::from([
            ("memory".to_string(), Quantity(memory.to_string())),
            ("cpu".to_string(), Quantity(cpu.to_string())),
        ])
    };
    ResourceRequirements {
        requests: Some(quantities("128Mi", "100m")),
        limits: Some(quantities("1Gi", "1")),
        ..Default::default()
    }
}
