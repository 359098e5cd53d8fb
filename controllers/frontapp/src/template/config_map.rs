//! ConfigMap holding the Caddyfile.

use super::{ChildKind, Identity, caddyfile};
use crate::error::ControllerError;
use crds::FrontApp;
use k8s_openapi::api::core::v1::ConfigMap;
use std::collections::BTreeMap;

/// Data key the Caddy image reads its configuration from.
pub const CADDYFILE_KEY: &str = "Caddyfile";

/// Renders the ConfigMap of `app`.
pub fn config_map(app: &FrontApp) -> Result<ConfigMap, ControllerError> {
    let id = Identity::of(app, ChildKind::ConfigMap)?;
    Ok(ConfigMap {
        metadata: id.object_meta(),
        data: Some(BTreeMap::from([(
            CADDYFILE_KEY.to_string(),
            caddyfile(app.spec.reverse_proxy()),
        )])),
        ..Default::default()
    })
}
