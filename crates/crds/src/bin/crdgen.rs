//! Prints the FrontApp CustomResourceDefinition as YAML.
//!
//! Installation: `cargo run --bin crdgen | kubectl apply -f -`

use crds::FrontApp;
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    let crd = FrontApp::crd();
    print!("{}", serde_yaml::to_string(&crd)?);
    Ok(())
}
