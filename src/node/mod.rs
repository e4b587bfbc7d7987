//! Host plugin contract for the node graph runtime.
//!
//! A host discovers nodes through [`node_class_mappings`], reads each node's
//! [`NodeDefinition`] to build its UI, and invokes [`HostNode::execute`]
//! synchronously once per graph run.

mod error;
mod sora_video;
mod traits;

use std::collections::BTreeMap;

pub use error::NodeError;
pub use sora_video::{SoraVideoNode, DEFAULT_PROMPT, SORA_VIDEO_NODE_KEY, SORA_VIDEO_NODE_NAME};
pub use traits::{HostNode, InputSpec, InputType, InputValue, NodeDefinition, NodeInputs, OutputValue};

/// Nodes exported by this crate, keyed by class key.
pub fn node_class_mappings() -> BTreeMap<&'static str, Box<dyn HostNode>> {
    let mut nodes: BTreeMap<&'static str, Box<dyn HostNode>> = BTreeMap::new();
    nodes.insert(SORA_VIDEO_NODE_KEY, Box::new(SoraVideoNode::default()));
    nodes
}

/// Human-readable node names, keyed by class key.
pub fn node_display_name_mappings() -> BTreeMap<&'static str, &'static str> {
    node_class_mappings()
        .into_iter()
        .map(|(key, node)| (key, node.definition().display_name))
        .collect()
}
