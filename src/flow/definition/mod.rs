// SPDX-License-Identifier: MIT

//! Flow definitions: the nodes and links a run walks over

mod loader;
mod types;

pub use loader::FlowLoader;
pub use types::{FlowDefinition, LinkDefinition, LinkId, LinkType, NodeDefinition};
