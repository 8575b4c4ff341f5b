// SPDX-License-Identifier: MIT

//! Flow loader - YAML file loading and parsing
//!
//! JSON documents are valid YAML, so both formats load through the same path.

use super::types::FlowDefinition;
use crate::error::DefinitionError;
use std::fs;
use std::path::Path;

/// Loads flow definitions from YAML or JSON files
pub struct FlowLoader;

impl FlowLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load and validate a flow definition from a file
    pub fn load_flow<P: AsRef<Path>>(&self, path: P) -> Result<FlowDefinition, DefinitionError> {
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Parse and validate a flow definition from a YAML string
    pub fn parse_yaml(content: &str) -> Result<FlowDefinition, DefinitionError> {
        let def: FlowDefinition = serde_yaml::from_str(content)?;
        def.validate()?;
        log::debug!(
            "Loaded flow '{}': {} nodes, {} links",
            def.name,
            def.nodes.len(),
            def.links.len()
        );
        Ok(def)
    }
}

impl Default for FlowLoader {
    fn default() -> Self {
        Self::new()
    }
}
