// SPDX-License-Identifier: MIT

//! Flow definition types
//!
//! A flow is a set of nodes joined by links. Expression links carry the
//! text that decides whether they fire.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::DefinitionError;

/// Identity of a link within one flow definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct LinkId(pub u32);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for LinkId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A flow definition
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct FlowDefinition {
    /// Name of the flow
    pub name: String,
    /// Description of the flow
    #[serde(default)]
    pub description: String,
    /// Nodes in the graph
    #[serde(default)]
    pub nodes: Vec<NodeDefinition>,
    /// Links between nodes
    #[serde(default)]
    pub links: Vec<LinkDefinition>,
}

/// A node in the flow graph
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeDefinition {
    /// Unique identifier for this node
    pub id: String,
    #[serde(default)]
    pub description: String,
}

/// A directed link between two nodes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinkDefinition {
    pub id: LinkId,
    pub from: String,
    pub to: String,
    /// Dependency or expression link
    #[serde(rename = "type", default)]
    pub link_type: LinkType,
    /// Expression text, for expression links
    #[serde(default)]
    pub value: Option<String>,
}

/// How a link decides whether it fires
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// Always fires (default)
    #[default]
    #[serde(alias = "unconditional")]
    Dependency,
    /// Fires when its expression evaluates to true
    #[serde(alias = "conditional")]
    Expression,
}

impl LinkDefinition {
    /// Create an unconditional link
    pub fn dependency(id: u32, from: &str, to: &str) -> Self {
        Self {
            id: LinkId(id),
            from: from.to_string(),
            to: to.to_string(),
            link_type: LinkType::Dependency,
            value: None,
        }
    }

    /// Create a link guarded by `expr`
    pub fn expression(id: u32, from: &str, to: &str, expr: &str) -> Self {
        Self {
            id: LinkId(id),
            from: from.to_string(),
            to: to.to_string(),
            link_type: LinkType::Expression,
            value: Some(expr.to_string()),
        }
    }

    /// Expression text, empty when none was given
    pub fn text(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

impl FlowDefinition {
    /// Links that carry an expression
    pub fn expression_links(&self) -> impl Iterator<Item = &LinkDefinition> {
        self.links
            .iter()
            .filter(|l| l.link_type == LinkType::Expression)
    }

    /// Links leaving `node`, in definition order
    pub fn outgoing<'a>(&'a self, node: &'a str) -> impl Iterator<Item = &'a LinkDefinition> + 'a {
        self.links.iter().filter(move |l| l.from == node)
    }

    pub fn link(&self, id: LinkId) -> Option<&LinkDefinition> {
        self.links.iter().find(|l| l.id == id)
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Check identities are unique and links connect declared nodes
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let mut node_ids = HashSet::new();
        for node in &self.nodes {
            if !node_ids.insert(node.id.as_str()) {
                return Err(DefinitionError::DuplicateNode(node.id.clone()));
            }
        }

        let mut link_ids = HashSet::new();
        for link in &self.links {
            if !link_ids.insert(link.id) {
                return Err(DefinitionError::DuplicateLink(link.id));
            }
            for end in [&link.from, &link.to] {
                if !node_ids.contains(end.as_str()) {
                    return Err(DefinitionError::UnknownNode {
                        link: link.id,
                        node: end.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
