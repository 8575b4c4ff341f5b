// SPDX-License-Identifier: MIT

//! Compiled link expressions of one flow definition
//!
//! The registry is built once when a definition is loaded and is never
//! modified afterwards; share it behind an `Arc` between runs.

use std::collections::HashMap;

use super::translate::{translate, Translation};
use crate::error::LinkExprError;
use crate::flow::definition::{FlowDefinition, LinkDefinition, LinkId, LinkType};
use crate::flow::diagnostics::Diagnostics;
use crate::script::{CompiledExpression, ExpressionEngine};

/// What the gate needs to evaluate one expression link
#[derive(Debug)]
pub struct LinkExprEntry {
    attributes: Vec<String>,
    expression: Box<dyn CompiledExpression>,
}

impl LinkExprEntry {
    /// Referenced attributes, in order of appearance, duplicates kept
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn expression(&self) -> &dyn CompiledExpression {
        self.expression.as_ref()
    }
}

/// Link identity → compiled expression
#[derive(Debug, Default)]
pub struct LinkExprRegistry {
    entries: HashMap<LinkId, LinkExprEntry>,
}

impl LinkExprRegistry {
    /// Compile every expression link in `links`.
    ///
    /// Dependency links and links with blank text get no entry. Links
    /// whose expression does not compile are reported and left out.
    pub fn build<'a, I>(links: I, engine: &dyn ExpressionEngine, diagnostics: &Diagnostics) -> Self
    where
        I: IntoIterator<Item = &'a LinkDefinition>,
    {
        let mut entries = HashMap::new();

        for link in links {
            match compile_link(link, engine, diagnostics) {
                Ok(Some(entry)) => {
                    if entries.insert(link.id, entry).is_some() {
                        diagnostics.warn(format_args!(
                            "link {} appears more than once; keeping the last expression",
                            link.id
                        ));
                    }
                }
                Ok(None) => {}
                Err(err) => diagnostics.error(format_args!("{}", err)),
            }
        }

        Self { entries }
    }

    /// Compile the links of `def`
    pub fn from_definition(
        def: &FlowDefinition,
        engine: &dyn ExpressionEngine,
        diagnostics: &Diagnostics,
    ) -> Self {
        Self::build(&def.links, engine, diagnostics)
    }

    pub fn get(&self, id: LinkId) -> Option<&LinkExprEntry> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: LinkId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identities with an entry, ascending
    pub fn link_ids(&self) -> Vec<LinkId> {
        let mut ids: Vec<LinkId> = self.entries.keys().copied().collect();
        ids.sort();
        ids
    }
}

/// Translate and compile one link. `Ok(None)` when the link needs no entry.
pub fn compile_link(
    link: &LinkDefinition,
    engine: &dyn ExpressionEngine,
    diagnostics: &Diagnostics,
) -> Result<Option<LinkExprEntry>, LinkExprError> {
    match link.link_type {
        LinkType::Dependency => return Ok(None),
        LinkType::Expression => {}
    }

    let text = link.text();
    if text.trim().is_empty() {
        return Ok(None);
    }

    let Translation {
        attributes,
        rewritten,
    } = translate(text);
    diagnostics.debug(format_args!("link {}: expr: {}", link.id, rewritten));

    let expression = engine
        .compile(&rewritten)
        .map_err(|source| LinkExprError::Compile {
            link: link.id,
            text: text.to_string(),
            source,
        })?;

    Ok(Some(LinkExprEntry {
        attributes,
        expression,
    }))
}
