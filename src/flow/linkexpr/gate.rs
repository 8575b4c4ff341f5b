// SPDX-License-Identifier: MIT

//! Link gate - decides whether a link fires for one run
//!
//! Dependency links always fire. Expression links fire when their
//! compiled expression evaluates to `true` against the run scope. Any
//! problem on the way (no compiled expression, evaluation error, a
//! non-boolean result) makes the link not fire.

use std::sync::Arc;

use super::registry::LinkExprRegistry;
use super::resolver::resolve;
use crate::error::LinkExprError;
use crate::flow::definition::{FlowDefinition, LinkDefinition, LinkId, LinkType};
use crate::flow::diagnostics::Diagnostics;
use crate::flow::scope::Scope;
use crate::script::{Context, ExpressionEngine};
use crate::value::Value;

/// Evaluates links against run scopes.
///
/// Cheap to clone; clones share the same frozen registry.
#[derive(Debug, Clone)]
pub struct LinkGate {
    registry: Arc<LinkExprRegistry>,
    diagnostics: Diagnostics,
}

impl LinkGate {
    pub fn new(registry: Arc<LinkExprRegistry>, diagnostics: Diagnostics) -> Self {
        Self {
            registry,
            diagnostics,
        }
    }

    /// Build the registry for `def` and wrap it in a gate
    pub fn from_definition(
        def: &FlowDefinition,
        engine: &dyn ExpressionEngine,
        diagnostics: Diagnostics,
    ) -> Self {
        let registry = LinkExprRegistry::from_definition(def, engine, &diagnostics);
        Self::new(Arc::new(registry), diagnostics)
    }

    pub fn registry(&self) -> &Arc<LinkExprRegistry> {
        &self.registry
    }

    /// Whether `link` fires for `scope`. Never fails; problems are
    /// reported and count as "does not fire".
    pub fn evaluate(&self, link: &LinkDefinition, scope: &dyn Scope) -> bool {
        match self.try_evaluate(link, scope) {
            Ok(fires) => fires,
            Err(err) => {
                self.diagnostics.warn(format_args!("{}", err));
                false
            }
        }
    }

    /// Like [`evaluate`](Self::evaluate), returning the reason a link
    /// could not be decided
    pub fn try_evaluate(
        &self,
        link: &LinkDefinition,
        scope: &dyn Scope,
    ) -> Result<bool, LinkExprError> {
        match link.link_type {
            LinkType::Dependency => return Ok(true),
            LinkType::Expression => {}
        }

        let entry = self
            .registry
            .get(link.id)
            .ok_or_else(|| LinkExprError::MissingEntry {
                link: link.id,
                text: link.text().to_string(),
            })?;

        let ctx = self.context(entry.attributes(), scope);
        self.diagnostics
            .debug(format_args!("link {}: context: {:?}", link.id, ctx));

        let result = entry
            .expression()
            .evaluate(&ctx)
            .map_err(|source| LinkExprError::Eval {
                link: link.id,
                source,
            })?;

        result.as_bool().ok_or(LinkExprError::NonBoolean {
            link: link.id,
            found: result.kind(),
        })
    }

    /// Decide every link in `links`, in order
    pub fn evaluate_all<'a, I>(&self, links: I, scope: &dyn Scope) -> Vec<(LinkId, bool)>
    where
        I: IntoIterator<Item = &'a LinkDefinition>,
    {
        links
            .into_iter()
            .map(|link| (link.id, self.evaluate(link, scope)))
            .collect()
    }

    fn context(&self, attributes: &[String], scope: &dyn Scope) -> Context {
        let mut ctx = Context::with_capacity(attributes.len());
        for name in attributes {
            if ctx.contains_key(name) {
                continue;
            }
            let value = resolve(name, scope, &self.diagnostics).unwrap_or(Value::Undefined);
            ctx.insert(name.clone(), value);
        }
        ctx
    }
}
