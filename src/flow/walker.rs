//! Follows firing links through a flow definition

use std::collections::{HashSet, VecDeque};

use super::definition::FlowDefinition;
use super::linkexpr::LinkGate;
use super::scope::Scope;

/// Nodes reachable from `start` over links that fire for `scope`.
///
/// Breadth-first; each node appears once, in order of first visit, with
/// `start` first. Returns nothing when `start` is not a node of `def`.
pub fn walk(def: &FlowDefinition, gate: &LinkGate, scope: &dyn Scope, start: &str) -> Vec<String> {
    if !def.has_node(start) {
        log::warn!("Walk start node '{}' is not part of flow '{}'", start, def.name);
        return Vec::new();
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut order = Vec::new();
    let mut queue = VecDeque::new();

    visited.insert(start);
    queue.push_back(start);

    while let Some(node) = queue.pop_front() {
        order.push(node.to_string());

        for link in def.outgoing(node) {
            if visited.contains(link.to.as_str()) {
                continue;
            }
            if gate.evaluate(link, scope) {
                log::debug!("Link {} fired: {} -> {}", link.id, link.from, link.to);
                visited.insert(&link.to);
                queue.push_back(&link.to);
            } else {
                log::debug!("Link {} held: {} -> {}", link.id, link.from, link.to);
            }
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::definition::FlowLoader;
    use crate::flow::diagnostics::Diagnostics;
    use crate::flow::scope::RunScope;
    use crate::script::ScriptEngine;

    const FLOW: &str = r#"
name: orders
nodes:
  - id: start
  - id: review
  - id: ship
  - id: reject
  - id: archive
links:
  - id: 1
    from: start
    to: review
    type: expression
    value: "$total > 100"
  - id: 2
    from: start
    to: ship
    type: expression
    value: "$total <= 100"
  - id: 3
    from: review
    to: ship
    type: expression
    value: "$approved"
  - id: 4
    from: review
    to: reject
    type: expression
    value: "!$approved"
  - id: 5
    from: ship
    to: archive
  - id: 6
    from: reject
    to: archive
"#;

    fn run(scope: &RunScope) -> Vec<String> {
        let def = FlowLoader::parse_yaml(FLOW).unwrap();
        let gate = LinkGate::from_definition(&def, &ScriptEngine::new(), Diagnostics::global());
        walk(&def, &gate, scope, "start")
    }

    #[test]
    fn test_walk_small_order() {
        let mut scope = RunScope::new();
        scope.set("total", 20i64);
        assert_eq!(run(&scope), vec!["start", "ship", "archive"]);
    }

    #[test]
    fn test_walk_large_order_approved() {
        let mut scope = RunScope::new();
        scope.set("total", 500i64);
        scope.set("approved", true);
        assert_eq!(run(&scope), vec!["start", "review", "ship", "archive"]);
    }

    #[test]
    fn test_walk_large_order_rejected() {
        let mut scope = RunScope::new();
        scope.set("total", 500i64);
        scope.set("approved", false);
        assert_eq!(run(&scope), vec!["start", "review", "reject", "archive"]);
    }

    #[test]
    fn test_walk_stops_when_nothing_fires() {
        // `total` unset: both comparisons fail on undefined
        assert_eq!(run(&RunScope::new()), vec!["start"]);
    }

    #[test]
    fn test_walk_unknown_start() {
        let def = FlowLoader::parse_yaml(FLOW).unwrap();
        let gate = LinkGate::from_definition(&def, &ScriptEngine::new(), Diagnostics::global());
        assert!(walk(&def, &gate, &RunScope::new(), "nowhere").is_empty());
    }
}
