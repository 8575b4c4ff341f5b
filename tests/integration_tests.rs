//! Integration tests for link expression loading and evaluation
//!
//! These tests drive flows end to end: load a definition and a scope
//! schema, build the registry once, then decide links for one or many runs.

use linkexpr_rs::flow::definition::FlowDefinition;
use linkexpr_rs::flow::{walk, MemorySink};
use linkexpr_rs::{
    Diagnostics, FlowLoader, LinkExprError, LinkExprRegistry, LinkGate, LinkId, RunScope,
    ScopeSchema, ScriptEngine, Value,
};
use log::Level;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// Fixtures
// ============================================================================

static ORDER_FLOW: Lazy<FlowDefinition> = Lazy::new(|| {
    FlowLoader::parse_yaml(
        r#"
name: order-routing
description: "Route an order by total and status"

nodes:
  - id: receive
  - id: review
  - id: ship
  - id: hold
  - id: notify

links:
  - id: 1
    from: receive
    to: review
    type: conditional
    value: "$order.total > 100"
  - id: 2
    from: receive
    to: ship
    type: expression
    value: "$order.total <= 100 && $status == 'paid'"
  - id: 3
    from: receive
    to: hold
    type: expression
    value: "$status != 'paid'"
  - id: 4
    from: review
    to: ship
    type: expression
    value: "$approved"
  - id: 5
    from: ship
    to: notify
  - id: 6
    from: hold
    to: notify
    type: expression
    value: "$order.total >"
"#,
    )
    .expect("fixture flow should parse")
});

fn scope_from(yaml: &str) -> RunScope {
    let schema = ScopeSchema::parse_yaml(yaml).unwrap();
    RunScope::from_schema(&schema).unwrap()
}

fn order_scope(total: &str, status: &str) -> RunScope {
    scope_from(&format!(
        r#"
order:
  type: object
  value:
    total: {}
status:
  type: string
  value: {}
approved:
  type: boolean
  value: true
"#,
        total, status
    ))
}

fn gate_with_sink(def: &FlowDefinition) -> (LinkGate, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::default());
    let gate = LinkGate::from_definition(def, &ScriptEngine::new(), Diagnostics::new(sink.clone()));
    (gate, sink)
}

fn decisions(gate: &LinkGate, scope: &RunScope) -> HashMap<LinkId, bool> {
    gate.evaluate_all(&ORDER_FLOW.links, scope)
        .into_iter()
        .collect()
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_registry_holds_only_compiled_expression_links() {
    let (gate, sink) = gate_with_sink(&ORDER_FLOW);
    let registry = gate.registry();

    assert_eq!(
        registry.link_ids(),
        vec![LinkId(1), LinkId(2), LinkId(3), LinkId(4)]
    );
    assert!(!registry.contains(LinkId(5)));
    assert!(!registry.contains(LinkId(6)));

    let errors = sink.messages(Level::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("link 6"));
}

#[test]
fn test_registry_entry_attributes() {
    let (gate, _) = gate_with_sink(&ORDER_FLOW);
    let entry = gate.registry().get(LinkId(2)).unwrap();

    assert_eq!(entry.attributes(), ["order.total", "status"]);
    assert_eq!(
        entry.expression().source(),
        r#"lookup("order.total") <= 100 && lookup("status") == 'paid'"#
    );
}

// ============================================================================
// Gate
// ============================================================================

#[test]
fn test_small_paid_order() {
    let (gate, _) = gate_with_sink(&ORDER_FLOW);
    let d = decisions(&gate, &order_scope("40.5", "paid"));

    assert!(!d[&LinkId(1)]);
    assert!(d[&LinkId(2)]);
    assert!(!d[&LinkId(3)]);
    assert!(d[&LinkId(5)]);
    assert!(!d[&LinkId(6)]);
}

#[test]
fn test_large_unpaid_order() {
    let (gate, _) = gate_with_sink(&ORDER_FLOW);
    let d = decisions(&gate, &order_scope("250", "pending"));

    assert!(d[&LinkId(1)]);
    assert!(!d[&LinkId(2)]);
    assert!(d[&LinkId(3)]);
}

#[test]
fn test_uncompiled_link_reports_missing_entry() {
    let (gate, sink) = gate_with_sink(&ORDER_FLOW);
    let link = ORDER_FLOW.link(LinkId(6)).unwrap();
    let scope = order_scope("1", "paid");

    assert!(matches!(
        gate.try_evaluate(link, &scope),
        Err(LinkExprError::MissingEntry { link: LinkId(6), .. })
    ));
    assert!(!gate.evaluate(link, &scope));
    assert!(sink
        .messages(Level::Warn)
        .iter()
        .any(|m| m.contains("link 6")));
}

#[test]
fn test_plain_map_scope() {
    let (gate, _) = gate_with_sink(&ORDER_FLOW);
    let link = ORDER_FLOW.link(LinkId(4)).unwrap();

    let mut scope: HashMap<String, Value> = HashMap::new();
    assert!(!gate.evaluate(link, &scope));

    scope.insert("approved".to_string(), Value::Bool(true));
    assert!(gate.evaluate(link, &scope));
}

#[test]
fn test_child_scope_overrides_parent() {
    let (gate, _) = gate_with_sink(&ORDER_FLOW);
    let link = ORDER_FLOW.link(LinkId(3)).unwrap();

    let parent = Arc::new(order_scope("10", "paid"));
    let mut child = RunScope::with_parent(parent.clone());
    assert!(!gate.evaluate(link, &child));

    child.set("status", "refunded");
    assert!(gate.evaluate(link, &child));
    assert!(!gate.evaluate(link, parent.as_ref()));
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_runs_share_one_registry() {
    let registry = Arc::new(LinkExprRegistry::from_definition(
        &ORDER_FLOW,
        &ScriptEngine::new(),
        &Diagnostics::global(),
    ));
    let gate = LinkGate::new(registry, Diagnostics::global());
    let link = ORDER_FLOW.link(LinkId(1)).unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let gate = gate.clone();
                s.spawn(move || {
                    let total = 50 * i;
                    let scope = order_scope(&total.to_string(), "paid");
                    (0..100).all(|_| gate.evaluate(link, &scope) == (total > 100))
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    });
}

// ============================================================================
// Walk
// ============================================================================

#[test]
fn test_walk_paid_small_order() {
    let (gate, _) = gate_with_sink(&ORDER_FLOW);
    let reached = walk(&ORDER_FLOW, &gate, &order_scope("20", "paid"), "receive");
    assert_eq!(reached, vec!["receive", "ship", "notify"]);
}

#[test]
fn test_walk_unpaid_large_order() {
    let (gate, _) = gate_with_sink(&ORDER_FLOW);
    let reached = walk(&ORDER_FLOW, &gate, &order_scope("500", "pending"), "receive");
    assert_eq!(reached, vec!["receive", "review", "hold", "ship", "notify"]);
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_flow_from_file() {
    let path = std::env::temp_dir().join(format!("linkexpr-flow-{}.yaml", std::process::id()));
    std::fs::write(
        &path,
        "name: tiny\nnodes:\n  - id: a\n  - id: b\nlinks:\n  - id: 1\n    from: a\n    to: b\n",
    )
    .unwrap();

    let def = FlowLoader::new().load_flow(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(def.name, "tiny");
    assert_eq!(def.expression_links().count(), 0);
}

#[test]
fn test_invalid_flow_is_rejected() {
    let result = FlowLoader::parse_yaml(
        "name: broken\nnodes:\n  - id: a\nlinks:\n  - id: 1\n    from: a\n    to: missing\n",
    );
    assert!(result.is_err());
}
