//! Tests for the step graph model and its traversal queries.
mod common;
use common::*;
use flowstep::prelude::*;

#[test]
fn test_next_scope_returns_the_unique_edge() {
    let mut graph = StepGraph::new();

    let src = graph.add_element(FlowElement::source_anchor("in"));
    let snk = graph.add_element(FlowElement::sink_anchor("out"));
    let edge = graph.connect(src, snk, Scope::new("in", Fields::new(["line"])));

    let next = graph.next_scope(src).expect("source has one outgoing scope");
    assert_eq!(next, edge);
    assert_eq!(graph.next_element(next), snk);
    assert_eq!(graph.scope(next).name(), "in");
}

#[test]
fn test_next_scope_fails_with_zero_outgoing() {
    let mut graph = StepGraph::new();
    let snk = graph.add_element(FlowElement::sink_anchor("out"));

    match graph.next_scope(snk) {
        Err(GraphError::NotExactlyOne { found, .. }) => assert_eq!(found, 0),
        other => panic!("expected NotExactlyOne, got {other:?}"),
    }
}

#[test]
fn test_next_scope_fails_with_two_outgoing() {
    let mut graph = StepGraph::new();

    let pipe = graph.add_element(FlowElement::Pipe(Pipe::new("fork")));
    let left = graph.add_element(FlowElement::sink_anchor("left"));
    let right = graph.add_element(FlowElement::sink_anchor("right"));

    graph.connect(pipe, left, Scope::new("fork", Fields::new(["line"])));
    graph.connect(pipe, right, Scope::new("fork", Fields::new(["line"])));

    match graph.next_scope(pipe) {
        Err(GraphError::NotExactlyOne { element, found }) => {
            assert_eq!(found, 2);
            assert!(element.contains("fork"));
        }
        other => panic!("expected NotExactlyOne, got {other:?}"),
    }

    // the permissive query still exposes both edges
    assert_eq!(graph.next_scopes(pipe).len(), 2);
}

#[test]
fn test_previous_scopes_reflect_co_group_fan_in() {
    let step = co_grouped_step(
        RecordingTap::source("lhs"),
        RecordingTap::source("rhs"),
        RecordingTap::sink("out", 0),
        false,
    );

    let graph = step.graph();
    let (group_id, _) = graph
        .elements()
        .find(|(_, element)| matches!(element, FlowElement::Group(_)))
        .expect("graph contains the group");

    assert_eq!(step.previous_scopes(group_id).len(), 2);

    let (source_id, _) = graph
        .elements()
        .find(|(_, element)| matches!(element, FlowElement::SourceAnchor { .. }))
        .expect("graph contains a source anchor");

    assert!(step.previous_scopes(source_id).is_empty());
}

#[test]
fn test_all_operations_collapses_shared_references() {
    let mut graph = StepGraph::new();

    let parse = Arc::new(Operation::new("parse"));
    let emit = Arc::new(Operation::new("emit"));

    graph.add_element(FlowElement::Operator(Operator::new("first", parse.clone())));
    graph.add_element(FlowElement::Operator(Operator::new("second", parse.clone())));
    graph.add_element(FlowElement::Operator(Operator::new("third", emit)));

    let operations = graph.all_operations();
    assert_eq!(operations.len(), 2);
}

#[test]
fn test_contains_pipe_named_matches_only_pipes() {
    let mut graph = StepGraph::new();

    graph.add_element(FlowElement::Pipe(Pipe::new("copy")));
    graph.add_element(FlowElement::Operator(Operator::new(
        "parse",
        Arc::new(Operation::new("parse")),
    )));

    assert!(graph.contains_pipe_named("copy"));
    assert!(!graph.contains_pipe_named("missing"));
    // operator names never count as pipe names
    assert!(!graph.contains_pipe_named("parse"));
}
