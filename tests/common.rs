//! Common test utilities for building taps, graphs, and canonical steps.
use flowstep::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Tap double that records configuration writes and deletions, and can be
/// told to misbehave.
#[derive(Debug, Default)]
pub struct RecordingTap {
    identifier: String,
    sink_parts: u32,
    ephemeral: bool,
    fail_delete: bool,
    fail_sink_init: bool,
    deletes: AtomicUsize,
}

#[allow(dead_code)]
impl RecordingTap {
    pub fn source(identifier: &str) -> Arc<Self> {
        Arc::new(Self {
            identifier: identifier.to_string(),
            ..Self::default()
        })
    }

    pub fn sink(identifier: &str, sink_parts: u32) -> Arc<Self> {
        Arc::new(Self {
            identifier: identifier.to_string(),
            sink_parts,
            ..Self::default()
        })
    }

    pub fn ephemeral(identifier: &str) -> Arc<Self> {
        Arc::new(Self {
            identifier: identifier.to_string(),
            ephemeral: true,
            ..Self::default()
        })
    }

    pub fn failing_delete(identifier: &str) -> Arc<Self> {
        Arc::new(Self {
            identifier: identifier.to_string(),
            ephemeral: true,
            fail_delete: true,
            ..Self::default()
        })
    }

    pub fn failing_sink_init(identifier: &str) -> Arc<Self> {
        Arc::new(Self {
            identifier: identifier.to_string(),
            fail_sink_init: true,
            ..Self::default()
        })
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

impl Tap for RecordingTap {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn source_init(&self, conf: &mut JobConf) -> Result<(), TapError> {
        conf.set(format!("tap.{}.input", self.identifier), "open");
        Ok(())
    }

    fn sink_init(&self, conf: &mut JobConf) -> Result<(), TapError> {
        if self.fail_sink_init {
            return Err(TapError::new("sink refused to initialize"));
        }

        conf.set(format!("tap.{}.output", self.identifier), "open");
        Ok(())
    }

    fn num_sink_parts(&self) -> u32 {
        self.sink_parts
    }

    fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    fn delete_path(&self, _conf: &JobConf) -> Result<(), TapError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);

        if self.fail_delete {
            return Err(TapError::new("delete refused"));
        }

        Ok(())
    }

    fn descriptor(&self) -> TapDescriptor {
        let kind = if self.ephemeral { "temp" } else { "text" };
        TapDescriptor::new(kind, self.identifier.clone())
    }
}

/// A step with one source "A" feeding a passthrough pipe into the sink; no
/// grouping boundary.
#[allow(dead_code)]
pub fn linear_step(source: TapRef, sink: TapRef) -> FlowStep {
    let mut graph = StepGraph::new();

    let src = graph.add_element(FlowElement::source_anchor("A"));
    let pipe = graph.add_element(FlowElement::Pipe(Pipe::new("copy")));
    let snk = graph.add_element(FlowElement::sink_anchor("B"));

    graph.connect(src, pipe, Scope::new("A", Fields::new(["line"])));
    graph.connect(pipe, snk, Scope::new("copy", Fields::new(["line"])));

    FlowStep::builder("linear", 1)
        .graph(graph)
        .source(source, "A")
        .sink(sink)
        .build()
        .expect("step should build")
}

/// A step whose shuffle phase is governed by the given grouping boundary,
/// reading a single source.
#[allow(dead_code)]
pub fn grouped_step(source: TapRef, sink: TapRef, group: Group) -> FlowStep {
    let mut graph = StepGraph::new();

    let src = graph.add_element(FlowElement::source_anchor("A"));
    let group_id = graph.add_element(FlowElement::Group(group));
    let snk = graph.add_element(FlowElement::sink_anchor("B"));

    graph.connect(src, group_id, Scope::new("A", Fields::new(["key", "value"])));
    graph.connect(group_id, snk, Scope::new("group", Fields::new(["key", "value"])));

    FlowStep::builder("grouped", 2)
        .graph(graph)
        .source(source, "A")
        .sink(sink)
        .group(group_id)
        .build()
        .expect("step should build")
}

/// A step co-grouping two sources on "key", secondary-sorted on "ts".
#[allow(dead_code)]
pub fn co_grouped_step(lhs: TapRef, rhs: TapRef, sink: TapRef, reversed: bool) -> FlowStep {
    let group = Group::co_group(
        "merge",
        [
            ("lhs".to_string(), Fields::new(["key"])),
            ("rhs".to_string(), Fields::new(["key"])),
        ],
    )
    .sorted_by([
        ("lhs".to_string(), Fields::new(["ts"])),
        ("rhs".to_string(), Fields::new(["ts"])),
    ])
    .reversed(reversed);

    let mut graph = StepGraph::new();

    let left = graph.add_element(FlowElement::source_anchor("lhs"));
    let right = graph.add_element(FlowElement::source_anchor("rhs"));
    let group_id = graph.add_element(FlowElement::Group(group));
    let snk = graph.add_element(FlowElement::sink_anchor("B"));

    graph.connect(left, group_id, Scope::new("lhs", Fields::new(["key", "ts"])));
    graph.connect(right, group_id, Scope::new("rhs", Fields::new(["key", "ts"])));
    graph.connect(group_id, snk, Scope::new("merge", Fields::new(["key", "ts"])));

    FlowStep::builder("co-grouped", 3)
        .graph(graph)
        .source(lhs, "lhs")
        .source(rhs, "rhs")
        .sink(sink)
        .group(group_id)
        .build()
        .expect("step should build")
}
