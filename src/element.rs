//! The polymorphic vertex set of a step graph.
//!
//! The element variants form a closed set: graph algorithms dispatch on the
//! tag, never on runtime type checks.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::record::Fields;

/// A named passthrough node in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipe {
    name: String,
}

impl Pipe {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The identity of a record-level operation. Execution stays external to this
/// crate; only the identity is surfaced for introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    name: String,
}

impl Operation {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// An operator node applying an operation to the records flowing through it.
///
/// The operation is held behind an `Arc` so several operators can reference
/// one operation instance; deduplication in
/// [`all_operations`](crate::graph::StepGraph::all_operations) works by
/// reference identity.
#[derive(Debug, Clone)]
pub struct Operator {
    name: String,
    operation: Arc<Operation>,
}

impl Operator {
    pub fn new(name: impl Into<String>, operation: Arc<Operation>) -> Self {
        Self {
            name: name.into(),
            operation,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operation(&self) -> &Arc<Operation> {
        &self.operation
    }
}

/// Whether records gather from a single input or merge from several logical
/// inputs on a shared key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupKind {
    GroupBy,
    CoGroup,
}

/// A grouping boundary: the point where the step's shuffle phase gathers
/// records by key for joint processing.
///
/// Carries per-input grouping field selectors, optional per-input sorting
/// selectors when a secondary sort was requested, and a flag reversing the
/// sort direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    name: String,
    kind: GroupKind,
    grouping_selectors: Vec<(String, Fields)>,
    sorting_selectors: Option<Vec<(String, Fields)>>,
    sort_reversed: bool,
}

impl Group {
    /// A simple grouping over a single logical input.
    pub fn group_by(name: impl Into<String>, input: impl Into<String>, fields: Fields) -> Self {
        Self {
            name: name.into(),
            kind: GroupKind::GroupBy,
            grouping_selectors: vec![(input.into(), fields)],
            sorting_selectors: None,
            sort_reversed: false,
        }
    }

    /// A co-grouping merging several logical inputs on a shared key.
    pub fn co_group(
        name: impl Into<String>,
        selectors: impl IntoIterator<Item = (String, Fields)>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: GroupKind::CoGroup,
            grouping_selectors: selectors.into_iter().collect(),
            sorting_selectors: None,
            sort_reversed: false,
        }
    }

    /// Requests a secondary sort with the given per-input sort selectors.
    pub fn sorted_by(mut self, selectors: impl IntoIterator<Item = (String, Fields)>) -> Self {
        self.sorting_selectors = Some(selectors.into_iter().collect());
        self
    }

    /// Reverses the sort direction of the grouping (and of the secondary sort
    /// when one is present).
    pub fn reversed(mut self, reversed: bool) -> Self {
        self.sort_reversed = reversed;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    pub fn is_group_by(&self) -> bool {
        self.kind == GroupKind::GroupBy
    }

    /// True when a secondary sort was requested.
    pub fn is_sorted(&self) -> bool {
        self.sorting_selectors.is_some()
    }

    pub fn is_sort_reversed(&self) -> bool {
        self.sort_reversed
    }

    pub fn grouping_selectors(&self) -> &[(String, Fields)] {
        &self.grouping_selectors
    }

    pub fn sorting_selectors(&self) -> Option<&[(String, Fields)]> {
        self.sorting_selectors.as_deref()
    }

    /// The number of logical inputs merged at this boundary.
    pub fn num_inputs(&self) -> usize {
        self.grouping_selectors.len()
    }
}

/// A vertex in the step graph.
#[derive(Debug, Clone)]
pub enum FlowElement {
    Pipe(Pipe),
    Operator(Operator),
    Group(Group),
    /// Boundary node anchoring a source tap into the graph.
    SourceAnchor { name: String },
    /// Boundary node anchoring the sink tap into the graph.
    SinkAnchor { name: String },
}

impl FlowElement {
    pub fn source_anchor(name: impl Into<String>) -> Self {
        Self::SourceAnchor { name: name.into() }
    }

    pub fn sink_anchor(name: impl Into<String>) -> Self {
        Self::SinkAnchor { name: name.into() }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Pipe(pipe) => pipe.name(),
            Self::Operator(operator) => operator.name(),
            Self::Group(group) => group.name(),
            Self::SourceAnchor { name } | Self::SinkAnchor { name } => name,
        }
    }
}

impl fmt::Display for FlowElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pipe(pipe) => write!(f, "Pipe('{}')", pipe.name()),
            Self::Operator(operator) => write!(f, "Operator('{}')", operator.name()),
            Self::Group(group) => write!(f, "Group('{}')", group.name()),
            Self::SourceAnchor { name } => write!(f, "Source('{name}')"),
            Self::SinkAnchor { name } => write!(f, "Sink('{name}')"),
        }
    }
}
