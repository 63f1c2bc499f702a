//! Explicit adjacency storage for a step's element graph.
//!
//! Vertices and edges live in arenas addressed by stable integer handles,
//! with per-vertex incoming/outgoing edge index lists. The graph is a DAG by
//! construction; acyclicity is the planner's responsibility and is not
//! validated here.

use std::sync::Arc;

use itertools::Itertools;

use crate::element::{FlowElement, Operation};
use crate::error::GraphError;
use crate::scope::Scope;

/// Stable handle to a vertex in a [`StepGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub(crate) usize);

/// Stable handle to an edge in a [`StepGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub(crate) usize);

#[derive(Debug)]
struct ScopeEntry {
    scope: Scope,
    source: ElementId,
    target: ElementId,
}

/// Directed graph of pipeline elements connected by typed scopes.
///
/// A vertex may have many incoming scopes (co-group fan-in) but exactly one
/// outgoing scope unless it is a terminal sink anchor.
#[derive(Debug, Default)]
pub struct StepGraph {
    elements: Vec<FlowElement>,
    scopes: Vec<ScopeEntry>,
    incoming: Vec<Vec<ScopeId>>,
    outgoing: Vec<Vec<ScopeId>>,
}

impl StepGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_element(&mut self, element: FlowElement) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(element);
        self.incoming.push(Vec::new());
        self.outgoing.push(Vec::new());
        id
    }

    /// Adds a scope from `source` to `target`.
    pub fn connect(&mut self, source: ElementId, target: ElementId, scope: Scope) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(ScopeEntry {
            scope,
            source,
            target,
        });
        self.outgoing[source.0].push(id);
        self.incoming[target.0].push(id);
        id
    }

    pub fn element(&self, id: ElementId) -> &FlowElement {
        &self.elements[id.0]
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0].scope
    }

    /// The incoming scopes of an element: empty for true sources, more than
    /// one for a co-group boundary.
    pub fn previous_scopes(&self, id: ElementId) -> &[ScopeId] {
        &self.incoming[id.0]
    }

    /// The single outgoing scope of an element. Every element except a sink
    /// anchor has exactly one downstream path; anything else is a logic error
    /// on the planner's side.
    pub fn next_scope(&self, id: ElementId) -> Result<ScopeId, GraphError> {
        match self.outgoing[id.0].as_slice() {
            [scope] => Ok(*scope),
            outgoing => Err(GraphError::NotExactlyOne {
                element: self.elements[id.0].to_string(),
                found: outgoing.len(),
            }),
        }
    }

    /// All outgoing scopes of an element; normally of size at most one.
    pub fn next_scopes(&self, id: ElementId) -> &[ScopeId] {
        &self.outgoing[id.0]
    }

    /// The target vertex of a scope.
    pub fn next_element(&self, id: ScopeId) -> ElementId {
        self.scopes[id.0].target
    }

    /// The (source, target) endpoints of a scope.
    pub fn scope_endpoints(&self, id: ScopeId) -> (ElementId, ElementId) {
        let entry = &self.scopes[id.0];
        (entry.source, entry.target)
    }

    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &FlowElement)> {
        self.elements
            .iter()
            .enumerate()
            .map(|(index, element)| (ElementId(index), element))
    }

    pub fn scopes(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes
            .iter()
            .enumerate()
            .map(|(index, entry)| (ScopeId(index), &entry.scope))
    }

    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn num_scopes(&self) -> usize {
        self.scopes.len()
    }

    /// The distinct operations referenced by operator vertices. Duplicates
    /// collapse by reference identity; order is not significant.
    pub fn all_operations(&self) -> Vec<Arc<Operation>> {
        self.elements
            .iter()
            .filter_map(|element| match element {
                FlowElement::Operator(operator) => Some(Arc::clone(operator.operation())),
                _ => None,
            })
            .unique_by(|operation| Arc::as_ptr(operation))
            .collect()
    }

    /// True if any pipe vertex carries the given name.
    pub fn contains_pipe_named(&self, name: &str) -> bool {
        self.elements.iter().any(|element| {
            matches!(element, FlowElement::Pipe(pipe) if pipe.name() == name)
        })
    }
}
