//! The step aggregate: one physical unit of distributed work and the
//! metadata needed to execute, order, and clean it up.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use ahash::AHashMap;

use crate::element::{FlowElement, Group, Operation};
use crate::error::{GraphError, StepBuildError};
use crate::graph::{ElementId, ScopeId, StepGraph};
use crate::tap::TapRef;

pub mod snapshot;

pub use snapshot::StepSnapshot;

/// Default submit priority: the midpoint of the 1 (highest) to 10 (lowest)
/// scale.
pub const DEFAULT_SUBMIT_PRIORITY: u8 = 5;

const LOG_PREFIX_WIDTH: usize = 25;

/// An internal representation of one job to be executed on a remote cluster.
/// During planning, pipe assemblies are broken down into steps and
/// encapsulated in this type.
///
/// Steps are submitted in order of dependency. If two or more steps share no
/// dependencies and all can be scheduled simultaneously,
/// [`submit_priority`](FlowStep::submit_priority) decides the order in which
/// they are handed to the scheduler.
///
/// Identity and equality are governed solely by the step name: two steps with
/// equal names are interchangeable for dependency bookkeeping regardless of
/// their content.
#[derive(Debug)]
pub struct FlowStep {
    name: String,
    id: u32,
    parent_flow_name: Option<String>,
    submit_priority: u8,
    properties: Option<AHashMap<String, String>>,
    graph: StepGraph,
    sources: Vec<(TapRef, String)>,
    sink: TapRef,
    mapper_traps: Vec<(String, TapRef)>,
    reducer_traps: Vec<(String, TapRef)>,
    group: Option<ElementId>,
}

impl FlowStep {
    pub fn builder(name: impl Into<String>, id: u32) -> FlowStepBuilder {
        FlowStepBuilder::new(name, id)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn parent_flow_name(&self) -> Option<&str> {
        self.parent_flow_name.as_deref()
    }

    /// Labels this step with the flow it belongs to. Must be called before
    /// [`compile`](FlowStep::compile).
    pub fn set_parent_flow_name(&mut self, parent_flow_name: impl Into<String>) {
        self.parent_flow_name = Some(parent_flow_name.into());
    }

    /// The job identity handed to the cluster: `"<parentFlow>[<name>]"`.
    pub fn step_name(&self) -> String {
        format!(
            "{}[{}]",
            self.parent_flow_name.as_deref().unwrap_or_default(),
            self.name
        )
    }

    /// 10 is lowest, 1 is the highest, 5 is the default. Consulted by the
    /// external scheduler only to order steps that share no dependency
    /// relationship.
    pub fn submit_priority(&self) -> u8 {
        self.submit_priority
    }

    pub fn set_submit_priority(&mut self, submit_priority: u8) {
        self.submit_priority = submit_priority;
    }

    pub fn has_properties(&self) -> bool {
        self.properties
            .as_ref()
            .is_some_and(|properties| !properties.is_empty())
    }

    /// The user property map, materialized on first access. Entries are
    /// merged into the job configuration before any compiler decision, so
    /// they can never override required wiring.
    pub fn properties_mut(&mut self) -> &mut AHashMap<String, String> {
        self.properties.get_or_insert_with(AHashMap::new)
    }

    pub fn properties(&self) -> Option<&AHashMap<String, String>> {
        self.properties.as_ref()
    }

    pub fn set_properties(&mut self, properties: AHashMap<String, String>) {
        self.properties = Some(properties);
    }

    pub fn graph(&self) -> &StepGraph {
        &self.graph
    }

    /// The incoming scopes of an element. More than one when the element is a
    /// co-group boundary.
    pub fn previous_scopes(&self, id: ElementId) -> &[ScopeId] {
        self.graph.previous_scopes(id)
    }

    /// The single outgoing scope of an element. There is always exactly one
    /// next scope for any element that is not a sink anchor.
    pub fn next_scope(&self, id: ElementId) -> Result<ScopeId, GraphError> {
        self.graph.next_scope(id)
    }

    pub fn next_scopes(&self, id: ElementId) -> &[ScopeId] {
        self.graph.next_scopes(id)
    }

    pub fn next_element(&self, id: ScopeId) -> ElementId {
        self.graph.next_element(id)
    }

    pub fn all_operations(&self) -> Vec<Arc<Operation>> {
        self.graph.all_operations()
    }

    pub fn contains_pipe_named(&self, name: &str) -> bool {
        self.graph.contains_pipe_named(name)
    }

    /// The source taps and their logical names, in registration order. All
    /// sources and the sink must share a compatible record scheme.
    pub fn sources(&self) -> impl Iterator<Item = (&TapRef, &str)> {
        self.sources.iter().map(|(tap, name)| (tap, name.as_str()))
    }

    /// The logical name a source tap was registered under, looked up by
    /// handle identity.
    pub fn source_name(&self, tap: &TapRef) -> Option<&str> {
        self.sources
            .iter()
            .find(|(candidate, _)| Arc::ptr_eq(candidate, tap))
            .map(|(_, name)| name.as_str())
    }

    pub fn sink(&self) -> &TapRef {
        &self.sink
    }

    /// The map-phase trap registered under `name`, if any. Traps receive
    /// records rejected during processing; they are wired into the job but
    /// never count toward sources, the sink, or output parallelism.
    pub fn mapper_trap(&self, name: &str) -> Option<&TapRef> {
        lookup_trap(&self.mapper_traps, name)
    }

    /// The reduce-phase trap registered under `name`, if any.
    pub fn reducer_trap(&self, name: &str) -> Option<&TapRef> {
        lookup_trap(&self.reducer_traps, name)
    }

    pub fn mapper_traps(&self) -> impl Iterator<Item = (&str, &TapRef)> {
        self.mapper_traps.iter().map(|(name, tap)| (name.as_str(), tap))
    }

    pub fn reducer_traps(&self) -> impl Iterator<Item = (&str, &TapRef)> {
        self.reducer_traps.iter().map(|(name, tap)| (name.as_str(), tap))
    }

    /// The grouping boundary governing this step's shuffle phase, or `None`
    /// when the step has no shuffle phase at all.
    pub fn group(&self) -> Option<&Group> {
        match self.graph.element(self.group?) {
            FlowElement::Group(group) => Some(group),
            _ => None,
        }
    }

    /// The logging context for this step, prefixed with its parent flow name.
    pub fn log(&self) -> StepLog {
        StepLog::new(self.parent_flow_name.as_deref())
    }
}

fn lookup_trap<'a>(traps: &'a [(String, TapRef)], name: &str) -> Option<&'a TapRef> {
    traps
        .iter()
        .find(|(candidate, _)| candidate == name)
        .map(|(_, tap)| tap)
}

impl PartialEq for FlowStep {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for FlowStep {}

impl Hash for FlowStep {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlowStep[name: {}]", self.name)
    }
}

/// Assembles a [`FlowStep`]. The graph, sources, sink, traps, and grouping
/// reference are all populated here by the planner before compilation.
pub struct FlowStepBuilder {
    name: String,
    id: u32,
    graph: StepGraph,
    sources: Vec<(TapRef, String)>,
    sink: Option<TapRef>,
    mapper_traps: Vec<(String, TapRef)>,
    reducer_traps: Vec<(String, TapRef)>,
    group: Option<ElementId>,
}

impl FlowStepBuilder {
    pub fn new(name: impl Into<String>, id: u32) -> Self {
        Self {
            name: name.into(),
            id,
            graph: StepGraph::new(),
            sources: Vec::new(),
            sink: None,
            mapper_traps: Vec::new(),
            reducer_traps: Vec::new(),
            group: None,
        }
    }

    pub fn graph(mut self, graph: StepGraph) -> Self {
        self.graph = graph;
        self
    }

    /// Registers a source tap under a logical name.
    pub fn source(mut self, tap: TapRef, name: impl Into<String>) -> Self {
        self.sources.push((tap, name.into()));
        self
    }

    pub fn sink(mut self, tap: TapRef) -> Self {
        self.sink = Some(tap);
        self
    }

    /// Registers a map-phase trap. A later registration under the same name
    /// replaces the earlier one.
    pub fn mapper_trap(mut self, name: impl Into<String>, tap: TapRef) -> Self {
        upsert_trap(&mut self.mapper_traps, name.into(), tap);
        self
    }

    /// Registers a reduce-phase trap. Trap names are a namespace independent
    /// of the map-phase traps.
    pub fn reducer_trap(mut self, name: impl Into<String>, tap: TapRef) -> Self {
        upsert_trap(&mut self.reducer_traps, name.into(), tap);
        self
    }

    /// Marks the graph element governing this step's shuffle phase.
    pub fn group(mut self, id: ElementId) -> Self {
        self.group = Some(id);
        self
    }

    pub fn build(self) -> Result<FlowStep, StepBuildError> {
        let sink = self
            .sink
            .ok_or_else(|| StepBuildError::MissingSink(self.name.clone()))?;

        Ok(FlowStep {
            name: self.name,
            id: self.id,
            parent_flow_name: None,
            submit_priority: DEFAULT_SUBMIT_PRIORITY,
            properties: None,
            graph: self.graph,
            sources: self.sources,
            sink,
            mapper_traps: self.mapper_traps,
            reducer_traps: self.reducer_traps,
            group: self.group,
        })
    }
}

fn upsert_trap(traps: &mut Vec<(String, TapRef)>, name: String, tap: TapRef) {
    match traps.iter_mut().find(|(candidate, _)| *candidate == name) {
        Some(entry) => entry.1 = tap,
        None => traps.push((name, tap)),
    }
}

/// Logging context carrying the parent-flow prefix. Passed explicitly to the
/// operations that report progress instead of being read from a process-wide
/// logger.
#[derive(Debug, Clone)]
pub struct StepLog {
    prefix: String,
}

impl StepLog {
    pub fn new(parent_flow_name: Option<&str>) -> Self {
        Self {
            prefix: truncate(parent_flow_name.unwrap_or_default(), LOG_PREFIX_WIDTH).to_string(),
        }
    }

    pub fn debug(&self, message: impl fmt::Display) {
        log::debug!("[{}] {}", self.prefix, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        log::info!("[{}] {}", self.prefix, message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        log::warn!("[{}] {}", self.prefix, message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        log::error!("[{}] {}", self.prefix, message);
    }
}

fn truncate(value: &str, width: usize) -> &str {
    match value.char_indices().nth(width) {
        Some((offset, _)) => &value[..offset],
        None => value,
    }
}
