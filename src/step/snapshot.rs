//! A versioned snapshot of a step, embedded into its own compiled job so a
//! remote executor can rehydrate the full step context.
//!
//! The snapshot schema is deliberately decoupled from the in-memory step
//! representation: it carries tap descriptors instead of live tap handles and
//! graph elements in handle form, so decoding never requires the concrete
//! collaborators that built the step.

use serde::{Deserialize, Serialize};

use crate::element::{FlowElement, Group};
use crate::error::SnapshotError;
use crate::scope::Scope;
use crate::step::FlowStep;
use crate::tap::{TapDescriptor, TapRef};

/// Bump when the snapshot schema changes shape.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A graph vertex in snapshot form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotElement {
    pub name: String,
    pub kind: SnapshotElementKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SnapshotElementKind {
    Pipe,
    Operator { operation: String },
    Group,
    SourceAnchor,
    SinkAnchor,
}

/// A graph edge in snapshot form; endpoints index into
/// [`StepSnapshot::elements`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEdge {
    pub source: usize,
    pub target: usize,
    pub scope: Scope,
}

/// The serialized full copy of a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSnapshot {
    pub version: u32,
    pub id: u32,
    pub name: String,
    pub parent_flow_name: Option<String>,
    pub submit_priority: u8,
    pub sources: Vec<(String, TapDescriptor)>,
    pub sink: TapDescriptor,
    pub mapper_traps: Vec<(String, TapDescriptor)>,
    pub reducer_traps: Vec<(String, TapDescriptor)>,
    pub group: Option<Group>,
    pub elements: Vec<SnapshotElement>,
    pub edges: Vec<SnapshotEdge>,
}

impl StepSnapshot {
    /// Captures the current state of a step.
    pub fn capture(step: &FlowStep) -> Self {
        let graph = step.graph();

        let elements = graph
            .elements()
            .map(|(_, element)| SnapshotElement {
                name: element.name().to_string(),
                kind: match element {
                    FlowElement::Pipe(_) => SnapshotElementKind::Pipe,
                    FlowElement::Operator(operator) => SnapshotElementKind::Operator {
                        operation: operator.operation().name().to_string(),
                    },
                    FlowElement::Group(_) => SnapshotElementKind::Group,
                    FlowElement::SourceAnchor { .. } => SnapshotElementKind::SourceAnchor,
                    FlowElement::SinkAnchor { .. } => SnapshotElementKind::SinkAnchor,
                },
            })
            .collect();

        let edges = graph
            .scopes()
            .map(|(id, scope)| {
                let (source, target) = graph.scope_endpoints(id);
                SnapshotEdge {
                    source: source.0,
                    target: target.0,
                    scope: scope.clone(),
                }
            })
            .collect();

        Self {
            version: SNAPSHOT_VERSION,
            id: step.id(),
            name: step.name().to_string(),
            parent_flow_name: step.parent_flow_name().map(str::to_string),
            submit_priority: step.submit_priority(),
            sources: step
                .sources()
                .map(|(tap, name)| (name.to_string(), tap.descriptor()))
                .collect(),
            sink: step.sink().descriptor(),
            mapper_traps: collect_traps(step.mapper_traps()),
            reducer_traps: collect_traps(step.reducer_traps()),
            group: step.group().cloned(),
            elements,
            edges,
        }
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(|err| SnapshotError::Encode(err.to_string()))
    }

    pub fn from_json(raw: &str) -> Result<Self, SnapshotError> {
        let snapshot: StepSnapshot =
            serde_json::from_str(raw).map_err(|err| SnapshotError::Decode(err.to_string()))?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        Ok(snapshot)
    }
}

fn collect_traps<'a>(
    traps: impl Iterator<Item = (&'a str, &'a TapRef)>,
) -> Vec<(String, TapDescriptor)> {
    traps
        .map(|(name, tap)| (name.to_string(), tap.descriptor()))
        .collect()
}
