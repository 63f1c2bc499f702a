//! The boundary contract for sources and sinks.
//!
//! Concrete I/O (file systems, codecs) lives outside this crate. A tap only
//! initializes itself into a job configuration, answers a few planning
//! questions, and can delete its backing resource when it is ephemeral.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::compiler::conf::JobConf;
use crate::error::TapError;

/// Serializable identity of a tap. Embedded in job configurations so remote
/// tasks can tell which logical resource produced a given split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapDescriptor {
    pub kind: String,
    pub identifier: String,
}

impl TapDescriptor {
    pub fn new(kind: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            identifier: identifier.into(),
        }
    }
}

impl fmt::Display for TapDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.identifier)
    }
}

/// A source or sink at the edge of a step.
pub trait Tap: fmt::Debug + Send + Sync {
    /// The resource path or name this tap reads or writes.
    fn identifier(&self) -> &str;

    /// Wires this tap into `conf` as a source of the job.
    fn source_init(&self, conf: &mut JobConf) -> Result<(), TapError>;

    /// Wires this tap into `conf` as a sink of the job.
    fn sink_init(&self, conf: &mut JobConf) -> Result<(), TapError>;

    /// Desired number of output partitions; 0 leaves the choice to the
    /// execution engine.
    fn num_sink_parts(&self) -> u32 {
        0
    }

    /// True for temporary inter-step resources eligible for deletion once the
    /// consuming step has run.
    fn is_ephemeral(&self) -> bool {
        false
    }

    /// Deletes the underlying resource.
    fn delete_path(&self, conf: &JobConf) -> Result<(), TapError>;

    /// Serializable identity for remote tasks.
    fn descriptor(&self) -> TapDescriptor;
}

/// Shared handle to a tap. Source-name lookup on a step works by pointer
/// identity of this handle.
pub type TapRef = Arc<dyn Tap>;
