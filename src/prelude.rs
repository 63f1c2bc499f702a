//! Prelude module for convenient imports
//!
//! Re-exports the types needed to assemble a step, compile it into a job
//! description, and clean up after it, so callers don't have to import each
//! one individually.

// Step assembly and identity
pub use crate::step::{DEFAULT_SUBMIT_PRIORITY, FlowStep, FlowStepBuilder, StepLog, StepSnapshot};

// Graph model
pub use crate::element::{FlowElement, Group, GroupKind, Operation, Operator, Pipe};
pub use crate::graph::{ElementId, ScopeId, StepGraph};
pub use crate::scope::Scope;

// Record schema and physical plan tags
pub use crate::record::{
    Fields, GroupingComparator, KeyType, Partitioner, RECORD_TYPE_TAG, SortComparator, ValueType,
};

// Tap boundary
pub use crate::tap::{Tap, TapDescriptor, TapRef};

// Compilation and cleanup
pub use crate::cleanup::{CleanupEntry, CleanupOutcome, CleanupReport};
pub use crate::compiler::{
    InputSlice, JobConf, JobDescriptor, MultiInputPlan, ShufflePlan, TrapPlan, keys,
};

// Error types
pub use crate::error::{
    CleanupError, CompileError, GraphError, SnapshotError, StepBuildError, TapError,
};

// Standard library re-exports commonly used with this crate
pub use std::sync::Arc;
