use thiserror::Error;

/// An I/O-class failure surfaced by a [`Tap`](crate::tap::Tap) implementation
/// while initializing into a job or deleting its backing resource.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct TapError {
    message: String,
}

impl TapError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for TapError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Logic errors raised by step graph traversal. These indicate a malformed
/// graph handed over by the planner, not a runtime condition.
#[derive(Error, Debug, Clone)]
pub enum GraphError {
    #[error("should only be one scope after element {element}, found: {found}")]
    NotExactlyOne { element: String, found: usize },
}

/// Errors that can occur while encoding or decoding a step snapshot or a
/// compiled job description blob.
#[derive(Error, Debug, Clone)]
pub enum SnapshotError {
    #[error("failed to encode snapshot: {0}")]
    Encode(String),

    #[error("failed to decode snapshot: {0}")]
    Decode(String),

    #[error("unsupported snapshot version {found}, expected {expected}")]
    Version { found: u32, expected: u32 },
}

/// Errors that abort job compilation for a step. No partial job description is
/// produced when any of these occur.
#[derive(Error, Debug, Clone)]
pub enum CompileError {
    #[error("failed to initialize source tap '{name}': {source}")]
    SourceInit { name: String, source: TapError },

    #[error("failed to initialize sink tap '{identifier}': {source}")]
    SinkInit { identifier: String, source: TapError },

    #[error("failed to initialize {phase} trap '{name}': {source}")]
    TrapInit {
        phase: &'static str,
        name: String,
        source: TapError,
    },

    #[error("failed to embed step context: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Errors raised while assembling a [`FlowStep`](crate::step::FlowStep) from
/// its builder.
#[derive(Error, Debug, Clone)]
pub enum StepBuildError {
    #[error("step '{0}' has no sink tap")]
    MissingSink(String),
}

/// The single fatal condition of resource cleanup: without a working scratch
/// configuration no cleanup at all can proceed. Individual resource failures
/// are collected in the [`CleanupReport`](crate::cleanup::CleanupReport)
/// instead.
#[derive(Error, Debug, Clone)]
pub enum CleanupError {
    #[error("unable to create scratch configuration for step '{step}': {message}")]
    Handle { step: String, message: String },
}
