//! # Flowstep - Dataflow Step Compilation Engine
//!
//! **Flowstep** compiles one stage ("step") of a logical dataflow pipeline
//! into a concrete, submittable distributed-computation job description, and
//! manages the metadata needed to execute, order, and clean up that job on a
//! cluster.
//!
//! ## Core Workflow
//!
//! The crate sits between an external planner and an external step runner.
//! The planner decides how a pipeline decomposes into steps; the runner
//! submits and executes compiled jobs. In between, the workflow is:
//!
//! 1.  **Lay out the graph**: build a [`StepGraph`](graph::StepGraph) of
//!     pipeline elements (pipes, operators, grouping boundaries, tap anchors)
//!     connected by typed [`Scope`](scope::Scope) edges.
//! 2.  **Assemble the step**: use
//!     [`FlowStep::builder`](step::FlowStep::builder) to attach source taps,
//!     the sink tap, per-phase traps, and the grouping boundary.
//! 3.  **Compile**: [`FlowStep::compile`] renders the step into a
//!     [`JobDescriptor`](compiler::JobDescriptor) - identity, combined
//!     multi-source input, shuffle plan, trap wiring, and a configuration
//!     with the step's own snapshot embedded for remote rehydration.
//! 4.  **Clean up**: once the external runner is done,
//!     [`FlowStep::clean`] reclaims ephemeral resources best-effort and
//!     reports per-resource outcomes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowstep::prelude::*;
//!
//! // A minimal tap. Real implementations wrap a file system or store.
//! #[derive(Debug)]
//! struct TextTap {
//!     path: String,
//!     parts: u32,
//! }
//!
//! impl Tap for TextTap {
//!     fn identifier(&self) -> &str {
//!         &self.path
//!     }
//!     fn source_init(&self, conf: &mut JobConf) -> Result<(), TapError> {
//!         conf.set("text.input.dir", self.path.clone());
//!         Ok(())
//!     }
//!     fn sink_init(&self, conf: &mut JobConf) -> Result<(), TapError> {
//!         conf.set("text.output.dir", self.path.clone());
//!         Ok(())
//!     }
//!     fn num_sink_parts(&self) -> u32 {
//!         self.parts
//!     }
//!     fn delete_path(&self, _conf: &JobConf) -> Result<(), TapError> {
//!         std::fs::remove_dir_all(&self.path).map_err(TapError::from)
//!     }
//!     fn descriptor(&self) -> TapDescriptor {
//!         TapDescriptor::new("text", self.path.clone())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Lay out the step graph the planner decided on.
//!     let mut graph = StepGraph::new();
//!     let source = graph.add_element(FlowElement::source_anchor("lines"));
//!     let group = Group::group_by("by-word", "lines", Fields::new(["word"]));
//!     let group_id = graph.add_element(FlowElement::Group(group));
//!     let sink = graph.add_element(FlowElement::sink_anchor("counts"));
//!
//!     graph.connect(source, group_id, Scope::new("lines", Fields::new(["word"])));
//!     graph.connect(group_id, sink, Scope::new("by-word", Fields::new(["word", "count"])));
//!
//!     // 2. Assemble the step with its taps.
//!     let input: TapRef = Arc::new(TextTap { path: "/data/in".into(), parts: 0 });
//!     let output: TapRef = Arc::new(TextTap { path: "/data/out".into(), parts: 4 });
//!
//!     let mut step = FlowStep::builder("word-count", 0)
//!         .graph(graph)
//!         .source(input, "lines")
//!         .sink(output)
//!         .group(group_id)
//!         .build()?;
//!     step.set_parent_flow_name("demo");
//!
//!     // 3. Compile into a submittable job description.
//!     let job = step.compile(None)?;
//!     assert_eq!(job.job_name, "demo[word-count]");
//!     assert_eq!(job.shuffle.reduce_tasks, 4);
//!
//!     // 4. After the external runner finishes, reclaim ephemeral resources.
//!     let report = step.clean(&JobConf::new())?;
//!     assert!(report.is_clean());
//!     Ok(())
//! }
//! ```

pub mod cleanup;
pub mod compiler;
pub mod element;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod record;
pub mod scope;
pub mod step;
pub mod tap;
