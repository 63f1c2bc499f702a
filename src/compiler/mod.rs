//! Renders a planned step into a submittable physical job description.
//!
//! The compiler assembles configuration, identity, sources, sink, traps, and
//! the shuffle plan in a fixed order: user properties are applied first so
//! compiler-assigned values always win, and the step's own id and snapshot
//! are embedded last so nothing upstream can be reached back into.

use std::fs;
use std::path::Path;

use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};

use crate::error::{CompileError, SnapshotError};
use crate::record::{self, Fields, RECORD_TYPE_TAG};
use crate::step::{FlowStep, StepSnapshot};
use crate::tap::{TapDescriptor, TapRef};

pub mod conf;
pub mod shuffle;

pub use conf::{JobConf, keys};
pub use shuffle::ShufflePlan;

/// Tag the engine uses to locate the map-side per-record entry point.
pub const MAP_ENTRY: &str = "flow-mapper";
/// Tag the engine uses to locate the reduce-side per-record entry point.
pub const REDUCE_ENTRY: &str = "flow-reducer";

/// One initialized source slice of the combined job input, tagged with the
/// descriptor of the tap that will produce its splits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSlice {
    pub name: String,
    pub descriptor: TapDescriptor,
    pub conf: JobConf,
}

/// The combined multi-source input description: one slice per source tap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiInputPlan {
    pub slices: Vec<InputSlice>,
}

/// An initialized per-phase trap sink, wired into an auxiliary context
/// derived from the main job configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrapPlan {
    pub name: String,
    pub descriptor: TapDescriptor,
    pub conf: JobConf,
}

/// The submittable physical description of one step's job. This is the
/// stable contract handed to the external step runner; tap-specific wire
/// formats stay outside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptor {
    /// Job identity: `"<parentFlow>[<stepName>]"`.
    pub job_name: String,
    /// Uniform record type tag for both map-side and shuffle-side output.
    pub output_type: String,
    pub map_entry: String,
    pub reduce_entry: String,
    pub input: MultiInputPlan,
    /// Sink descriptor, captured after sink initialization.
    pub sink: TapDescriptor,
    pub mapper_traps: Vec<TrapPlan>,
    pub reducer_traps: Vec<TrapPlan>,
    pub shuffle: ShufflePlan,
    pub conf: JobConf,
}

impl JobDescriptor {
    /// Saves this description to a file in the bincode format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let bytes = encode_to_vec(self, standard())
            .map_err(|err| SnapshotError::Encode(err.to_string()))?;
        fs::write(path, bytes).map_err(|err| SnapshotError::Encode(err.to_string()))
    }

    /// Loads a previously saved description.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let bytes =
            fs::read(path).map_err(|err| SnapshotError::Decode(err.to_string()))?;
        let (descriptor, _) = decode_from_slice(&bytes, standard())
            .map_err(|err| SnapshotError::Decode(err.to_string()))?;
        Ok(descriptor)
    }
}

impl FlowStep {
    /// Compiles this step into a physical job description, starting from
    /// `parent` when one is supplied.
    ///
    /// Fails if any source, sink, or trap refuses to initialize; no partial
    /// description is returned in that case.
    pub fn compile(&self, parent: Option<&JobConf>) -> Result<JobDescriptor, CompileError> {
        let log = self.log();

        let mut conf = parent.map(JobConf::derived).unwrap_or_default();

        // set user values first so they can't break things downstream
        if let Some(properties) = self.properties() {
            conf.merge(properties.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        let job_name = self.step_name();
        log.info(format!("compiling step '{job_name}'"));

        // register the record codec before any comparator wiring
        record::register_serializations(&mut conf);

        let input = self.init_sources(&conf)?;
        self.init_sink(&mut conf)?;
        let mapper_traps = init_traps(&conf, "mapper", self.mapper_traps())?;
        let reducer_traps = init_traps(&conf, "reducer", self.reducer_traps())?;

        let shuffle = shuffle::resolve(self.group(), self.sink().num_sink_parts());

        if let Some(hint) = shuffle.map_task_hint {
            // no reducers: the sink's desired parts drive map-side tasks
            conf.set_int(keys::MAP_TASKS, i64::from(hint));
        }

        if let Some(group) = self.group() {
            log.debug(format!(
                "grouping over {} input(s), sorted: {}, reversed: {}",
                group.num_inputs(),
                group.is_sorted(),
                group.is_sort_reversed()
            ));

            add_comparators(&mut conf, keys::GROUP_COMPARATOR, group.grouping_selectors())?;

            if group.is_group_by() {
                if let Some(sorting) = group.sorting_selectors() {
                    add_comparators(&mut conf, keys::SORT_COMPARATOR, sorting)?;
                }
            }
        }

        // perform last so everything set above reaches the remote tasks intact
        conf.set_int(keys::STEP_ID, i64::from(self.id()));
        conf.set(keys::STEP, StepSnapshot::capture(self).to_json()?);

        Ok(JobDescriptor {
            job_name,
            output_type: RECORD_TYPE_TAG.to_string(),
            map_entry: MAP_ENTRY.to_string(),
            reduce_entry: REDUCE_ENTRY.to_string(),
            input,
            sink: self.sink().descriptor(),
            mapper_traps,
            reducer_traps,
            shuffle,
            conf,
        })
    }

    fn init_sources(&self, base: &JobConf) -> Result<MultiInputPlan, CompileError> {
        let mut slices = Vec::new();

        for (tap, name) in self.sources() {
            let mut slice_conf = base.derived();

            tap.source_init(&mut slice_conf)
                .map_err(|source| CompileError::SourceInit {
                    name: name.to_string(),
                    source,
                })?;

            let descriptor = tap.descriptor();
            let raw = serde_json::to_string(&descriptor)
                .map_err(|err| SnapshotError::Encode(err.to_string()))?;
            slice_conf.set(keys::STEP_SOURCE, raw);

            slices.push(InputSlice {
                name: name.to_string(),
                descriptor,
                conf: slice_conf,
            });
        }

        Ok(MultiInputPlan { slices })
    }

    fn init_sink(&self, conf: &mut JobConf) -> Result<(), CompileError> {
        let sink = self.sink();

        sink.sink_init(conf).map_err(|source| CompileError::SinkInit {
            identifier: sink.identifier().to_string(),
            source,
        })
    }
}

fn init_traps<'a>(
    base: &JobConf,
    phase: &'static str,
    traps: impl Iterator<Item = (&'a str, &'a TapRef)>,
) -> Result<Vec<TrapPlan>, CompileError> {
    let mut plans = Vec::new();

    for (name, tap) in traps {
        let mut trap_conf = base.derived();

        tap.sink_init(&mut trap_conf)
            .map_err(|source| CompileError::TrapInit {
                phase,
                name: name.to_string(),
                source,
            })?;

        plans.push(TrapPlan {
            name: name.to_string(),
            descriptor: tap.descriptor(),
            conf: trap_conf,
        });
    }

    Ok(plans)
}

/// Serializes the first selector into the configuration when it carries
/// custom comparators; natural ordering needs no entry.
fn add_comparators(
    conf: &mut JobConf,
    key: &str,
    selectors: &[(String, Fields)],
) -> Result<(), CompileError> {
    let Some((_, fields)) = selectors.first() else {
        return Ok(());
    };

    if fields.has_comparators() {
        let raw = serde_json::to_string(fields)
            .map_err(|err| SnapshotError::Encode(err.to_string()))?;
        conf.set(key, raw);
    }

    Ok(())
}
