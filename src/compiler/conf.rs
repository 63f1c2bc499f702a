//! String-keyed job configuration, the substrate every collaborator writes
//! into.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Reserved configuration keys consumed by remote tasks.
pub mod keys {
    /// The numeric id of the step that produced the job.
    pub const STEP_ID: &str = "flowstep.step.id";
    /// The JSON-encoded snapshot of the step itself, for remote rehydration.
    pub const STEP: &str = "flowstep.step";
    /// Per-source-slice descriptor of the tap that produced the split.
    pub const STEP_SOURCE: &str = "flowstep.step.source";
    /// Serialized grouping selector when it carries custom comparators.
    pub const GROUP_COMPARATOR: &str = "flowstep.group.comparator";
    /// Serialized sorting selector when it carries custom comparators.
    pub const SORT_COMPARATOR: &str = "flowstep.sort.comparator";
    /// Map-side task count hint; only meaningful without a shuffle phase.
    pub const MAP_TASKS: &str = "flowstep.map.tasks";
    /// Registered record codecs, consumed by the shuffle phase.
    pub const SERIALIZATIONS: &str = "flowstep.serializations";
}

/// Mutable key/value configuration handed to taps during initialization and
/// embedded in the compiled job description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobConf {
    entries: AHashMap<String, String>,
}

impl JobConf {
    pub fn new() -> Self {
        Self::default()
    }

    /// A child configuration seeded from this one. Used for trap and
    /// per-source contexts so their keys never pollute the parent.
    pub fn derived(&self) -> JobConf {
        self.clone()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn set_int(&mut self, key: impl Into<String>, value: i64) {
        self.set(key, value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key)?.parse().ok()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Copies every entry of a user-supplied property map into this
    /// configuration.
    pub fn merge<I, K, V>(&mut self, properties: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in properties {
            self.set(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}
