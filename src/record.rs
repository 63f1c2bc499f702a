use std::fmt;

use serde::{Deserialize, Serialize};

use crate::compiler::conf::{JobConf, keys};

/// The uniform record type tag a compiled job carries for both its map-side
/// and shuffle-side output.
pub const RECORD_TYPE_TAG: &str = "record";

/// An ordered selection of field names, optionally carrying a custom
/// comparator identifier per selected field.
///
/// A selector with no comparators falls back to the natural record ordering.
/// Comparator identifiers are opaque to this crate; they are serialized into
/// the job configuration for the execution engine to resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fields {
    names: Vec<String>,
    comparators: Vec<String>,
}

impl Fields {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            comparators: Vec::new(),
        }
    }

    /// Attaches custom comparator identifiers to this selector.
    pub fn with_comparators<I, S>(mut self, comparators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.comparators = comparators.into_iter().map(Into::into).collect();
        self
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn comparators(&self) -> &[String] {
        &self.comparators
    }

    pub fn has_comparators(&self) -> bool {
        !self.comparators.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl fmt::Display for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.names.join(", "))
    }
}

/// Key class selected for the map output of a shuffling job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyType {
    /// A plain record keyed by the grouping fields.
    Record,
    /// A compound (group-key, sort-key) pair, used when a secondary sort was
    /// requested.
    RecordPair,
}

/// Value class selected for the map output of a shuffling job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    Record,
    /// A record tagged with the index of the logical input it came from, so
    /// the reduce phase can demultiplex co-grouped inputs merged on one key.
    IndexedRecord,
}

/// Comparator used to order records within a partition before reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortComparator {
    Natural,
    Reverse,
    /// Orders compound (group-key, sort-key) pairs.
    Pair,
    ReversePair,
}

/// Comparator that decides which records share a reduce invocation. Equality
/// only; it carries no ordering semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupingComparator {
    /// Compares the group-key component alone, ignoring any sort key.
    KeyOnly,
}

/// Partitioner routing map output to reducers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Partitioner {
    /// Hash of the full key.
    Hash,
    /// Hash of the group-key component only, so secondary-sorted pairs with
    /// the same group key land on the same reducer.
    GroupingKey,
}

/// Records the record-codec registration in the configuration. Must run
/// before any comparator wiring so the shuffle phase can resolve the codec.
pub fn register_serializations(conf: &mut JobConf) {
    conf.set(keys::SERIALIZATIONS, RECORD_TYPE_TAG);
}
