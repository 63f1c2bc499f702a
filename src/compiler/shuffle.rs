//! Resolves a step's optional grouping boundary into the physical shuffle
//! decisions: key and value classes, comparators, partitioner, and the
//! reducer count.

use serde::{Deserialize, Serialize};

use crate::element::Group;
use crate::record::{GroupingComparator, KeyType, Partitioner, SortComparator, ValueType};

/// The physical decisions the shuffle phase of a job is wired with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShufflePlan {
    /// Whether the job has a shuffle phase at all. Without one, map output is
    /// the step's final output.
    pub has_shuffle: bool,
    /// Explicit reducer count. 0 without a shuffle means reducers are
    /// disabled; 0 with a shuffle leaves the count to the execution engine.
    pub reduce_tasks: u32,
    /// Map-side task count hint; only meaningful when the shuffle is
    /// disabled.
    pub map_task_hint: Option<u32>,
    pub map_output_key: KeyType,
    pub map_output_value: ValueType,
    pub sort_comparator: SortComparator,
    pub grouping_comparator: Option<GroupingComparator>,
    pub partitioner: Partitioner,
}

/// Derives the shuffle plan from the step's optional grouping boundary and
/// the sink's desired partition count.
pub fn resolve(group: Option<&Group>, num_sink_parts: u32) -> ShufflePlan {
    let Some(group) = group else {
        // no grouping boundary: reducers disabled, the sink's desired parts
        // drive map-side parallelism instead
        return ShufflePlan {
            has_shuffle: false,
            reduce_tasks: 0,
            map_task_hint: (num_sink_parts != 0).then_some(num_sink_parts),
            map_output_key: KeyType::Record,
            map_output_value: ValueType::Record,
            sort_comparator: SortComparator::Natural,
            grouping_comparator: None,
            partitioner: Partitioner::Hash,
        };
    };

    let mut plan = ShufflePlan {
        has_shuffle: true,
        reduce_tasks: num_sink_parts,
        map_task_hint: None,
        map_output_key: KeyType::Record,
        map_output_value: if group.is_group_by() {
            ValueType::Record
        } else {
            ValueType::IndexedRecord
        },
        sort_comparator: if group.is_sort_reversed() {
            SortComparator::Reverse
        } else {
            SortComparator::Natural
        },
        grouping_comparator: None,
        partitioner: Partitioner::Hash,
    };

    if group.is_sorted() {
        plan.partitioner = Partitioner::GroupingKey;
        plan.map_output_key = KeyType::RecordPair;

        plan.sort_comparator = if group.is_sort_reversed() {
            SortComparator::ReversePair
        } else {
            SortComparator::Pair
        };

        // no reverse variant needed here, only equality is checked
        plan.grouping_comparator = Some(GroupingComparator::KeyOnly);
    }

    plan
}
