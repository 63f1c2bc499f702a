//! Tests for job compilation: shuffle resolution, configuration wiring, and
//! the embedded step context.
mod common;
use common::*;
use flowstep::prelude::*;

#[test]
fn test_ungrouped_step_disables_reducers() {
    let step = linear_step(RecordingTap::source("in"), RecordingTap::sink("out", 4));

    let job = step.compile(None).expect("compilation should succeed");

    assert!(!job.shuffle.has_shuffle);
    assert_eq!(job.shuffle.reduce_tasks, 0);
    assert_eq!(job.shuffle.map_task_hint, Some(4));
    assert_eq!(job.conf.get_int(keys::MAP_TASKS), Some(4));
}

#[test]
fn test_ungrouped_step_without_sink_parts_leaves_parallelism_alone() {
    let step = linear_step(RecordingTap::source("in"), RecordingTap::sink("out", 0));

    let job = step.compile(None).expect("compilation should succeed");

    assert_eq!(job.shuffle.map_task_hint, None);
    assert!(!job.conf.contains(keys::MAP_TASKS));
}

#[test]
fn test_grouped_unsorted_uses_natural_order() {
    let group = Group::group_by("by-key", "A", Fields::new(["key"]));
    let step = grouped_step(RecordingTap::source("in"), RecordingTap::sink("out", 3), group);

    let job = step.compile(None).expect("compilation should succeed");

    assert!(job.shuffle.has_shuffle);
    assert_eq!(job.shuffle.reduce_tasks, 3);
    assert_eq!(job.shuffle.map_output_key, KeyType::Record);
    assert_eq!(job.shuffle.map_output_value, ValueType::Record);
    assert_eq!(job.shuffle.sort_comparator, SortComparator::Natural);
    assert_eq!(job.shuffle.grouping_comparator, None);
    assert_eq!(job.shuffle.partitioner, Partitioner::Hash);
}

#[test]
fn test_grouped_reversed_uses_reverse_comparator() {
    let group = Group::group_by("by-key", "A", Fields::new(["key"])).reversed(true);
    let step = grouped_step(RecordingTap::source("in"), RecordingTap::sink("out", 0), group);

    let job = step.compile(None).expect("compilation should succeed");

    assert_eq!(job.shuffle.sort_comparator, SortComparator::Reverse);
    // 0 sink parts passes through unchanged: the engine decides
    assert_eq!(job.shuffle.reduce_tasks, 0);
    assert!(job.shuffle.has_shuffle);
    assert_eq!(job.shuffle.map_task_hint, None);
}

#[test]
fn test_co_group_tags_values_with_input_index() {
    let group = Group::co_group(
        "merge",
        [
            ("lhs".to_string(), Fields::new(["key"])),
            ("rhs".to_string(), Fields::new(["key"])),
        ],
    );
    let step = grouped_step(RecordingTap::source("in"), RecordingTap::sink("out", 0), group);

    let job = step.compile(None).expect("compilation should succeed");

    assert_eq!(job.shuffle.map_output_value, ValueType::IndexedRecord);
    assert_eq!(job.shuffle.map_output_key, KeyType::Record);
}

#[test]
fn test_secondary_sort_promotes_key_to_pair() {
    let group = Group::group_by("by-key", "A", Fields::new(["key"]))
        .sorted_by([("A".to_string(), Fields::new(["ts"]))]);
    let step = grouped_step(RecordingTap::source("in"), RecordingTap::sink("out", 2), group);

    let job = step.compile(None).expect("compilation should succeed");

    assert_eq!(job.shuffle.map_output_key, KeyType::RecordPair);
    assert_eq!(job.shuffle.sort_comparator, SortComparator::Pair);
    assert_eq!(
        job.shuffle.grouping_comparator,
        Some(GroupingComparator::KeyOnly)
    );
    assert_eq!(job.shuffle.partitioner, Partitioner::GroupingKey);
}

#[test]
fn test_reversed_secondary_sort_uses_reversed_pair_comparator() {
    let step = co_grouped_step(
        RecordingTap::source("lhs"),
        RecordingTap::source("rhs"),
        RecordingTap::sink("out", 2),
        true,
    );

    let job = step.compile(None).expect("compilation should succeed");

    assert_eq!(job.shuffle.map_output_key, KeyType::RecordPair);
    assert_eq!(job.shuffle.sort_comparator, SortComparator::ReversePair);
    assert_eq!(job.shuffle.map_output_value, ValueType::IndexedRecord);
    assert_eq!(job.shuffle.reduce_tasks, 2);
}

#[test]
fn test_properties_cannot_override_wiring() {
    let mut step = linear_step(RecordingTap::source("in"), RecordingTap::sink("out", 0));

    step.properties_mut()
        .insert(keys::STEP_ID.to_string(), "999".to_string());
    step.properties_mut()
        .insert("user.setting".to_string(), "kept".to_string());

    let job = step.compile(None).expect("compilation should succeed");

    // user values are applied first, so compiler-assigned values win
    assert_eq!(job.conf.get_int(keys::STEP_ID), Some(1));
    assert_eq!(job.conf.get("user.setting"), Some("kept"));
}

#[test]
fn test_parent_configuration_is_inherited() {
    let mut parent = JobConf::new();
    parent.set("cluster.queue", "batch");

    let step = linear_step(RecordingTap::source("in"), RecordingTap::sink("out", 0));
    let job = step.compile(Some(&parent)).expect("compilation should succeed");

    assert_eq!(job.conf.get("cluster.queue"), Some("batch"));
    // the parent handle itself is never written to
    assert!(!parent.contains(keys::STEP_ID));
}

#[test]
fn test_step_context_is_embedded() {
    let mut step = linear_step(RecordingTap::source("in"), RecordingTap::sink("out", 0));
    step.set_parent_flow_name("nightly");

    let job = step.compile(None).expect("compilation should succeed");

    assert_eq!(job.job_name, "nightly[linear]");
    assert_eq!(job.conf.get_int(keys::STEP_ID), Some(1));

    let raw = job.conf.get(keys::STEP).expect("snapshot should be embedded");
    let snapshot = StepSnapshot::from_json(raw).expect("snapshot should decode");

    assert_eq!(snapshot.name, "linear");
    assert_eq!(snapshot.id, 1);
    assert_eq!(snapshot.parent_flow_name.as_deref(), Some("nightly"));
    assert_eq!(snapshot.sources.len(), 1);
    assert_eq!(snapshot.elements.len(), 3);
    assert_eq!(snapshot.edges.len(), 2);
}

#[test]
fn test_source_slices_are_tagged_with_their_descriptor() {
    let step = linear_step(RecordingTap::source("in"), RecordingTap::sink("out", 0));

    let job = step.compile(None).expect("compilation should succeed");

    assert_eq!(job.input.slices.len(), 1);
    let slice = &job.input.slices[0];

    assert_eq!(slice.name, "A");
    assert_eq!(slice.descriptor.identifier, "in");
    assert!(slice.conf.contains(keys::STEP_SOURCE));
    assert!(slice.conf.contains("tap.in.input"));

    // per-slice keys never leak into the main configuration
    assert!(!job.conf.contains(keys::STEP_SOURCE));
    assert!(!job.conf.contains("tap.in.input"));
}

#[test]
fn test_trap_contexts_do_not_pollute_the_main_configuration() {
    let trap = RecordingTap::sink("rejects", 0);
    let source = RecordingTap::source("in");
    let sink = RecordingTap::sink("out", 0);

    let mut graph = StepGraph::new();
    let src = graph.add_element(FlowElement::source_anchor("A"));
    let snk = graph.add_element(FlowElement::sink_anchor("B"));
    graph.connect(src, snk, Scope::new("A", Fields::new(["line"])));

    let step = FlowStep::builder("trapped", 7)
        .graph(graph)
        .source(source, "A")
        .sink(sink)
        .mapper_trap("parse-errors", trap)
        .build()
        .expect("step should build");

    let job = step.compile(None).expect("compilation should succeed");

    assert_eq!(job.mapper_traps.len(), 1);
    assert!(job.reducer_traps.is_empty());

    let plan = &job.mapper_traps[0];
    assert_eq!(plan.name, "parse-errors");
    assert!(plan.conf.contains("tap.rejects.output"));
    assert!(!job.conf.contains("tap.rejects.output"));

    // traps never join the primary source/sink accounting
    assert_eq!(job.input.slices.len(), 1);
    assert_eq!(job.sink.identifier, "out");
}

#[test]
fn test_sink_init_failure_aborts_compilation() {
    let step = linear_step(RecordingTap::source("in"), RecordingTap::failing_sink_init("out"));

    match step.compile(None) {
        Err(CompileError::SinkInit { identifier, .. }) => assert_eq!(identifier, "out"),
        other => panic!("expected SinkInit error, got {other:?}"),
    }
}

#[test]
fn test_custom_comparators_are_propagated() {
    let grouping = Fields::new(["key"]).with_comparators(["long"]);
    let sorting = Fields::new(["ts"]).with_comparators(["reverse-long"]);

    let group = Group::group_by("by-key", "A", grouping)
        .sorted_by([("A".to_string(), sorting)]);
    let step = grouped_step(RecordingTap::source("in"), RecordingTap::sink("out", 0), group);

    let job = step.compile(None).expect("compilation should succeed");

    let raw = job
        .conf
        .get(keys::GROUP_COMPARATOR)
        .expect("grouping comparator should be serialized");
    assert!(raw.contains("long"));

    let raw = job
        .conf
        .get(keys::SORT_COMPARATOR)
        .expect("sorting comparator should be serialized");
    assert!(raw.contains("reverse-long"));
}

#[test]
fn test_natural_ordering_needs_no_comparator_entry() {
    let group = Group::group_by("by-key", "A", Fields::new(["key"]));
    let step = grouped_step(RecordingTap::source("in"), RecordingTap::sink("out", 0), group);

    let job = step.compile(None).expect("compilation should succeed");

    assert!(!job.conf.contains(keys::GROUP_COMPARATOR));
    assert!(!job.conf.contains(keys::SORT_COMPARATOR));
}

#[test]
fn test_record_codec_is_registered() {
    let step = linear_step(RecordingTap::source("in"), RecordingTap::sink("out", 0));

    let job = step.compile(None).expect("compilation should succeed");

    assert_eq!(job.conf.get(keys::SERIALIZATIONS), Some(RECORD_TYPE_TAG));
    assert_eq!(job.output_type, RECORD_TYPE_TAG);
}
