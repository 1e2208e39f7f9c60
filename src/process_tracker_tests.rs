// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::FakeClock;
use crate::id::SubstrateId;
use crate::observer::{SubstInfo, UpdateItem};
use crate::process_spec::{NamedValues, ProcessStepResult, ProcessStepTemplate};
use crate::test_support::{FakeObjectStore, FakePublisher, FakeTableUpdater};
use crate::tracker::TrackerConfig;

fn spec_with_steps(n: usize) -> ProcessSpec {
    let templates = (0..n)
        .map(|_| ProcessStepTemplate::new(vec!["LP1".to_string()], NamedValues::new()))
        .collect();
    ProcessSpec::new("recipe", NamedValues::new(), templates).unwrap()
}

fn tracker_with_info(info: SubstInfo) -> (SubstrateTracker<FakeClock>, Arc<FakeTableUpdater>) {
    let store = FakeObjectStore::with_publisher(FakePublisher::new(info));
    let updater = Arc::new(FakeTableUpdater::default());
    let tracker = SubstrateTracker::setup(
        SubstrateId::from_name("W1"),
        &store,
        updater.clone(),
        FakeClock::new(),
        TrackerConfig::default(),
    )
    .unwrap();
    (tracker, updater)
}

#[test]
fn next_step_spec_follows_recipe_order() {
    let spec = spec_with_steps(2);
    let (tracker, _updater) = tracker_with_info(SubstInfo::default());
    let pt = SubstrateAndProcessTracker::new(tracker, spec.clone());
    assert_eq!(pt.next_step_spec().unwrap().step_num(), 1);
}

#[test]
fn add_with_auto_advance_shrinks_remaining_list() {
    let spec = spec_with_steps(2);
    let (tracker, _updater) = tracker_with_info(SubstInfo::default());
    let mut pt = SubstrateAndProcessTracker::new(tracker, spec.clone());
    let step = spec.steps()[0].clone();
    let item = ProcessStepTrackerResultItem {
        loc_name: "LP1".to_string(),
        step_spec: step,
        step_result: ProcessStepResult::new("", SubstProcState::Undefined),
    };
    pt.add(item, true, false).unwrap();
    assert_eq!(pt.remaining_step_spec_list().len(), 1);
    assert_eq!(pt.tracker_step_result_list().len(), 1);
}

#[test]
fn add_without_auto_advance_leaves_remaining_list_untouched() {
    let spec = spec_with_steps(1);
    let (tracker, _updater) = tracker_with_info(SubstInfo::default());
    let mut pt = SubstrateAndProcessTracker::new(tracker, spec.clone());
    let step = spec.steps()[0].clone();
    let item = ProcessStepTrackerResultItem {
        loc_name: "LP1".to_string(),
        step_spec: step,
        step_result: ProcessStepResult::new("", SubstProcState::Undefined),
    };
    pt.add(item, false, false).unwrap();
    assert_eq!(pt.remaining_step_spec_list().len(), 1);
}

#[test]
fn compute_final_sps_merges_successful_steps_to_processed() {
    let spec = spec_with_steps(2);
    let (tracker, _updater) = tracker_with_info(SubstInfo::default());
    let mut pt = SubstrateAndProcessTracker::new(tracker, spec.clone());
    for step in spec.steps() {
        let item = ProcessStepTrackerResultItem {
            loc_name: "LP1".to_string(),
            step_spec: step.clone(),
            step_result: ProcessStepResult::new("", SubstProcState::Undefined),
        };
        pt.add(item, true, false).unwrap();
    }
    assert_eq!(pt.compute_final_sps(), SubstProcState::Processed);
}

#[test]
fn compute_final_sps_keeps_terminal_failing_result() {
    let spec = spec_with_steps(2);
    let (tracker, _updater) = tracker_with_info(SubstInfo::default());
    let mut pt = SubstrateAndProcessTracker::new(tracker, spec.clone());
    let ok_item = ProcessStepTrackerResultItem {
        loc_name: "LP1".to_string(),
        step_spec: spec.steps()[0].clone(),
        step_result: ProcessStepResult::new("", SubstProcState::Undefined),
    };
    let failed_item = ProcessStepTrackerResultItem {
        loc_name: "LP1".to_string(),
        step_spec: spec.steps()[1].clone(),
        step_result: ProcessStepResult::new("E042", SubstProcState::Undefined),
    };
    pt.add(ok_item, true, false).unwrap();
    pt.add(failed_item, true, false).unwrap();
    assert_eq!(pt.compute_final_sps(), SubstProcState::Rejected);
}

#[test]
fn auto_latch_submits_sps_update_once_steps_exhausted() {
    let spec = spec_with_steps(1);
    let (tracker, updater) = tracker_with_info(SubstInfo::default());
    let mut pt = SubstrateAndProcessTracker::new(tracker, spec.clone());
    updater.clear();
    let item = ProcessStepTrackerResultItem {
        loc_name: "LP1".to_string(),
        step_spec: spec.steps()[0].clone(),
        step_result: ProcessStepResult::new("", SubstProcState::Undefined),
    };
    pt.add(item, true, true).unwrap();
    let batches = updater.submitted();
    assert_eq!(batches.len(), 1);
    assert!(matches!(
        batches[0][0],
        UpdateItem::SpsUpdate { sps: SubstProcState::Processed, .. }
    ));
}
