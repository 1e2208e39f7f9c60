// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::FakeClock;
use crate::id::SubstrateId;
use crate::observer::SubstInfo;
use crate::test_support::{FakeObjectStore, FakePublisher, FakeTableUpdater};
use crate::tracker::TrackerConfig;
use proptest::prelude::*;
use std::sync::Arc;

fn tracker_at(sjs: SubstrateJobState, info: SubstInfo) -> SubstrateTracker<FakeClock> {
    let store = FakeObjectStore::with_publisher(FakePublisher::new(info));
    let updater = Arc::new(FakeTableUpdater::default());
    let mut tracker = SubstrateTracker::setup(
        SubstrateId::from_name("W1"),
        &store,
        updater,
        FakeClock::new(),
        TrackerConfig::default(),
    )
    .unwrap();
    if sjs != SubstrateJobState::WaitingForStart {
        tracker.set_substrate_job_state(sjs, "test setup", true).unwrap();
    }
    tracker
}

#[test]
fn add_accumulates_sts_sps_sjs_counts() {
    let mut tally = SubstrateStateTally::new();
    let mut info = SubstInfo::default();
    info.sts = SubstTransportState::AtWork;
    info.inferred_sps = SubstProcState::InProcess;
    let tracker = tracker_at(SubstrateJobState::WaitingForStart, info);
    tally.add(&tracker);

    assert_eq!(tally.sts_count(SubstTransportState::AtWork), 1);
    assert_eq!(tally.sps_count(SubstProcState::InProcess), 1);
    assert_eq!(tally.sjs_count(SubstrateJobState::WaitingForStart), 1);
    assert_eq!(tally.total(), 1);
}

#[test]
fn render_omits_zero_buckets() {
    let mut tally = SubstrateStateTally::new();
    let mut info = SubstInfo::default();
    info.sts = SubstTransportState::AtSource;
    let tracker = tracker_at(SubstrateJobState::WaitingForStart, info);
    tally.add(&tracker);

    let rendered = tally.render();
    assert!(rendered.contains("AtSource=1"));
    assert!(!rendered.contains("AtWork="));
    assert!(!rendered.contains("AtDestination="));
}

#[test]
fn lost_and_removed_contribute_to_combined_bucket() {
    let mut tally = SubstrateStateTally::new();
    let mut lost = SubstInfo::default();
    lost.sps = SubstProcState::Lost;
    let mut removed = SubstInfo::default();
    removed.is_final = true;
    tally.add(&tracker_at(SubstrateJobState::Lost, lost));
    tally.add(&tracker_at(SubstrateJobState::Removed, removed));
    tally.add(&tracker_at(SubstrateJobState::Processed, SubstInfo::default()));

    assert_eq!(tally.lost_anywhere, 1);
    assert_eq!(tally.removed_anywhere, 1);
    assert_eq!(tally.lost_or_removed_anywhere, 2);
    assert_eq!(tally.total(), 3);
}

#[test]
fn aborted_at_destination_bucket_requires_both_conditions() {
    let mut tally = SubstrateStateTally::new();
    let mut at_dest = SubstInfo::default();
    at_dest.sts = SubstTransportState::AtDestination;
    tally.add(&tracker_at(SubstrateJobState::Aborting, at_dest));

    let mut elsewhere = SubstInfo::default();
    elsewhere.sts = SubstTransportState::AtWork;
    tally.add(&tracker_at(SubstrateJobState::Aborting, elsewhere));

    assert_eq!(tally.aborted_at_destination, 1);
}

proptest! {
    #[test]
    fn tally_conservation_holds_over_arbitrary_populations(
        lost_count in 0usize..5,
        removed_count in 0usize..5,
        processed_count in 0usize..5,
    ) {
        let mut tally = SubstrateStateTally::new();
        for _ in 0..lost_count {
            let mut info = SubstInfo::default();
            info.sps = SubstProcState::Lost;
            tally.add(&tracker_at(SubstrateJobState::Lost, info));
        }
        for _ in 0..removed_count {
            let mut info = SubstInfo::default();
            info.is_final = true;
            tally.add(&tracker_at(SubstrateJobState::Removed, info));
        }
        for _ in 0..processed_count {
            tally.add(&tracker_at(SubstrateJobState::Processed, SubstInfo::default()));
        }

        prop_assert_eq!(tally.lost_anywhere, lost_count as u32);
        prop_assert_eq!(tally.removed_anywhere, removed_count as u32);
        prop_assert_eq!(tally.lost_or_removed_anywhere, (lost_count + removed_count) as u32);
        prop_assert_eq!(tally.total(), (lost_count + removed_count + processed_count) as u32);
    }
}
