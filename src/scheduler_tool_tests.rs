// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::FakeClock;
use crate::observer::SubstInfo;
use crate::state::{SubstProcState, SubstTransportState, SubstrateJobState, UseState};
use crate::test_support::{FakeObjectStore, FakePublisher, FakeTableUpdater};
use crate::tracker::TrackerConfig;
use std::sync::Arc;

fn make_tracker(id: &str, info: SubstInfo) -> SubstrateTracker<FakeClock> {
    let store = FakeObjectStore::with_publisher(FakePublisher::new(info));
    let updater = Arc::new(FakeTableUpdater::default());
    SubstrateTracker::setup(SubstrateId::from_name(id), &store, updater, FakeClock::new(), TrackerConfig::default())
        .unwrap()
}

#[test]
fn add_then_lookup_round_trips() {
    let mut tool = BasicSchedulerTool::new(());
    tool.add(make_tracker("W1", SubstInfo::default())).unwrap();
    assert_eq!(tool.len(), 1);
    assert!(tool.tracker(&SubstrateId::from_name("W1")).is_some());
}

#[test]
fn add_rejects_duplicate_id() {
    let mut tool = BasicSchedulerTool::new(());
    tool.add(make_tracker("W1", SubstInfo::default())).unwrap();
    let err = tool.add(make_tracker("W1", SubstInfo::default())).unwrap_err();
    assert!(matches!(err, TrackerError::InvalidOperation(_)));
}

#[test]
fn drop_removes_and_returns_tracker() {
    let mut tool = BasicSchedulerTool::new(());
    tool.add(make_tracker("W1", SubstInfo::default())).unwrap();
    let removed = tool.drop(&SubstrateId::from_name("W1"));
    assert!(removed.is_some());
    assert!(tool.is_empty());
}

#[test]
fn verify_use_state_change_is_empty_when_nothing_alarmed() {
    let mut tool = BasicSchedulerTool::new(());
    tool.add(make_tracker("W1", SubstInfo::default())).unwrap();
    let reasons = tool.verify_use_state_change(UseState::Offline, UseState::OnlineLocal, false);
    assert!(reasons.is_empty());
}

#[test]
fn verify_use_state_change_blocks_going_online_with_routing_alarm() {
    let mut tracker = make_tracker("W1", SubstInfo::default());
    // RoutingAlarm is reachable only via direct assignment here — it has no
    // §4.3 trigger path in this crate's scope, matching spec.md's notion of
    // an externally-raised alarm condition.
    tracker.set_substrate_job_state(SubstrateJobState::RoutingAlarm, "alarm raised", true).unwrap();
    let mut tool = BasicSchedulerTool::new(());
    tool.add(tracker).unwrap();

    let reasons = tool.verify_use_state_change(UseState::Offline, UseState::OnlineRemote, false);
    assert_eq!(reasons.len(), 1);
    assert!(reasons[0].contains("RoutingAlarm"));
}

#[test]
fn verify_use_state_change_is_advisory_only_when_going_offline() {
    let mut tracker = make_tracker("W1", SubstInfo::default());
    tracker.set_substrate_job_state(SubstrateJobState::RoutingAlarm, "alarm raised", true).unwrap();
    let mut tool = BasicSchedulerTool::new(());
    tool.add(tracker).unwrap();

    let reasons = tool.verify_use_state_change(UseState::OnlineLocal, UseState::Offline, false);
    assert!(reasons.is_empty());
}

#[test]
fn service_drives_sjs_triggers_and_fills_tally() {
    let mut tool = BasicSchedulerTool::new(());
    let mut info = SubstInfo::default();
    info.sts = SubstTransportState::AtWork;
    info.sps = SubstProcState::NeedsProcessing;
    tool.add(make_tracker("W1", info)).unwrap();

    let mut tally = SubstrateStateTally::new();
    tool.service(true, &mut tally, UseState::OnlineLocal);
    assert_eq!(tally.total(), 1);
}

#[test]
fn service_does_not_drive_sjs_triggers_while_offline() {
    let mut tool = BasicSchedulerTool::new(());
    let mut info = SubstInfo::default();
    info.sts = SubstTransportState::AtWork;
    info.sjrs = crate::state::SubstJobRequestState::Run;
    tool.add(make_tracker("W1", info)).unwrap();

    let mut tally = SubstrateStateTally::new();
    let changes = tool.service(true, &mut tally, UseState::Offline);
    assert_eq!(changes, 0);
    assert_eq!(tool.tracker(&SubstrateId::from_name("W1")).unwrap().sjs(), SubstrateJobState::WaitingForStart);
}
