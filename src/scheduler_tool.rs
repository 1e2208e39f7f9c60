// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`SchedulerTool`] — the capability a hosting scheduler drives to service
//! a population of tracked substrates (spec.md §5).

use crate::clock::Clock;
use crate::error::TrackerError;
use crate::id::SubstrateId;
use crate::state::{ServiceBasicSjsStateChangeTriggerFlags as Flags, SubstrateJobState, UseState};
use crate::tally::SubstrateStateTally;
use crate::tracker::SubstrateTracker;
use std::collections::HashMap;

/// Capability consumed by a hosting scheduler to own and drive a population
/// of [`SubstrateTracker`]s. Threading, timers, and hosting-side scheduling
/// policy live outside this crate; implementors of this trait are the seam.
pub trait SchedulerTool<C: Clock> {
    /// Opaque capability used to notify the hosting part of events this tool
    /// does not act on directly (e.g. an alarm sink).
    type Notifier;

    fn hosting_part_notifier(&self) -> &Self::Notifier;

    /// Begin tracking a substrate. Fails if one is already tracked under the
    /// same id.
    fn add(&mut self, tracker: SubstrateTracker<C>) -> Result<(), TrackerError>;

    /// Stop tracking a substrate, returning its tracker if one was present.
    fn drop(&mut self, subst_id: &SubstrateId) -> Option<SubstrateTracker<C>>;

    /// Reasons the tool is not ready to move from `base_state` to
    /// `requested_use_state`. Advisory when `requested_use_state` is
    /// `Offline`: callers may proceed despite a non-empty list. Blocking
    /// when `requested_use_state` is online: a non-empty list means the
    /// transition must not proceed. `and_initialize` additionally asks the
    /// tool to (re)initialize its tracked population as part of the
    /// transition once the caller has acted on a clean (empty) result.
    fn verify_use_state_change(
        &self,
        base_state: UseState,
        requested_use_state: UseState,
        and_initialize: bool,
    ) -> Vec<String>;

    /// Drive every tracked substrate's update/drop-reason/SJS-trigger cycle
    /// once, folding results into `tally`. Returns the count of trackers
    /// whose SJS changed this pass. Trigger rules only run while
    /// `base_state.is_online()`; offline, only observation/tally bookkeeping
    /// happens.
    fn service(
        &mut self,
        recent_tracker_change_may_have_occurred: bool,
        tally: &mut SubstrateStateTally,
        base_state: UseState,
    ) -> usize;
}

/// Straightforward in-memory [`SchedulerTool`], analogous to [`crate::clock::SystemClock`]:
/// a default production-shaped implementation, not a test double.
pub struct BasicSchedulerTool<C: Clock, N> {
    trackers: HashMap<SubstrateId, SubstrateTracker<C>>,
    notifier: N,
}

impl<C: Clock, N> BasicSchedulerTool<C, N> {
    pub fn new(notifier: N) -> Self {
        Self { trackers: HashMap::new(), notifier }
    }

    pub fn tracker(&self, subst_id: &SubstrateId) -> Option<&SubstrateTracker<C>> {
        self.trackers.get(subst_id)
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }
}

impl<C: Clock, N> SchedulerTool<C> for BasicSchedulerTool<C, N> {
    type Notifier = N;

    fn hosting_part_notifier(&self) -> &N {
        &self.notifier
    }

    fn add(&mut self, tracker: SubstrateTracker<C>) -> Result<(), TrackerError> {
        let id = tracker.subst_id().clone();
        if self.trackers.contains_key(&id) {
            return Err(TrackerError::InvalidOperation("substrate is already tracked"));
        }
        self.trackers.insert(id, tracker);
        Ok(())
    }

    fn drop(&mut self, subst_id: &SubstrateId) -> Option<SubstrateTracker<C>> {
        self.trackers.remove(subst_id)
    }

    /// Default policy: block going online while any tracked substrate is in
    /// `RoutingAlarm` (it needs operator attention before resuming normal
    /// flow). `and_initialize` is accepted but does not mutate state here —
    /// there is nothing to (re)initialize in this bare in-memory tool beyond
    /// the trackers already present.
    fn verify_use_state_change(
        &self,
        base_state: UseState,
        requested_use_state: UseState,
        _and_initialize: bool,
    ) -> Vec<String> {
        let _ = base_state;
        if !requested_use_state.is_online() {
            return Vec::new();
        }
        self.trackers
            .values()
            .filter(|t| t.sjs() == SubstrateJobState::RoutingAlarm)
            .map(|t| format!("substrate {} is in RoutingAlarm", t.subst_id()))
            .collect()
    }

    fn service(
        &mut self,
        recent_tracker_change_may_have_occurred: bool,
        tally: &mut SubstrateStateTally,
        base_state: UseState,
    ) -> usize {
        let flags = if base_state.is_online() { Flags::ALL } else { Flags::NONE };
        let mut changes = 0usize;
        for tracker in self.trackers.values_mut() {
            tracker.update_if_needed(recent_tracker_change_may_have_occurred);
            tracker.service_drop_reason_assertion();
            changes += tracker.service_basic_sjs_state_change_triggers(flags) as usize;
            tally.add(tracker);
        }
        changes
    }
}

#[cfg(test)]
#[path = "scheduler_tool_tests.rs"]
mod tests;
