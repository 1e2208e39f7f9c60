// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`SubstrateAndProcessTracker`] — a [`SubstrateTracker`] layered with
//! recipe-step bookkeeping (spec.md §5).

use crate::clock::Clock;
use crate::error::TrackerError;
use crate::observer::UpdateBehavior;
use crate::process_spec::{ProcessSpec, ProcessStepSpec, ProcessStepTrackerResultItem};
use crate::state::SubstProcState;
use crate::tracker::SubstrateTracker;
use std::sync::Arc;

/// Layers recipe-step tracking on top of a [`SubstrateTracker`]: the
/// remaining steps to run and the results recorded for completed ones.
pub struct SubstrateAndProcessTracker<C: Clock> {
    tracker: SubstrateTracker<C>,
    process_spec: ProcessSpec,
    remaining_step_spec_list: Vec<Arc<ProcessStepSpec>>,
    tracker_step_result_list: Vec<ProcessStepTrackerResultItem>,
}

impl<C: Clock> SubstrateAndProcessTracker<C> {
    pub fn new(tracker: SubstrateTracker<C>, process_spec: ProcessSpec) -> Self {
        let remaining_step_spec_list = process_spec.steps().to_vec();
        Self { tracker, process_spec, remaining_step_spec_list, tracker_step_result_list: Vec::new() }
    }

    pub fn tracker(&self) -> &SubstrateTracker<C> {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut SubstrateTracker<C> {
        &mut self.tracker
    }

    pub fn process_spec(&self) -> &ProcessSpec {
        &self.process_spec
    }

    pub fn remaining_step_spec_list(&self) -> &[Arc<ProcessStepSpec>] {
        &self.remaining_step_spec_list
    }

    pub fn tracker_step_result_list(&self) -> &[ProcessStepTrackerResultItem] {
        &self.tracker_step_result_list
    }

    /// The next step to run, in recipe order. `None` once every step has
    /// been recorded.
    pub fn next_step_spec(&self) -> Option<&Arc<ProcessStepSpec>> {
        self.remaining_step_spec_list.first()
    }

    /// Record a completed step's result.
    ///
    /// When `auto_advance` is set, the head of `remaining_step_spec_list` is
    /// removed (spec.md §4.5: the list only ever shrinks from the front, in
    /// recipe order — not a search for `item.step_spec`). When
    /// `auto_latch_final_sps` is set and that removal empties the list,
    /// [`Self::compute_final_sps`] is submitted as a standalone SPS update
    /// through the underlying tracker.
    pub fn add(
        &mut self,
        item: ProcessStepTrackerResultItem,
        auto_advance: bool,
        auto_latch_final_sps: bool,
    ) -> Result<(), TrackerError> {
        if auto_advance && !self.remaining_step_spec_list.is_empty() {
            self.remaining_step_spec_list.remove(0);
        }
        self.tracker_step_result_list.push(item);

        if auto_advance && auto_latch_final_sps && self.remaining_step_spec_list.is_empty() {
            let final_sps = self.compute_final_sps();
            self.tracker.submit_sps_update(
                final_sps,
                UpdateBehavior::STANDARD_SPS_UPDATE | UpdateBehavior::BASIC_SPS_LISTS,
            )?;
        }
        Ok(())
    }

    /// Left-to-right SPS-merge reduction over recorded step results,
    /// starting from the observer's current `inferred_sps` (spec.md §8
    /// SPS-merge-associativity), collapsing a fully-succeeded run's
    /// `ProcessStepCompleted` into `Processed`.
    pub fn compute_final_sps(&self) -> SubstProcState {
        let merged = self
            .tracker_step_result_list
            .iter()
            .fold(self.tracker.info().inferred_sps, |acc, item| acc.merge(item.step_result.sps));
        if merged == SubstProcState::ProcessStepCompleted {
            SubstProcState::Processed
        } else {
            merged
        }
    }
}

#[cfg(test)]
#[path = "process_tracker_tests.rs"]
mod tests;
