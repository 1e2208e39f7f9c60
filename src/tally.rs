// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`SubstrateStateTally`] — aggregate STS/SPS/SJS counts across a set of
//! trackers (spec.md §4.8, §8 Tally Conservation).

use crate::clock::Clock;
use crate::state::{SubstProcState, SubstTransportState, SubstrateJobState};
use crate::tracker::SubstrateTracker;

const ALL_STS: [SubstTransportState; 4] = [
    SubstTransportState::AtSource,
    SubstTransportState::AtWork,
    SubstTransportState::AtDestination,
    SubstTransportState::Other,
];

const ALL_SPS: [SubstProcState; 10] = [
    SubstProcState::NeedsProcessing,
    SubstProcState::InProcess,
    SubstProcState::ProcessStepCompleted,
    SubstProcState::Processed,
    SubstProcState::Stopped,
    SubstProcState::Rejected,
    SubstProcState::Aborted,
    SubstProcState::Skipped,
    SubstProcState::Lost,
    SubstProcState::Undefined,
];

const ALL_SJS: [SubstrateJobState; 18] = [
    SubstrateJobState::Initial,
    SubstrateJobState::WaitingForStart,
    SubstrateJobState::Running,
    SubstrateJobState::Pausing,
    SubstrateJobState::Paused,
    SubstrateJobState::Stopping,
    SubstrateJobState::Stopped,
    SubstrateJobState::Aborting,
    SubstrateJobState::Aborted,
    SubstrateJobState::Processed,
    SubstrateJobState::Rejected,
    SubstrateJobState::Skipped,
    SubstrateJobState::Lost,
    SubstrateJobState::Returning,
    SubstrateJobState::Returned,
    SubstrateJobState::Held,
    SubstrateJobState::RoutingAlarm,
    SubstrateJobState::Removed,
];

/// Aggregate counts over a population of trackers, bucketed by observed STS,
/// inferred SPS, and SJS, plus the cross-cutting buckets spec.md §4.8 calls
/// out by name.
///
/// Adding every tracked substrate exactly once keeps the tally an accurate
/// census (spec.md §8 Tally Conservation): `sts`/`sps`/`sjs` totals, and
/// `lost_anywhere + removed_anywhere == lost_or_removed_anywhere`, always
/// sum back to the number of `add` calls.
#[derive(Debug, Default, Clone)]
pub struct SubstrateStateTally {
    sts: [u32; 4],
    sps: [u32; 10],
    sjs: [u32; 18],
    pub aborted_at_destination: u32,
    pub lost_anywhere: u32,
    pub removed_anywhere: u32,
    pub lost_or_removed_anywhere: u32,
}

impl SubstrateStateTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one tracker's current state into the tally.
    pub fn add<C: Clock>(&mut self, tracker: &SubstrateTracker<C>) {
        let info = tracker.info();
        let sjs = tracker.sjs();

        // STS bucket (spec.md §4.8): `sps == Lost` and `is_final` take
        // priority over the plain AtSource/AtWork/AtDestination/Other case
        // split, and additionally contribute to the combined bucket.
        if info.sps == SubstProcState::Lost {
            self.lost_anywhere += 1;
            self.lost_or_removed_anywhere += 1;
        } else if info.is_final {
            self.removed_anywhere += 1;
            self.lost_or_removed_anywhere += 1;
        } else {
            self.sts[info.sts as usize] += 1;
        }

        self.sps[info.inferred_sps as usize] += 1;
        self.sjs[sjs as usize] += 1;

        if sjs == SubstrateJobState::Aborting && info.sts == SubstTransportState::AtDestination {
            self.aborted_at_destination += 1;
        }
    }

    pub fn sts_count(&self, sts: SubstTransportState) -> u32 {
        self.sts[sts as usize]
    }

    pub fn sps_count(&self, sps: SubstProcState) -> u32 {
        self.sps[sps as usize]
    }

    pub fn sjs_count(&self, sjs: SubstrateJobState) -> u32 {
        self.sjs[sjs as usize]
    }

    pub fn total(&self) -> u32 {
        self.sjs.iter().sum()
    }

    /// `sts:[...] sps:[...] sjs:[...]`, omitting any bucket with a zero
    /// count, in declaration order.
    pub fn render(&self) -> String {
        format!(
            "sts:[{}] sps:[{}] sjs:[{}]",
            render_bucket(ALL_STS.iter().map(|s| (s.to_string(), self.sts[*s as usize]))),
            render_bucket(ALL_SPS.iter().map(|s| (s.to_string(), self.sps[*s as usize]))),
            render_bucket(ALL_SJS.iter().map(|s| (s.to_string(), self.sjs[*s as usize]))),
        )
    }
}

fn render_bucket(entries: impl Iterator<Item = (String, u32)>) -> String {
    entries
        .filter(|(_, count)| *count > 0)
        .map(|(name, count)| format!("{name}={count}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[path = "tally_tests.rs"]
mod tests;
