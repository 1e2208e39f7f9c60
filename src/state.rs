// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Substrate state enums: STS, SPS, SJS, SJRS, and the SJS trigger flag set.

use serde::{Deserialize, Serialize};

/// Substrate Transport State — where the substrate is in its transport lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstTransportState {
    AtSource,
    AtWork,
    AtDestination,
    Other,
}

crate::simple_display! {
    SubstTransportState {
        AtSource => "AtSource",
        AtWork => "AtWork",
        AtDestination => "AtDestination",
        Other => "Other",
    }
}

/// Substrate Process State — outcome of processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstProcState {
    NeedsProcessing,
    InProcess,
    ProcessStepCompleted,
    Processed,
    Stopped,
    Rejected,
    Aborted,
    Skipped,
    Lost,
    Undefined,
}

crate::simple_display! {
    SubstProcState {
        NeedsProcessing => "NeedsProcessing",
        InProcess => "InProcess",
        ProcessStepCompleted => "ProcessStepCompleted",
        Processed => "Processed",
        Stopped => "Stopped",
        Rejected => "Rejected",
        Aborted => "Aborted",
        Skipped => "Skipped",
        Lost => "Lost",
        Undefined => "Undefined",
    }
}

impl SubstProcState {
    /// Whether this SPS represents a concluded processing outcome
    /// (terminal from the processing point of view).
    pub fn is_processing_complete(&self) -> bool {
        matches!(
            self,
            SubstProcState::Processed
                | SubstProcState::Stopped
                | SubstProcState::Rejected
                | SubstProcState::Aborted
                | SubstProcState::Skipped
                | SubstProcState::Lost
        )
    }

    /// Whether this SPS is a terminal-failing outcome (used by the SPS-merge
    /// operator and by §8's SPS-merge-associativity property).
    pub fn is_terminal_failing(&self) -> bool {
        matches!(
            self,
            SubstProcState::Aborted
                | SubstProcState::Rejected
                | SubstProcState::Stopped
                | SubstProcState::Lost
        )
    }

    /// Relative rank used by the monotone SPS-merge operator: higher rank
    /// wins when merging an accumulator with a new observation. Terminal-failing
    /// states outrank `ProcessStepCompleted`/`Processed`, which outrank the
    /// in-flight states, which outrank `Undefined`.
    fn merge_rank(&self) -> u8 {
        match self {
            SubstProcState::Undefined => 0,
            SubstProcState::NeedsProcessing => 1,
            SubstProcState::InProcess => 2,
            SubstProcState::ProcessStepCompleted => 3,
            SubstProcState::Processed => 4,
            // Terminal-failing states all outrank success so that any failing
            // step poisons the merged result; ties keep the accumulator's
            // existing value to keep the merge left-biased/associative on
            // equal-rank inputs.
            SubstProcState::Skipped => 5,
            SubstProcState::Stopped => 6,
            SubstProcState::Rejected => 7,
            SubstProcState::Aborted => 8,
            SubstProcState::Lost => 9,
        }
    }

    /// Monotone merge of an accumulated (inferred) SPS with a newly observed
    /// or step-level SPS. Used both to compute `inferred_sps` from an observed
    /// SPS plus recorded step SPSs, and by `compute_final_sps`.
    pub fn merge(self, other: SubstProcState) -> SubstProcState {
        if other.merge_rank() > self.merge_rank() {
            other
        } else {
            self
        }
    }
}

/// Substrate Job Request State — externally driven command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstJobRequestState {
    None,
    Run,
    Pause,
    Stop,
    Abort,
    Return,
}

crate::simple_display! {
    SubstJobRequestState {
        None => "None",
        Run => "Run",
        Pause => "Pause",
        Stop => "Stop",
        Abort => "Abort",
        Return => "Return",
    }
}

/// Substrate Job State — job-level lifecycle tracked per substrate by
/// [`crate::tracker::SubstrateTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstrateJobState {
    Initial,
    WaitingForStart,
    Running,
    Pausing,
    Paused,
    Stopping,
    Stopped,
    Aborting,
    Aborted,
    Processed,
    Rejected,
    Skipped,
    Lost,
    Returning,
    Returned,
    Held,
    RoutingAlarm,
    Removed,
}

crate::simple_display! {
    SubstrateJobState {
        Initial => "Initial",
        WaitingForStart => "WaitingForStart",
        Running => "Running",
        Pausing => "Pausing",
        Paused => "Paused",
        Stopping => "Stopping",
        Stopped => "Stopped",
        Aborting => "Aborting",
        Aborted => "Aborted",
        Processed => "Processed",
        Rejected => "Rejected",
        Skipped => "Skipped",
        Lost => "Lost",
        Returning => "Returning",
        Returned => "Returned",
        Held => "Held",
        RoutingAlarm => "RoutingAlarm",
        Removed => "Removed",
    }
}

impl SubstrateJobState {
    /// Terminal SJS values per spec.md §3 invariant (a): once reached, the SJS
    /// never regresses.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubstrateJobState::Processed
                | SubstrateJobState::Rejected
                | SubstrateJobState::Skipped
                | SubstrateJobState::Stopped
                | SubstrateJobState::Aborted
                | SubstrateJobState::Lost
                | SubstrateJobState::Removed
                | SubstrateJobState::Returned
        )
    }
}

/// SEMI E30-style equipment "base state" a [`crate::scheduler_tool::SchedulerTool`]
/// is asked to transition between (spec.md §4.7). Distinct from SJS/SPS/STS,
/// which are per-substrate; this is per-tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseState {
    Offline,
    OnlineLocal,
    OnlineRemote,
}

crate::simple_display! {
    UseState {
        Offline => "Offline",
        OnlineLocal => "OnlineLocal",
        OnlineRemote => "OnlineRemote",
    }
}

impl UseState {
    pub fn is_online(&self) -> bool {
        !matches!(self, UseState::Offline)
    }
}

bitflags::bitflags! {
    /// `ServiceBasicSJSStateChangeTriggerFlags` — stable bit positions per
    /// spec.md §6. `ALL` deliberately excludes `ENABLE_ABORTED_AT_WORK`: the
    /// AbortedAtWork override (spec.md §4.3 Group B) requires both
    /// `ENABLE_ABORTING` and `ENABLE_ABORTED_AT_WORK` to be set explicitly by
    /// the caller. Do not "fix" this by folding it into `ALL` — see
    /// DESIGN.md Open Question 1.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ServiceBasicSjsStateChangeTriggerFlags: u8 {
        const NONE = 0x00;
        const ENABLE_INFO_TRIGGERED = 0x01;
        const ENABLE_WAITING_FOR_START = 0x02;
        const ENABLE_AUTO_START = 0x04;
        const ENABLE_PAUSING = 0x08;
        const ENABLE_STOPPING = 0x10;
        const ENABLE_ABORTING = 0x20;
        const ENABLE_RUNNING = 0x40;
        const ENABLE_ABORTED_AT_WORK = 0x80;
    }
}

impl ServiceBasicSjsStateChangeTriggerFlags {
    /// `All = 0x7F` per spec.md §6 — excludes `ENABLE_ABORTED_AT_WORK` (0x80).
    pub const ALL: Self = Self::from_bits_truncate(0x7F);
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
