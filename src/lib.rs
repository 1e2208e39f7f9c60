// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! substrate-track-core: per-substrate tracking and job state machine for
//! SEMI E090-aligned tool scheduling (spec.md §1).

pub mod macros;

pub mod clock;
pub mod error;
pub mod id;
pub mod loc_observer;
pub mod observer;
pub mod process_spec;
pub mod process_tracker;
pub mod scheduler_tool;
pub mod state;
pub mod tally;
pub mod tracker;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error::TrackerError;
pub use id::SubstrateId;
pub use loc_observer::{LocationPublisher, SubstLocObserverWithTrackerLookup, TrackerLookup};
pub use observer::{ObjectStore, SubstInfo, SubstratePublisher, TableUpdater, UpdateBehavior, UpdateItem};
pub use process_spec::{
    NamedValues, ProcessSpec, ProcessStepResult, ProcessStepSpec, ProcessStepTemplate,
    ProcessStepTrackerResultItem,
};
pub use process_tracker::SubstrateAndProcessTracker;
pub use scheduler_tool::{BasicSchedulerTool, SchedulerTool};
pub use state::{
    ServiceBasicSjsStateChangeTriggerFlags, SubstJobRequestState, SubstProcState,
    SubstTransportState, SubstrateJobState, UseState,
};
pub use tally::SubstrateStateTally;
pub use tracker::{JobTrackerLinkage, SubstrateTracker, TrackerConfig};
