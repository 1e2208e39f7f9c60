// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds surfaced by the tracking core (spec.md §7).

use crate::id::SubstrateId;
use thiserror::Error;

/// Errors surfaced by [`crate::tracker::SubstrateTracker`] and related types.
///
/// The state machine itself never produces these for ordinary domain events —
/// adverse observations (missing object, empty location) become drop-reason
/// requests, not errors. These variants cover setup failures, programmer
/// errors, and opaque propagation of table-update failures.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// No publisher found in the object store for the given substrate id;
    /// tracker construction fails.
    #[error("no publisher found for substrate {subst_id}: substrate not found")]
    Setup { subst_id: SubstrateId },

    /// A programmer error that is fatal to the call, e.g. calling
    /// `SetProcessSpecAndStepNum` a second time.
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),

    /// Surfaced verbatim from the table updater. The tracker does not
    /// attempt recovery; this propagates to the hosting scheduler, which
    /// decides retry/alarm policy.
    #[error("table update submission failed: {0}")]
    UpdateSubmission(String),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
