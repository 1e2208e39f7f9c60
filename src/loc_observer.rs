// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`SubstLocObserverWithTrackerLookup`] — a location observer that resolves
//! its occupant to a locally-tracked handle (spec.md §5).

use crate::id::SubstrateId;
use std::sync::Arc;

/// Narrow capability over an E039 location object: who (if anyone) currently
/// occupies it. Raw location-diffing lives outside this crate, same as
/// [`crate::observer::SubstratePublisher`] for substrates.
pub trait LocationPublisher: Send {
    /// `full_name` of the substrate currently at this location, if occupied.
    fn occupant_full_name(&self) -> Option<String>;

    /// Refresh the observed occupant. Returns whether it changed.
    fn refresh(&mut self) -> bool;
}

/// Resolves a substrate id to whatever locally-tracked handle a caller keeps
/// around (a `SubstrateTracker`, an `Arc<Mutex<SubstrateTracker<C>>>`, an
/// index into a tracker table — the lookup owns that choice). A relation,
/// not ownership: this type holds neither the tracker table nor any
/// tracker directly.
pub trait TrackerLookup<T>: Send + Sync {
    fn lookup(&self, subst_id: &SubstrateId) -> Option<T>;
}

impl<T, F> TrackerLookup<T> for F
where
    F: Fn(&SubstrateId) -> Option<T> + Send + Sync,
{
    fn lookup(&self, subst_id: &SubstrateId) -> Option<T> {
        self(subst_id)
    }
}

/// Wraps a location's publisher and, for whichever substrate occupies it,
/// resolves the corresponding locally-tracked handle through a shared
/// lookup rather than holding a tracker reference itself.
pub struct SubstLocObserverWithTrackerLookup<L, T> {
    loc_publisher: L,
    tracker_lookup: Arc<dyn TrackerLookup<T>>,
}

impl<L: LocationPublisher, T> SubstLocObserverWithTrackerLookup<L, T> {
    pub fn new(loc_publisher: L, tracker_lookup: Arc<dyn TrackerLookup<T>>) -> Self {
        Self { loc_publisher, tracker_lookup }
    }

    /// Refresh the underlying location observation. Returns whether the
    /// occupant changed.
    pub fn refresh(&mut self) -> bool {
        self.loc_publisher.refresh()
    }

    pub fn occupant_id(&self) -> Option<SubstrateId> {
        self.loc_publisher.occupant_full_name().map(SubstrateId::from_name)
    }

    /// The locally-tracked handle for the current occupant, if both an
    /// occupant is present and the lookup resolves it.
    pub fn occupant_tracker(&self) -> Option<T> {
        self.occupant_id().and_then(|id| self.tracker_lookup.lookup(&id))
    }
}

#[cfg(test)]
#[path = "loc_observer_tests.rs"]
mod tests;
