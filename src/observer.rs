// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The E039 object store contract consumed by trackers: observed snapshots,
//! publishers, and table updates (spec.md §6).

use crate::error::TrackerError;
use crate::id::SubstrateId;
use crate::state::{SubstJobRequestState, SubstProcState, SubstTransportState};

/// Observed snapshot of a substrate object, as reported by its publisher.
#[derive(Debug, Clone, PartialEq)]
pub struct SubstInfo {
    pub sts: SubstTransportState,
    pub sps: SubstProcState,
    /// Monotone merge of the observed `sps` with any recorded step-level
    /// SPSs (see [`crate::state::SubstProcState::merge`]).
    pub inferred_sps: SubstProcState,
    pub sjrs: SubstJobRequestState,
    /// Current location name, if known.
    pub loc_id: Option<String>,
    /// Fixed source location identity for this substrate's job.
    pub link_to_src: Option<String>,
    /// Fixed destination location identity for this substrate's job.
    pub link_to_dest: Option<String>,
    /// True once the object has been removed from the store.
    pub is_final: bool,
    /// True if the substrate's current location is reported empty.
    pub is_empty: bool,
}

impl SubstInfo {
    pub fn is_at_src_loc(&self) -> bool {
        match (&self.loc_id, &self.link_to_src) {
            (Some(loc), Some(src)) => loc == src,
            _ => false,
        }
    }

    pub fn is_at_dest_loc(&self) -> bool {
        match (&self.loc_id, &self.link_to_dest) {
            (Some(loc), Some(dest)) => loc == dest,
            _ => false,
        }
    }
}

impl Default for SubstInfo {
    fn default() -> Self {
        Self {
            sts: SubstTransportState::Other,
            sps: SubstProcState::Undefined,
            inferred_sps: SubstProcState::Undefined,
            sjrs: SubstJobRequestState::None,
            loc_id: None,
            link_to_src: None,
            link_to_dest: None,
            is_final: false,
            is_empty: false,
        }
    }
}

/// Sequenced source of snapshots for a stored substrate object.
///
/// Wraps a publisher from the E039 store. Raw object-diffing lives outside
/// this crate (spec.md §1 out-of-scope); this trait is the narrow surface
/// [`crate::tracker::SubstrateTracker`] consumes.
pub trait SubstratePublisher: Send {
    /// Whether a newer snapshot is available and `refresh` would return
    /// `true` if called now, without actually fetching it.
    fn is_update_needed(&self) -> bool;

    /// Fetch the latest snapshot from the publisher. Returns whether the
    /// snapshot differs from the previously observed one. Pass `force = true`
    /// to refresh even when `is_update_needed` is false.
    fn refresh(&mut self, force: bool) -> bool;

    /// The most recently fetched snapshot.
    fn info(&self) -> &SubstInfo;
}

/// Looks up a publisher for a given substrate id in the external object
/// store. Out of scope to implement here; consumed as a capability.
pub trait ObjectStore {
    fn get_publisher(&self, id: &SubstrateId) -> Option<Box<dyn SubstratePublisher>>;
}

bitflags::bitflags! {
    /// Update-behavior flags accompanying a generated E090 update item
    /// (spec.md §4.4/§6).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UpdateBehavior: u8 {
        /// The SPS update represents the substrate's final processing outcome.
        const STANDARD_SPS_UPDATE = 0x01;
        /// The SPS update is provisional, not yet final (e.g. Aborting).
        const PENDING_SPS_UPDATE = 0x02;
        /// Include the basic SPS list attributes alongside the scalar SPS.
        const BASIC_SPS_LISTS = 0x04;
    }
}

/// A single item in an update batch submitted to the E039 table.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateItem {
    /// Set attributes on the named object, e.g. `SJS = <value>`.
    SetAttributes { subst_id: SubstrateId, attributes: Vec<(String, String)> },
    /// Generated E090 update item carrying a target SPS and behavior flags.
    SpsUpdate { subst_id: SubstrateId, sps: SubstProcState, behavior: UpdateBehavior },
    /// Marker requesting the store synchronize with any linked external state.
    SyncExternal { subst_id: SubstrateId },
}

impl UpdateItem {
    pub fn subst_id(&self) -> &SubstrateId {
        match self {
            UpdateItem::SetAttributes { subst_id, .. } => subst_id,
            UpdateItem::SpsUpdate { subst_id, .. } => subst_id,
            UpdateItem::SyncExternal { subst_id } => subst_id,
        }
    }
}

/// Submits ordered update batches to the E039 table and awaits completion.
///
/// Out of scope to implement here; consumed as a capability by
/// [`crate::tracker::SubstrateTracker::set_substrate_job_state`].
pub trait TableUpdater {
    fn submit(&self, items: Vec<UpdateItem>) -> Result<(), TrackerError>;
}

#[cfg(test)]
#[path = "observer_tests.rs"]
mod tests;
