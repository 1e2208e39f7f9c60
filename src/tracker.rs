// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`SubstrateTracker`] — per-substrate state machine (spec.md §4.1-§4.4).

use crate::clock::Clock;
use crate::error::TrackerError;
use crate::id::SubstrateId;
use crate::observer::{ObjectStore, SubstInfo, SubstratePublisher, TableUpdater, UpdateBehavior, UpdateItem};
use crate::state::{
    ServiceBasicSjsStateChangeTriggerFlags as Flags, SubstJobRequestState, SubstProcState,
    SubstTransportState, SubstrateJobState,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Configuration injected into a tracker at setup time (DESIGN.md §6C):
/// the "use external sync" probe and the default trigger-flag set, kept out
/// of any process-wide singleton so the state machine stays a pure function
/// of its explicit inputs.
#[derive(Debug, Clone, Copy)]
pub struct TrackerConfig {
    pub use_external_sync: bool,
    pub trigger_flags: Flags,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self { use_external_sync: false, trigger_flags: Flags::ALL }
    }
}

/// External back-reference from a tracker to the job that created it.
///
/// A relation, not ownership (DESIGN.md "Back-references"): the tracker
/// writes `substrate_tracker_has_been_updated` whenever its observer reports
/// a change; the linked job reads and clears that flag on its own schedule.
/// Interior state is shared (`Arc<Mutex<_>>`) because both the tracker and
/// the external job hold a handle to the same linkage.
#[derive(Debug, Clone)]
pub struct JobTrackerLinkage {
    inner: Arc<Mutex<JobTrackerLinkageInner>>,
}

#[derive(Debug, Default)]
struct JobTrackerLinkageInner {
    id: String,
    substrate_tracker_has_been_updated: bool,
    is_drop_requested: bool,
    drop_request_reason: String,
}

impl JobTrackerLinkage {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(JobTrackerLinkageInner { id: id.into(), ..Default::default() })),
        }
    }

    pub fn id(&self) -> String {
        self.inner.lock().id.clone()
    }

    /// Written by the tracker when its observer reports a change.
    pub(crate) fn mark_substrate_tracker_updated(&self) {
        self.inner.lock().substrate_tracker_has_been_updated = true;
    }

    pub fn has_been_updated(&self) -> bool {
        self.inner.lock().substrate_tracker_has_been_updated
    }

    /// Called by the linked job reader to consume the update notification.
    pub fn clear_updated(&self) {
        self.inner.lock().substrate_tracker_has_been_updated = false;
    }

    pub fn is_drop_requested(&self) -> bool {
        self.inner.lock().is_drop_requested
    }

    pub fn drop_request_reason(&self) -> String {
        self.inner.lock().drop_request_reason.clone()
    }

    /// Called by the linked job to request the tracker be dropped.
    pub fn request_drop(&self, reason: impl Into<String>) {
        let mut inner = self.inner.lock();
        inner.is_drop_requested = true;
        inner.drop_request_reason = reason.into();
    }
}

/// Per-substrate state machine: owns an observer, drives SJS transitions,
/// and emits table updates.
pub struct SubstrateTracker<C: Clock> {
    subst_id: SubstrateId,
    observer: Box<dyn SubstratePublisher>,
    table_updater: Arc<dyn TableUpdater>,
    clock: C,
    span: tracing::Span,
    config: TrackerConfig,

    sjs: SubstrateJobState,
    /// `None` ⇒ not requested. Becomes `Some` exactly once and is never
    /// cleared (spec.md §3 invariant (c)).
    drop_request_reason: Option<String>,
    job_tracker_linkage: Option<JobTrackerLinkage>,
    last_update_timestamp: Instant,
}

impl<C: Clock> SubstrateTracker<C> {
    /// Bind table-updater, id, logger span, and observer; emit the initial
    /// SJS (`WaitingForStart`). Fails with [`TrackerError::Setup`] when the
    /// object store has no publisher for `subst_id`.
    pub fn setup(
        subst_id: SubstrateId,
        object_store: &dyn ObjectStore,
        table_updater: Arc<dyn TableUpdater>,
        clock: C,
        config: TrackerConfig,
    ) -> Result<Self, TrackerError> {
        let observer = object_store
            .get_publisher(&subst_id)
            .ok_or_else(|| TrackerError::Setup { subst_id: subst_id.clone() })?;
        let span = tracing::info_span!("substrate_tracker", subst_id = %subst_id);
        let now = clock.now();
        let mut tracker = Self {
            subst_id,
            observer,
            table_updater,
            clock,
            span,
            config,
            sjs: SubstrateJobState::Initial,
            drop_request_reason: None,
            job_tracker_linkage: None,
            last_update_timestamp: now,
        };
        tracker.set_substrate_job_state(
            SubstrateJobState::WaitingForStart,
            "Tracker setup complete",
            true,
        )?;
        Ok(tracker)
    }

    pub fn subst_id(&self) -> &SubstrateId {
        &self.subst_id
    }

    pub fn sjs(&self) -> SubstrateJobState {
        self.sjs
    }

    /// The most recently observed SJRS, read straight from the observer's
    /// current snapshot rather than a separately-cached copy (spec.md §4.3
    /// takes "current observed … sjrs" as input, not a mirror that could go
    /// stale between refreshes).
    pub fn sjrs(&self) -> SubstJobRequestState {
        self.observer.info().sjrs
    }

    pub fn drop_request_reason(&self) -> Option<&str> {
        self.drop_request_reason.as_deref()
    }

    pub fn last_update_timestamp(&self) -> Instant {
        self.last_update_timestamp
    }

    pub fn info(&self) -> &SubstInfo {
        self.observer.info()
    }

    pub fn set_job_tracker_linkage(&mut self, linkage: Option<JobTrackerLinkage>) {
        self.job_tracker_linkage = linkage;
    }

    pub fn job_tracker_linkage(&self) -> Option<&JobTrackerLinkage> {
        self.job_tracker_linkage.as_ref()
    }

    /// §4.1 — refresh the observer if needed (or if `force`); returns whether
    /// the snapshot changed.
    pub fn update_if_needed(&mut self, force: bool) -> bool {
        if !force && !self.observer.is_update_needed() {
            return false;
        }
        let changed = self.observer.refresh(force);
        if changed {
            self.last_update_timestamp = self.clock.now();
            if let Some(linkage) = &self.job_tracker_linkage {
                if !linkage.has_been_updated() {
                    linkage.mark_substrate_tracker_updated();
                }
            }
            trace!(parent: &self.span, "observer snapshot changed");
        }
        changed
    }

    /// §4.2 — evaluate whether a drop should be requested. Only runs while
    /// `drop_request_reason` is empty; returns 1 if a reason was newly
    /// assigned, 0 otherwise.
    pub fn service_drop_reason_assertion(&mut self) -> i32 {
        if self.drop_request_reason.is_some() {
            return 0;
        }
        let info = self.observer.info();
        match next_drop_reason(info, self.job_tracker_linkage.as_ref()) {
            Some(reason) => {
                debug!(parent: &self.span, reason = %reason, "drop requested");
                self.drop_request_reason = Some(reason);
                1
            }
            None => 0,
        }
    }

    /// §4.3 — the per-substrate SJS state machine. Returns 1 if the SJS
    /// changed, 0 otherwise.
    pub fn service_basic_sjs_state_change_triggers(&mut self, flags: Flags) -> i32 {
        let info = self.observer.info().clone();
        let (next_sjs, reason) = compute_next_sjs(&info, self.sjs, info.sjrs, flags);
        if next_sjs == SubstrateJobState::Initial || next_sjs == self.sjs {
            return 0;
        }
        let previous_sjs = self.sjs;
        let full_reason = format!("{reason} [{} {} {}]", info.sps, info.sts, info.sjrs);
        match self.set_substrate_job_state(next_sjs, full_reason, true) {
            // `set_substrate_job_state` silently no-ops once `self.sjs` is
            // terminal (spec.md §3 invariant (a)); only report a change when
            // one actually happened.
            Ok(()) => i32::from(self.sjs != previous_sjs),
            Err(err) => {
                warn!(parent: &self.span, error = %err, "failed to submit SJS transition");
                0
            }
        }
    }

    /// §4.4 — assign a new SJS and submit the resulting table-update batch.
    ///
    /// No-ops (logging at `trace`) when `if_needed` is set and the SJS is
    /// unchanged, and always no-ops once the current SJS is terminal
    /// (spec.md §3 invariant (a): SJS never regresses from a terminal state).
    pub fn set_substrate_job_state(
        &mut self,
        sjs: SubstrateJobState,
        reason: impl Into<String>,
        if_needed: bool,
    ) -> Result<(), TrackerError> {
        let reason = reason.into();
        if if_needed && self.sjs == sjs {
            trace!(parent: &self.span, sjs = %sjs, "SJS unchanged, skipping");
            return Ok(());
        }
        if self.sjs.is_terminal() {
            trace!(parent: &self.span, from = %self.sjs, to = %sjs, "ignoring SJS change from terminal state");
            return Ok(());
        }

        debug!(parent: &self.span, from = %self.sjs, to = %sjs, reason = %reason, "SJS transition");
        self.sjs = sjs;

        let info = self.observer.info();
        let mut items = vec![UpdateItem::SetAttributes {
            subst_id: self.subst_id.clone(),
            attributes: vec![("SJS".to_string(), sjs.to_string())],
        }];
        items.extend(self.sps_update_items_for(sjs, info));

        if !items.is_empty() && self.config.use_external_sync {
            items.push(UpdateItem::SyncExternal { subst_id: self.subst_id.clone() });
        }

        self.table_updater.submit(items)
    }

    /// The SPS update items (if any) that accompany a given new SJS, per the
    /// case table in spec.md §4.4.
    fn sps_update_items_for(&self, sjs: SubstrateJobState, info: &SubstInfo) -> Vec<UpdateItem> {
        let standard_lists = UpdateBehavior::STANDARD_SPS_UPDATE | UpdateBehavior::BASIC_SPS_LISTS;
        match sjs {
            SubstrateJobState::Processed => {
                self.final_sps_items(info, SubstProcState::Processed, standard_lists)
            }
            SubstrateJobState::Stopped => {
                self.final_sps_items(info, SubstProcState::Stopped, standard_lists)
            }
            SubstrateJobState::Aborting => {
                if info.inferred_sps != SubstProcState::Aborted {
                    vec![UpdateItem::SpsUpdate {
                        subst_id: self.subst_id.clone(),
                        sps: SubstProcState::Aborted,
                        behavior: UpdateBehavior::PENDING_SPS_UPDATE | UpdateBehavior::BASIC_SPS_LISTS,
                    }]
                } else {
                    Vec::new()
                }
            }
            SubstrateJobState::Aborted => {
                self.final_sps_items(info, SubstProcState::Aborted, standard_lists)
            }
            SubstrateJobState::Skipped => {
                self.final_sps_items(info, SubstProcState::Skipped, standard_lists)
            }
            SubstrateJobState::Lost => vec![UpdateItem::SpsUpdate {
                subst_id: self.subst_id.clone(),
                sps: SubstProcState::Lost,
                behavior: standard_lists,
            }],
            _ => Vec::new(),
        }
    }

    /// Submit a standalone SPS update outside of an SJS transition. Used by
    /// [`crate::process_tracker::SubstrateAndProcessTracker`] to latch the
    /// final merged SPS once every recipe step has reported.
    pub fn submit_sps_update(&self, sps: SubstProcState, behavior: UpdateBehavior) -> Result<(), TrackerError> {
        self.table_updater
            .submit(vec![UpdateItem::SpsUpdate { subst_id: self.subst_id.clone(), sps, behavior }])
    }

    /// Final-SPS pattern shared by `Processed`/`Stopped`/`Aborted`/`Skipped`:
    /// if the observed SPS is already processing-complete, nothing more is
    /// needed; else if the inferred SPS is processing-complete, use it;
    /// otherwise fall back to `default_sps`. A single if/else-if/else chain
    /// (DESIGN.md Open Question 2) — not two independent checks.
    fn final_sps_items(
        &self,
        info: &SubstInfo,
        default_sps: SubstProcState,
        behavior: UpdateBehavior,
    ) -> Vec<UpdateItem> {
        if info.sps.is_processing_complete() {
            Vec::new()
        } else if info.inferred_sps.is_processing_complete() {
            vec![UpdateItem::SpsUpdate { subst_id: self.subst_id.clone(), sps: info.inferred_sps, behavior }]
        } else {
            vec![UpdateItem::SpsUpdate { subst_id: self.subst_id.clone(), sps: default_sps, behavior }]
        }
    }
}

/// §4.2 pure lookup of the next drop-request reason, evaluated top-down
/// (first match wins) exactly as the table in spec.md §4.2 orders it.
fn next_drop_reason(info: &SubstInfo, linkage: Option<&JobTrackerLinkage>) -> Option<String> {
    let linkage_drop_requested = linkage.map(|l| l.is_drop_requested()).unwrap_or(false);
    let sps_done_away_from_work =
        info.sps.is_processing_complete() && info.sts != SubstTransportState::AtWork;

    if sps_done_away_from_work && linkage.is_none() {
        return Some("Substrate processing done and no Job was linked to it".to_string());
    }
    if sps_done_away_from_work && linkage_drop_requested {
        let reason = linkage.map(|l| l.drop_request_reason()).unwrap_or_default();
        return Some(format!(
            "Substrate processing done and linked Job is requesting to be dropped [{reason}]"
        ));
    }
    if info.is_final && linkage.is_none() {
        return Some("Substrate Object has been removed and no Job was linked to it".to_string());
    }
    if info.is_final && linkage_drop_requested {
        let reason = linkage.map(|l| l.drop_request_reason()).unwrap_or_default();
        return Some(format!(
            "Substrate Object has been removed and linked Job is requesting to be dropped [{reason}]"
        ));
    }
    if info.is_final {
        return Some("Substrate Object has been removed unexpectedly".to_string());
    }
    if info.is_empty {
        return Some("Substrate Object has been emptied unexpectedly".to_string());
    }
    None
}

/// §4.3 pure state-machine step: `(observed, sjs, sjrs, flags) -> (next_sjs, reason)`.
/// Side-effectful submission of updates is handled separately by
/// [`SubstrateTracker::set_substrate_job_state`] (DESIGN Notes, "State machine").
pub fn compute_next_sjs(
    info: &SubstInfo,
    sjs: SubstrateJobState,
    sjrs: SubstJobRequestState,
    flags: Flags,
) -> (SubstrateJobState, String) {
    let sts_is_at_source = info.sts == SubstTransportState::AtSource;
    let sts_is_at_destination = info.sts == SubstTransportState::AtDestination;
    let sts_is_at_work = info.sts == SubstTransportState::AtWork;
    let is_at_src_loc = info.is_at_src_loc();
    let is_at_dest_loc = info.is_at_dest_loc();
    let sps_is_needs_processing = info.sps == SubstProcState::NeedsProcessing;

    let mut next_sjs = SubstrateJobState::Initial;
    let mut reason = String::new();

    // Group A — InfoTriggered
    if flags.contains(Flags::ENABLE_INFO_TRIGGERED) {
        if info.sps == SubstProcState::Lost {
            next_sjs = SubstrateJobState::Lost;
            reason = "Substrate has been marked Lost".to_string();
        } else if sjrs == SubstJobRequestState::Return {
            next_sjs = if sts_is_at_source || sts_is_at_destination || is_at_src_loc || is_at_dest_loc {
                SubstrateJobState::Returned
            } else {
                SubstrateJobState::Returning
            };
        } else if sts_is_at_source {
            if info.sps == SubstProcState::Skipped {
                next_sjs = SubstrateJobState::Skipped;
            }
        } else if sts_is_at_destination {
            next_sjs = match info.sps {
                SubstProcState::Processed => SubstrateJobState::Processed,
                SubstProcState::Rejected => SubstrateJobState::Rejected,
                SubstProcState::Skipped => SubstrateJobState::Skipped,
                SubstProcState::Stopped => SubstrateJobState::Stopped,
                SubstProcState::Aborted => SubstrateJobState::Aborted,
                _ => SubstrateJobState::Initial,
            };
        } else if info.is_final {
            next_sjs = SubstrateJobState::Removed;
            reason = "Substrate has been removed/deleted unexpectedly".to_string();
        }

        if next_sjs != SubstrateJobState::Initial && reason.is_empty() {
            reason = "Substrate reached a final state processing/transport state".to_string();
        }
    }

    // Group B — AbortedAtWork override
    if next_sjs == SubstrateJobState::Initial
        && sts_is_at_work
        && info.sps == SubstProcState::Aborted
        && flags.contains(Flags::ENABLE_ABORTING)
        && flags.contains(Flags::ENABLE_ABORTED_AT_WORK)
    {
        next_sjs = SubstrateJobState::Aborted;
        reason = "Substrate reached Aborted state AtWork".to_string();
    }

    // Group C — per-current-SJS rules
    if next_sjs == SubstrateJobState::Initial {
        match sjs {
            SubstrateJobState::WaitingForStart if flags.contains(Flags::ENABLE_WAITING_FOR_START) => {
                if sjrs == SubstJobRequestState::Run && flags.contains(Flags::ENABLE_AUTO_START) {
                    next_sjs = SubstrateJobState::Running;
                } else if sjrs == SubstJobRequestState::Pause {
                    next_sjs = SubstrateJobState::Pausing;
                } else if sjrs == SubstJobRequestState::Stop {
                    next_sjs = SubstrateJobState::Stopping;
                } else if sjrs == SubstJobRequestState::Abort {
                    next_sjs = SubstrateJobState::Aborting;
                }
            }
            SubstrateJobState::Pausing if flags.contains(Flags::ENABLE_PAUSING) => {
                if sjrs == SubstJobRequestState::Stop {
                    next_sjs = SubstrateJobState::Stopping;
                } else if sjrs == SubstJobRequestState::Abort {
                    next_sjs = SubstrateJobState::Aborting;
                } else if sps_is_needs_processing && sts_is_at_source {
                    next_sjs = SubstrateJobState::Paused;
                }
            }
            SubstrateJobState::Stopping if flags.contains(Flags::ENABLE_STOPPING) => {
                if sjrs == SubstJobRequestState::Abort {
                    next_sjs = SubstrateJobState::Aborting;
                } else if sts_is_at_source {
                    next_sjs = SubstrateJobState::Skipped;
                    reason = "Stop completed".to_string();
                }
            }
            SubstrateJobState::Aborting if flags.contains(Flags::ENABLE_ABORTING) => {
                if sts_is_at_source {
                    next_sjs = SubstrateJobState::Skipped;
                    reason = "Abort completed".to_string();
                }
            }
            SubstrateJobState::Running if flags.contains(Flags::ENABLE_RUNNING) => {
                if sjrs == SubstJobRequestState::Pause {
                    next_sjs = SubstrateJobState::Pausing;
                } else if sjrs == SubstJobRequestState::Stop {
                    next_sjs = SubstrateJobState::Stopping;
                } else if sjrs == SubstJobRequestState::Abort {
                    next_sjs = SubstrateJobState::Aborting;
                }
            }
            _ => {}
        }
    }

    (next_sjs, reason)
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
