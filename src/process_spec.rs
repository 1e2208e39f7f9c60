// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recipe value objects: [`ProcessSpec`], [`ProcessStepSpec`],
//! [`ProcessStepResult`], [`ProcessStepTrackerResultItem`].

use crate::error::TrackerError;
use crate::state::SubstProcState;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Read-only named-value set attached to a [`ProcessSpec`] or
/// [`ProcessStepSpec`] (recipe variables / step variables).
pub type NamedValues = HashMap<String, String>;

/// A named process definition composed of an ordered sequence of steps.
///
/// Construction is the one place the `process_spec` back-reference and
/// `step_num` on each [`ProcessStepSpec`] are bound — see
/// [`ProcessSpec::new`]. The back-reference is a [`Weak`] pointer (DESIGN.md
/// "Back-references") so a step never keeps its owning spec alive and the
/// two never form a reference cycle.
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    inner: Arc<ProcessSpecInner>,
}

#[derive(Debug)]
struct ProcessSpecInner {
    recipe_name: String,
    recipe_variables: NamedValues,
    steps: Vec<Arc<ProcessStepSpec>>,
}

impl ProcessSpec {
    /// Build a process spec from an ordered list of step templates.
    ///
    /// Each step's `process_spec` back-reference and `step_num` are bound
    /// here as the one-shot [`ProcessStepSpec::set_process_spec_and_step_num`]
    /// call, with `step_num` set to the template's 1-based index.
    pub fn new(
        recipe_name: impl Into<String>,
        recipe_variables: NamedValues,
        step_templates: Vec<ProcessStepTemplate>,
    ) -> Result<Self, TrackerError> {
        let recipe_name = recipe_name.into();
        let steps: Vec<Arc<ProcessStepSpec>> = step_templates
            .into_iter()
            .enumerate()
            .map(|(idx, template)| {
                Arc::new(ProcessStepSpec {
                    process_spec_binding: parking_lot::Mutex::new(None),
                    step_num: idx + 1,
                    usable_loc_name_list: template.usable_loc_name_list,
                    step_variables: template.step_variables,
                })
            })
            .collect();
        let inner = Arc::new(ProcessSpecInner { recipe_name, recipe_variables, steps });
        for step in inner.steps.iter() {
            step.set_process_spec_and_step_num(Arc::downgrade(&inner), step.step_num)?;
        }
        Ok(ProcessSpec { inner })
    }

    pub fn recipe_name(&self) -> &str {
        &self.inner.recipe_name
    }

    pub fn recipe_variables(&self) -> &NamedValues {
        &self.inner.recipe_variables
    }

    pub fn steps(&self) -> &[Arc<ProcessStepSpec>] {
        &self.inner.steps
    }
}

/// Input to [`ProcessSpec::new`] before the back-reference/step_num binding
/// is applied.
#[derive(Debug, Clone)]
pub struct ProcessStepTemplate {
    pub usable_loc_name_list: Vec<String>,
    pub step_variables: NamedValues,
}

impl ProcessStepTemplate {
    pub fn new(usable_loc_name_list: Vec<String>, step_variables: NamedValues) -> Self {
        Self { usable_loc_name_list, step_variables }
    }
}

/// A single step in a [`ProcessSpec`]'s recipe.
///
/// `process_spec` is a back-reference, never ownership (see DESIGN.md); it
/// is bound exactly once, at the owning [`ProcessSpec::new`] call, via the
/// one-shot [`Self::set_process_spec_and_step_num`].
#[derive(Debug)]
pub struct ProcessStepSpec {
    process_spec_binding: parking_lot::Mutex<Option<Weak<ProcessSpecInner>>>,
    step_num: usize,
    usable_loc_name_list: Vec<String>,
    step_variables: NamedValues,
}

impl ProcessStepSpec {
    /// One-shot binding of the back-reference to the owning spec. Re-binding
    /// fails with [`TrackerError::InvalidOperation`].
    fn set_process_spec_and_step_num(
        &self,
        process_spec: Weak<ProcessSpecInner>,
        step_num: usize,
    ) -> Result<(), TrackerError> {
        let mut binding = self.process_spec_binding.lock();
        if binding.is_some() {
            return Err(TrackerError::InvalidOperation(
                "SetProcessSpecAndStepNum called more than once",
            ));
        }
        debug_assert_eq!(step_num, self.step_num);
        *binding = Some(process_spec);
        Ok(())
    }

    /// The owning process spec, if it is still alive. `None` only before
    /// [`ProcessSpec::new`] has finished binding (never observable outside
    /// this module) or after the owning spec has been dropped.
    pub fn process_spec(&self) -> Option<ProcessSpec> {
        self.process_spec_binding
            .lock()
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| ProcessSpec { inner })
    }

    /// 1-based index of this step within its owning spec's `steps`.
    pub fn step_num(&self) -> usize {
        self.step_num
    }

    pub fn usable_loc_name_list(&self) -> &[String] {
        &self.usable_loc_name_list
    }

    pub fn step_variables(&self) -> &NamedValues {
        &self.step_variables
    }
}

/// Result of a completed process step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessStepResult {
    /// Empty string means success.
    pub result_code: String,
    pub sps: SubstProcState,
}

impl ProcessStepResult {
    /// Default SPS assigned to a successful result when the caller does not
    /// specify one.
    pub const DEFAULT_SUCCEEDED_SPS: SubstProcState = SubstProcState::ProcessStepCompleted;
    /// Default SPS assigned to a failed result when the caller does not
    /// specify one.
    pub const DEFAULT_FAILED_SPS: SubstProcState = SubstProcState::Rejected;

    /// Construct a result, deriving `sps` from `result_code` when the caller
    /// passes [`SubstProcState::Undefined`] (spec.md §3 constructor policy).
    pub fn new(result_code: impl Into<String>, sps: SubstProcState) -> Self {
        Self::with_fallbacks(result_code, sps, Self::DEFAULT_SUCCEEDED_SPS, Self::DEFAULT_FAILED_SPS)
    }

    /// As [`Self::new`], but with explicit fallback SPS values instead of the
    /// module defaults.
    pub fn with_fallbacks(
        result_code: impl Into<String>,
        sps: SubstProcState,
        default_succeeded_sps: SubstProcState,
        fallback_failed_sps: SubstProcState,
    ) -> Self {
        let result_code = result_code.into();
        let sps = if sps == SubstProcState::Undefined {
            if result_code.is_empty() {
                default_succeeded_sps
            } else {
                fallback_failed_sps
            }
        } else {
            sps
        };
        Self { result_code, sps }
    }

    pub fn is_success(&self) -> bool {
        self.result_code.is_empty()
    }
}

/// Record of one completed step, kept in
/// [`crate::process_tracker::SubstrateAndProcessTracker::tracker_step_result_list`].
#[derive(Debug, Clone)]
pub struct ProcessStepTrackerResultItem {
    pub loc_name: String,
    pub step_spec: Arc<ProcessStepSpec>,
    pub step_result: ProcessStepResult,
}

#[cfg(test)]
#[path = "process_spec_tests.rs"]
mod tests;
