// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test fixtures (spec.md §8A). Available to this crate's own test
//! modules unconditionally, and to downstream crates behind the
//! `test-support` feature.

use crate::error::TrackerError;
use crate::id::SubstrateId;
use crate::observer::{ObjectStore, SubstInfo, SubstratePublisher, TableUpdater, UpdateItem};
use parking_lot::Mutex;

/// A publisher with a fixed or manually-set snapshot, recording whether it
/// was asked to refresh.
#[derive(Default)]
pub struct FakePublisher {
    pub info: SubstInfo,
    pub update_needed: bool,
    pub changed_on_refresh: bool,
}

impl FakePublisher {
    pub fn new(info: SubstInfo) -> Self {
        Self { info, update_needed: false, changed_on_refresh: false }
    }

    pub fn needing_update(mut self, changed_on_refresh: bool) -> Self {
        self.update_needed = true;
        self.changed_on_refresh = changed_on_refresh;
        self
    }
}

impl SubstratePublisher for FakePublisher {
    fn is_update_needed(&self) -> bool {
        self.update_needed
    }

    fn refresh(&mut self, force: bool) -> bool {
        if !force && !self.update_needed {
            return false;
        }
        self.update_needed = false;
        self.changed_on_refresh
    }

    fn info(&self) -> &SubstInfo {
        &self.info
    }
}

/// An object store vending a single pre-built publisher, once.
#[derive(Default)]
pub struct FakeObjectStore {
    publisher: Mutex<Option<Box<dyn SubstratePublisher>>>,
}

impl FakeObjectStore {
    pub fn with_publisher(publisher: impl SubstratePublisher + 'static) -> Self {
        Self { publisher: Mutex::new(Some(Box::new(publisher))) }
    }

    pub fn empty() -> Self {
        Self { publisher: Mutex::new(None) }
    }
}

impl ObjectStore for FakeObjectStore {
    fn get_publisher(&self, _id: &SubstrateId) -> Option<Box<dyn SubstratePublisher>> {
        self.publisher.lock().take()
    }
}

/// Records every batch it is asked to submit, for assertion by tests.
#[derive(Default)]
pub struct FakeTableUpdater {
    pub batches: Mutex<Vec<Vec<UpdateItem>>>,
}

impl FakeTableUpdater {
    pub fn submitted(&self) -> Vec<Vec<UpdateItem>> {
        self.batches.lock().clone()
    }

    pub fn clear(&self) {
        self.batches.lock().clear();
    }
}

impl TableUpdater for FakeTableUpdater {
    fn submit(&self, items: Vec<UpdateItem>) -> Result<(), TrackerError> {
        self.batches.lock().push(items);
        Ok(())
    }
}
