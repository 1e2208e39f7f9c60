// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier types.
//!
//! [`SubstrateId`] wraps the external E039 object store's `full_name` for a
//! substrate object. Unlike locally-minted IDs (job IDs, decision IDs, ...),
//! a substrate's identity is assigned by the object store, not generated
//! here — there is no `new()`/random-generation path, only `from_name`.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::borrow::Borrow;
use std::fmt;

/// Opaque identifier of a substrate object in the external E039 object store.
///
/// Backed by [`SmolStr`] (cheap to clone, inline-stored for short names) since
/// `full_name` values are assigned externally and have no fixed maximum
/// length the way locally-minted prefixed IDs do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubstrateId(SmolStr);

impl SubstrateId {
    /// Wrap an existing full name from the object store.
    pub fn from_name(full_name: impl Into<SmolStr>) -> Self {
        Self(full_name.into())
    }

    /// The stable unique string identifying this substrate in the object store.
    pub fn full_name(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SubstrateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SubstrateId {
    fn from(s: &str) -> Self {
        Self::from_name(s)
    }
}

impl From<String> for SubstrateId {
    fn from(s: String) -> Self {
        Self::from_name(s)
    }
}

impl AsRef<str> for SubstrateId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Borrow<str> for SubstrateId {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq<str> for SubstrateId {
    fn eq(&self, other: &str) -> bool {
        self.0.as_str() == other
    }
}

impl PartialEq<&str> for SubstrateId {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_str() == *other
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
