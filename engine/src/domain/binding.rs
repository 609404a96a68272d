// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0
//! # Client Binding
//!
//! Per-session record tying one connected client to its resolved namespace.
//! Bindings hold a weak [`NamespaceId`] handle; the registry alone owns the
//! namespace records and keeps `refcount` in step with these references.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::credential::CredentialId;
use crate::domain::namespace::NamespaceId;

/// Host-assigned index of a connected client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub u32);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client {}", self.0)
    }
}

/// Session lifecycle phase, as delivered by the host.
///
/// Binding resolution only happens at `Running`, the first phase where a
/// credential is observable. `Retained` and `Gone` tear the binding down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Initial,
    Running,
    Retained,
    Gone,
}

/// Per-session binding state.
#[derive(Debug, Clone, Default)]
pub struct ClientBinding {
    /// The host server's own implicit session; exempt from resource checks.
    pub is_server: bool,
    /// Credential the session was resolved with, if any.
    pub credential: Option<CredentialId>,
    /// Weak handle into the registry; `None` until resolved.
    pub namespace: Option<NamespaceId>,
}

impl ClientBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server() -> Self {
        Self {
            is_server: true,
            ..Self::default()
        }
    }

    /// Two sessions share a namespace when both reference the same one, or
    /// when neither is bound at all.
    pub fn shares_namespace_with(&self, other: &ClientBinding) -> bool {
        self.namespace == other.namespace
    }
}

/// Connection-admission decision surfaced to the host's session-acceptance
/// logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Bound(NamespaceId),
    Rejected,
}

impl Admission {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Admission::Rejected)
    }
}
