// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0
//! # Namespace Aggregate
//!
//! A namespace is the unit of isolation: every connected client is bound to
//! exactly one namespace, and every mediated operation is decided against
//! the binding's permission flags.
//!
//! ## Invariants
//!
//! - Exactly one namespace has `is_root = true` (the trusted namespace with
//!   a fixed cross-namespace whitelist).
//! - Exactly one namespace is the anonymous default.
//! - `name` is unique across the registry and immutable after creation.
//! - `retained` namespaces (declared in configuration, plus root and
//!   anonymous) are never garbage-collected; ephemeral ones are deleted
//!   once their `refcount` returns to zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::credential::Credential;
use crate::domain::permissions::PermissionSet;

/// Name of the single trusted root namespace.
pub const ROOT_NAMESPACE: &str = "root";

/// Name of the default low-privilege namespace.
pub const ANONYMOUS_NAMESPACE: &str = "anon";

/// Opaque registry handle for a namespace.
///
/// Bindings and static rules hold this id rather than a reference; the
/// registry is the only strong owner of namespace records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespaceId(pub Uuid);

impl NamespaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NamespaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle to a host-owned window resource.
///
/// The host window subsystem creates and destroys the actual windows; the
/// engine only stores the handle of each namespace's private virtual root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowHandle(pub u64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:06x}", self.0)
    }
}

/// Behavior flags set at namespace creation (beyond the permission set).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NamespaceFlags {
    pub is_root: bool,
    pub super_power: bool,
    pub deny_connections: bool,
}

/// A named security scope.
#[derive(Debug)]
pub struct Namespace {
    pub id: NamespaceId,
    pub name: String,
    pub permissions: PermissionSet,
    /// The single trusted namespace whose resources carry a fixed
    /// cross-namespace whitelist.
    pub is_root: bool,
    /// Bypasses every guard when set on the *acting* namespace.
    pub super_power: bool,
    /// Never garbage-collected: configured namespaces, root and anonymous.
    pub retained: bool,
    /// Unresolved clients are refused rather than bound to a default.
    pub deny_connections: bool,
    /// Number of client bindings currently pointing here.
    pub refcount: usize,
    pub credentials: Vec<Credential>,
    /// This namespace's private top-level surface, owned by the host.
    pub virtual_root: Option<WindowHandle>,
    pub created_at: DateTime<Utc>,
}

impl Namespace {
    pub(crate) fn new(
        name: impl Into<String>,
        permissions: PermissionSet,
        retained: bool,
        flags: NamespaceFlags,
    ) -> Self {
        Self {
            id: NamespaceId::new(),
            name: name.into(),
            permissions,
            is_root: flags.is_root,
            super_power: flags.super_power,
            retained,
            deny_connections: flags.deny_connections,
            refcount: 0,
            credentials: Vec::new(),
            virtual_root: None,
            created_at: Utc::now(),
        }
    }

    /// Deletable: no live bindings and not a retained namespace.
    pub fn eligible_for_delete(&self) -> bool {
        self.refcount == 0 && !self.retained
    }

    /// First credential bound to this namespace, if any. Static-rule
    /// matches adopt this credential as the session's resolved one.
    pub fn first_credential(&self) -> Option<&Credential> {
        self.credentials.first()
    }

    /// Operator-facing snapshot without raw secret bytes.
    pub fn summary(&self) -> NamespaceSummary {
        NamespaceSummary {
            name: self.name.clone(),
            is_root: self.is_root,
            super_power: self.super_power,
            retained: self.retained,
            refcount: self.refcount,
            permissions: self.permissions,
            credentials: self
                .credentials
                .iter()
                .map(|cred| CredentialSummary {
                    protocol: cred.protocol.clone(),
                    secret_hex: cred.secret_hex(),
                })
                .collect(),
        }
    }
}

/// Introspection record for one namespace, used by logs and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceSummary {
    pub name: String,
    pub is_root: bool,
    pub super_power: bool,
    pub retained: bool,
    pub refcount: usize,
    pub permissions: PermissionSet,
    pub credentials: Vec<CredentialSummary>,
}

/// Hex-rendered credential record for operator inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialSummary {
    pub protocol: String,
    pub secret_hex: String,
}
