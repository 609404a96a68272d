// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0
//! # Host Collaborator Seams
//!
//! The engine runs inline inside a host server and delegates two concerns
//! to it: the authorization subsystem that records live credentials, and
//! the window subsystem that materializes each namespace's private virtual
//! root. These traits keep the domain layer free of host internals; the
//! in-memory implementations in [`crate::infrastructure`] back the CLI and
//! the test suites.

use anyhow::Result;

use crate::domain::namespace::WindowHandle;

/// External authorization subsystem: the host-side store of credentials
/// accepted at connection setup.
pub trait AuthorityBackend {
    /// Register a credential record with the host.
    fn add_credential(&mut self, protocol: &str, secret: &[u8]) -> Result<()>;

    /// Remove a credential record. Failure is treated as best-effort by
    /// callers (logged, never fatal).
    fn remove_credential(&mut self, protocol: &str, secret: &[u8]) -> Result<()>;
}

/// Host window subsystem: creates and tears down the per-namespace virtual
/// root surfaces the engine references but never owns.
pub trait WindowSystem {
    /// Create the private top-level surface for a namespace.
    fn create_virtual_root(&mut self, namespace_name: &str) -> Result<WindowHandle>;

    /// Tear down a window previously created for a namespace.
    ///
    /// May reentrantly trigger destroy notifications into the engine; the
    /// registry removes a namespace from its collection *before* calling
    /// this, so reentrant lookups observe the namespace as already gone.
    fn destroy_window(&mut self, handle: WindowHandle) -> Result<()>;
}
