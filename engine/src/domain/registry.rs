// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0
//! # Namespace Registry
//!
//! The single strong owner of all namespace records. Everything else —
//! client bindings, static rules — holds weak [`NamespaceId`] handles and
//! goes through the registry for lookups, so no raw back-reference can
//! dangle across a deletion.
//!
//! ## Lifecycle
//!
//! Retained namespaces come from configuration (plus the built-in root and
//! anonymous ones) and live forever. Ephemeral namespaces are created
//! per-client, cloned from the anonymous permission set, and deleted once
//! their refcount returns to zero.
//!
//! ## Reentrancy
//!
//! Deleting a namespace asks the host to tear down its virtual-root window,
//! which may loop back into the engine with destroy notifications.
//! [`NamespaceRegistry::delete`] therefore removes the record from the
//! collection *before* invoking the teardown; a reentrant lookup observes
//! the namespace as already absent.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::binding::ClientBinding;
use crate::domain::credential::{Credential, CredentialId};
use crate::domain::host::{AuthorityBackend, WindowSystem};
use crate::domain::namespace::{
    Namespace, NamespaceFlags, NamespaceId, NamespaceSummary, ANONYMOUS_NAMESPACE, ROOT_NAMESPACE,
};
use crate::domain::permissions::PermissionSet;

/// What happens to a connecting client that no credential or static rule
/// claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultPolicy {
    /// Bind to the anonymous namespace.
    Anonymous,
    /// Refuse the connection outright.
    Deny,
    /// Create a fresh per-client namespace cloned from anonymous.
    Ephemeral,
    /// Bind to a specific configured namespace.
    Namespace(NamespaceId),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("namespace name already exists: {0}")]
    DuplicateName(String),

    #[error("unknown namespace id: {0}")]
    UnknownNamespace(NamespaceId),

    #[error("namespace '{0}' is not eligible for deletion (retained or still referenced)")]
    NotEligible(String),

    #[error("virtual root creation failed for namespace '{name}'")]
    VirtualRoot {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("credential registration failed for namespace '{name}'")]
    Authority {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Owned collection of namespaces, in insertion order.
///
/// Linear scans throughout: the namespace count is administrator-bounded
/// and small, and the host dispatch loop is single-threaded (§ concurrency
/// model), so no index or lock is warranted.
#[derive(Debug)]
pub struct NamespaceRegistry {
    namespaces: Vec<Namespace>,
    root: NamespaceId,
    anonymous: NamespaceId,
    default_policy: DefaultPolicy,
}

impl NamespaceRegistry {
    /// Build a registry holding the two built-in namespaces: the trusted
    /// root (every permission, superpower) and the low-privilege anonymous
    /// default.
    pub fn new() -> Self {
        let root = Namespace::new(
            ROOT_NAMESPACE,
            PermissionSet::ALL,
            true,
            NamespaceFlags {
                is_root: true,
                super_power: true,
                deny_connections: false,
            },
        );
        let anonymous = Namespace::new(
            ANONYMOUS_NAMESPACE,
            PermissionSet::NONE,
            true,
            NamespaceFlags::default(),
        );
        let root_id = root.id;
        let anonymous_id = anonymous.id;

        Self {
            namespaces: vec![root, anonymous],
            root: root_id,
            anonymous: anonymous_id,
            default_policy: DefaultPolicy::Anonymous,
        }
    }

    pub fn root_id(&self) -> NamespaceId {
        self.root
    }

    pub fn anonymous_id(&self) -> NamespaceId {
        self.anonymous
    }

    pub fn default_policy(&self) -> DefaultPolicy {
        self.default_policy
    }

    pub fn set_default_policy(&mut self, policy: DefaultPolicy) {
        self.default_policy = policy;
    }

    pub fn get(&self, id: NamespaceId) -> Option<&Namespace> {
        self.namespaces.iter().find(|ns| ns.id == id)
    }

    pub fn get_mut(&mut self, id: NamespaceId) -> Option<&mut Namespace> {
        self.namespaces.iter_mut().find(|ns| ns.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<NamespaceId> {
        self.namespaces
            .iter()
            .find(|ns| ns.name == name)
            .map(|ns| ns.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Namespace> {
        self.namespaces.iter()
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Create a configuration-declared namespace. Fails on a duplicate
    /// name; the config loader selects the existing namespace instead of
    /// calling this twice.
    pub fn create_retained(
        &mut self,
        name: &str,
        permissions: PermissionSet,
        flags: NamespaceFlags,
    ) -> Result<NamespaceId, RegistryError> {
        if self.find_by_name(name).is_some() {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }

        let ns = Namespace::new(name, permissions, true, flags);
        let id = ns.id;
        info!(namespace = %name, "created retained namespace");
        self.namespaces.push(ns);
        Ok(id)
    }

    /// Create a per-client namespace cloned from `clone_from`'s permission
    /// set, with a fresh virtual root requested from the host.
    pub fn create_ephemeral(
        &mut self,
        clone_from: NamespaceId,
        name: &str,
        windows: &mut dyn WindowSystem,
    ) -> Result<NamespaceId, RegistryError> {
        if self.find_by_name(name).is_some() {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }
        let permissions = self
            .get(clone_from)
            .ok_or(RegistryError::UnknownNamespace(clone_from))?
            .permissions;

        let mut ns = Namespace::new(name, permissions, false, NamespaceFlags::default());
        let virtual_root =
            windows
                .create_virtual_root(name)
                .map_err(|source| RegistryError::VirtualRoot {
                    name: name.to_string(),
                    source,
                })?;
        ns.virtual_root = Some(virtual_root);

        let id = ns.id;
        info!(namespace = %name, %virtual_root, "created ephemeral namespace");
        self.namespaces.push(ns);
        Ok(id)
    }

    /// Point `binding` at `target`, keeping refcounts in step with the
    /// reference change. `None` releases the current namespace.
    pub fn bind(&mut self, binding: &mut ClientBinding, target: Option<NamespaceId>) {
        if let Some(old) = binding.namespace.take() {
            if let Some(ns) = self.get_mut(old) {
                ns.refcount = ns.refcount.saturating_sub(1);
            }
        }

        match target {
            Some(id) => match self.get_mut(id) {
                Some(ns) => {
                    ns.refcount += 1;
                    binding.namespace = Some(id);
                }
                None => {
                    warn!(namespace = %id, "bind requested against unknown namespace");
                }
            },
            None => {}
        }
    }

    pub fn unbind(&mut self, binding: &mut ClientBinding) {
        self.bind(binding, None);
    }

    /// Delete an ephemeral namespace nobody references any more.
    ///
    /// Revokes its credentials and asks the host to tear down its virtual
    /// root; the record leaves the registry before either side effect runs.
    pub fn delete(
        &mut self,
        id: NamespaceId,
        authority: &mut dyn AuthorityBackend,
        windows: &mut dyn WindowSystem,
    ) -> Result<(), RegistryError> {
        let position = self
            .namespaces
            .iter()
            .position(|ns| ns.id == id)
            .ok_or(RegistryError::UnknownNamespace(id))?;

        if !self.namespaces[position].eligible_for_delete() {
            return Err(RegistryError::NotEligible(
                self.namespaces[position].name.clone(),
            ));
        }

        let mut ns = self.namespaces.remove(position);
        info!(namespace = %ns.name, "deleting namespace");

        revoke_credentials(&mut ns, authority);

        if let Some(handle) = ns.virtual_root.take() {
            if let Err(error) = windows.destroy_window(handle) {
                warn!(namespace = %ns.name, %handle, %error, "virtual root teardown failed");
            }
        }
        Ok(())
    }

    /// Delete every eligible namespace in one sweep; used after batch
    /// disconnects. Returns the number deleted.
    pub fn prune(
        &mut self,
        authority: &mut dyn AuthorityBackend,
        windows: &mut dyn WindowSystem,
    ) -> usize {
        let eligible: Vec<NamespaceId> = self
            .namespaces
            .iter()
            .filter(|ns| ns.eligible_for_delete())
            .map(|ns| ns.id)
            .collect();

        let mut deleted = 0;
        for id in eligible {
            match self.delete(id, authority, windows) {
                Ok(()) => deleted += 1,
                Err(error) => warn!(%error, "prune failed to delete namespace"),
            }
        }
        deleted
    }

    /// Register an explicit credential with the host authority and store it
    /// under the namespace.
    pub fn bind_credential(
        &mut self,
        id: NamespaceId,
        protocol: &str,
        secret: Vec<u8>,
        authority: &mut dyn AuthorityBackend,
    ) -> Result<CredentialId, RegistryError> {
        let name = self
            .get(id)
            .ok_or(RegistryError::UnknownNamespace(id))?
            .name
            .clone();

        authority
            .add_credential(protocol, &secret)
            .map_err(|source| RegistryError::Authority {
                name: name.clone(),
                source,
            })?;

        let credential = Credential::new(protocol, secret);
        let credential_id = credential.id;
        debug!(namespace = %name, protocol, "bound credential");

        // lookup cannot fail: the name clone above proved the id
        if let Some(ns) = self.get_mut(id) {
            ns.credentials.push(credential);
        }
        Ok(credential_id)
    }

    /// Generate and bind a fresh random credential for a namespace.
    pub fn generate_credential(
        &mut self,
        id: NamespaceId,
        authority: &mut dyn AuthorityBackend,
    ) -> Result<CredentialId, RegistryError> {
        let name = self
            .get(id)
            .ok_or(RegistryError::UnknownNamespace(id))?
            .name
            .clone();

        let credential = Credential::generate();
        authority
            .add_credential(&credential.protocol, credential.secret())
            .map_err(|source| RegistryError::Authority {
                name: name.clone(),
                source,
            })?;

        info!(
            namespace = %name,
            secret = %credential.secret_hex(),
            "generated credential"
        );

        let credential_id = credential.id;
        if let Some(ns) = self.get_mut(id) {
            ns.credentials.push(credential);
        }
        Ok(credential_id)
    }

    /// Best-effort removal of every credential of a namespace from the host
    /// authority. Failures are logged, never propagated.
    pub fn revoke_credentials(&mut self, id: NamespaceId, authority: &mut dyn AuthorityBackend) {
        if let Some(ns) = self.get_mut(id) {
            revoke_credentials(ns, authority);
        }
    }

    /// Exact credential match across all namespaces.
    pub fn find_credential(
        &self,
        protocol: &str,
        secret: &[u8],
    ) -> Option<(NamespaceId, CredentialId)> {
        for ns in &self.namespaces {
            for credential in &ns.credentials {
                if credential.matches(protocol, secret) {
                    return Some((ns.id, credential.id));
                }
            }
        }
        None
    }

    /// Resolve a presented credential to its owning namespace, falling back
    /// to the anonymous namespace on no match. Unknown credentials are
    /// never rejected here; only the binding state machine's default policy
    /// refuses connections.
    pub fn resolve_credential(&self, protocol: &str, secret: &[u8]) -> NamespaceId {
        self.find_credential(protocol, secret)
            .map(|(ns, _)| ns)
            .unwrap_or(self.anonymous)
    }

    /// Snapshot of every namespace for logs and operator tooling.
    pub fn summaries(&self) -> Vec<NamespaceSummary> {
        self.namespaces.iter().map(Namespace::summary).collect()
    }
}

impl Default for NamespaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn revoke_credentials(ns: &mut Namespace, authority: &mut dyn AuthorityBackend) {
    for credential in ns.credentials.drain(..) {
        match authority.remove_credential(&credential.protocol, credential.secret()) {
            Ok(()) => info!(
                namespace = %ns.name,
                protocol = %credential.protocol,
                "revoked credential"
            ),
            Err(error) => warn!(
                namespace = %ns.name,
                protocol = %credential.protocol,
                %error,
                "credential revocation failed"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::authority::InMemoryAuthority;
    use crate::infrastructure::window_system::InMemoryWindowSystem;

    fn backends() -> (InMemoryAuthority, InMemoryWindowSystem) {
        (InMemoryAuthority::new(), InMemoryWindowSystem::new())
    }

    #[test]
    fn test_builtin_namespaces_exist() {
        let registry = NamespaceRegistry::new();

        let root = registry.get(registry.root_id()).unwrap();
        assert!(root.is_root);
        assert!(root.super_power);
        assert!(root.retained);
        assert_eq!(root.permissions, PermissionSet::ALL);

        let anon = registry.get(registry.anonymous_id()).unwrap();
        assert!(!anon.is_root);
        assert!(anon.retained);
        assert_eq!(anon.permissions, PermissionSet::NONE);
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let mut registry = NamespaceRegistry::new();
        registry
            .create_retained("studio", PermissionSet::NONE, NamespaceFlags::default())
            .unwrap();

        let err = registry
            .create_retained("studio", PermissionSet::NONE, NamespaceFlags::default())
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName(_)));
    }

    #[test]
    fn test_bind_and_unbind_track_refcount() {
        let mut registry = NamespaceRegistry::new();
        let ns = registry
            .create_retained("studio", PermissionSet::NONE, NamespaceFlags::default())
            .unwrap();

        let mut a = ClientBinding::new();
        let mut b = ClientBinding::new();
        registry.bind(&mut a, Some(ns));
        registry.bind(&mut b, Some(ns));
        assert_eq!(registry.get(ns).unwrap().refcount, 2);

        registry.unbind(&mut a);
        assert_eq!(registry.get(ns).unwrap().refcount, 1);
        assert!(a.namespace.is_none());

        // rebinding moves the refcount, atomically with the reference
        registry.bind(&mut b, Some(registry.anonymous_id()));
        assert_eq!(registry.get(ns).unwrap().refcount, 0);
        assert_eq!(registry.get(registry.anonymous_id()).unwrap().refcount, 1);
    }

    #[test]
    fn test_refcount_never_goes_negative() {
        let mut registry = NamespaceRegistry::new();
        let mut binding = ClientBinding::new();

        registry.unbind(&mut binding);
        registry.unbind(&mut binding);
        registry.bind(&mut binding, Some(registry.anonymous_id()));
        registry.unbind(&mut binding);
        registry.unbind(&mut binding);

        assert_eq!(registry.get(registry.anonymous_id()).unwrap().refcount, 0);
    }

    #[test]
    fn test_root_and_anonymous_are_never_deletable() {
        let mut registry = NamespaceRegistry::new();
        let (mut authority, mut windows) = backends();

        for id in [registry.root_id(), registry.anonymous_id()] {
            let err = registry.delete(id, &mut authority, &mut windows).unwrap_err();
            assert!(matches!(err, RegistryError::NotEligible(_)));
        }
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_delete_refuses_referenced_namespace() {
        let mut registry = NamespaceRegistry::new();
        let (mut authority, mut windows) = backends();
        let ns = registry
            .create_ephemeral(registry.anonymous_id(), "shell1", &mut windows)
            .unwrap();

        let mut binding = ClientBinding::new();
        registry.bind(&mut binding, Some(ns));

        assert!(registry.delete(ns, &mut authority, &mut windows).is_err());

        registry.unbind(&mut binding);
        registry.delete(ns, &mut authority, &mut windows).unwrap();
        assert!(registry.get(ns).is_none());
    }

    #[test]
    fn test_delete_tears_down_virtual_root_and_credentials() {
        let mut registry = NamespaceRegistry::new();
        let (mut authority, mut windows) = backends();

        let ns = registry
            .create_ephemeral(registry.anonymous_id(), "shell1", &mut windows)
            .unwrap();
        registry.generate_credential(ns, &mut authority).unwrap();
        assert_eq!(authority.len(), 1);
        assert_eq!(windows.live_windows(), 1);

        registry.delete(ns, &mut authority, &mut windows).unwrap();
        assert_eq!(authority.len(), 0);
        assert_eq!(windows.live_windows(), 0);
    }

    #[test]
    fn test_ephemeral_clones_permissions() {
        let mut registry = NamespaceRegistry::new();
        let (_, mut windows) = backends();

        let anon = registry.anonymous_id();
        registry
            .get_mut(anon)
            .unwrap()
            .permissions
            .grant(crate::domain::permissions::Capability::Shape);

        let ns = registry.create_ephemeral(anon, "shell1", &mut windows).unwrap();
        let created = registry.get(ns).unwrap();
        assert!(created.permissions.shape);
        assert!(!created.retained);
        assert!(created.virtual_root.is_some());
    }

    #[test]
    fn test_prune_sweeps_only_eligible() {
        let mut registry = NamespaceRegistry::new();
        let (mut authority, mut windows) = backends();

        let dead = registry
            .create_ephemeral(registry.anonymous_id(), "gone1", &mut windows)
            .unwrap();
        let live = registry
            .create_ephemeral(registry.anonymous_id(), "live2", &mut windows)
            .unwrap();
        let mut binding = ClientBinding::new();
        registry.bind(&mut binding, Some(live));

        assert_eq!(registry.prune(&mut authority, &mut windows), 1);
        assert!(registry.get(dead).is_none());
        assert!(registry.get(live).is_some());
        // root and anonymous survive every prune
        assert!(registry.get(registry.root_id()).is_some());
        assert!(registry.get(registry.anonymous_id()).is_some());
    }

    #[test]
    fn test_resolve_credential_falls_back_to_anonymous() {
        let mut registry = NamespaceRegistry::new();
        let (mut authority, _) = backends();

        let ns = registry
            .create_retained("studio", PermissionSet::NONE, NamespaceFlags::default())
            .unwrap();
        registry
            .bind_credential(ns, "proto", vec![1, 2, 3, 4], &mut authority)
            .unwrap();

        assert_eq!(registry.resolve_credential("proto", &[1, 2, 3, 4]), ns);
        assert_eq!(
            registry.resolve_credential("proto", &[9, 9, 9, 9]),
            registry.anonymous_id()
        );
        assert_eq!(
            registry.resolve_credential("other", &[1, 2, 3, 4]),
            registry.anonymous_id()
        );
    }
}
