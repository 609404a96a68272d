// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0
//! # Policy Engine Facade
//!
//! The single entry point a host embeds. Owns the registry, the static rule
//! set, the per-session bindings and the two host adapters, and exposes one
//! check method per guard plus the lookup queries the host's acceptance
//! logic consumes.
//!
//! Every check fails closed: a session the engine has never bound gets a
//! block verdict, never a permissive default.

use std::collections::HashMap;

use tracing::warn;

use crate::domain::binding::{ClientBinding, ClientId};
use crate::domain::guards::{self, ResourceDecision, Verdict};
use crate::domain::host::{AuthorityBackend, WindowSystem};
use crate::domain::namespace::{Namespace, NamespaceId};
use crate::domain::operation::{
    DeviceOp, DispatchRequest, EventKind, EventTarget, ResourceOp, ResourceTarget,
};
use crate::domain::registry::NamespaceRegistry;
use crate::domain::rules::StaticRuleSet;
use crate::infrastructure::config_loader::LoadedPolicy;

pub struct PolicyEngine {
    pub(crate) registry: NamespaceRegistry,
    pub(crate) rules: StaticRuleSet,
    pub(crate) bindings: HashMap<ClientId, ClientBinding>,
    pub(crate) authority: Box<dyn AuthorityBackend>,
    pub(crate) windows: Box<dyn WindowSystem>,
}

impl PolicyEngine {
    pub fn new(
        policy: LoadedPolicy,
        authority: Box<dyn AuthorityBackend>,
        windows: Box<dyn WindowSystem>,
    ) -> Self {
        Self {
            registry: policy.registry,
            rules: policy.rules,
            bindings: HashMap::new(),
            authority,
            windows,
        }
    }

    /// Register the host server's own implicit session, bound to the root
    /// namespace. Called once at startup, before any client connects.
    pub fn bootstrap_server(&mut self, client: ClientId) {
        let mut binding = ClientBinding::server();
        let root = self.registry.root_id();
        self.registry.bind(&mut binding, Some(root));
        self.bindings.insert(client, binding);
    }

    pub fn registry(&self) -> &NamespaceRegistry {
        &self.registry
    }

    pub fn rules(&self) -> &StaticRuleSet {
        &self.rules
    }

    /// Namespace a session is currently bound to.
    pub fn namespace_of(&self, client: ClientId) -> Option<NamespaceId> {
        self.bindings.get(&client).and_then(|b| b.namespace)
    }

    pub fn namespace_by_name(&self, name: &str) -> Option<NamespaceId> {
        self.registry.find_by_name(name)
    }

    pub fn namespace_by_credential(&self, protocol: &str, secret: &[u8]) -> Option<NamespaceId> {
        self.registry.find_credential(protocol, secret).map(|(ns, _)| ns)
    }

    /// Delete every unreferenced ephemeral namespace; used after batch
    /// disconnects. Returns the number deleted.
    pub fn prune(&mut self) -> usize {
        self.registry
            .prune(&mut *self.authority, &mut *self.windows)
    }

    pub fn check_dispatch(&self, client: ClientId, request: &DispatchRequest) -> Verdict {
        match self.subject(client) {
            Some((_, ns)) => guards::dispatch::check(ns, request),
            None => Verdict::Block,
        }
    }

    pub fn check_device(&self, client: ClientId, op: DeviceOp) -> Verdict {
        match self.subject(client) {
            Some((_, ns)) => guards::device::check(ns, op),
            None => Verdict::Block,
        }
    }

    /// Mediate access by `client` to a resource owned by `owner`'s session.
    pub fn check_resource(
        &self,
        client: ClientId,
        owner: ClientId,
        op: ResourceOp,
        target: &ResourceTarget,
    ) -> ResourceDecision {
        let (subject_binding, subject_ns) = match self.subject(client) {
            Some(found) => found,
            None => return ResourceDecision::block(),
        };
        let (owner_binding, owner_ns) = match self.subject(owner) {
            Some(found) => found,
            None => {
                warn!(%owner, "resource check against unbound owner session");
                return ResourceDecision::block();
            }
        };
        guards::resource::check(subject_binding, subject_ns, owner_binding, owner_ns, op, target)
    }

    /// Mediate delivery of an event batch to `client`, aimed at a window
    /// owned by `owner`'s session.
    pub fn check_receive(
        &self,
        client: ClientId,
        owner: ClientId,
        events: &[EventKind],
        target: &EventTarget,
    ) -> Verdict {
        let (subject_binding, subject_ns) = match self.subject(client) {
            Some(found) => found,
            None => return Verdict::Block,
        };
        let (owner_binding, owner_ns) = match self.subject(owner) {
            Some(found) => found,
            None => {
                warn!(%owner, "receive check against unbound owner session");
                return Verdict::Block;
            }
        };
        guards::receive::check(
            subject_binding,
            subject_ns,
            owner_binding,
            owner_ns,
            events,
            target,
        )
    }

    /// Binding and namespace for a session, or `None` (logged) when the
    /// session is unknown or unbound.
    fn subject(&self, client: ClientId) -> Option<(&ClientBinding, &Namespace)> {
        let binding = match self.bindings.get(&client) {
            Some(binding) => binding,
            None => {
                warn!(%client, "check against unknown session, blocking");
                return None;
            }
        };
        let ns = match binding.namespace.and_then(|id| self.registry.get(id)) {
            Some(ns) => ns,
            None => {
                warn!(%client, "check against unbound session, blocking");
                return None;
            }
        };
        Some((binding, ns))
    }
}
