// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0
//! # Session Lifecycle
//!
//! The binding state machine driven by the host's session phases:
//! `Initial → Running → Retained → Gone`. Nothing can be decided at
//! `Initial` (no credential is observable yet); the decision ladder runs at
//! `Running`; the disconnect phases unbind and garbage-collect.
//!
//! Decision ladder at `Running`, first match wins:
//!
//! 1. a presented credential resolving to a non-anonymous namespace binds
//!    the session to it (credentials are authoritative over name rules)
//! 2. a static client-name rule binds the session and adopts the target
//!    namespace's first credential
//! 3. default policy `deny` refuses the session; no binding is created
//! 4. default policy `new_ns` creates an ephemeral namespace cloned from
//!    anonymous, named from the executable plus session index, with a
//!    freshly generated credential
//! 5. otherwise the session binds to the configured default namespace

use tracing::{info, warn};

use crate::application::engine::PolicyEngine;
use crate::domain::binding::{Admission, ClientBinding, ClientId, SessionPhase};
use crate::domain::registry::DefaultPolicy;

/// Credential material presented by a connecting session.
#[derive(Debug, Clone, Copy)]
pub struct PresentedCredential<'a> {
    pub protocol: &'a str,
    pub secret: &'a [u8],
}

/// What the host knows about a session when a phase change fires.
#[derive(Debug, Clone, Copy)]
pub struct SessionInfo<'a> {
    pub client: ClientId,
    /// Executable base name, stripped of path and arguments.
    pub executable: &'a str,
    pub credential: Option<PresentedCredential<'a>>,
}

impl PolicyEngine {
    /// Drive the state machine from a host phase notification. Only the
    /// `Running` phase produces an admission decision.
    pub fn on_session_phase(&mut self, phase: SessionPhase, info: &SessionInfo) -> Option<Admission> {
        match phase {
            SessionPhase::Initial => {
                self.session_connected(info.client);
                None
            }
            SessionPhase::Running => Some(self.session_running(info)),
            SessionPhase::Retained | SessionPhase::Gone => {
                self.session_disconnected(info.client);
                None
            }
        }
    }

    /// A session appeared; track it unbound until `Running`.
    pub fn session_connected(&mut self, client: ClientId) {
        self.bindings.entry(client).or_insert_with(ClientBinding::new);
    }

    /// Run the decision ladder for a session whose credential is now
    /// observable.
    pub fn session_running(&mut self, info: &SessionInfo) -> Admission {
        let client = info.client;
        self.session_connected(client);

        // 1. presented credential, authoritative when it names a real
        //    namespace
        if let Some(presented) = info.credential {
            if let Some((ns, credential)) =
                self.registry.find_credential(presented.protocol, presented.secret)
            {
                if ns != self.registry.anonymous_id() {
                    if let Some(binding) = self.bindings.get_mut(&client) {
                        binding.credential = Some(credential);
                        self.registry.bind(binding, Some(ns));
                    }
                    info!(%client, executable = info.executable, "bound by credential");
                    return Admission::Bound(ns);
                }
            }
        }

        // 2. static client-name rule
        if let Some(rule) = self.rules.lookup(info.executable) {
            let target = rule.namespace;
            let adopted = self
                .registry
                .get(target)
                .and_then(|ns| ns.first_credential())
                .map(|credential| credential.id);

            if let Some(binding) = self.bindings.get_mut(&client) {
                binding.credential = adopted;
                self.registry.bind(binding, Some(target));
            }
            info!(%client, executable = info.executable, "bound by static client rule");
            return Admission::Bound(target);
        }

        match self.registry.default_policy() {
            // 3. refuse outright; the host drops the connection
            DefaultPolicy::Deny => {
                warn!(%client, executable = info.executable, "denying connection");
                self.bindings.remove(&client);
                Admission::Rejected
            }

            // 4. fresh namespace per client
            DefaultPolicy::Ephemeral => {
                let name = format!("{}{}", info.executable, client.0);
                let anonymous = self.registry.anonymous_id();

                let ns = match self
                    .registry
                    .create_ephemeral(anonymous, &name, &mut *self.windows)
                {
                    Ok(ns) => {
                        if let Err(error) =
                            self.registry.generate_credential(ns, &mut *self.authority)
                        {
                            warn!(%client, %error, "credential generation failed");
                        }
                        ns
                    }
                    Err(error) => {
                        warn!(%client, %error, "ephemeral namespace creation failed, using anon");
                        anonymous
                    }
                };

                if let Some(binding) = self.bindings.get_mut(&client) {
                    self.registry.bind(binding, Some(ns));
                }
                Admission::Bound(ns)
            }

            // 5. configured default
            DefaultPolicy::Anonymous => self.bind_default(client, self.registry.anonymous_id()),
            DefaultPolicy::Namespace(ns) => self.bind_default(client, ns),
        }
    }

    /// A session went away; unbind it and collect its namespace if that was
    /// the last reference to an ephemeral one.
    pub fn session_disconnected(&mut self, client: ClientId) {
        let mut binding = match self.bindings.remove(&client) {
            Some(binding) => binding,
            None => return,
        };
        let released = binding.namespace;
        self.registry.unbind(&mut binding);

        if let Some(ns) = released {
            let eligible = self
                .registry
                .get(ns)
                .map(|ns| ns.eligible_for_delete())
                .unwrap_or(false);
            if eligible {
                if let Err(error) =
                    self.registry
                        .delete(ns, &mut *self.authority, &mut *self.windows)
                {
                    warn!(%client, %error, "failed to delete namespace on disconnect");
                }
            }
        }
    }

    fn bind_default(&mut self, client: ClientId, ns: crate::domain::namespace::NamespaceId) -> Admission {
        if let Some(binding) = self.bindings.get_mut(&client) {
            self.registry.bind(binding, Some(ns));
        }
        let name = self.registry.get(ns).map(|ns| ns.name.as_str()).unwrap_or("?");
        info!(%client, namespace = name, "bound to default namespace");
        Admission::Bound(ns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::credential::GENERATED_SECRET_LEN;
    use crate::infrastructure::authority::InMemoryAuthority;
    use crate::infrastructure::config_loader::parse_policy;
    use crate::infrastructure::window_system::InMemoryWindowSystem;

    fn engine(config: &str) -> PolicyEngine {
        let mut authority = InMemoryAuthority::new();
        let policy = parse_policy(config, &mut authority).unwrap();
        PolicyEngine::new(
            policy,
            Box::new(authority),
            Box::new(InMemoryWindowSystem::new()),
        )
    }

    fn anonymous_session(client: u32, executable: &str) -> SessionInfo<'_> {
        SessionInfo {
            client: ClientId(client),
            executable,
            credential: None,
        }
    }

    #[test]
    fn test_credential_binds_to_owning_namespace() {
        let mut engine = engine("namespace studio\nauth proto CAFE\n");
        let studio = engine.namespace_by_name("studio").unwrap();

        let info = SessionInfo {
            client: ClientId(3),
            executable: "editor",
            credential: Some(PresentedCredential {
                protocol: "proto",
                secret: &[0xCA, 0xFE],
            }),
        };
        assert_eq!(engine.session_running(&info), Admission::Bound(studio));
        assert_eq!(engine.namespace_of(ClientId(3)), Some(studio));
        assert_eq!(engine.registry().get(studio).unwrap().refcount, 1);
    }

    #[test]
    fn test_unknown_credential_falls_through_ladder() {
        let mut engine = engine("");
        let anon = engine.registry().anonymous_id();

        let info = SessionInfo {
            client: ClientId(3),
            executable: "editor",
            credential: Some(PresentedCredential {
                protocol: "proto",
                secret: &[0xFF],
            }),
        };
        assert_eq!(engine.session_running(&info), Admission::Bound(anon));
    }

    #[test]
    fn test_credential_overrides_static_rule() {
        let mut engine = engine(
            "namespace studio\nauth proto CAFE\nnamespace office\nclient editor\n",
        );
        let studio = engine.namespace_by_name("studio").unwrap();

        let info = SessionInfo {
            client: ClientId(3),
            executable: "editor",
            credential: Some(PresentedCredential {
                protocol: "proto",
                secret: &[0xCA, 0xFE],
            }),
        };
        assert_eq!(engine.session_running(&info), Admission::Bound(studio));
    }

    #[test]
    fn test_static_rule_adopts_first_credential() {
        let mut engine = engine("namespace studio\nauth proto CAFE\nclient editor\n");
        let studio = engine.namespace_by_name("studio").unwrap();

        let admission = engine.session_running(&anonymous_session(4, "editor"));
        assert_eq!(admission, Admission::Bound(studio));

        let binding = engine.bindings.get(&ClientId(4)).unwrap();
        let expected = engine
            .registry()
            .get(studio)
            .unwrap()
            .first_credential()
            .unwrap()
            .id;
        assert_eq!(binding.credential, Some(expected));
    }

    #[test]
    fn test_deny_policy_rejects_without_binding() {
        let mut engine = engine("default deny\n");
        let anon = engine.registry().anonymous_id();

        let admission = engine.session_running(&anonymous_session(5, "stranger"));
        assert!(admission.is_rejected());
        assert!(engine.namespace_of(ClientId(5)).is_none());
        assert_eq!(engine.registry().get(anon).unwrap().refcount, 0);
    }

    #[test]
    fn test_ephemeral_policy_creates_named_namespace_with_credential() {
        let mut engine = engine("default new_ns\n");

        let admission = engine.session_running(&anonymous_session(7, "shell"));
        let ns = match admission {
            Admission::Bound(ns) => ns,
            Admission::Rejected => panic!("expected a binding"),
        };

        let created = engine.registry().get(ns).unwrap();
        assert_eq!(created.name, "shell7");
        assert!(!created.retained);
        assert!(created.virtual_root.is_some());
        assert_eq!(created.refcount, 1);
        let credential = created.first_credential().unwrap();
        assert_eq!(credential.secret().len(), GENERATED_SECRET_LEN);
    }

    #[test]
    fn test_ephemeral_namespace_deleted_on_disconnect() {
        let mut engine = engine("default new_ns\n");

        let admission = engine.session_running(&anonymous_session(7, "shell"));
        let ns = match admission {
            Admission::Bound(ns) => ns,
            Admission::Rejected => panic!("expected a binding"),
        };

        engine.session_disconnected(ClientId(7));
        assert!(engine.registry().get(ns).is_none());
    }

    #[test]
    fn test_retained_namespace_survives_disconnects() {
        let mut engine = engine("namespace studio\nclient editor\n");
        let studio = engine.namespace_by_name("studio").unwrap();

        engine.session_running(&anonymous_session(1, "editor"));
        engine.session_running(&anonymous_session(2, "editor"));
        assert_eq!(engine.registry().get(studio).unwrap().refcount, 2);

        engine.session_disconnected(ClientId(1));
        // retained namespaces survive even at refcount zero
        engine.session_disconnected(ClientId(2));
        assert!(engine.registry().get(studio).is_some());
        assert_eq!(engine.registry().get(studio).unwrap().refcount, 0);
    }

    #[test]
    fn test_default_namespace_policy() {
        let mut engine = engine("default sandbox\nnamespace sandbox\n");
        let sandbox = engine.namespace_by_name("sandbox").unwrap();

        let admission = engine.session_running(&anonymous_session(9, "anything"));
        assert_eq!(admission, Admission::Bound(sandbox));
    }

    #[test]
    fn test_phase_dispatch() {
        let mut engine = engine("");
        let info = anonymous_session(11, "editor");

        assert!(engine.on_session_phase(SessionPhase::Initial, &info).is_none());
        let admission = engine.on_session_phase(SessionPhase::Running, &info);
        assert!(matches!(admission, Some(Admission::Bound(_))));
        assert!(engine.on_session_phase(SessionPhase::Gone, &info).is_none());
        assert!(engine.namespace_of(ClientId(11)).is_none());
    }
}
