// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0
//! # Policy Configuration Loader
//!
//! Parses the line-oriented namespace policy file into a populated
//! [`NamespaceRegistry`] and [`StaticRuleSet`].
//!
//! Grammar, one directive per line, `#` starts a comment:
//!
//! ```text
//! default <anon|deny|new_ns|NAME>
//! namespace <NAME>          # selects/creates; "container" is a deprecated alias
//! auth generate
//! auth <PROTOCOL> <HEXSECRET>
//! allow <capability>...
//! superpower
//! client <NAME>...
//! ```
//!
//! Directives before the first `namespace` line apply to the built-in root
//! namespace. Malformed lines are logged and skipped; only I/O and host
//! failures abort the load. The `default` token is resolved after the whole
//! file has been read, so it may name a namespace declared later.

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::host::AuthorityBackend;
use crate::domain::namespace::{NamespaceFlags, NamespaceId};
use crate::domain::permissions::{Capability, PermissionSet};
use crate::domain::registry::{DefaultPolicy, NamespaceRegistry, RegistryError};
use crate::domain::rules::StaticRuleSet;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed reading policy file: {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Everything a policy file produces.
#[derive(Debug)]
pub struct LoadedPolicy {
    pub registry: NamespaceRegistry,
    pub rules: StaticRuleSet,
}

/// Load and parse a policy file from disk.
pub fn load_policy(
    path: &Path,
    authority: &mut dyn AuthorityBackend,
) -> Result<LoadedPolicy, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let policy = parse_policy(&text, authority)?;
    info!(path = %path.display(), "loaded namespace policy");
    dump_policy(&policy);
    Ok(policy)
}

/// Parse policy text into a registry and rule set.
pub fn parse_policy(
    text: &str,
    authority: &mut dyn AuthorityBackend,
) -> Result<LoadedPolicy, ConfigError> {
    let mut registry = NamespaceRegistry::new();
    let mut rules = StaticRuleSet::new();

    // the most recently selected namespace; root until a namespace line
    let mut current: Option<NamespaceId> = None;
    let mut default_token: Option<String> = None;

    for (number, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let directive = match tokens.next() {
            Some(token) => token,
            None => continue,
        };

        match directive {
            "default" => match tokens.next() {
                Some(token) => default_token = Some(token.to_string()),
                None => warn!(line = number + 1, "default directive without a value"),
            },

            "namespace" | "container" => {
                if directive == "container" {
                    warn!(line = number + 1, "'container' is deprecated, use 'namespace'");
                }
                match tokens.next() {
                    Some(name) => {
                        let id = match registry.find_by_name(name) {
                            Some(id) => id,
                            None => registry.create_retained(
                                name,
                                PermissionSet::NONE,
                                NamespaceFlags::default(),
                            )?,
                        };
                        current = Some(id);
                    }
                    None => warn!(line = number + 1, "namespace directive without a name"),
                }
            }

            "auth" => {
                let target = current.unwrap_or(registry.root_id());
                match tokens.next() {
                    Some("generate") => {
                        registry.generate_credential(target, authority)?;
                    }
                    Some(protocol) => match tokens.next().map(decode_secret) {
                        Some(Some(secret)) => {
                            registry.bind_credential(target, protocol, secret, authority)?;
                        }
                        Some(None) => {
                            warn!(line = number + 1, protocol, "invalid hex secret, skipping");
                        }
                        None => {
                            warn!(line = number + 1, protocol, "auth directive without a secret");
                        }
                    },
                    None => warn!(line = number + 1, "auth directive without arguments"),
                }
            }

            "allow" => {
                let target = current.unwrap_or(registry.root_id());
                for token in tokens {
                    match token.parse::<Capability>() {
                        Ok(capability) => {
                            if let Some(ns) = registry.get_mut(target) {
                                ns.permissions.grant(capability);
                            }
                        }
                        Err(error) => warn!(line = number + 1, %error, "skipping"),
                    }
                }
            }

            "superpower" => {
                let target = current.unwrap_or(registry.root_id());
                if let Some(ns) = registry.get_mut(target) {
                    ns.super_power = true;
                }
            }

            "client" => {
                let target = current.unwrap_or(registry.root_id());
                let name = registry
                    .get(target)
                    .map(|ns| ns.name.clone())
                    .unwrap_or_default();
                for token in tokens {
                    rules.add(token, target);
                    info!(client = token, namespace = %name, "added static client rule");
                }
            }

            other => warn!(line = number + 1, directive = other, "unknown directive"),
        }
    }

    apply_default(&mut registry, default_token.as_deref());

    Ok(LoadedPolicy { registry, rules })
}

/// Resolve the `default` token once the whole file is known.
fn apply_default(registry: &mut NamespaceRegistry, token: Option<&str>) {
    let policy = match token {
        None | Some("anon") => DefaultPolicy::Anonymous,
        Some("deny") => {
            info!("defaulting to denying unclaimed connections");
            DefaultPolicy::Deny
        }
        Some("new_ns") => {
            info!("defaulting to a fresh namespace per unclaimed client");
            DefaultPolicy::Ephemeral
        }
        Some(name) => match registry.find_by_name(name) {
            Some(id) => {
                info!(namespace = name, "defaulting unclaimed clients to namespace");
                DefaultPolicy::Namespace(id)
            }
            None => {
                warn!(namespace = name, "unknown default namespace, falling back to anon");
                DefaultPolicy::Anonymous
            }
        },
    };
    registry.set_default_policy(policy);
}

/// Hex decoding matching the historical loader: pairs are consumed left to
/// right, an odd trailing digit is ignored, any non-hex digit rejects the
/// whole secret.
fn decode_secret(token: &str) -> Option<Vec<u8>> {
    if !token.is_ascii() {
        return None;
    }
    let pairs = token.len() / 2;
    hex::decode(&token[..pairs * 2]).ok()
}

fn dump_policy(policy: &LoadedPolicy) {
    for ns in policy.registry.iter() {
        info!(namespace = %ns.name, "namespace");
        for credential in &ns.credentials {
            info!(
                namespace = %ns.name,
                protocol = %credential.protocol,
                secret = %credential.secret_hex(),
                "  auth"
            );
        }
    }
}
