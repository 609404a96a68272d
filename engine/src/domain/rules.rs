// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0
//! # Static Client Rules
//!
//! Administrator-declared mappings from a literal client executable name to
//! a namespace, loaded from `client` config directives. Rules are immutable
//! at runtime and consulted before the default-policy ladder; matching is
//! exact-string only.

use crate::domain::namespace::NamespaceId;

/// One declared client-name → namespace mapping.
#[derive(Debug, Clone)]
pub struct StaticRule {
    pub client_name: String,
    /// Weak handle; the registry owns the namespace record.
    pub namespace: NamespaceId,
}

/// The ordered list of static rules. First match wins.
#[derive(Debug, Clone, Default)]
pub struct StaticRuleSet {
    rules: Vec<StaticRule>,
}

impl StaticRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, client_name: impl Into<String>, namespace: NamespaceId) {
        self.rules.push(StaticRule {
            client_name: client_name.into(),
            namespace,
        });
    }

    /// First rule whose client name equals `name` exactly.
    pub fn lookup(&self, name: &str) -> Option<&StaticRule> {
        self.rules.iter().find(|rule| rule.client_name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StaticRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
