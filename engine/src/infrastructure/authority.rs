// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0
//! In-memory authority backend, used by the test suites and the config
//! validator. A real host registers credentials with its display-server
//! authorization list instead.

use anyhow::bail;

use crate::domain::host::AuthorityBackend;

#[derive(Debug, Default)]
pub struct InMemoryAuthority {
    entries: Vec<(String, Vec<u8>)>,
}

impl InMemoryAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, protocol: &str, secret: &[u8]) -> bool {
        self.entries
            .iter()
            .any(|(p, s)| p == protocol && s == secret)
    }
}

impl AuthorityBackend for InMemoryAuthority {
    fn add_credential(&mut self, protocol: &str, secret: &[u8]) -> anyhow::Result<()> {
        self.entries.push((protocol.to_string(), secret.to_vec()));
        Ok(())
    }

    fn remove_credential(&mut self, protocol: &str, secret: &[u8]) -> anyhow::Result<()> {
        let position = self
            .entries
            .iter()
            .position(|(p, s)| p == protocol && s == secret);
        match position {
            Some(index) => {
                self.entries.remove(index);
                Ok(())
            }
            None => bail!("credential not registered: {protocol}"),
        }
    }
}
