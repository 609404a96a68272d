// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0
//! In-memory window system, used by the test suites and the config
//! validator. Hands out monotonically increasing window handles and tracks
//! which are still alive.

use anyhow::bail;

use crate::domain::host::WindowSystem;
use crate::domain::namespace::WindowHandle;

#[derive(Debug)]
pub struct InMemoryWindowSystem {
    next: u64,
    live: Vec<WindowHandle>,
}

impl InMemoryWindowSystem {
    pub fn new() -> Self {
        Self {
            next: 0x200,
            live: Vec::new(),
        }
    }

    pub fn live_windows(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, handle: WindowHandle) -> bool {
        self.live.contains(&handle)
    }
}

impl Default for InMemoryWindowSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowSystem for InMemoryWindowSystem {
    fn create_virtual_root(&mut self, _namespace_name: &str) -> anyhow::Result<WindowHandle> {
        let handle = WindowHandle(self.next);
        self.next += 1;
        self.live.push(handle);
        Ok(handle)
    }

    fn destroy_window(&mut self, handle: WindowHandle) -> anyhow::Result<()> {
        match self.live.iter().position(|&h| h == handle) {
            Some(index) => {
                self.live.remove(index);
                Ok(())
            }
            None => bail!("no such window: {handle}"),
        }
    }
}
