// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0
//! # Policy Guards
//!
//! Four pure decision functions, one per mediated interaction: extension
//! dispatch, device operations, resource access and event receipt. Each is
//! an explicit ordered rule list sharing the same shape:
//!
//! 1. acting namespace has superpower → pass
//! 2. acting and target namespace are the same → pass
//! 3. target owned by the root namespace → fixed per-guard whitelist
//! 4. category mapped to a permission flag → pass iff the flag is set
//! 5. anything unmapped → block (fail-closed), audited at `warn!`
//!
//! Guards never mutate bindings or the registry. The resource guard's
//! forced-opaque marking is the single documented side effect, and it is
//! reported back to the host in the decision rather than applied here.

pub mod device;
pub mod dispatch;
pub mod receive;
pub mod resource;

use serde::{Deserialize, Serialize};

/// Pass/block outcome of one guard evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Pass,
    Block,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

/// Resource-guard outcome: the verdict plus the forced-opaque side effect.
///
/// `force_opaque` is independent of the verdict: a window created by a
/// namespace without the transparency flag is marked opaque whether or not
/// the access itself passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDecision {
    pub verdict: Verdict,
    pub force_opaque: bool,
}

impl ResourceDecision {
    pub fn pass() -> Self {
        Self {
            verdict: Verdict::Pass,
            force_opaque: false,
        }
    }

    pub fn block() -> Self {
        Self {
            verdict: Verdict::Block,
            force_opaque: false,
        }
    }

    pub fn with_force_opaque(mut self, force_opaque: bool) -> Self {
        self.force_opaque = force_opaque;
        self
    }
}
