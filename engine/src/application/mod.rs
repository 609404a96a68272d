// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0

pub mod engine;
pub mod lifecycle;

pub use engine::PolicyEngine;
pub use lifecycle::{PresentedCredential, SessionInfo};
