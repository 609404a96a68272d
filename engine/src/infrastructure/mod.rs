// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0

pub mod authority;
pub mod config_loader;
pub mod window_system;

pub use authority::InMemoryAuthority;
pub use config_loader::{load_policy, parse_policy, ConfigError, LoadedPolicy};
pub use window_system::InMemoryWindowSystem;
