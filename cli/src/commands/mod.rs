// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0

pub mod config;

pub use config::ConfigCommand;
