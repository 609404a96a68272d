// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Model
//!
//! Pure policy vocabulary and state: namespaces and their capability sets,
//! credentials, client bindings, the namespace registry, static client
//! rules, operation categories, and the four policy guards. Nothing here
//! performs I/O; side effects on the host go through the [`host`] traits.

pub mod binding;
pub mod credential;
pub mod guards;
pub mod host;
pub mod namespace;
pub mod operation;
pub mod permissions;
pub mod registry;
pub mod rules;
