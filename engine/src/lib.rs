// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0
//! Warden policy engine
//!
//! Mandatory access control for a single-host display server: security
//! namespaces, credentials, client bindings and the four policy guards that
//! mediate extension dispatch, device operations, resource access and event
//! receipt.
//!
//! # Architecture
//!
//! - **domain** — pure policy model, no I/O
//! - **application** — the [`application::engine::PolicyEngine`] facade and
//!   the session lifecycle ladder
//! - **infrastructure** — config loading plus in-memory host adapters

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use domain::*;
