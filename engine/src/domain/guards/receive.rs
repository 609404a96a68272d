// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0
//! # Event-Receipt Guard
//!
//! Checks a whole batch of events about to be delivered to one window. The
//! batch is all-or-nothing: one unmapped event blocks the delivery entirely.
//!
//! Structural notifications aimed at a root-namespace-owned window pass the
//! whole batch, so window managers inside the root namespace keep working.
//! Raw input events only flow when they target the literal server root
//! window and the receiving namespace holds the matching input flag.

use tracing::warn;

use crate::domain::binding::ClientBinding;
use crate::domain::guards::Verdict;
use crate::domain::namespace::Namespace;
use crate::domain::operation::{EventKind, EventTarget};

/// Decide whether `subject` may receive `events` aimed at a window owned by
/// `owner`.
pub fn check(
    subject_binding: &ClientBinding,
    subject: &Namespace,
    owner_binding: &ClientBinding,
    owner: &Namespace,
    events: &[EventKind],
    target: &EventTarget,
) -> Verdict {
    if subject.super_power || subject_binding.shares_namespace_with(owner_binding) {
        return Verdict::Pass;
    }

    for (index, event) in events.iter().copied().enumerate() {
        if owner.is_root {
            match root_owner_rule(subject, event) {
                // one whitelisted structural event clears the whole batch
                RootOwnerRule::PassBatch => return Verdict::Pass,
                RootOwnerRule::Continue => {}
            }
        }

        if !event_allowed(subject, event, target) {
            warn!(
                guard = "receive",
                namespace = %subject.name,
                owner = %owner.name,
                event = ?event,
                index,
                window = %target.window,
                "blocked event delivery"
            );
            return Verdict::Block;
        }
    }

    Verdict::Pass
}

enum RootOwnerRule {
    PassBatch,
    Continue,
}

/// Events aimed at a root-namespace window that clear the batch outright.
fn root_owner_rule(subject: &Namespace, event: EventKind) -> RootOwnerRule {
    match event {
        EventKind::ClientMessage
        | EventKind::UnmapNotify
        | EventKind::ColormapNotify
        | EventKind::ConfigureNotify
        | EventKind::CreateNotify
        | EventKind::DestroyNotify
        | EventKind::MapNotify
        | EventKind::PropertyNotify
        | EventKind::ReparentNotify
        | EventKind::EnterNotify
        | EventKind::LeaveNotify
        | EventKind::FocusIn
        | EventKind::FocusOut => RootOwnerRule::PassBatch,

        // exposes the entire screen
        EventKind::PresentPixmap if subject.permissions.screen => RootOwnerRule::PassBatch,

        _ => RootOwnerRule::Continue,
    }
}

/// Per-event input gates; everything not mapped here blocks.
fn event_allowed(subject: &Namespace, event: EventKind, target: &EventTarget) -> bool {
    let perms = &subject.permissions;

    match event {
        EventKind::RawMotion => perms.mouse_motion && target.is_server_root,
        EventKind::RawKeyPress | EventKind::RawKeyRelease => {
            perms.global_keyboard && target.is_server_root
        }
        EventKind::ButtonPress | EventKind::ButtonRelease => {
            perms.x_input && target.is_server_root
        }
        _ => false,
    }
}
