// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0
//! # Device-Operation Guard
//!
//! Gates pointer and keyboard queries and grabs. The mapping follows the
//! flag semantics: `mouse-motion` covers pointer position queries,
//! `global-keyboard` the global keymap state, `x-input` pointer grabs and
//! input-extension device control, `x-keyboard` keyboard grabs and the
//! keyboard extension. A handful of read-only queries are harmless for
//! anybody and pass unconditionally.

use tracing::warn;

use crate::domain::guards::Verdict;
use crate::domain::namespace::Namespace;
use crate::domain::operation::DeviceOp;

/// Decide whether `subject` may perform the device operation `op`.
pub fn check(subject: &Namespace, op: DeviceOp) -> Verdict {
    if subject.super_power {
        return Verdict::Pass;
    }

    let verdict = classify(subject, op);
    if verdict == Verdict::Block {
        warn!(
            guard = "device",
            namespace = %subject.name,
            op = ?op,
            "blocked device operation"
        );
    }
    verdict
}

fn classify(subject: &Namespace, op: DeviceOp) -> Verdict {
    let perms = &subject.permissions;

    let allowed = match op {
        DeviceOp::QueryPointer => perms.mouse_motion,
        DeviceOp::QueryKeymap => perms.global_keyboard,

        // read-only and needed by ordinary toolkits; safe for anybody
        DeviceOp::GetInputFocus
        | DeviceOp::GetKeyboardMapping
        | DeviceOp::GetModifierMapping
        | DeviceOp::GrabButton => true,

        DeviceOp::GrabPointer
        | DeviceOp::GetPointerMapping
        | DeviceOp::SetInputFocus
        | DeviceOp::WarpPointer => perms.x_input,

        DeviceOp::GrabKeyboard | DeviceOp::UngrabKeyboard => perms.x_keyboard,

        // keyboard-extension requests common toolkits need regardless of
        // the x-keyboard flag
        DeviceOp::XkbSelectEvents
        | DeviceOp::XkbGetMap
        | DeviceOp::XkbBell
        | DeviceOp::XkbPerClientFlags
        | DeviceOp::XkbGetState
        | DeviceOp::XkbGetNames
        | DeviceOp::XkbGetControls => true,
        DeviceOp::XkbOther => perms.x_keyboard,

        DeviceOp::XiListDevices | DeviceOp::XiGetProperty => true,
        DeviceOp::XiQueryPointer => perms.mouse_motion,
        DeviceOp::XiQueryDevice
        | DeviceOp::XiChangeCursor
        | DeviceOp::XiGrabDevice
        | DeviceOp::XiUngrabDevice => perms.x_input,
        DeviceOp::XiOther => false,

        DeviceOp::Other => false,
    };

    if allowed {
        Verdict::Pass
    } else {
        Verdict::Block
    }
}
