// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0
//! # Extension-Dispatch Guard
//!
//! Classifies by extension identity. A fixed set of extensions carries no
//! isolation-relevant capability and is always allowed; most others map to
//! one permission flag; a few split their sub-operations between
//! unconditional allows and the flag check; four are blacklisted outright.

use tracing::warn;

use crate::domain::guards::Verdict;
use crate::domain::namespace::Namespace;
use crate::domain::operation::{DispatchOp, DispatchRequest, Extension};

/// Decide whether `subject` may dispatch `request`.
pub fn check(subject: &Namespace, request: &DispatchRequest) -> Verdict {
    if subject.super_power {
        return Verdict::Pass;
    }

    let verdict = classify(subject, request);
    if verdict == Verdict::Block {
        warn!(
            guard = "dispatch",
            namespace = %subject.name,
            extension = ?request.extension,
            op = ?request.op,
            "blocked extension dispatch"
        );
    }
    verdict
}

fn classify(subject: &Namespace, request: &DispatchRequest) -> Verdict {
    let perms = &subject.permissions;

    match request.extension {
        // no isolation-relevant capability; unrestricted
        Extension::BigRequests
        | Extension::Damage
        | Extension::DoubleBuffer
        | Extension::Dpms
        | Extension::GenericEvent
        | Extension::Present
        | Extension::XcMisc
        | Extension::XResource
        | Extension::Xinerama
        | Extension::Sync => Verdict::Pass,

        Extension::XKeyboard => {
            if perms.x_keyboard {
                return Verdict::Pass;
            }
            match request.op {
                DispatchOp::XkbUseExtension
                | DispatchOp::XkbGetMap
                | DispatchOp::XkbSelectEvents
                | DispatchOp::XkbGetState
                | DispatchOp::XkbGetNames
                | DispatchOp::XkbGetControls
                | DispatchOp::XkbPerClientFlags => Verdict::Pass,
                _ => Verdict::Block,
            }
        }

        Extension::Glx | Extension::Dri2 | Extension::Dri3 | Extension::Render => {
            flag(perms.render)
        }

        Extension::Randr => {
            if perms.randr || request.op == DispatchOp::RandrQueryVersion {
                Verdict::Pass
            } else {
                Verdict::Block
            }
        }

        Extension::Composite => {
            if perms.composite || request.op == DispatchOp::CompositeQueryVersion {
                Verdict::Pass
            } else {
                Verdict::Block
            }
        }

        Extension::Shm => flag(perms.screen),
        Extension::Shape => flag(perms.shape),

        Extension::XInput => {
            if perms.x_input || request.op == DispatchOp::XiListDevices {
                Verdict::Pass
            } else {
                Verdict::Block
            }
        }

        Extension::XFixes => match request.op {
            DispatchOp::XfixesQueryVersion
            | DispatchOp::XfixesCreateRegion
            | DispatchOp::XfixesSetCursorName
            | DispatchOp::XfixesGetCursorImage
            | DispatchOp::XfixesGetCursorImageAndName
            | DispatchOp::XfixesSelectSelectionInput
            | DispatchOp::XfixesDestroyRegion
            | DispatchOp::XfixesSetRegion => Verdict::Pass,
            _ => Verdict::Block,
        },

        // grant surveillance or injection power; never cross the boundary
        Extension::ScreenSaver | Extension::Record | Extension::Security | Extension::XTest => {
            Verdict::Block
        }
    }
}

fn flag(allowed: bool) -> Verdict {
    if allowed {
        Verdict::Pass
    } else {
        Verdict::Block
    }
}
