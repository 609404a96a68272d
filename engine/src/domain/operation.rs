// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0
//! # Operation Classification
//!
//! The categorical vocabulary the host uses when asking a guard for a
//! decision. The host's request parser maps raw protocol opcodes onto these
//! categories before calling into the engine; the engine never sees wire
//! encodings. Categories a guard's table does not map default to block.

use serde::{Deserialize, Serialize};
use std::ops::BitOr;

/// Access-mode bit mask accompanying a resource check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessMode(pub u32);

impl AccessMode {
    pub const EMPTY: AccessMode = AccessMode(0);
    pub const READ: AccessMode = AccessMode(1 << 0);
    pub const WRITE: AccessMode = AccessMode(1 << 1);
    pub const CREATE: AccessMode = AccessMode(1 << 2);
    pub const GET_ATTR: AccessMode = AccessMode(1 << 3);
    pub const GET_PROP: AccessMode = AccessMode(1 << 4);
    pub const USE: AccessMode = AccessMode(1 << 5);
    pub const ADD: AccessMode = AccessMode(1 << 6);
    pub const REMOVE: AccessMode = AccessMode(1 << 7);

    /// Every requested bit is present in `allowed`.
    pub fn is_subset_of(self, allowed: AccessMode) -> bool {
        (self.0 & allowed.0) == self.0
    }

    pub fn contains(self, other: AccessMode) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl BitOr for AccessMode {
    type Output = AccessMode;

    fn bitor(self, rhs: AccessMode) -> AccessMode {
        AccessMode(self.0 | rhs.0)
    }
}

/// Protocol extension identity, as classified by the dispatch guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Extension {
    BigRequests,
    Damage,
    DoubleBuffer,
    Dpms,
    GenericEvent,
    Present,
    XcMisc,
    XResource,
    Xinerama,
    Sync,
    XKeyboard,
    Glx,
    Dri2,
    Dri3,
    Render,
    Randr,
    Composite,
    Shm,
    Shape,
    XInput,
    XFixes,
    ScreenSaver,
    Record,
    Security,
    XTest,
}

/// Sub-operation of an extension request, for the extensions whose dispatch
/// table splits on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DispatchOp {
    // x-keyboard sub-operations usable without the x-keyboard flag
    XkbUseExtension,
    XkbGetMap,
    XkbSelectEvents,
    XkbGetState,
    XkbGetNames,
    XkbGetControls,
    XkbPerClientFlags,
    // benign version queries
    RandrQueryVersion,
    CompositeQueryVersion,
    // x-input device enumeration
    XiListDevices,
    // x-fixes sub-operations
    XfixesQueryVersion,
    XfixesCreateRegion,
    XfixesSetCursorName,
    XfixesGetCursorImage,
    XfixesGetCursorImageAndName,
    XfixesSelectSelectionInput,
    XfixesDestroyRegion,
    XfixesSetRegion,
    /// Anything a table does not name.
    Other,
}

/// One extension-dispatch check: which extension, and which sub-operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchRequest {
    pub extension: Extension,
    pub op: DispatchOp,
}

impl DispatchRequest {
    pub fn new(extension: Extension, op: DispatchOp) -> Self {
        Self { extension, op }
    }

    /// An extension request with no distinguished sub-operation.
    pub fn extension(extension: Extension) -> Self {
        Self::new(extension, DispatchOp::Other)
    }
}

/// Device-level operation category: core pointer/keyboard requests plus the
/// keyboard- and input-extension requests routed through the device guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceOp {
    QueryPointer,
    QueryKeymap,
    GetInputFocus,
    GetKeyboardMapping,
    GetModifierMapping,
    GrabButton,
    GrabPointer,
    GetPointerMapping,
    SetInputFocus,
    WarpPointer,
    GrabKeyboard,
    UngrabKeyboard,
    // x-keyboard extension
    XkbSelectEvents,
    XkbGetMap,
    XkbBell,
    XkbPerClientFlags,
    XkbGetState,
    XkbGetNames,
    XkbGetControls,
    XkbOther,
    // x-input extension
    XiListDevices,
    XiGetProperty,
    XiQueryPointer,
    XiQueryDevice,
    XiChangeCursor,
    XiGrabDevice,
    XiUngrabDevice,
    XiOther,
    Other,
}

/// Kind of resource a resource-access check targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Window,
    Colormap,
    Pixmap,
    /// A randr event-subscription resource.
    RandrEvent,
    Other,
}

/// Request category for the resource guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceOp {
    GetProperty,
    ChangeProperty,
    DeleteProperty,
    RotateProperties,
    TranslateCoords,
    GetGeometry,
    QueryTree,
    GetWindowAttributes,
    ChangeWindowAttributes,
    CreateWindow,
    DestroyWindow,
    CreateGc,
    CreatePixmap,
    CreateColormap,
    QueryPointer,
    GrabPointer,
    SendEvent,
    GetImage,
    CopyArea,
    XfixesGetCursorImage,
    XfixesGetCursorImageAndName,
    XiQueryPointer,
    XiSelectEvents,
    XiOther,
    ShmCreatePixmap,
    ShmOther,
    Composite,
    Randr,
    Render,
    Other,
}

/// Facts about the resource a check targets, supplied by the host.
#[derive(Debug, Clone, Copy)]
pub struct ResourceTarget {
    pub kind: ResourceKind,
    pub access: AccessMode,
    /// The window being touched, when the resource is a window.
    pub window: Option<crate::domain::namespace::WindowHandle>,
    /// The literal (parentless, server-owned) screen root window.
    pub is_screen_root: bool,
}

impl ResourceTarget {
    pub fn new(kind: ResourceKind, access: AccessMode) -> Self {
        Self {
            kind,
            access,
            window: None,
            is_screen_root: false,
        }
    }

    pub fn window(
        handle: crate::domain::namespace::WindowHandle,
        access: AccessMode,
    ) -> Self {
        Self {
            kind: ResourceKind::Window,
            access,
            window: Some(handle),
            is_screen_root: false,
        }
    }

    pub fn screen_root(handle: crate::domain::namespace::WindowHandle, access: AccessMode) -> Self {
        Self {
            is_screen_root: true,
            ..Self::window(handle, access)
        }
    }
}

/// Event classification for the receive guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    // structural / notification events
    ClientMessage,
    UnmapNotify,
    ColormapNotify,
    ConfigureNotify,
    CreateNotify,
    DestroyNotify,
    MapNotify,
    PropertyNotify,
    ReparentNotify,
    EnterNotify,
    LeaveNotify,
    FocusIn,
    FocusOut,
    // raw input events
    RawMotion,
    RawKeyPress,
    RawKeyRelease,
    ButtonPress,
    ButtonRelease,
    /// Present-pixmap completion; exposes screen contents.
    PresentPixmap,
    /// Generic extension event the table does not map.
    GenericOther,
    Other,
}

/// Facts about the window a batch of events is aimed at.
#[derive(Debug, Clone, Copy)]
pub struct EventTarget {
    pub window: crate::domain::namespace::WindowHandle,
    /// Parentless and server-owned: the literal server root window.
    pub is_server_root: bool,
}
