// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0
//! # Namespace Permission Flags
//!
//! A namespace carries ten independent capability toggles. Each guard maps
//! its operation categories onto these flags; an unset flag means the
//! corresponding category is blocked across namespace boundaries.
//!
//! Capability names accepted in the policy config file are the canonical
//! hyphenated tokens (`x-input`, `global-keyboard`, ...). The legacy
//! run-together spellings (`xinput`, `xkeyboard`, `globalxkeyboard`) are
//! still accepted for old config files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the ten grantable capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Composite,
    GlobalKeyboard,
    MouseMotion,
    Randr,
    Render,
    Screen,
    Shape,
    Transparency,
    XInput,
    XKeyboard,
}

impl Capability {
    pub const ALL: [Capability; 10] = [
        Capability::Composite,
        Capability::GlobalKeyboard,
        Capability::MouseMotion,
        Capability::Randr,
        Capability::Render,
        Capability::Screen,
        Capability::Shape,
        Capability::Transparency,
        Capability::XInput,
        Capability::XKeyboard,
    ];

    /// Canonical config-file token for this capability.
    pub fn token(&self) -> &'static str {
        match self {
            Capability::Composite => "composite",
            Capability::GlobalKeyboard => "global-keyboard",
            Capability::MouseMotion => "mouse-motion",
            Capability::Randr => "randr",
            Capability::Render => "render",
            Capability::Screen => "screen",
            Capability::Shape => "shape",
            Capability::Transparency => "transparency",
            Capability::XInput => "x-input",
            Capability::XKeyboard => "x-keyboard",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A capability token the config parser did not recognize.
#[derive(Debug, Error)]
#[error("unknown capability name: {0}")]
pub struct UnknownCapability(pub String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "composite" => Capability::Composite,
            "global-keyboard" | "globalxkeyboard" => Capability::GlobalKeyboard,
            "mouse-motion" => Capability::MouseMotion,
            "randr" => Capability::Randr,
            "render" => Capability::Render,
            "screen" => Capability::Screen,
            "shape" => Capability::Shape,
            "transparency" => Capability::Transparency,
            "x-input" | "xinput" => Capability::XInput,
            "x-keyboard" | "xkeyboard" => Capability::XKeyboard,
            _ => return Err(UnknownCapability(s.to_string())),
        })
    }
}

/// The full set of capability flags held by one namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    pub composite: bool,
    pub global_keyboard: bool,
    pub mouse_motion: bool,
    pub randr: bool,
    pub render: bool,
    pub screen: bool,
    pub shape: bool,
    pub transparency: bool,
    pub x_input: bool,
    pub x_keyboard: bool,
}

impl PermissionSet {
    /// No capabilities granted (the anonymous namespace default).
    pub const NONE: PermissionSet = PermissionSet {
        composite: false,
        global_keyboard: false,
        mouse_motion: false,
        randr: false,
        render: false,
        screen: false,
        shape: false,
        transparency: false,
        x_input: false,
        x_keyboard: false,
    };

    /// Every capability granted (the root namespace default).
    pub const ALL: PermissionSet = PermissionSet {
        composite: true,
        global_keyboard: true,
        mouse_motion: true,
        randr: true,
        render: true,
        screen: true,
        shape: true,
        transparency: true,
        x_input: true,
        x_keyboard: true,
    };

    pub fn allows(&self, cap: Capability) -> bool {
        match cap {
            Capability::Composite => self.composite,
            Capability::GlobalKeyboard => self.global_keyboard,
            Capability::MouseMotion => self.mouse_motion,
            Capability::Randr => self.randr,
            Capability::Render => self.render,
            Capability::Screen => self.screen,
            Capability::Shape => self.shape,
            Capability::Transparency => self.transparency,
            Capability::XInput => self.x_input,
            Capability::XKeyboard => self.x_keyboard,
        }
    }

    pub fn grant(&mut self, cap: Capability) {
        match cap {
            Capability::Composite => self.composite = true,
            Capability::GlobalKeyboard => self.global_keyboard = true,
            Capability::MouseMotion => self.mouse_motion = true,
            Capability::Randr => self.randr = true,
            Capability::Render => self.render = true,
            Capability::Screen => self.screen = true,
            Capability::Shape => self.shape = true,
            Capability::Transparency => self.transparency = true,
            Capability::XInput => self.x_input = true,
            Capability::XKeyboard => self.x_keyboard = true,
        }
    }

    /// Iterate over the capabilities this set grants.
    pub fn granted(&self) -> impl Iterator<Item = Capability> {
        let perms = *self;
        Capability::ALL.into_iter().filter(move |cap| perms.allows(*cap))
    }
}
