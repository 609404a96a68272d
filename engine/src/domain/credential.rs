// Copyright (c) 2026 The Warden Project
// SPDX-License-Identifier: AGPL-3.0
//! # Namespace Credentials
//!
//! A credential is a protocol-tagged shared secret bound to exactly one
//! namespace. A client presenting a matching credential at connect time is
//! bound to the owning namespace. Secrets are compared in constant time.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Protocol tag used for engine-generated credentials.
pub const GENERATED_PROTOCOL: &str = "MIT-MAGIC-COOKIE-1";

/// Secret length, in bytes, of engine-generated credentials.
pub const GENERATED_SECRET_LEN: usize = 16;

/// Opaque identifier issued for a credential record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CredentialId(pub Uuid);

impl CredentialId {
    /// Generate a new random credential ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CredentialId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A protocol-tagged secret owned by one namespace.
///
/// Deliberately not serializable: the secret must never leave the engine
/// except through the hex rendering used for operator inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub id: CredentialId,
    pub protocol: String,
    secret: Vec<u8>,
}

impl Credential {
    pub fn new(protocol: impl Into<String>, secret: Vec<u8>) -> Self {
        Self {
            id: CredentialId::new(),
            protocol: protocol.into(),
            secret,
        }
    }

    /// Create a fresh credential with a random 16-byte secret under the
    /// fixed generated-credential protocol tag.
    pub fn generate() -> Self {
        let mut secret = vec![0u8; GENERATED_SECRET_LEN];
        rand::rng().fill_bytes(&mut secret);
        Self::new(GENERATED_PROTOCOL, secret)
    }

    /// Exact match against a presented protocol tag and secret.
    ///
    /// The secret comparison is constant-time; the protocol tag is not a
    /// secret and is compared normally.
    pub fn matches(&self, protocol: &str, secret: &[u8]) -> bool {
        self.protocol == protocol && bool::from(self.secret.ct_eq(secret))
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    /// Uppercase hex rendering of the secret, for logs and `config show`.
    pub fn secret_hex(&self) -> String {
        hex::encode_upper(&self.secret)
    }
}
