// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::DATA_KEY_LEN;

/// Opaque identifier of a master key held by the key management service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MasterKeyRef(String);

impl MasterKeyRef {
    pub fn new(key_id: impl Into<String>) -> Self {
        Self(key_id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MasterKeyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyTag {
    pub key: String,
    pub value: String,
}

impl KeyTag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Strength of a data key requested from the key management service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySpec {
    Aes256,
}

impl KeySpec {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySpec::Aes256 => "AES_256",
        }
    }

    pub fn key_len(&self) -> usize {
        match self {
            KeySpec::Aes256 => DATA_KEY_LEN,
        }
    }
}

/// Plaintext symmetric key material, zeroized when dropped.
///
/// Not `Clone`; a data key lives only as long as the call it was issued for.
///
/// ```compile_fail
/// let key = bastion_ca::PlaintextKey::new(vec![0; 32]);
/// let copy = key.clone();
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PlaintextKey(Vec<u8>);

impl PlaintextKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Custom Debug implementation to prevent accidental logging of key material
impl fmt::Debug for PlaintextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PlaintextKey").field(&"[REDACTED]").finish()
    }
}

/// A freshly generated data key in both of its forms.
///
/// The plaintext half is used for exactly one encryption and is zeroized when
/// the `DataKey` is dropped. The wrapped half is only meaningful to the key
/// management service that produced it.
#[derive(Debug)]
pub struct DataKey {
    pub plaintext: PlaintextKey,
    pub wrapped: Vec<u8>,
}

/// The persisted form of a protected CA key.
///
/// `wrapped_data_key` is the key management service ciphertext of the data key
/// in unpadded standard base64. `encrypted_ca_block` is the armoured block
/// produced by [`crate::block::seal`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedEnvelope {
    pub wrapped_data_key: String,
    pub encrypted_ca_block: String,
}
