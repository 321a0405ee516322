// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Key management service integration.
//!
//! The CA only needs five operations from a key management service: resolve
//! and create master keys, bind aliases, generate data keys and unwrap them.
//! [`KeyManagementService`] captures exactly that, so the envelope service
//! can run against AWS KMS in production and [`memory::InMemoryKms`] in tests.
//!
//! # Security
//!
//! - Master keys never leave the key management service
//! - Plaintext data keys are returned as [`PlaintextKey`], which is zeroized
//!   when dropped

use std::sync::Arc;
use std::time::Duration;

use crate::models::{DataKey, KeySpec, KeyTag, MasterKeyRef, PlaintextKey};

pub mod memory;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum KmsError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("alias already exists: {0}")]
    AlreadyExists(String),
    #[error("ciphertext rejected by key management service")]
    InvalidCiphertext,
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("key management service unavailable: {0}")]
    Unavailable(String),
    #[error("key management service error: {0}")]
    Service(String),
}

impl KmsError {
    /// Timeouts and connectivity failures may succeed on retry; everything
    /// else is a definitive answer from the service.
    pub fn is_transient(&self) -> bool {
        matches!(self, KmsError::Timeout(_) | KmsError::Unavailable(_))
    }
}

pub trait KeyManagementService {
    /// Resolves an alias to the master key it is bound to, or
    /// [`KmsError::NotFound`].
    fn describe_key_by_alias(&self, alias: &str) -> Result<MasterKeyRef, KmsError>;

    fn create_key(&self, tags: &[KeyTag]) -> Result<MasterKeyRef, KmsError>;

    /// Binds `alias` to `key`, or fails with [`KmsError::AlreadyExists`] when the
    /// alias is already bound.
    fn create_alias(&self, alias: &str, key: &MasterKeyRef) -> Result<(), KmsError>;

    fn generate_data_key(&self, key: &MasterKeyRef, spec: KeySpec) -> Result<DataKey, KmsError>;

    /// Unwraps a data key previously returned by [`generate_data_key`].
    ///
    /// [`generate_data_key`]: KeyManagementService::generate_data_key
    fn decrypt(&self, wrapped_key: &[u8]) -> Result<PlaintextKey, KmsError>;
}

impl<K: KeyManagementService + ?Sized> KeyManagementService for Arc<K> {
    fn describe_key_by_alias(&self, alias: &str) -> Result<MasterKeyRef, KmsError> {
        (**self).describe_key_by_alias(alias)
    }

    fn create_key(&self, tags: &[KeyTag]) -> Result<MasterKeyRef, KmsError> {
        (**self).create_key(tags)
    }

    fn create_alias(&self, alias: &str, key: &MasterKeyRef) -> Result<(), KmsError> {
        (**self).create_alias(alias, key)
    }

    fn generate_data_key(&self, key: &MasterKeyRef, spec: KeySpec) -> Result<DataKey, KmsError> {
        (**self).generate_data_key(key, spec)
    }

    fn decrypt(&self, wrapped_key: &[u8]) -> Result<PlaintextKey, KmsError> {
        (**self).decrypt(wrapped_key)
    }
}
