// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Envelope encryption of the CA private key.
//!
//! # Encrypt
//!
//! 1. Resolve the master key by alias, creating and aliasing it on first use
//! 2. Ask the key management service for a fresh AES-256 data key
//! 3. Seal the OpenSSH-encoded CA key into an armoured block with the
//!    plaintext data key, then zeroize the data key
//! 4. Package the wrapped data key and the block into a [`ProtectedEnvelope`]
//!
//! # Decrypt
//!
//! The reverse: decode the envelope, unwrap the data key through the key
//! management service, open the block and parse the CA key into a
//! [`SigningKey`].
//!
//! # Security
//!
//! Plaintext data keys and decrypted key text live in zeroizing buffers
//! scoped to a single call, so they are erased on every exit path including
//! errors. Nothing in this module logs key material.

use crate::block;
use crate::codec;
use crate::configuration::EnvelopeConfig;
use crate::errors::{Error, Result};
use crate::keypair::{CaKeyPair, SigningKey};
use crate::kms::{KeyManagementService, KmsError};
use crate::models::{KeySpec, MasterKeyRef, ProtectedEnvelope};
use crate::utils::{base64_decode, base64_encode};

/// Protects CA keys with data keys issued under a single aliased master key.
///
/// Holds no mutable state; one service can be shared between threads when
/// its key management client allows it.
pub struct EnvelopeService<K> {
    kms: K,
    config: EnvelopeConfig,
}

impl<K: KeyManagementService> EnvelopeService<K> {
    pub fn new(kms: K, config: EnvelopeConfig) -> Self {
        Self { kms, config }
    }

    pub fn config(&self) -> &EnvelopeConfig {
        &self.config
    }

    pub fn kms(&self) -> &K {
        &self.kms
    }

    /// Returns the master key bound to the configured alias, creating and
    /// binding one if the alias does not exist yet.
    ///
    /// Safe to call concurrently from a cold start: when another caller binds
    /// the alias first, the key created here is abandoned and the winner's key
    /// is returned.
    ///
    /// # Errors
    ///
    /// - [`Error::KeyResolution`] if the alias lookup fails for any reason
    ///   other than the alias not existing
    /// - [`Error::KeyProvisioning`] if the key cannot be created or the alias
    ///   cannot be bound to it
    #[tracing::instrument(skip(self), fields(alias = %self.config.master_key_alias))]
    pub fn resolve_or_create_master_key(&self) -> Result<MasterKeyRef> {
        let alias = self.config.master_key_alias.as_str();

        match self.kms.describe_key_by_alias(alias) {
            Ok(key) => {
                tracing::debug!("[bastion] resolved master key {key}");
                Ok(key)
            }
            Err(KmsError::NotFound(_)) => self.create_master_key(),
            Err(source) => Err(Error::KeyResolution {
                alias: alias.to_string(),
                source,
            }),
        }
    }

    fn create_master_key(&self) -> Result<MasterKeyRef> {
        let alias = self.config.master_key_alias.as_str();

        let key = self
            .kms
            .create_key(&self.config.key_tags)
            .map_err(|source| Error::KeyProvisioning {
                alias: alias.to_string(),
                orphaned_key_id: None,
                source,
            })?;

        match self.kms.create_alias(alias, &key) {
            Ok(()) => {
                tracing::info!("[bastion] created master key {key} with alias {alias}");
                Ok(key)
            }
            Err(KmsError::AlreadyExists(_)) => {
                tracing::warn!(
                    "[bastion] alias {alias} was bound concurrently, master key {key} is orphaned"
                );
                self.kms
                    .describe_key_by_alias(alias)
                    .map_err(|source| Error::KeyResolution {
                        alias: alias.to_string(),
                        source,
                    })
            }
            Err(source) => {
                tracing::warn!("[bastion] unable to bind alias {alias}, master key {key} is orphaned");
                Err(Error::KeyProvisioning {
                    alias: alias.to_string(),
                    orphaned_key_id: Some(key.to_string()),
                    source,
                })
            }
        }
    }

    /// Encrypts a CA key and serializes the resulting envelope.
    pub fn encrypt(&self, ca_key: &CaKeyPair) -> Result<Vec<u8>> {
        let envelope = self.encrypt_envelope(ca_key)?;
        codec::serialize(&envelope)
    }

    #[tracing::instrument(skip_all, fields(alias = %self.config.master_key_alias))]
    pub fn encrypt_envelope(&self, ca_key: &CaKeyPair) -> Result<ProtectedEnvelope> {
        let master_key = self.resolve_or_create_master_key()?;

        let data_key = self
            .kms
            .generate_data_key(&master_key, KeySpec::Aes256)
            .map_err(|source| Error::Encryption {
                reason: format!("unable to generate data key under {master_key}"),
                source: Some(source),
            })?;

        let encrypted_ca_block = block::seal(ca_key.as_openssh().as_bytes(), &data_key.plaintext)
            .map_err(|err| Error::encryption(err.to_string()))?;
        let wrapped_data_key = base64_encode(&data_key.wrapped);

        // plaintext data key is zeroized here
        drop(data_key);

        tracing::info!(
            "[bastion] encrypted CA key {} under master key {master_key}",
            ca_key.fingerprint()
        );

        Ok(ProtectedEnvelope {
            wrapped_data_key,
            encrypted_ca_block,
        })
    }

    /// Deserializes an envelope and decrypts the CA key inside it.
    pub fn decrypt(&self, envelope: &[u8]) -> Result<SigningKey> {
        let envelope = codec::deserialize(envelope)?;
        self.decrypt_envelope(&envelope)
    }

    #[tracing::instrument(skip_all)]
    pub fn decrypt_envelope(&self, envelope: &ProtectedEnvelope) -> Result<SigningKey> {
        let wrapped_key = base64_decode(&envelope.wrapped_data_key)?;

        let data_key = self.kms.decrypt(&wrapped_key).map_err(Error::Unwrap)?;

        let plaintext = block::open(&envelope.encrypted_ca_block, &data_key)
            .map_err(|err| Error::Decryption(err.to_string()))?;
        drop(data_key);

        let signing_key = SigningKey::from_openssh(&plaintext)?;

        tracing::debug!("[bastion] decrypted CA key {}", signing_key.fingerprint());

        Ok(signing_key)
    }
}
