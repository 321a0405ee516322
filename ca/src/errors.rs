// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Error types for the CA workflow.
//!
//! Every variant names the stage that failed. [`Error::is_retryable`] separates
//! transient key management failures (timeouts, throttling, unreachable service)
//! from data-integrity failures such as a malformed envelope or a wrong key.
//!
//! Messages never carry key material.

use crate::kms::KmsError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unable to generate CA key pair: {0}")]
    KeyGeneration(String),
    #[error("unable to resolve master key {alias:?}: {source}")]
    KeyResolution {
        alias: String,
        #[source]
        source: KmsError,
    },
    #[error("{}", provisioning_message(.alias, .orphaned_key_id.as_deref(), .source))]
    KeyProvisioning {
        alias: String,
        /// Set when the master key was created but the alias could not be bound to it.
        orphaned_key_id: Option<String>,
        #[source]
        source: KmsError,
    },
    #[error("unable to encrypt CA key: {reason}")]
    Encryption {
        reason: String,
        #[source]
        source: Option<KmsError>,
    },
    #[error("unable to decode envelope: {0}")]
    Codec(String),
    #[error("unable to decode wrapped data key: {0}")]
    Encoding(String),
    #[error("unable to unwrap data key: {0}")]
    Unwrap(#[source] KmsError),
    #[error("unable to decrypt CA key block: {0}")]
    Decryption(String),
    #[error("unable to parse CA private key: {0}")]
    KeyParse(String),
    #[error("unable to parse public key: {0}")]
    PublicKeyParse(String),
    #[error("unable to sign certificate: {0}")]
    Signing(String),
}

impl Error {
    pub(crate) fn encryption(reason: impl Into<String>) -> Self {
        Self::Encryption {
            reason: reason.into(),
            source: None,
        }
    }

    /// Returns true when the failure came from a transient key management
    /// condition and the same call may succeed if repeated.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::KeyResolution { source, .. }
            | Self::KeyProvisioning { source, .. }
            | Self::Unwrap(source) => source.is_transient(),
            Self::Encryption {
                source: Some(source),
                ..
            } => source.is_transient(),
            _ => false,
        }
    }
}

fn provisioning_message(alias: &str, orphaned_key_id: Option<&str>, source: &KmsError) -> String {
    match orphaned_key_id {
        Some(key_id) => format!(
            "created master key {key_id} but unable to bind alias {alias:?} to it: {source}"
        ),
        None => format!("unable to create master key for alias {alias:?}: {source}"),
    }
}
