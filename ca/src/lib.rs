// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! # Bastion CA
//!
//! Protects an SSH certificate authority key with envelope encryption and
//! issues short-lived OpenSSH user certificates with it.
//!
//! ```text
//! generate -> EnvelopeService::encrypt -> codec -> [storage] -> codec
//!          -> EnvelopeService::decrypt -> certificate::sign
//! ```
//!
//! ## Modules
//!
//! - [`keypair`]: CA key generation and the decrypted [`SigningKey`] handle
//! - [`envelope`]: master key resolution and envelope encryption
//! - [`block`]: AES-256-GCM armoured block holding the CA key
//! - [`codec`]: versioned wire encoding of [`ProtectedEnvelope`]
//! - [`certificate`]: user certificate issuance
//! - [`kms`]: key management service interface and an in-memory implementation
//! - [`configuration`]: envelope and certificate options
//! - [`errors`]: error type with retryability classification
//!
//! ## Security Considerations
//!
//! - Plaintext CA keys and data keys are zeroized when dropped
//! - The signing key handle is neither cloneable nor serializable
//! - Debug output of key holding types is redacted

pub mod block;
pub mod certificate;
pub mod codec;
pub mod configuration;
pub mod constants;
pub mod envelope;
pub mod errors;
pub mod keypair;
pub mod kms;
pub mod models;
pub mod utils;

pub use configuration::{Capabilities, CertificateOptions, EnvelopeConfig, KeyAlgorithm};
pub use envelope::EnvelopeService;
pub use errors::{Error, Result};
pub use keypair::{CaKeyPair, SigningKey, generate};
pub use kms::{KeyManagementService, KmsError};
pub use models::{DataKey, KeySpec, KeyTag, MasterKeyRef, PlaintextKey, ProtectedEnvelope};
