// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Issuance of OpenSSH user certificates.
//!
//! The CA signs the requester's public key together with the serial, key id,
//! principals, validity window and permitted extensions. The signature covers
//! every field, so any later modification makes the certificate fail
//! validation against the CA key.

use std::time::{SystemTime, UNIX_EPOCH};

use rand_core::OsRng;
use ssh_key::certificate::{Builder, CertType};
use ssh_key::{Certificate, PublicKey};

use crate::configuration::CertificateOptions;
use crate::errors::{Error, Result};
use crate::keypair::SigningKey;

/// Parses a public key in authorized-key form, e.g. the contents of
/// `~/.ssh/id_ed25519.pub`.
pub fn parse_public_key(bytes: &[u8]) -> Result<PublicKey> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| Error::PublicKeyParse("public key is not valid UTF-8".to_string()))?
        .trim();
    if text.is_empty() {
        return Err(Error::PublicKeyParse("public key is empty".to_string()));
    }
    PublicKey::from_openssh(text).map_err(|err| Error::PublicKeyParse(err.to_string()))
}

/// Signs a user certificate for `requester_public_key`, valid from now for
/// `options.validity`, and returns it as an authorized-key line.
pub fn sign(
    requester_public_key: &[u8],
    signing_key: &SigningKey,
    options: &CertificateOptions,
) -> Result<String> {
    sign_at(requester_public_key, signing_key, options, SystemTime::now())
}

/// Same as [`sign`] with an explicit issue time.
pub fn sign_at(
    requester_public_key: &[u8],
    signing_key: &SigningKey,
    options: &CertificateOptions,
    now: SystemTime,
) -> Result<String> {
    let public_key = parse_public_key(requester_public_key)?;
    let certificate = issue(&public_key, signing_key, options, now)?;

    certificate
        .to_openssh()
        .map_err(|err| Error::Signing(format!("unable to encode certificate: {err}")))
}

#[tracing::instrument(skip_all, fields(serial = options.serial, key_id = %options.key_id))]
fn issue(
    public_key: &PublicKey,
    signing_key: &SigningKey,
    options: &CertificateOptions,
    now: SystemTime,
) -> Result<Certificate> {
    if options.principals.is_empty() {
        return Err(Error::Signing("at least one principal is required".to_string()));
    }
    if options.principals.iter().any(String::is_empty) {
        return Err(Error::Signing("principal names must not be empty".to_string()));
    }

    let valid_after = now
        .duration_since(UNIX_EPOCH)
        .map_err(|_| Error::Signing("system clock is before the UNIX epoch".to_string()))?
        .as_secs();
    let valid_before = valid_after
        .checked_add(options.validity.as_secs())
        .ok_or_else(|| Error::Signing("validity window overflows".to_string()))?;
    if valid_before <= valid_after {
        return Err(Error::Signing(
            "validity must be at least one second".to_string(),
        ));
    }

    let mut builder = Builder::new_with_random_nonce(
        &mut OsRng,
        public_key.key_data().clone(),
        valid_after,
        valid_before,
    )
    .map_err(signing_error)?;

    builder.serial(options.serial).map_err(signing_error)?;
    builder
        .key_id(options.key_id.clone())
        .map_err(signing_error)?;
    builder.cert_type(CertType::User).map_err(signing_error)?;
    for principal in &options.principals {
        builder
            .valid_principal(principal.clone())
            .map_err(signing_error)?;
    }
    for extension in options.capabilities.extensions() {
        builder.extension(extension, "").map_err(signing_error)?;
    }
    if let Some(comment) = &options.comment {
        builder.comment(comment.clone()).map_err(signing_error)?;
    }

    let certificate = builder
        .sign(signing_key.private_key())
        .map_err(signing_error)?;

    tracing::info!(
        "[bastion] signed user certificate serial {} for {:?} with CA key {}, valid until {valid_before}",
        options.serial,
        options.principals,
        signing_key.fingerprint()
    );

    Ok(certificate)
}

fn signing_error(err: ssh_key::Error) -> Error {
    Error::Signing(err.to_string())
}
