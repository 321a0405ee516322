// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::fs::{self, OpenOptions};
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use anyhow::{Context, Result};
use bastion_ca::{CertificateOptions, EnvelopeService, KeyAlgorithm, KeyManagementService};

use crate::configuration::Command;
#[cfg(unix)]
use crate::constants::ENVELOPE_FILE_MODE;

/// A freshly generated CA key, encrypted and ready to be written out.
#[derive(Debug)]
pub struct Initialized {
    pub envelope: Vec<u8>,
    /// CA public key in authorized-key form.
    pub public_key: String,
}

pub fn init<K: KeyManagementService>(
    service: &EnvelopeService<K>,
    algorithm: KeyAlgorithm,
) -> Result<Initialized> {
    let ca_key = bastion_ca::generate(algorithm).context("unable to generate CA key")?;
    let envelope = service
        .encrypt(&ca_key)
        .context("unable to encrypt CA key")?;
    let public_key = ca_key
        .public_key()
        .to_openssh()
        .context("unable to encode CA public key")?;

    tracing::info!(
        "[bastion] generated {} CA key {}",
        ca_key.algorithm(),
        ca_key.fingerprint()
    );

    Ok(Initialized {
        envelope,
        public_key,
    })
}

pub fn sign<K: KeyManagementService>(
    service: &EnvelopeService<K>,
    envelope: &[u8],
    requester_public_key: &[u8],
    options: &CertificateOptions,
) -> Result<String> {
    let signing_key = service
        .decrypt(envelope)
        .context("unable to decrypt CA key")?;
    bastion_ca::certificate::sign(requester_public_key, &signing_key, options)
        .context("unable to sign certificate")
}

pub fn public_key<K: KeyManagementService>(
    service: &EnvelopeService<K>,
    envelope: &[u8],
) -> Result<String> {
    let signing_key = service
        .decrypt(envelope)
        .context("unable to decrypt CA key")?;

    signing_key
        .public_key()
        .to_openssh()
        .context("unable to encode CA public key")
}

/// Runs `command` and returns what it prints on stdout.
pub fn run<K: KeyManagementService>(service: &EnvelopeService<K>, command: &Command) -> Result<String> {
    match command {
        Command::Init(args) => {
            let initialized = init(service, args.key_algorithm())?;
            write_envelope(&args.out, &initialized.envelope, args.force)?;
            tracing::info!("[bastion] wrote envelope to {}", args.out.display());
            Ok(format!("{}\n", initialized.public_key))
        }
        Command::Sign(args) => {
            let envelope = read(&args.envelope, "envelope")?;
            let requester_public_key = read(&args.public_key, "public key")?;
            let certificate = sign(
                service,
                &envelope,
                &requester_public_key,
                &args.certificate_options(),
            )?;
            Ok(format!("{certificate}\n"))
        }
        Command::PublicKey(args) => {
            let envelope = read(&args.envelope, "envelope")?;
            Ok(format!("{}\n", public_key(service, &envelope)?))
        }
    }
}

fn read(path: &Path, what: &str) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("unable to read {what} from {}", path.display()))
}

fn write_envelope(path: &Path, envelope: &[u8], force: bool) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    #[cfg(unix)]
    options.mode(ENVELOPE_FILE_MODE);

    let mut file = options
        .open(path)
        .with_context(|| format!("unable to create envelope file {}", path.display()))?;
    file.write_all(envelope)
        .and_then(|()| file.sync_all())
        .with_context(|| format!("unable to write envelope file {}", path.display()))
}
