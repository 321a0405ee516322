// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::path::PathBuf;
use std::time::Duration;

use bastion_ca::constants::{
    DEFAULT_KEY_ID, DEFAULT_MASTER_KEY_ALIAS, DEFAULT_PRINCIPAL, DEFAULT_RSA_BITS, DEFAULT_SERIAL,
};
use bastion_ca::{Capabilities, CertificateOptions, EnvelopeConfig, KeyAlgorithm};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::constants::{DEFAULT_KMS_TIMEOUT_SECS, DEFAULT_VALIDITY_HOURS, SECONDS_PER_HOUR};

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct BastionOptions {
    /// KMS alias of the master key, created on first use
    #[arg(long, default_value = DEFAULT_MASTER_KEY_ALIAS, env("BASTION_KEY_ALIAS"))]
    pub alias: String,
    #[arg(long, env("BASTION_REGION"))]
    pub region: Option<String>,
    #[arg(long, default_value_t = DEFAULT_KMS_TIMEOUT_SECS, env("BASTION_KMS_TIMEOUT_SECS"))]
    pub kms_timeout_secs: u64,
    #[command(subcommand)]
    pub command: Command,
}

impl BastionOptions {
    pub fn envelope_config(&self) -> EnvelopeConfig {
        EnvelopeConfig::new(self.alias.clone())
    }

    pub fn kms_timeout(&self) -> Duration {
        Duration::from_secs(self.kms_timeout_secs)
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Generate a CA key and write it envelope encrypted
    Init(InitArgs),
    /// Sign a user certificate with the CA key
    Sign(SignArgs),
    /// Print the CA public key in authorized-key form
    PublicKey(PublicKeyArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmArg {
    Rsa,
    Ed25519,
}

#[derive(Debug, Clone, Args)]
pub struct InitArgs {
    #[arg(long, env("BASTION_ENVELOPE"))]
    pub out: PathBuf,
    #[arg(long, value_enum, default_value_t = AlgorithmArg::Rsa)]
    pub algorithm: AlgorithmArg,
    /// RSA modulus size, ignored for ed25519
    #[arg(long, default_value_t = DEFAULT_RSA_BITS)]
    pub bits: usize,
    /// Replace an existing envelope file
    #[arg(long, default_value = "false", action = ArgAction::SetTrue)]
    pub force: bool,
}

impl InitArgs {
    pub fn key_algorithm(&self) -> KeyAlgorithm {
        match self.algorithm {
            AlgorithmArg::Rsa => KeyAlgorithm::Rsa { bits: self.bits },
            AlgorithmArg::Ed25519 => KeyAlgorithm::Ed25519,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct SignArgs {
    #[arg(long, env("BASTION_ENVELOPE"))]
    pub envelope: PathBuf,
    /// Requester's public key file, e.g. ~/.ssh/id_ed25519.pub
    #[arg(long)]
    pub public_key: PathBuf,
    #[arg(long = "principal", default_value = DEFAULT_PRINCIPAL)]
    pub principals: Vec<String>,
    #[arg(long, default_value_t = DEFAULT_SERIAL)]
    pub serial: u64,
    #[arg(long, default_value = DEFAULT_KEY_ID)]
    pub key_id: String,
    #[arg(long, default_value_t = DEFAULT_VALIDITY_HOURS)]
    pub validity_hours: u64,
    #[arg(long)]
    pub comment: Option<String>,
    #[arg(long, default_value = "false", action = ArgAction::SetTrue)]
    pub no_x11_forwarding: bool,
    #[arg(long, default_value = "false", action = ArgAction::SetTrue)]
    pub no_agent_forwarding: bool,
    #[arg(long, default_value = "false", action = ArgAction::SetTrue)]
    pub no_port_forwarding: bool,
    #[arg(long, default_value = "false", action = ArgAction::SetTrue)]
    pub no_pty: bool,
    #[arg(long, default_value = "false", action = ArgAction::SetTrue)]
    pub no_user_rc: bool,
}

impl SignArgs {
    pub fn certificate_options(&self) -> CertificateOptions {
        CertificateOptions {
            serial: self.serial,
            key_id: self.key_id.clone(),
            principals: self.principals.clone(),
            validity: Duration::from_secs(self.validity_hours.saturating_mul(SECONDS_PER_HOUR)),
            capabilities: Capabilities {
                x11_forwarding: !self.no_x11_forwarding,
                agent_forwarding: !self.no_agent_forwarding,
                port_forwarding: !self.no_port_forwarding,
                pty: !self.no_pty,
                user_rc: !self.no_user_rc,
            },
            comment: self.comment.clone(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct PublicKeyArgs {
    #[arg(long, env("BASTION_ENVELOPE"))]
    pub envelope: PathBuf,
}
