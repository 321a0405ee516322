// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! # Bastion CLI
//!
//! Command line front end for the Bastion SSH certificate authority.
//!
//! ```text
//! bastion init --out ca.json --algorithm ed25519
//! bastion sign --envelope ca.json --public-key ~/.ssh/id_ed25519.pub --principal alice
//! bastion public-key --envelope ca.json
//! ```
//!
//! The CA private key only ever exists on disk as an envelope encrypted under
//! an AWS KMS master key, located by alias and created on first use.
//!
//! ## Modules
//!
//! - [`aws`]: AWS KMS implementation of the key management interface
//! - [`commands`]: subcommand implementations
//! - [`configuration`]: CLI argument parsing with clap
//! - [`constants`]: defaults for the command line

pub mod aws;
pub mod commands;
pub mod configuration;
pub mod constants;
