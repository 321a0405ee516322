// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use bastion_ca::EnvelopeService;
use bastion_cli::aws::AwsKms;
use bastion_cli::commands;
use bastion_cli::configuration::BastionOptions;
use bastion_cli::constants::EXIT_TEMPORARY_FAILURE;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        // this needs to be set to remove duplicated information in the log.
        .with_current_span(false)
        .with_ansi(false)
        // remove the name of the function from every log entry
        .with_target(false)
        // stdout carries command output only
        .with_writer(std::io::stderr)
        .init();

    let options = BastionOptions::parse();

    tracing::debug!("[bastion] {:?}", &options);

    match run(&options) {
        Ok(output) => match std::io::stdout().write_all(output.as_bytes()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                tracing::error!("[bastion] unable to write output: {}", err);
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            let retryable = err
                .downcast_ref::<bastion_ca::Error>()
                .is_some_and(bastion_ca::Error::is_retryable);
            tracing::error!("[bastion] {:#} (retryable: {})", err, retryable);
            if retryable {
                ExitCode::from(EXIT_TEMPORARY_FAILURE)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(options: &BastionOptions) -> Result<String> {
    let kms = AwsKms::new(options.region.clone(), options.kms_timeout())
        .context("unable to configure KMS client")?;
    let service = EnvelopeService::new(kms, options.envelope_config());

    commands::run(&service, &options.command)
}
