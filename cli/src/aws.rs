// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! [`KeyManagementService`] backed by AWS KMS.
//!
//! The SDK is async; the envelope service is not. Each call is driven to
//! completion on a private current-thread runtime and bounded by a timeout.

use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region};
use aws_sdk_kms::Client;
use aws_sdk_kms::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_kms::primitives::Blob;
use aws_sdk_kms::types::{DataKeySpec, KeyMetadata, Tag};
use bastion_ca::{
    DataKey, KeyManagementService, KeySpec, KeyTag, KmsError, MasterKeyRef, PlaintextKey,
};
use tokio::runtime::{Builder, Runtime};

use crate::constants::ALIAS_PREFIX;

/// Service error codes worth retrying.
const TRANSIENT_ERROR_CODES: [&str; 3] = [
    "ThrottlingException",
    "KMSInternalException",
    "DependencyTimeoutException",
];

pub struct AwsKms {
    client: Client,
    runtime: Runtime,
    timeout: Duration,
}

impl AwsKms {
    /// Loads credentials and region from the default provider chain. `region`
    /// overrides the region from the environment.
    pub fn new(region: Option<String>, timeout: Duration) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("unable to start KMS runtime")?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let sdk_config = runtime.block_on(loader.load());

        tracing::debug!(
            "[bastion] using KMS in {:?} with a {:?} timeout",
            sdk_config.region(),
            timeout
        );

        Ok(Self {
            client: Client::new(&sdk_config),
            runtime,
            timeout,
        })
    }

    fn block_on<F: Future>(&self, request: F) -> Result<F::Output, KmsError> {
        self.runtime
            .block_on(tokio::time::timeout(self.timeout, request))
            .map_err(|_| KmsError::Timeout(self.timeout))
    }
}

impl KeyManagementService for AwsKms {
    fn describe_key_by_alias(&self, alias: &str) -> Result<MasterKeyRef, KmsError> {
        let alias_name = alias_name(alias);
        let output = self
            .block_on(self.client.describe_key().key_id(&alias_name).send())?
            .map_err(|err| {
                let not_found = err
                    .as_service_error()
                    .is_some_and(|service| service.is_not_found_exception());
                if not_found {
                    KmsError::NotFound(alias_name.clone())
                } else {
                    classify(err)
                }
            })?;

        key_ref(output.key_metadata(), "DescribeKey")
    }

    fn create_key(&self, tags: &[KeyTag]) -> Result<MasterKeyRef, KmsError> {
        let mut request = self.client.create_key();
        for tag in tags {
            let tag = Tag::builder()
                .tag_key(&tag.key)
                .tag_value(&tag.value)
                .build()
                .map_err(|err| KmsError::Service(err.to_string()))?;
            request = request.tags(tag);
        }

        let output = self.block_on(request.send())?.map_err(classify)?;

        key_ref(output.key_metadata(), "CreateKey")
    }

    fn create_alias(&self, alias: &str, key: &MasterKeyRef) -> Result<(), KmsError> {
        let alias_name = alias_name(alias);
        self.block_on(
            self.client
                .create_alias()
                .alias_name(&alias_name)
                .target_key_id(key.as_str())
                .send(),
        )?
        .map_err(|err| {
            let exists = err
                .as_service_error()
                .is_some_and(|service| service.is_already_exists_exception());
            if exists {
                KmsError::AlreadyExists(alias_name.clone())
            } else {
                classify(err)
            }
        })?;

        Ok(())
    }

    fn generate_data_key(&self, key: &MasterKeyRef, spec: KeySpec) -> Result<DataKey, KmsError> {
        let output = self
            .block_on(
                self.client
                    .generate_data_key()
                    .key_id(key.as_str())
                    .key_spec(data_key_spec(spec))
                    .send(),
            )?
            .map_err(classify)?;

        let plaintext = output
            .plaintext()
            .map(|blob| PlaintextKey::new(blob.as_ref().to_vec()))
            .ok_or_else(|| missing("GenerateDataKey", "Plaintext"))?;
        let wrapped = output
            .ciphertext_blob()
            .map(|blob| blob.as_ref().to_vec())
            .ok_or_else(|| missing("GenerateDataKey", "CiphertextBlob"))?;

        Ok(DataKey { plaintext, wrapped })
    }

    fn decrypt(&self, wrapped_key: &[u8]) -> Result<PlaintextKey, KmsError> {
        let output = self
            .block_on(
                self.client
                    .decrypt()
                    .ciphertext_blob(Blob::new(wrapped_key.to_vec()))
                    .send(),
            )?
            .map_err(|err| {
                let rejected = err.as_service_error().is_some_and(|service| {
                    service.is_invalid_ciphertext_exception() || service.is_incorrect_key_exception()
                });
                if rejected {
                    KmsError::InvalidCiphertext
                } else {
                    classify(err)
                }
            })?;

        output
            .plaintext()
            .map(|blob| PlaintextKey::new(blob.as_ref().to_vec()))
            .ok_or_else(|| missing("Decrypt", "Plaintext"))
    }
}

pub fn alias_name(alias: &str) -> String {
    if alias.starts_with(ALIAS_PREFIX) {
        alias.to_string()
    } else {
        format!("{ALIAS_PREFIX}{alias}")
    }
}

fn data_key_spec(spec: KeySpec) -> DataKeySpec {
    match spec {
        KeySpec::Aes256 => DataKeySpec::Aes256,
    }
}

fn key_ref(metadata: Option<&KeyMetadata>, operation: &str) -> Result<MasterKeyRef, KmsError> {
    metadata
        .map(|metadata| MasterKeyRef::new(metadata.key_id()))
        .ok_or_else(|| missing(operation, "KeyMetadata"))
}

fn missing(operation: &str, field: &str) -> KmsError {
    KmsError::Service(format!("{operation} response is missing {field}"))
}

/// Maps SDK failures that have no operation specific meaning.
fn classify<E, R>(err: SdkError<E, R>) -> KmsError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: Debug,
{
    let transient = match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => true,
        SdkError::ServiceError(service) => service
            .err()
            .code()
            .is_some_and(|code| TRANSIENT_ERROR_CODES.contains(&code)),
        _ => false,
    };
    let message = DisplayErrorContext(&err).to_string();

    tracing::debug!("[bastion] KMS request failed: {}", message);

    if transient {
        KmsError::Unavailable(message)
    } else {
        KmsError::Service(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_name() {
        assert_eq!(alias_name("bastion/mainKey"), "alias/bastion/mainKey");
        assert_eq!(alias_name("alias/bastion/mainKey"), "alias/bastion/mainKey");
    }

    #[test]
    fn test_data_key_spec() {
        assert_eq!(data_key_spec(KeySpec::Aes256), DataKeySpec::Aes256);
    }

    #[test]
    fn test_missing_field_is_not_transient() {
        let err = missing("Decrypt", "Plaintext");
        assert_eq!(
            err,
            KmsError::Service("Decrypt response is missing Plaintext".to_string())
        );
        assert!(!err.is_transient());
    }
}
