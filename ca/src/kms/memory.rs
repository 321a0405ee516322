// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! In-process key management service.
//!
//! Honours the same contract as a real service: aliases bind once, data keys
//! are wrapped with AES-256-GCM under a per-master-key secret, and wrapped keys
//! that were tampered with or produced by another instance are rejected with
//! [`KmsError::InvalidCiphertext`].
//!
//! Wrapped key layout:
//!
//! ```text
//! +----------------+--------+-----------+-------------------+
//! | key id len u16 | key id | nonce 12B | ciphertext || tag |
//! +----------------+--------+-----------+-------------------+
//! ```
//!
//! The key id doubles as AAD so a wrapped key cannot be re-pointed at another
//! master key.

use std::collections::BTreeMap;
use std::mem::size_of;
use std::sync::{Mutex, MutexGuard, PoisonError};

use aws_lc_rs::aead::{AES_256_GCM, Aad, LessSafeKey, NONCE_LEN, Nonce, UnboundKey};
use aws_lc_rs::rand::{SecureRandom, SystemRandom};
use byteorder::{BigEndian, ByteOrder};
use data_encoding::HEXLOWER;
use zeroize::Zeroizing;

use super::{KeyManagementService, KmsError};
use crate::constants::DATA_KEY_LEN;
use crate::models::{DataKey, KeySpec, KeyTag, MasterKeyRef, PlaintextKey};

/// Operations a failure can be injected into with [`InMemoryKms::fail_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    DescribeKey,
    CreateKey,
    CreateAlias,
    GenerateDataKey,
    Decrypt,
}

struct MasterKey {
    secret: Zeroizing<[u8; DATA_KEY_LEN]>,
    tags: Vec<KeyTag>,
}

#[derive(Default)]
struct State {
    keys: BTreeMap<MasterKeyRef, MasterKey>,
    aliases: BTreeMap<String, MasterKeyRef>,
    failures: Vec<(Operation, KmsError)>,
}

#[derive(Default)]
pub struct InMemoryKms {
    state: Mutex<State>,
}

impl InMemoryKms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call to `operation` fail with `error`.
    pub fn fail_next(&self, operation: Operation, error: KmsError) {
        self.lock().failures.push((operation, error));
    }

    pub fn key_count(&self) -> usize {
        self.lock().keys.len()
    }

    pub fn alias_target(&self, alias: &str) -> Option<MasterKeyRef> {
        self.lock().aliases.get(alias).cloned()
    }

    pub fn key_tags(&self, key: &MasterKeyRef) -> Option<Vec<KeyTag>> {
        self.lock().keys.get(key).map(|master| master.tags.clone())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fill(&self, dest: &mut [u8]) -> Result<(), KmsError> {
        SystemRandom::new()
            .fill(dest)
            .map_err(|_| KmsError::Service("random number generation failed".to_string()))
    }

    fn wrap(
        &self,
        master: &MasterKey,
        key: &MasterKeyRef,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, KmsError> {
        let key_id = key.as_str().as_bytes();
        let key_id_len = u16::try_from(key_id.len())
            .map_err(|_| KmsError::Service(format!("key id too long: {key}")))?;

        let mut nonce = [0u8; NONCE_LEN];
        self.fill(&mut nonce)?;

        let mut in_out = Zeroizing::new(Vec::with_capacity(plaintext.len() + AES_256_GCM.tag_len()));
        in_out.extend_from_slice(plaintext);
        sealing_key(master)?
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce),
                Aad::from(key_id),
                &mut *in_out,
            )
            .map_err(|_| KmsError::Service("unable to wrap data key".to_string()))?;

        let mut wrapped = vec![0u8; size_of::<u16>()];
        BigEndian::write_u16(&mut wrapped, key_id_len);
        wrapped.extend_from_slice(key_id);
        wrapped.extend_from_slice(&nonce);
        wrapped.extend_from_slice(&in_out);
        Ok(wrapped)
    }
}

fn sealing_key(master: &MasterKey) -> Result<LessSafeKey, KmsError> {
    let key = UnboundKey::new(&AES_256_GCM, master.secret.as_slice())
        .map_err(|_| KmsError::Service("invalid master key material".to_string()))?;
    Ok(LessSafeKey::new(key))
}

fn take_failure(state: &mut State, operation: Operation) -> Result<(), KmsError> {
    match state.failures.iter().position(|(op, _)| *op == operation) {
        Some(index) => Err(state.failures.remove(index).1),
        None => Ok(()),
    }
}

impl KeyManagementService for InMemoryKms {
    fn describe_key_by_alias(&self, alias: &str) -> Result<MasterKeyRef, KmsError> {
        let mut state = self.lock();
        take_failure(&mut state, Operation::DescribeKey)?;

        state
            .aliases
            .get(alias)
            .cloned()
            .ok_or_else(|| KmsError::NotFound(format!("alias {alias}")))
    }

    fn create_key(&self, tags: &[KeyTag]) -> Result<MasterKeyRef, KmsError> {
        let mut state = self.lock();
        take_failure(&mut state, Operation::CreateKey)?;

        let mut id = [0u8; 16];
        self.fill(&mut id)?;
        let key = MasterKeyRef::new(format!("mk-{}", HEXLOWER.encode(&id)));

        let mut secret = Zeroizing::new([0u8; DATA_KEY_LEN]);
        self.fill(secret.as_mut_slice())?;

        state.keys.insert(
            key.clone(),
            MasterKey {
                secret,
                tags: tags.to_vec(),
            },
        );
        Ok(key)
    }

    fn create_alias(&self, alias: &str, key: &MasterKeyRef) -> Result<(), KmsError> {
        let mut state = self.lock();
        take_failure(&mut state, Operation::CreateAlias)?;

        if state.aliases.contains_key(alias) {
            return Err(KmsError::AlreadyExists(alias.to_string()));
        }
        if !state.keys.contains_key(key) {
            return Err(KmsError::NotFound(format!("key {key}")));
        }
        state.aliases.insert(alias.to_string(), key.clone());
        Ok(())
    }

    fn generate_data_key(&self, key: &MasterKeyRef, spec: KeySpec) -> Result<DataKey, KmsError> {
        let mut state = self.lock();
        take_failure(&mut state, Operation::GenerateDataKey)?;

        let master = state
            .keys
            .get(key)
            .ok_or_else(|| KmsError::NotFound(format!("key {key}")))?;

        let mut bytes = vec![0u8; spec.key_len()];
        self.fill(&mut bytes)?;
        let plaintext = PlaintextKey::new(bytes);
        let wrapped = self.wrap(master, key, plaintext.as_bytes())?;

        Ok(DataKey { plaintext, wrapped })
    }

    fn decrypt(&self, wrapped_key: &[u8]) -> Result<PlaintextKey, KmsError> {
        let mut state = self.lock();
        take_failure(&mut state, Operation::Decrypt)?;

        let (header, rest) = wrapped_key
            .split_at_checked(size_of::<u16>())
            .ok_or(KmsError::InvalidCiphertext)?;
        let key_id_len = usize::from(BigEndian::read_u16(header));
        let (key_id, rest) = rest
            .split_at_checked(key_id_len)
            .ok_or(KmsError::InvalidCiphertext)?;
        let (nonce, ciphertext) = rest
            .split_at_checked(NONCE_LEN)
            .ok_or(KmsError::InvalidCiphertext)?;

        let key_id = std::str::from_utf8(key_id).map_err(|_| KmsError::InvalidCiphertext)?;
        // unknown key ids are foreign ciphertext, not a missing resource
        let master = state
            .keys
            .get(&MasterKeyRef::new(key_id))
            .ok_or(KmsError::InvalidCiphertext)?;
        let nonce =
            Nonce::try_assume_unique_for_key(nonce).map_err(|_| KmsError::InvalidCiphertext)?;

        let mut in_out = Zeroizing::new(ciphertext.to_vec());
        let plaintext_len = sealing_key(master)?
            .open_in_place(nonce, Aad::from(key_id.as_bytes()), &mut in_out)
            .map_err(|_| KmsError::InvalidCiphertext)?
            .len();
        in_out.truncate(plaintext_len);

        Ok(PlaintextKey::new(std::mem::take(&mut *in_out)))
    }
}
