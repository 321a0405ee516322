// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::time::Duration;

use crate::constants::{
    CREATED_BY_TAG_KEY, CREATED_BY_TAG_VALUE, DEFAULT_KEY_ID, DEFAULT_MASTER_KEY_ALIAS,
    DEFAULT_PRINCIPAL, DEFAULT_RSA_BITS, DEFAULT_SERIAL, DEFAULT_VALIDITY,
    EXTENSION_AGENT_FORWARDING, EXTENSION_PORT_FORWARDING, EXTENSION_PTY, EXTENSION_USER_RC,
    EXTENSION_X11_FORWARDING,
};
use crate::models::KeyTag;

/// Algorithm and strength of a newly generated CA key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Rsa { bits: usize },
    Ed25519,
}

impl Default for KeyAlgorithm {
    fn default() -> Self {
        KeyAlgorithm::Rsa {
            bits: DEFAULT_RSA_BITS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeConfig {
    /// Alias the master key is looked up by, and bound to on first use.
    pub master_key_alias: String,
    /// Tags attached to a master key when one has to be created.
    pub key_tags: Vec<KeyTag>,
}

impl EnvelopeConfig {
    pub fn new(master_key_alias: impl Into<String>) -> Self {
        Self {
            master_key_alias: master_key_alias.into(),
            ..Self::default()
        }
    }
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        EnvelopeConfig {
            master_key_alias: DEFAULT_MASTER_KEY_ALIAS.to_string(),
            key_tags: vec![KeyTag::new(CREATED_BY_TAG_KEY, CREATED_BY_TAG_VALUE)],
        }
    }
}

/// Session capabilities granted by an issued user certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub x11_forwarding: bool,
    pub agent_forwarding: bool,
    pub port_forwarding: bool,
    pub pty: bool,
    pub user_rc: bool,
}

impl Capabilities {
    pub fn none() -> Self {
        Capabilities {
            x11_forwarding: false,
            agent_forwarding: false,
            port_forwarding: false,
            pty: false,
            user_rc: false,
        }
    }

    /// Names of the OpenSSH extensions enabled by these capabilities.
    pub fn extensions(&self) -> Vec<&'static str> {
        [
            (self.x11_forwarding, EXTENSION_X11_FORWARDING),
            (self.agent_forwarding, EXTENSION_AGENT_FORWARDING),
            (self.port_forwarding, EXTENSION_PORT_FORWARDING),
            (self.pty, EXTENSION_PTY),
            (self.user_rc, EXTENSION_USER_RC),
        ]
        .into_iter()
        .filter_map(|(enabled, name)| enabled.then_some(name))
        .collect()
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities {
            x11_forwarding: true,
            agent_forwarding: true,
            port_forwarding: true,
            pty: true,
            user_rc: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateOptions {
    pub serial: u64,
    pub key_id: String,
    pub principals: Vec<String>,
    /// Length of the validity window, starting at the time of signing.
    pub validity: Duration,
    pub capabilities: Capabilities,
    /// Trailing comment on the authorized-key line.
    pub comment: Option<String>,
}

impl Default for CertificateOptions {
    fn default() -> Self {
        CertificateOptions {
            serial: DEFAULT_SERIAL,
            key_id: DEFAULT_KEY_ID.to_string(),
            principals: vec![DEFAULT_PRINCIPAL.to_string()],
            validity: DEFAULT_VALIDITY,
            capabilities: Capabilities::default(),
            comment: None,
        }
    }
}
