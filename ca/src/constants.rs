// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::time::Duration;

/// Well-known alias the CA master key is bound to in the key management service.
pub const DEFAULT_MASTER_KEY_ALIAS: &str = "bastion/mainKey";
pub const CREATED_BY_TAG_KEY: &str = "CreatedBy";
pub const CREATED_BY_TAG_VALUE: &str = "Bastion";

/// Length of an AES-256 data key in bytes
pub const DATA_KEY_LEN: usize = 32;

/// Current protected envelope schema version
pub const ENVELOPE_VERSION: u8 = 1;
/// Maximum accepted envelope size (1 MB) to bound decoder memory use
pub const MAX_ENVELOPE_SIZE: usize = 1024 * 1024;

// Armour for the encrypted CA key block
pub const BLOCK_LABEL: &str = "BASTION ENCRYPTED PRIVATE KEY";
pub const BLOCK_PROC_TYPE: &str = "4,ENCRYPTED";
pub const BLOCK_CIPHER: &str = "AES-256-GCM";
pub const BLOCK_LINE_WIDTH: usize = 64;

pub const DEFAULT_RSA_BITS: usize = 4096;
pub const MIN_RSA_BITS: usize = 2048;
pub const CA_KEY_COMMENT: &str = "bastion-ca";

pub const DEFAULT_SERIAL: u64 = 1;
pub const DEFAULT_PRINCIPAL: &str = "user";
pub const DEFAULT_KEY_ID: &str = "user";
pub const DEFAULT_VALIDITY: Duration = Duration::from_secs(7 * 24 * 60 * 60); // 7 days

// OpenSSH user certificate extensions
pub const EXTENSION_X11_FORWARDING: &str = "permit-X11-forwarding";
pub const EXTENSION_AGENT_FORWARDING: &str = "permit-agent-forwarding";
pub const EXTENSION_PORT_FORWARDING: &str = "permit-port-forwarding";
pub const EXTENSION_PTY: &str = "permit-pty";
pub const EXTENSION_USER_RC: &str = "permit-user-rc";
