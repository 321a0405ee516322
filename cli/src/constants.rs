// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

/// KMS addresses aliases as `alias/<name>`.
pub const ALIAS_PREFIX: &str = "alias/";
pub const DEFAULT_KMS_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_VALIDITY_HOURS: u64 = 7 * 24; // 7 days
pub const SECONDS_PER_HOUR: u64 = 60 * 60;
/// sysexits.h EX_TEMPFAIL, returned when a retry may succeed
pub const EXIT_TEMPORARY_FAILURE: u8 = 75;
#[cfg(unix)]
pub const ENVELOPE_FILE_MODE: u32 = 0o600;

