// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use data_encoding::BASE64_NOPAD;

use crate::errors::{Error, Result};

/// Encodes a wrapped data key for transport inside an envelope.
#[inline]
pub fn base64_encode(input: &[u8]) -> String {
    BASE64_NOPAD.encode(input)
}

#[inline]
pub fn base64_decode(input: &str) -> Result<Vec<u8>> {
    let decoded = BASE64_NOPAD
        .decode(input.as_bytes())
        .map_err(|err| Error::Encoding(format!("invalid base64: {err}")))?;
    Ok(decoded)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_decode() {
        let input = "YmFzdGlvbgABAg";
        let actual = base64_decode(input).unwrap();
        assert_eq!(actual, b"bastion\x00\x01\x02");
        assert_eq!(base64_encode(&actual), input);
    }

    #[test]
    fn test_base64_decode_rejects_garbage() {
        let err = base64_decode("not base64!").unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));

        // padding is not part of the transport encoding
        assert!(base64_decode("YmFzdGlvbgABAg==").is_err());
    }
}
