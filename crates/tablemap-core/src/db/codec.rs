//! Continuation token codec.
//!
//! A token is the last evaluated key of a page: the key serialized to JSON,
//! hex-encoded, and tagged with a format prefix so a later layout can be told
//! apart from this one.
use crate::{db::store::ContinuationToken, value::Item};
use std::fmt::Write as _;
use thiserror::Error as ThisError;

const TOKEN_PREFIX: &str = "k1.";

// A primary key is two short attributes; anything larger was not ours.
const MAX_KEY_BYTES: usize = 4 * 1024;

///
/// TokenDecodeError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum TokenDecodeError {
    #[error("continuation token is empty")]
    Empty,

    #[error("continuation token has an unknown format")]
    UnknownFormat,

    #[error("continuation token holds {bytes} key bytes (max {max})")]
    TooLarge { bytes: usize, max: usize },

    #[error("continuation token is not hex at offset {offset}")]
    BadHex { offset: usize },

    #[error("continuation token does not hold a key: {reason}")]
    MalformedKey { reason: String },
}

/// Encode the last evaluated key of a page.
#[must_use]
pub fn encode_token(key: &Item) -> ContinuationToken {
    // an Item is a string-keyed map of plain enums and always serializes
    let bytes = serde_json::to_vec(key).unwrap_or_default();
    let token = bytes.iter().fold(String::from(TOKEN_PREFIX), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    });

    ContinuationToken::new(token)
}

/// Decode a token produced by [`encode_token`].
pub fn decode_token(token: &ContinuationToken) -> Result<Item, TokenDecodeError> {
    let token = token.as_str().trim();
    if token.is_empty() {
        return Err(TokenDecodeError::Empty);
    }

    let hex = token
        .strip_prefix(TOKEN_PREFIX)
        .ok_or(TokenDecodeError::UnknownFormat)?;
    let bytes = hex.len().div_ceil(2);
    if bytes > MAX_KEY_BYTES {
        return Err(TokenDecodeError::TooLarge {
            bytes,
            max: MAX_KEY_BYTES,
        });
    }

    let body = hex
        .as_bytes()
        .chunks(2)
        .enumerate()
        .map(|(idx, pair)| byte_at(pair, idx * 2))
        .collect::<Result<Vec<u8>, _>>()?;

    serde_json::from_slice(&body).map_err(|err| TokenDecodeError::MalformedKey {
        reason: err.to_string(),
    })
}

// `from_str_radix` tolerates a leading sign, so digits are checked first.
fn byte_at(pair: &[u8], offset: usize) -> Result<u8, TokenDecodeError> {
    let err = TokenDecodeError::BadHex { offset };
    if pair.len() != 2 || !pair.iter().all(u8::is_ascii_hexdigit) {
        return Err(err);
    }

    std::str::from_utf8(pair)
        .ok()
        .and_then(|digits| u8::from_str_radix(digits, 16).ok())
        .ok_or(err)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::AttributeValue;

    fn key() -> Item {
        Item::from([
            ("PK".to_string(), AttributeValue::from("acme/root")),
            ("SK".to_string(), AttributeValue::from("file/a.txt")),
        ])
    }

    #[test]
    fn tokens_carry_the_key() {
        let token = encode_token(&key());

        let hex = token.as_str().strip_prefix("k1.").expect("tagged token");
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(decode_token(&token).expect("token decodes"), key());
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let err = decode_token(&ContinuationToken::new("  ")).expect_err("empty token");
        assert_eq!(err, TokenDecodeError::Empty);

        let err = decode_token(&ContinuationToken::new("7b7d")).expect_err("untagged");
        assert_eq!(err, TokenDecodeError::UnknownFormat);

        let err = decode_token(&ContinuationToken::new("k1.7b7")).expect_err("odd length");
        assert_eq!(err, TokenDecodeError::BadHex { offset: 2 });

        let err = decode_token(&ContinuationToken::new("k1.+f")).expect_err("signed pair");
        assert_eq!(err, TokenDecodeError::BadHex { offset: 0 });

        let err = decode_token(&ContinuationToken::new("k1.ffff")).expect_err("not json");
        assert!(matches!(err, TokenDecodeError::MalformedKey { .. }));

        let oversized = format!("k1.{}", "aa".repeat(MAX_KEY_BYTES + 1));
        let err = decode_token(&ContinuationToken::new(oversized)).expect_err("too large");
        assert!(matches!(err, TokenDecodeError::TooLarge { .. }));
    }
}
