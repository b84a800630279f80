//! Payload decoding
//!
//! Two forms are accepted:
//! - encoded: base64 (padding optional) of a query string `s=..&c=..&t=..&b=..&y=..`
//! - delimited: `source_campaign[_clickid]`, e.g. `dzen_start_100`
//!
//! A string made only of base64 characters whose unpadded length is not
//! `1 mod 4` is treated as the encoded form; anything else is delimited.

use base64::Engine;
use funnelbot_core::UserPayload;
use thiserror::Error;

use super::{
    limit_str_len, BACKLINK_CAMPAIGN, CAMPAIGN_MAX_LEN, CLICK_ID_MAX_LEN, MAX_PAYLOAD_LEN,
    SOURCE_MAX_LEN,
};

/// Decode error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Raw payload longer than [`MAX_PAYLOAD_LEN`]
    #[error("payload too large: {len} > {max}", max = MAX_PAYLOAD_LEN)]
    TooLarge {
        /// Length of the rejected payload in characters
        len: usize,
    },

    /// Delimited payload without a campaign part
    #[error("invalid payload: {0:?}")]
    InvalidPayload(String),

    /// Encoded payload missing data (one dangling base64 character)
    #[error("not enough data in: {0:?}")]
    Truncated(String),

    /// Encoded payload is not valid base64
    #[error("invalid base64: {0}")]
    InvalidBase64(String),
}

impl From<DecodeError> for funnelbot_core::Error {
    fn from(e: DecodeError) -> Self {
        funnelbot_core::Error::Decode(e.to_string())
    }
}

/// Decode a raw entry-command payload
///
/// Empty input decodes to an empty payload.
pub fn decode_payload(raw: &str) -> Result<UserPayload, DecodeError> {
    if raw.is_empty() {
        return Ok(UserPayload::default());
    }

    let len = raw.chars().count();
    if len > MAX_PAYLOAD_LEN {
        return Err(DecodeError::TooLarge { len });
    }

    if is_encoded_form(raw) {
        decode_encoded(raw)
    } else {
        decode_delimited(raw)
    }
}

/// Check if `raw` looks like unpadded or padded base64
pub fn is_encoded_form(raw: &str) -> bool {
    let stripped = raw.trim_end_matches('=');
    let alphabet_ok = stripped
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/');
    alphabet_ok && stripped.len() % 4 != 1
}

fn decode_encoded(raw: &str) -> Result<UserPayload, DecodeError> {
    let bytes = decode_base64_unpadded(raw.trim_end_matches('='))?;

    let mut payload = UserPayload::default();
    for (key, value) in url::form_urlencoded::parse(&bytes) {
        let slot = match key.as_ref() {
            "s" => &mut payload.source,
            "c" => &mut payload.campaign,
            "t" => &mut payload.content,
            "b" => &mut payload.backlink,
            "y" => &mut payload.click_id,
            _ => continue,
        };
        // first value wins
        if slot.is_empty() {
            *slot = value.into_owned();
        }
    }
    Ok(payload)
}

fn decode_base64_unpadded(stripped: &str) -> Result<Vec<u8>, DecodeError> {
    let mut encoded = stripped.to_string();
    match stripped.len() % 4 {
        1 => return Err(DecodeError::Truncated(stripped.to_string())),
        2 => encoded.push_str("=="),
        3 => encoded.push('='),
        _ => {}
    }

    base64::engine::general_purpose::STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| DecodeError::InvalidBase64(e.to_string()))
}

fn decode_delimited(raw: &str) -> Result<UserPayload, DecodeError> {
    let parts: Vec<&str> = raw.split('_').collect();
    if parts.len() < 2 {
        return Err(DecodeError::InvalidPayload(raw.to_string()));
    }

    let source = limit_str_len(parts[0], SOURCE_MAX_LEN);
    let campaign = limit_str_len(parts[1], CAMPAIGN_MAX_LEN);

    let click_id = parts
        .get(2)
        .map(|part| limit_str_len(part, CLICK_ID_MAX_LEN))
        .filter(|candidate| is_number(candidate))
        .unwrap_or_default();

    let backlink = if campaign == BACKLINK_CAMPAIGN {
        source.clone()
    } else {
        String::new()
    };

    Ok(UserPayload {
        source,
        campaign,
        content: String::new(),
        backlink,
        click_id,
    })
}

/// Check if `s` parses as an integer or a floating-point number
pub fn is_number(s: &str) -> bool {
    s.parse::<i64>().is_ok() || s.parse::<f64>().is_ok()
}
