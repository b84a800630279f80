//! Entry-command payload codec
//!
//! The entry command (`/start <payload>`) may carry an attribution token. This
//! module turns the token into a [`UserPayload`] and back.
//!
//! | Form | Example | Fields |
//! |------|---------|--------|
//! | delimited | `dzen_org_100` | source, campaign, click id |
//! | delimited backlink | `howItWorks_back` | source, campaign, backlink = source |
//! | encoded | `cz1kemVuJmM9b3Jn` | any of s, c, t, b, y |

mod decode;
mod encode;

pub use decode::{decode_payload, is_encoded_form, is_number, DecodeError};
pub use encode::encode_payload;

use funnelbot_core::UserPayload;

/// Longest accepted raw payload, in characters
pub const MAX_PAYLOAD_LEN: usize = 168;

/// Longest kept source, in characters
pub const SOURCE_MAX_LEN: usize = 24;

/// Longest kept campaign, in characters
pub const CAMPAIGN_MAX_LEN: usize = 24;

/// Longest click identifier considered, in characters
pub const CLICK_ID_MAX_LEN: usize = 64;

/// Campaign marking a delimited payload as a backlink
pub const BACKLINK_CAMPAIGN: &str = "back";

/// Truncate `s` to at most `max_len` characters
pub fn limit_str_len(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Decode `raw`, falling back to an empty payload on error
///
/// Returns the decode error alongside so the caller can log it.
pub fn decode_or_empty(raw: &str) -> (UserPayload, Option<DecodeError>) {
    match decode_payload(raw) {
        Ok(payload) => (payload, None),
        Err(e) => (UserPayload::default(), Some(e)),
    }
}
