//! Wire encoding for funnelbot
//!
//! This crate implements the codec for the attribution payload attached to the
//! entry command. Decoding is pure and never touches the network or disk.
//!
//! ## Examples
//!
//! ```
//! use funnelbot_wire::decode_payload;
//!
//! let payload = decode_payload("yandex_search_100").unwrap();
//! assert_eq!(payload.source, "yandex");
//! assert_eq!(payload.click_id, "100");
//!
//! let payload = decode_payload("howItWorks_back").unwrap();
//! assert_eq!(payload.backlink, "howItWorks");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod payload;

// Re-export main types
pub use payload::{
    decode_or_empty, decode_payload, encode_payload, is_encoded_form, limit_str_len, DecodeError,
    MAX_PAYLOAD_LEN,
};
