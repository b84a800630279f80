//! Payload encoding
//!
//! Produces the encoded form (unpadded base64 of a query string) used in deep
//! links such as `https://t.me/<bot>?start=<payload>`.

use base64::Engine;
use funnelbot_core::UserPayload;

/// Encode `payload` into its encoded wire form
///
/// Empty fields are omitted. The caller is responsible for keeping the result
/// within [`super::MAX_PAYLOAD_LEN`].
pub fn encode_payload(payload: &UserPayload) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    let fields = [
        ("s", &payload.source),
        ("c", &payload.campaign),
        ("t", &payload.content),
        ("b", &payload.backlink),
        ("y", &payload.click_id),
    ];
    for (key, value) in fields {
        if !value.is_empty() {
            query.append_pair(key, value);
        }
    }

    base64::engine::general_purpose::STANDARD_NO_PAD.encode(query.finish())
}
