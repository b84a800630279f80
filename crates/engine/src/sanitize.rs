//! Markup stripping for user-supplied text

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));

/// Remove every markup tag from `input`
pub fn strip_markup(input: &str) -> String {
    TAG_RE.replace_all(input, "").into_owned()
}
