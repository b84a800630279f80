//! Inline keyboard layout and link attribution

use funnelbot_core::{AttributionTags, Error, InlineButton, Keyboard, Result};
use url::Url;

const UTM_SOURCE: &str = "utm_source";
const UTM_CAMPAIGN: &str = "utm_campaign";
const UTM_CONTENT: &str = "utm_content";

/// Arrange buttons into rows
///
/// Column mode puts every button on its own row. Otherwise rows hold `split`
/// buttons each, and a split of 0 keeps all buttons on a single row.
pub fn layout_buttons(buttons: Vec<InlineButton>, columns: bool, split: usize) -> Keyboard {
    if buttons.is_empty() {
        return Keyboard::new();
    }
    if columns {
        return buttons.into_iter().map(|button| vec![button]).collect();
    }
    if split == 0 {
        return vec![buttons];
    }
    buttons.chunks(split).map(<[InlineButton]>::to_vec).collect()
}

/// Append attribution query parameters to `base`
///
/// Existing `utm_*` parameters are replaced. Returns `base` unchanged when the
/// source or campaign tag is empty.
pub fn add_utm_tags(base: &str, tags: &AttributionTags) -> Result<String> {
    if tags.source.is_empty() || tags.campaign.is_empty() {
        return Ok(base.to_string());
    }

    let mut url =
        Url::parse(base).map_err(|e| Error::Validation(format!("parse url {:?}: {}", base, e)))?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !matches!(key.as_ref(), UTM_SOURCE | UTM_CAMPAIGN | UTM_CONTENT))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        query.extend_pairs(kept);
        query.append_pair(UTM_SOURCE, &tags.source);
        query.append_pair(UTM_CAMPAIGN, &tags.campaign);
        if !tags.content.is_empty() {
            query.append_pair(UTM_CONTENT, &tags.content);
        }
    }

    Ok(url.into())
}
