//! Configuration mini-language: `key:value, other:"quoted value"`.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::ConfigurationNode;

pub const ITEM_DELIMITER: char = ',';
pub const KEY_VALUE_DELIMITER: char = ':';
const ESCAPE: char = '\\';

static QUOTED_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)^"(.*)"$"#).unwrap());

/// Parse one configuration string into an ordered key/value mapping.
///
/// Items are separated by commas not preceded by a backslash; `\,` becomes a
/// literal comma afterwards. Keys lose leading whitespace only. Values are kept
/// verbatim unless fully wrapped in double quotes, in which case the quotes are
/// removed and the inner text is used as is.
///
/// # Errors
/// - `InvalidConfiguration` for blank input
/// - `MissingKeyValueDelimiter` when any item has no `:`
#[instrument(level = "trace")]
pub fn parse_configuration(configuration: &str) -> DomainResult<ConfigurationNode> {
    if configuration.trim().is_empty() {
        return Err(DomainError::InvalidConfiguration);
    }

    let items: Vec<String> = split_unescaped(configuration)
        .into_iter()
        .map(|item| item.replace("\\,", ","))
        .collect();

    if items.iter().any(|item| !item.contains(KEY_VALUE_DELIMITER)) {
        return Err(DomainError::MissingKeyValueDelimiter(
            configuration.to_string(),
        ));
    }

    let mut entries = IndexMap::with_capacity(items.len());
    for item in &items {
        let item = item.trim_start();
        if let Some((key, raw_value)) = item.split_once(KEY_VALUE_DELIMITER) {
            // repeated keys keep their first position, last value wins
            entries.insert(key.to_string(), unquote(raw_value).to_string());
        }
    }
    Ok(ConfigurationNode::new(entries))
}

/// Split on item delimiters that are not escaped; empty items are kept.
fn split_unescaped(text: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut start = 0;
    let mut previous = None;
    for (i, c) in text.char_indices() {
        if c == ITEM_DELIMITER && previous != Some(ESCAPE) {
            items.push(&text[start..i]);
            start = i + c.len_utf8();
        }
        previous = Some(c);
    }
    items.push(&text[start..]);
    items
}

fn unquote(value: &str) -> &str {
    QUOTED_VALUE
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map_or(value, |inner| inner.as_str())
}
