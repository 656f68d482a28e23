use core::fmt::Write;

use heapless::String;

use crate::cfg::credentials::TOPIC_LEN;
use crate::cfg::error::ConfigError;

/// Returns the part of `topic` after `<username>/`.
///
/// `None` when the prefix does not match, the suffix is empty, or the
/// suffix holds an MQTT wildcard (`+`, `#`) which is not valid for publishing.
pub fn suffix_of<'a>(topic: &'a str, username: &str) -> Option<&'a str> {
    let suffix = topic.strip_prefix(username)?.strip_prefix('/')?;
    if suffix_is_valid(suffix) {
        Some(suffix)
    } else {
        None
    }
}

/// Builds `<username>/<suffix>`.
pub fn build(username: &str, suffix: &str) -> Result<String<TOPIC_LEN>, ConfigError> {
    if !suffix_is_valid(suffix) {
        return Err(ConfigError::InvalidTopicSuffix);
    }
    let mut topic = String::new();
    write!(topic, "{username}/{suffix}")?;
    Ok(topic)
}

fn suffix_is_valid(suffix: &str) -> bool {
    !suffix.is_empty() && !suffix.contains(|c| matches!(c, '+' | '#' | '\0'))
}
