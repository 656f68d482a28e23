use core::fmt;

use crate::cfg::net_cfg::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A text value is empty.
    Empty(Key),
    /// A text value does not fit its fixed capacity.
    TooLong(Key),
    /// Port is not a number in 1..=65535.
    InvalidPort,
    /// Topic is not `<username>/<suffix>`.
    MalformedTopic(Key),
    /// Suffix handed to `topic::build` is empty or holds `+`, `#` or NUL.
    InvalidTopicSuffix,
    DuplicateTopic,
    MissingKey(Key),
    /// 1-based line number in an env file.
    MalformedLine(usize),
    BufferFull,
    Json,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Empty(key) => write!(f, "{key} is empty"),
            ConfigError::TooLong(key) => write!(f, "{key} is too long"),
            ConfigError::InvalidPort => f.write_str("MQTT_BROKER_PORT must be in 1..=65535"),
            ConfigError::MalformedTopic(key) => {
                write!(f, "{key} is not of the form <MQTT_USERNAME>/<suffix>")
            }
            ConfigError::InvalidTopicSuffix => f.write_str("invalid topic suffix"),
            ConfigError::DuplicateTopic => f.write_str("TOPIC1 and TOPIC2 are identical"),
            ConfigError::MissingKey(key) => write!(f, "{key} is missing"),
            ConfigError::MalformedLine(line) => write!(f, "malformed line {line}"),
            ConfigError::BufferFull => f.write_str("output buffer is full"),
            ConfigError::Json => f.write_str("invalid JSON credentials"),
        }
    }
}

impl From<serde_json_core::ser::Error> for ConfigError {
    // Serialization of a fixed-shape struct only fails on buffer exhaustion
    fn from(_: serde_json_core::ser::Error) -> Self {
        ConfigError::BufferFull
    }
}

impl From<serde_json_core::de::Error> for ConfigError {
    fn from(_: serde_json_core::de::Error) -> Self {
        ConfigError::Json
    }
}

impl From<fmt::Error> for ConfigError {
    fn from(_: fmt::Error) -> Self {
        ConfigError::BufferFull
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_names_the_offending_key() {
        let mut msg: heapless::String<80> = heapless::String::new();
        write!(msg, "{}", ConfigError::MalformedTopic(Key::Topic2)).unwrap();
        assert_eq!(msg.as_str(), "TOPIC2 is not of the form <MQTT_USERNAME>/<suffix>");

        msg.clear();
        write!(msg, "{}", ConfigError::MalformedLine(7)).unwrap();
        assert_eq!(msg.as_str(), "malformed line 7");

        msg.clear();
        write!(msg, "{}", ConfigError::InvalidTopicSuffix).unwrap();
        assert_eq!(msg.as_str(), "invalid topic suffix");
    }
}
