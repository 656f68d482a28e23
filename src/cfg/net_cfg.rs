use core::fmt;

// Every constant can be overridden at build time by an environment variable
// of the same name, e.g. `STA_PASS=... cargo build --features firmware`.

// WIFI configuration constants
pub const STA_SSID: &str = env_or(option_env!("STA_SSID"), "My SSID");
pub const STA_PASS: &str = env_or(option_env!("STA_PASS"), "My_AP_password");
// MQTT configuration constants, as denoted in maqiatto.com
pub const MQTT_BROKER: &str = env_or(option_env!("MQTT_BROKER"), "maqiatto.com");
pub const MQTT_BROKER_PORT: u16 = port_or(option_env!("MQTT_BROKER_PORT"), 1883);
pub const MQTT_USERNAME: &str = env_or(option_env!("MQTT_USERNAME"), "my_maqiatto_username");
pub const MQTT_KEY: &str = env_or(option_env!("MQTT_KEY"), "MY_MAQIATTO_KEY");
// Topics as denoted in the broker topic list: <username>/<suffix>
pub const TOPIC1: &str = env_or(option_env!("TOPIC1"), "my_maqiatto_username/umidade");
pub const TOPIC2: &str = env_or(option_env!("TOPIC2"), "my_maqiatto_username/status");

// No build-time override is set, so the constants hold the literals above
#[cfg(test)]
pub(crate) const DEFAULTS_IN_USE: bool = option_env!("STA_SSID").is_none()
    && option_env!("STA_PASS").is_none()
    && option_env!("MQTT_BROKER").is_none()
    && option_env!("MQTT_BROKER_PORT").is_none()
    && option_env!("MQTT_USERNAME").is_none()
    && option_env!("MQTT_KEY").is_none()
    && option_env!("TOPIC1").is_none()
    && option_env!("TOPIC2").is_none();

const fn env_or(value: Option<&'static str>, default: &'static str) -> &'static str {
    match value {
        Some(value) => value,
        None => default,
    }
}

/// Parses a port override at compile time. A bad value fails the build.
const fn port_or(value: Option<&'static str>, default: u16) -> u16 {
    let digits = match value {
        Some(value) => value.as_bytes(),
        None => return default,
    };
    if digits.is_empty() {
        panic!("MQTT_BROKER_PORT override is empty");
    }
    let mut port: u32 = 0;
    let mut i = 0;
    while i < digits.len() {
        if !digits[i].is_ascii_digit() {
            panic!("MQTT_BROKER_PORT override is not a number");
        }
        port = port * 10 + (digits[i] - b'0') as u32;
        if port > u16::MAX as u32 {
            panic!("MQTT_BROKER_PORT override exceeds 65535");
        }
        i += 1;
    }
    if port == 0 {
        panic!("MQTT_BROKER_PORT override must not be 0");
    }
    port as u16
}

/// Symbolic name of each configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    StaSsid,
    StaPass,
    MqttBroker,
    MqttBrokerPort,
    MqttUsername,
    MqttKey,
    Topic1,
    Topic2,
}

impl Key {
    pub const COUNT: usize = 8;

    /// Canonical order, used when writing env files.
    pub const ALL: [Key; Key::COUNT] = [
        Key::StaSsid,
        Key::StaPass,
        Key::MqttBroker,
        Key::MqttBrokerPort,
        Key::MqttUsername,
        Key::MqttKey,
        Key::Topic1,
        Key::Topic2,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Key::StaSsid => "STA_SSID",
            Key::StaPass => "STA_PASS",
            Key::MqttBroker => "MQTT_BROKER",
            Key::MqttBrokerPort => "MQTT_BROKER_PORT",
            Key::MqttUsername => "MQTT_USERNAME",
            Key::MqttKey => "MQTT_KEY",
            Key::Topic1 => "TOPIC1",
            Key::Topic2 => "TOPIC2",
        }
    }

    pub fn from_name(name: &str) -> Option<Key> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }

    /// Values that must never be logged.
    pub const fn is_secret(self) -> bool {
        matches!(self, Key::StaPass | Key::MqttKey)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn port_is_a_valid_tcp_port() {
        assert!(MQTT_BROKER_PORT >= 1);
        if DEFAULTS_IN_USE {
            assert_eq!(MQTT_BROKER_PORT, 1883);
        }
    }

    #[test]
    fn string_constants_are_not_empty() {
        for value in [
            STA_SSID,
            STA_PASS,
            MQTT_BROKER,
            MQTT_USERNAME,
            MQTT_KEY,
            TOPIC1,
            TOPIC2,
        ] {
            assert!(!value.is_empty());
        }
    }

    #[test]
    fn topics_are_distinct_and_scoped_to_user() {
        assert_ne!(TOPIC1, TOPIC2);
        for topic in [TOPIC1, TOPIC2] {
            let suffix = topic
                .strip_prefix(MQTT_USERNAME)
                .and_then(|rest| rest.strip_prefix('/'));
            assert!(matches!(suffix, Some(s) if !s.is_empty()), "{topic}");
        }
        if DEFAULTS_IN_USE {
            assert_eq!(TOPIC1, "my_maqiatto_username/umidade");
            assert_eq!(TOPIC2, "my_maqiatto_username/status");
        }
    }

    #[test]
    fn port_override_parsing() {
        assert_eq!(port_or(None, 1883), 1883);
        assert_eq!(port_or(Some("8883"), 1883), 8883);
        assert_eq!(port_or(Some("65535"), 1883), 65535);
    }

    #[test]
    #[should_panic]
    fn port_override_rejects_zero() {
        port_or(Some("0"), 1883);
    }

    #[test]
    #[should_panic]
    fn port_override_rejects_overflow() {
        port_or(Some("65536"), 1883);
    }

    #[test]
    fn key_names_round_trip() {
        for key in Key::ALL {
            assert_eq!(Key::from_name(key.name()), Some(key));
        }
        assert_eq!(Key::from_name("TOPIC3"), None);
        assert!(Key::StaPass.is_secret());
        assert!(Key::MqttKey.is_secret());
        assert!(!Key::MqttUsername.is_secret());
    }
}
