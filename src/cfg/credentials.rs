use core::fmt;

use heapless::String;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::cfg::error::ConfigError;
use crate::cfg::net_cfg::{self, Key};
use crate::cfg::topic;

// String<32> because 802.11 limits SSIDs to 32 bytes
pub const SSID_LEN: usize = 32;
// String<64> matches the WPA2 passphrase limit
pub const PASS_LEN: usize = 64;
pub const HOST_LEN: usize = 64;
pub const AUTH_LEN: usize = 64;
pub const TOPIC_LEN: usize = 128;

/// Broker and network credentials of the node.
///
/// Built once at startup and handed by reference to whichever task needs
/// it. All fields are fixed-capacity so the value can live in a `static`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    ssid: String<SSID_LEN>,
    pass: String<PASS_LEN>,
    broker: String<HOST_LEN>,
    port: u16,
    username: String<AUTH_LEN>,
    key: String<AUTH_LEN>,
    topic1: String<TOPIC_LEN>,
    topic2: String<TOPIC_LEN>,
}

/// A single configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    Text(&'a str),
    Port(u16),
}

impl Credentials {
    /// All fields empty and port 0. Never valid on its own.
    pub(crate) fn blank() -> Self {
        Self {
            ssid: String::new(),
            pass: String::new(),
            broker: String::new(),
            port: 0,
            username: String::new(),
            key: String::new(),
            topic1: String::new(),
            topic2: String::new(),
        }
    }

    /// Credentials as compiled into the firmware.
    pub fn from_constants() -> Result<Self, ConfigError> {
        Ok(Self {
            ssid: fill(Key::StaSsid, net_cfg::STA_SSID)?,
            pass: fill(Key::StaPass, net_cfg::STA_PASS)?,
            broker: fill(Key::MqttBroker, net_cfg::MQTT_BROKER)?,
            port: net_cfg::MQTT_BROKER_PORT,
            username: fill(Key::MqttUsername, net_cfg::MQTT_USERNAME)?,
            key: fill(Key::MqttKey, net_cfg::MQTT_KEY)?,
            topic1: fill(Key::Topic1, net_cfg::TOPIC1)?,
            topic2: fill(Key::Topic2, net_cfg::TOPIC2)?,
        })
    }

    /// Compiled-in credentials with every key that `lookup` knows replaced.
    ///
    /// `lookup` receives the key name, e.g. `"MQTT_KEY"`.
    pub fn from_lookup<F, V>(mut lookup: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<V>,
        V: AsRef<str>,
    {
        let mut creds = Self::from_constants()?;
        for key in Key::ALL {
            if let Some(value) = lookup(key.name()) {
                creds.set(key, value.as_ref())?;
                info!("[CFG] {key} overridden");
            }
        }
        Ok(creds)
    }

    /// Compiled-in credentials overridden from the process environment.
    #[cfg(feature = "std")]
    pub fn from_process_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Replaces a single value. The port is parsed from decimal text.
    pub fn set(&mut self, key: Key, value: &str) -> Result<(), ConfigError> {
        match key {
            Key::StaSsid => self.ssid = fill(key, value)?,
            Key::StaPass => self.pass = fill(key, value)?,
            Key::MqttBroker => self.broker = fill(key, value)?,
            Key::MqttBrokerPort => self.port = parse_port(value)?,
            Key::MqttUsername => self.username = fill(key, value)?,
            Key::MqttKey => self.key = fill(key, value)?,
            Key::Topic1 => self.topic1 = fill(key, value)?,
            Key::Topic2 => self.topic2 = fill(key, value)?,
        }
        Ok(())
    }

    pub fn value(&self, key: Key) -> Value<'_> {
        match key {
            Key::StaSsid => Value::Text(&self.ssid),
            Key::StaPass => Value::Text(&self.pass),
            Key::MqttBroker => Value::Text(&self.broker),
            Key::MqttBrokerPort => Value::Port(self.port),
            Key::MqttUsername => Value::Text(&self.username),
            Key::MqttKey => Value::Text(&self.key),
            Key::Topic1 => Value::Text(&self.topic1),
            Key::Topic2 => Value::Text(&self.topic2),
        }
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn pass(&self) -> &str {
        &self.pass
    }

    pub fn broker(&self) -> &str {
        &self.broker
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// `[TOPIC1, TOPIC2]`
    pub fn topics(&self) -> [&str; 2] {
        [self.topic1.as_str(), self.topic2.as_str()]
    }

    /// Checks what a client needs before connecting: no empty values, a
    /// non-zero port, both topics under the username, and distinct topics.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for key in Key::ALL {
            if let Value::Text(text) = self.value(key) {
                if text.is_empty() {
                    return Err(ConfigError::Empty(key));
                }
            }
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        for (key, topic) in [(Key::Topic1, &self.topic1), (Key::Topic2, &self.topic2)] {
            if topic::suffix_of(topic, &self.username).is_none() {
                return Err(ConfigError::MalformedTopic(key));
            }
        }
        if self.topic1 == self.topic2 {
            return Err(ConfigError::DuplicateTopic);
        }
        Ok(())
    }

    /// Loggable one-line rendering with secrets masked.
    pub fn summary(&self) -> Summary<'_> {
        Summary(self)
    }

    /// Encodes as a JSON object into `buf`, returning the length written.
    pub fn to_json(&self, buf: &mut [u8]) -> Result<usize, ConfigError> {
        Ok(serde_json_core::to_slice(self, buf)?)
    }

    /// Decodes the object produced by [`Credentials::to_json`], unescaping
    /// string values.
    pub fn from_json(json: &[u8]) -> Result<Self, ConfigError> {
        // Every field fits in TOPIC_LEN once unescaped
        let mut unescaped = [0u8; TOPIC_LEN];
        let (creds, _) = serde_json_core::from_slice_escaped::<Self>(json, &mut unescaped)?;
        if creds.port == 0 {
            warn!("[CFG] JSON credentials carry port 0");
            return Err(ConfigError::InvalidPort);
        }
        Ok(creds)
    }
}

fn fill<const N: usize>(key: Key, value: &str) -> Result<String<N>, ConfigError> {
    String::try_from(value).map_err(|_| ConfigError::TooLong(key))
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    match value.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(ConfigError::InvalidPort),
        Ok(port) => Ok(port),
    }
}

struct Redacted;

impl fmt::Debug for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Credentials");
        for key in Key::ALL {
            match self.value(key) {
                _ if key.is_secret() => out.field(key.name(), &Redacted),
                Value::Text(text) => out.field(key.name(), &text),
                Value::Port(port) => out.field(key.name(), &port),
            };
        }
        out.finish()
    }
}

/// `KEY=value` pairs on one line. Text is quoted and escaped so a value
/// cannot break the line; secrets print as `***`.
pub struct Summary<'a>(&'a Credentials);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in Key::ALL.into_iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match self.0.value(key) {
                _ if key.is_secret() => write!(f, "{key}=***")?,
                Value::Text(text) => write!(f, "{key}={text:?}")?,
                Value::Port(port) => write!(f, "{key}={port}")?,
            }
        }
        Ok(())
    }
}
