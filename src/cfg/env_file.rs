//! `KEY=value` rendering of [`Credentials`].
//!
//! Written files hold one line per key in [`Key::ALL`] order, text values
//! double-quoted with `\\`, `\"`, `\n` and `\r` escapes, the port bare.
//! The parser also accepts blank lines, `#` comments, an `export ` prefix,
//! single-quoted literals and bare values. Bare values are taken verbatim,
//! so a `#` inside them is not a comment.

use core::fmt::{self, Write};

use heapless::String;
use log::{info, warn};

use crate::cfg::credentials::{Credentials, Value, TOPIC_LEN};
use crate::cfg::error::ConfigError;
use crate::cfg::net_cfg::Key;

// Largest field capacity
const VALUE_LEN: usize = TOPIC_LEN;

pub fn write<W: Write>(creds: &Credentials, out: &mut W) -> fmt::Result {
    for key in Key::ALL {
        match creds.value(key) {
            Value::Text(text) => {
                write!(out, "{key}=\"")?;
                write_escaped(out, text)?;
                out.write_str("\"\n")?;
            }
            Value::Port(port) => writeln!(out, "{key}={port}")?,
        }
    }
    Ok(())
}

/// Renders into a fixed-capacity string.
pub fn render<const N: usize>(creds: &Credentials) -> Result<String<N>, ConfigError> {
    let mut out = String::new();
    write(creds, &mut out)?;
    Ok(out)
}

fn write_escaped<W: Write>(out: &mut W, text: &str) -> fmt::Result {
    for c in text.chars() {
        match c {
            '\\' => out.write_str("\\\\")?,
            '"' => out.write_str("\\\"")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            c => out.write_char(c)?,
        }
    }
    Ok(())
}

/// Parses an env file. All eight keys must be present; a later line for the
/// same key replaces the earlier one and unknown keys are skipped.
pub fn parse(text: &str) -> Result<Credentials, ConfigError> {
    let mut creds = Credentials::blank();
    let mut seen = [false; Key::COUNT];

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").map_or(line, str::trim_start);
        let (name, value) = line
            .split_once('=')
            .ok_or(ConfigError::MalformedLine(line_no))?;
        let name = name.trim();
        let Some(key) = Key::from_name(name) else {
            warn!("[CFG] line {line_no}: unknown key {name}, skipped");
            continue;
        };
        let value = unquote(key, value.trim(), line_no)?;
        creds.set(key, &value)?;
        seen[key as usize] = true;
    }

    if let Some(missing) = Key::ALL.into_iter().find(|key| !seen[*key as usize]) {
        return Err(ConfigError::MissingKey(missing));
    }
    info!("[CFG] env file parsed");
    Ok(creds)
}

fn unquote(key: Key, raw: &str, line_no: usize) -> Result<String<VALUE_LEN>, ConfigError> {
    let mut chars = raw.chars();
    match chars.next() {
        Some('"') => {
            let mut out = String::new();
            loop {
                let c = match chars.next() {
                    None => return Err(ConfigError::MalformedLine(line_no)),
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some('n') => '\n',
                        Some('r') => '\r',
                        _ => return Err(ConfigError::MalformedLine(line_no)),
                    },
                    Some(c) => c,
                };
                out.push(c).map_err(|_| ConfigError::TooLong(key))?;
            }
            if !chars.as_str().trim().is_empty() {
                return Err(ConfigError::MalformedLine(line_no));
            }
            Ok(out)
        }
        Some('\'') => {
            let (value, tail) = chars
                .as_str()
                .split_once('\'')
                .ok_or(ConfigError::MalformedLine(line_no))?;
            if !tail.trim().is_empty() {
                return Err(ConfigError::MalformedLine(line_no));
            }
            String::try_from(value).map_err(|_| ConfigError::TooLong(key))
        }
        _ => String::try_from(raw).map_err(|_| ConfigError::TooLong(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DEFAULTS_FILE: &str = "\
STA_SSID=\"My SSID\"
STA_PASS=\"My_AP_password\"
MQTT_BROKER=\"maqiatto.com\"
MQTT_BROKER_PORT=1883
MQTT_USERNAME=\"my_maqiatto_username\"
MQTT_KEY=\"MY_MAQIATTO_KEY\"
TOPIC1=\"my_maqiatto_username/umidade\"
TOPIC2=\"my_maqiatto_username/status\"
";

    #[test]
    fn writes_defaults_in_key_order() {
        let creds = parse(DEFAULTS_FILE).unwrap();
        let text = render::<512>(&creds).unwrap();
        assert_eq!(text.as_str(), DEFAULTS_FILE);
    }

    #[test]
    fn round_trip_preserves_every_value() {
        let mut creds = parse(DEFAULTS_FILE).unwrap();
        creds.set(Key::StaSsid, "  Café \"guest\" ").unwrap();
        creds.set(Key::StaPass, "a=b#c\\d\nline").unwrap();
        creds.set(Key::MqttBrokerPort, "8883").unwrap();

        let text = render::<1024>(&creds).unwrap();
        let parsed = parse(&text).unwrap();
        assert_eq!(parsed, creds);
        assert_eq!(parsed.ssid(), "  Café \"guest\" ");
        assert_eq!(parsed.port(), 8883);
    }

    #[test]
    fn parses_hand_written_file() {
        let text = "\
# node credentials
export STA_SSID = 'home net'
STA_PASS=plain#secret
MQTT_BROKER=maqiatto.com

MQTT_BROKER_PORT = 1883
MQTT_USERNAME=user
MQTT_KEY=\"k\"
TOPIC1=user/umidade
TOPIC2=user/status
LED_PIN=5
TOPIC2=user/estado
";
        let creds = parse(text).unwrap();
        assert_eq!(creds.ssid(), "home net");
        assert_eq!(creds.pass(), "plain#secret");
        assert_eq!(creds.topics(), ["user/umidade", "user/estado"]);
        assert_eq!(creds.validate(), Ok(()));
    }

    #[test]
    fn reports_missing_key() {
        let text = DEFAULTS_FILE.replace("MQTT_KEY=\"MY_MAQIATTO_KEY\"\n", "");
        assert_eq!(parse(&text), Err(ConfigError::MissingKey(Key::MqttKey)));
    }

    #[test]
    fn reports_malformed_lines() {
        let no_equals = DEFAULTS_FILE.replace("MQTT_BROKER=", "MQTT_BROKER ");
        assert_eq!(parse(&no_equals), Err(ConfigError::MalformedLine(3)));

        let unterminated = DEFAULTS_FILE.replace("\"My SSID\"", "\"My SSID");
        assert_eq!(parse(&unterminated), Err(ConfigError::MalformedLine(1)));

        let trailing = DEFAULTS_FILE.replace("\"My_AP_password\"", "\"My_AP_password\" x");
        assert_eq!(parse(&trailing), Err(ConfigError::MalformedLine(2)));

        let bad_escape = DEFAULTS_FILE.replace("\"maqiatto.com\"", "\"maqiatto\\t.com\"");
        assert_eq!(parse(&bad_escape), Err(ConfigError::MalformedLine(3)));
    }

    #[test]
    fn reports_bad_values() {
        let port = DEFAULTS_FILE.replace("=1883", "=70000");
        assert_eq!(parse(&port), Err(ConfigError::InvalidPort));

        let ssid = DEFAULTS_FILE.replace("My SSID", &"x".repeat(33));
        assert_eq!(parse(&ssid), Err(ConfigError::TooLong(Key::StaSsid)));
    }

    #[test]
    fn render_reports_small_buffer() {
        let creds = Credentials::from_constants().unwrap();
        assert_eq!(render::<32>(&creds), Err(ConfigError::BufferFull));
    }
}
