use crate::format::ts::types::{STUFFING_BYTE, TS_PACKET_SIZE};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Environment variable prefix for [`CodecConfig::from_env`]
pub const ENV_PREFIX: &str = "TS_PMT_";

/// Settings for a [`PmtCodec`](crate::format::ts::PmtCodec).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Verify the CRC32 trailer on decode
    pub verify_crc: bool,
    /// Transport unit size packets are stuffed out to
    pub unit_size: usize,
    /// Fill byte used for stuffing
    pub stuffing_byte: u8,
    /// Level at which the logging observer reports sections
    pub event_level: log::Level,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            verify_crc: true,
            unit_size: TS_PACKET_SIZE,
            stuffing_byte: STUFFING_BYTE,
            event_level: log::Level::Debug,
        }
    }
}

impl CodecConfig {
    /// Same as [`CodecConfig::default`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether decode checks the CRC32 trailer
    pub fn with_verify_crc(mut self, verify_crc: bool) -> Self {
        self.verify_crc = verify_crc;
        self
    }

    /// Sets the transport unit size
    pub fn with_unit_size(mut self, unit_size: usize) -> Self {
        self.unit_size = unit_size;
        self
    }

    /// Sets the fill byte
    pub fn with_stuffing_byte(mut self, stuffing_byte: u8) -> Self {
        self.stuffing_byte = stuffing_byte;
        self
    }

    /// Sets the level used by the logging observer
    pub fn with_event_level(mut self, level: log::Level) -> Self {
        self.event_level = level;
        self
    }

    /// Defaults overridden by `TS_PMT_VERIFY_CRC`, `TS_PMT_UNIT_SIZE`,
    /// `TS_PMT_STUFFING_BYTE` and `TS_PMT_EVENT_LEVEL`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        for key in KEYS {
            if let Ok(value) = env::var(format!("{}{}", ENV_PREFIX, key.to_uppercase())) {
                config.set(key, &value);
            }
        }
        config
    }

    /// Defaults overridden by `key = value` lines from `path`. Keys are the
    /// lower-case variable names without the prefix; `#` starts a comment.
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Same as [`CodecConfig::from_file`] over in-memory text.
    pub fn parse(content: &str) -> Self {
        let mut config = Self::default();
        for line in content.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            if let Some((key, value)) = line.split_once('=') {
                let value = value.trim().trim_matches('"').trim_matches('\'');
                config.set(key.trim(), value);
            }
        }
        config
    }

    /// Applies one setting. Unknown keys and unparseable values keep the
    /// current value.
    pub fn set(&mut self, key: &str, value: &str) {
        match key {
            "verify_crc" => assign(&mut self.verify_crc, key, value),
            "unit_size" => assign(&mut self.unit_size, key, value),
            "stuffing_byte" => match parse_byte(value) {
                Some(b) => self.stuffing_byte = b,
                None => log::warn!("ignoring invalid {} value {:?}", key, value),
            },
            "event_level" => assign(&mut self.event_level, key, value),
            _ => log::warn!("ignoring unknown config key {:?}", key),
        }
    }
}

const KEYS: [&str; 4] = ["verify_crc", "unit_size", "stuffing_byte", "event_level"];

fn assign<T: FromStr>(slot: &mut T, key: &str, value: &str) {
    match value.parse() {
        Ok(v) => *slot = v,
        Err(_) => log::warn!("ignoring invalid {} value {:?}", key, value),
    }
}

fn parse_byte(value: &str) -> Option<u8> {
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}
