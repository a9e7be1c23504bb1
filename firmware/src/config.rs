//! Firmware configuration.
//!
//! Compile-time constants that fix buffer sizes, layout and defaults, plus
//! the runtime [`DeviceConfig`] read from the provisioned `/config.lua`.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use rosebox_network::{Ipv4Address, Network, WifiStatus};
use rosebox_storage::AssetStore;

/// Lines kept in the terminal output buffer.
pub const TERMINAL_MAX_LINES: usize = 10;

/// Terminal text row height in pixels.
pub const TERMINAL_LINE_HEIGHT: i32 = 10;

/// Port used by `connect` when none is given.
pub const DEFAULT_TELNET_PORT: u16 = rosebox_network::DEFAULT_PORT;

/// Host used by `connect` when none (or a malformed one) is given.
pub const DEFAULT_CONNECT_HOST: Ipv4Address = rosebox_network::DEFAULT_HOST;

/// Poll interval of the blocking key-wait helper.
pub const KEY_WAIT_POLL_MS: u32 = 10;

/// Maximum bytes drained from a transport per tick.
pub const TRANSPORT_READ_CHUNK: usize = 64;

/// Presence of this file means the device has been provisioned.
pub const SENTINEL_PATH: &str = "/config.lua";

/// Device configuration table.
pub const CONFIG_PATH: &str = SENTINEL_PATH;

/// Persisted display settings record.
pub const DISPLAY_SETTINGS_PATH: &str = "/display.bin";

/// Enable verbose logging by default in debug builds.
pub const DEBUG_ENABLED: bool = cfg!(debug_assertions);

// ── Device configuration ──

/// Configuration parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The file is not valid UTF-8.
    Encoding,
    /// The file is not a `return { ... }` table.
    NotATable,
    /// Unexpected token at the given byte offset.
    Syntax(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Encoding => write!(f, "config is not UTF-8"),
            ConfigError::NotATable => write!(f, "config must return a table"),
            ConfigError::Syntax(at) => write!(f, "config syntax error at byte {}", at),
        }
    }
}

/// Runtime device configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub screen_type: String,
    pub keyboard_type: String,
    /// Named GPIO assignments, in file order.
    pub gpio_pins: Vec<(String, u8)>,
    pub sd_cs_pin: Option<u8>,
    pub wifi_ssid: String,
    pub wifi_pass: String,
    pub debug_mode: bool,
    /// Default argument of the terminal's `connect` entry.
    pub terminal_host: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            screen_type: String::from("monochrome_spi"),
            keyboard_type: String::from("matrix_4x4"),
            gpio_pins: Vec::new(),
            sd_cs_pin: None,
            wifi_ssid: String::new(),
            wifi_pass: String::new(),
            debug_mode: DEBUG_ENABLED,
            terminal_host: alloc::format!("{}", DEFAULT_CONNECT_HOST),
        }
    }
}

impl DeviceConfig {
    /// Parse a `return { key = value, ... }` table.
    ///
    /// Keys not listed on [`DeviceConfig`] are ignored; keys that are absent
    /// keep their defaults.
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let mut lexer = Lexer::new(source);
        match lexer.next()? {
            Some(Token::Ident("return")) => {}
            _ => return Err(ConfigError::NotATable),
        }
        let table = match lexer.value()? {
            Value::Table(entries) => entries,
            _ => return Err(ConfigError::NotATable),
        };

        let mut config = Self::default();
        for (key, value) in table {
            match (key.as_str(), value) {
                ("screen_type", Value::Str(s)) => config.screen_type = s,
                ("keyboard_type", Value::Str(s)) => config.keyboard_type = s,
                ("wifi_ssid", Value::Str(s)) => config.wifi_ssid = s,
                ("wifi_pass", Value::Str(s)) => config.wifi_pass = s,
                ("terminal_host", Value::Str(s)) => config.terminal_host = s,
                ("debug_mode", Value::Bool(b)) => config.debug_mode = b,
                ("sd_cs_pin", Value::Int(n)) => config.sd_cs_pin = u8::try_from(n).ok(),
                ("gpio_pins", Value::Table(pins)) => {
                    config.gpio_pins = pins
                        .into_iter()
                        .filter_map(|(name, v)| match v {
                            Value::Int(n) => u8::try_from(n).ok().map(|pin| (name, pin)),
                            _ => None,
                        })
                        .collect();
                }
                (other, _) => {
                    log::debug!("[RoseBox/Config] ignoring key '{}'", other);
                }
            }
        }
        Ok(config)
    }

    /// Read `/config.lua`. Falls back to defaults when the file is missing
    /// or malformed.
    pub fn load(store: &dyn AssetStore) -> Self {
        let bytes = match store.read(CONFIG_PATH) {
            Ok(b) => b,
            Err(e) => {
                log::warn!("[RoseBox/Config] {}: {}, using defaults", CONFIG_PATH, e);
                return Self::default();
            }
        };
        let parsed = core::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Encoding)
            .and_then(Self::parse);
        match parsed {
            Ok(config) => config,
            Err(e) => {
                log::warn!("[RoseBox/Config] {}: {}, using defaults", CONFIG_PATH, e);
                Self::default()
            }
        }
    }

    /// Max log level for this configuration.
    pub fn log_level(&self) -> log::LevelFilter {
        if self.debug_mode {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }

    /// Start joining the configured WiFi network. Returns whether a join
    /// was requested.
    pub fn ensure_wifi(&self, network: &mut dyn Network) -> bool {
        if self.wifi_ssid.is_empty() {
            log::info!("[RoseBox/Config] no WiFi configured");
            return false;
        }
        if matches!(network.status(), WifiStatus::Connected | WifiStatus::Connecting) {
            return false;
        }
        log::info!("[RoseBox/Config] joining '{}'", self.wifi_ssid);
        network.join(&self.wifi_ssid, &self.wifi_pass);
        true
    }
}

// ── Table reader ──

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
    Table(Vec<(String, Value)>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Ident(&'a str),
    Str(&'a str),
    Int(i64),
    Open,
    Close,
    Assign,
    Comma,
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    peeked: Option<Token<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0, peeked: None }
    }

    fn skip_trivia(&mut self) {
        let bytes = self.src.as_bytes();
        loop {
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.src[self.pos..].starts_with("--") {
                while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
                    self.pos += 1;
                }
            } else {
                return;
            }
        }
    }

    fn peek(&mut self) -> Result<Option<Token<'a>>, ConfigError> {
        if self.peeked.is_none() {
            self.peeked = self.scan()?;
        }
        Ok(self.peeked)
    }

    fn next(&mut self) -> Result<Option<Token<'a>>, ConfigError> {
        match self.peeked.take() {
            Some(tok) => Ok(Some(tok)),
            None => self.scan(),
        }
    }

    fn scan(&mut self) -> Result<Option<Token<'a>>, ConfigError> {
        self.skip_trivia();
        let bytes = self.src.as_bytes();
        let start = self.pos;
        let Some(&b) = bytes.get(start) else {
            return Ok(None);
        };

        let tok = match b {
            b'{' => {
                self.pos += 1;
                Token::Open
            }
            b'}' => {
                self.pos += 1;
                Token::Close
            }
            b'=' => {
                self.pos += 1;
                Token::Assign
            }
            b',' | b';' => {
                self.pos += 1;
                Token::Comma
            }
            b'"' | b'\'' => {
                let end = self.src[start + 1..]
                    .find(b as char)
                    .ok_or(ConfigError::Syntax(start))?;
                self.pos = start + 1 + end + 1;
                Token::Str(&self.src[start + 1..start + 1 + end])
            }
            b'-' | b'0'..=b'9' => {
                self.pos += 1;
                while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
                    self.pos += 1;
                }
                let n = self.src[start..self.pos]
                    .parse::<i64>()
                    .map_err(|_| ConfigError::Syntax(start))?;
                Token::Int(n)
            }
            b if b.is_ascii_alphabetic() || b == b'_' => {
                while self.pos < bytes.len()
                    && (bytes[self.pos].is_ascii_alphanumeric() || bytes[self.pos] == b'_')
                {
                    self.pos += 1;
                }
                Token::Ident(&self.src[start..self.pos])
            }
            _ => return Err(ConfigError::Syntax(start)),
        };
        Ok(Some(tok))
    }

    fn value(&mut self) -> Result<Value, ConfigError> {
        let at = self.pos;
        match self.next()? {
            Some(Token::Str(s)) => Ok(Value::Str(String::from(s))),
            Some(Token::Int(n)) => Ok(Value::Int(n)),
            Some(Token::Ident("true")) => Ok(Value::Bool(true)),
            Some(Token::Ident("false")) => Ok(Value::Bool(false)),
            Some(Token::Open) => self.table().map(Value::Table),
            _ => Err(ConfigError::Syntax(at)),
        }
    }

    /// Entries after the opening brace. Positional entries are keyed by
    /// their 1-based index.
    fn table(&mut self) -> Result<Vec<(String, Value)>, ConfigError> {
        let mut entries = Vec::new();
        let mut index = 1;
        loop {
            let at = self.pos;
            match self.peek()? {
                Some(Token::Close) => {
                    self.next()?;
                    return Ok(entries);
                }
                Some(Token::Comma) => {
                    self.next()?;
                }
                Some(Token::Ident(name)) if !matches!(name, "true" | "false") => {
                    self.next()?;
                    if self.next()? != Some(Token::Assign) {
                        return Err(ConfigError::Syntax(at));
                    }
                    let v = self.value()?;
                    entries.push((String::from(name), v));
                }
                Some(_) => {
                    let v = self.value()?;
                    entries.push((alloc::format!("{}", index), v));
                    index += 1;
                }
                None => return Err(ConfigError::Syntax(at)),
            }
        }
    }
}
