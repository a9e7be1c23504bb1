//! Terminal command table.
//!
//! The device has no text entry, so the user cycles through a fixed list of
//! command lines and runs the selected one with a long press.

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use rosebox_network::Endpoint;

/// One-line summary printed by `help`.
pub const HELP: &str = "info|wifi|clear|connect IP [port]|disconnect|help|exit";

/// Command lines offered in local mode. `connect_target` is the argument
/// of the `connect` entry (`host [port]`).
pub fn command_list(connect_target: &str) -> Vec<String> {
    vec![
        String::from("info"),
        String::from("wifi"),
        String::from("clear"),
        format!("connect {}", connect_target),
        String::from("disconnect"),
        String::from("help"),
        String::from("exit"),
    ]
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Info,
    Wifi,
    Clear,
    Connect(Endpoint),
    Disconnect,
    Help,
    Exit,
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    /// Parse a command line. `None` for a blank line.
    pub fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim();
        let (name, args) = match line.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args),
            None => (line, ""),
        };
        let cmd = match name {
            "" => return None,
            "info" => Command::Info,
            "wifi" => Command::Wifi,
            "clear" => Command::Clear,
            "connect" => Command::Connect(Endpoint::parse_args(args)),
            "disconnect" => Command::Disconnect,
            "help" => Command::Help,
            "exit" => Command::Exit,
            other => Command::Unknown(other),
        };
        Some(cmd)
    }
}

// ── Output lines ──

pub fn info_line(free_memory: usize, uptime_millis: u64) -> String {
    format!("Heap: {} B  Uptime: {}s", free_memory, uptime_millis / 1000)
}

pub fn wifi_line(status: &str, ip: Option<&str>) -> String {
    format!("WiFi: {}  IP: {}", status, ip.unwrap_or("-"))
}

pub fn connected_line(endpoint: &Endpoint) -> String {
    format!("Connected to {}.", endpoint)
}

pub fn connect_failed_line(endpoint: &Endpoint) -> String {
    format!("Could not connect to {}.", endpoint)
}

pub const DISCONNECTED: &str = "Disconnected.";

pub fn unknown_line(name: &str) -> String {
    format!("Unknown: {}", name)
}
