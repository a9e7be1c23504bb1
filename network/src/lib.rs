//! RoseBox Network Contract
//!
//! The WiFi/TCP stack runs in the board support package. This crate defines
//! the narrow surface the firmware consumes from it:
//!
//! - [`Network`]: join a WiFi network, report status, open TCP connections
//! - [`Connection`]: a byte-stream session polled once per tick
//! - `endpoint`: `host [port]` argument parsing with device defaults
//!
//! Closing a connection is synchronous from the caller's point of view; the
//! stack finishes any teardown handshake on its own.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod endpoint;

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

pub use endpoint::{Endpoint, DEFAULT_HOST, DEFAULT_PORT};
pub use smoltcp::wire::Ipv4Address;

/// Network error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkError {
    /// Not associated with a WiFi network.
    NotJoined,
    /// Connection refused by the peer.
    ConnectionRefused,
    /// Connection attempt timed out.
    TimedOut,
    /// Connection reset by the peer.
    ConnectionReset,
    /// Socket not connected.
    NotConnected,
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NetworkError::NotJoined => "not joined to a network",
            NetworkError::ConnectionRefused => "connection refused",
            NetworkError::TimedOut => "timed out",
            NetworkError::ConnectionReset => "connection reset",
            NetworkError::NotConnected => "not connected",
        };
        f.write_str(s)
    }
}

/// WiFi association state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiStatus {
    Idle,
    Connecting,
    Connected,
    Disconnected,
    Failed,
}

impl WifiStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WifiStatus::Idle => "idle",
            WifiStatus::Connecting => "connecting",
            WifiStatus::Connected => "connected",
            WifiStatus::Disconnected => "disconnected",
            WifiStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for WifiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An open TCP byte stream.
pub trait Connection {
    /// Whether the peer is still connected.
    fn is_alive(&self) -> bool;

    /// Bytes buffered and ready to read without blocking.
    fn available(&self) -> usize;

    /// Read at most `max` buffered bytes. Never blocks.
    fn read_up_to(&mut self, max: usize) -> Result<Vec<u8>, NetworkError>;

    /// Queue bytes for transmission.
    fn send(&mut self, data: &[u8]) -> Result<(), NetworkError>;

    /// Close the stream. Idempotent.
    fn close(&mut self);
}

/// The board's WiFi/TCP stack.
pub trait Network {
    /// Start joining `ssid`. Completion is observed through [`Network::status`].
    fn join(&mut self, ssid: &str, password: &str);

    fn status(&self) -> WifiStatus;

    /// Address leased on the WiFi interface, if any.
    fn local_ip(&self) -> Option<Ipv4Address>;

    /// Open a TCP connection to `endpoint`.
    fn open(&mut self, endpoint: Endpoint) -> Result<Box<dyn Connection>, NetworkError>;
}
