//! Remote endpoint parsing for `connect <host> [port]`.
//!
//! Malformed arguments never fail: a host token that is not a dotted IPv4
//! address falls back to [`DEFAULT_HOST`], and a missing, zero or
//! out-of-range port falls back to [`DEFAULT_PORT`].

use core::fmt;
use core::str::FromStr;

use smoltcp::wire::Ipv4Address;

/// Telnet.
pub const DEFAULT_PORT: u16 = 23;

/// Gateway address of the default RoseNet access point.
pub const DEFAULT_HOST: Ipv4Address = Ipv4Address::new(192, 168, 1, 1);

/// IPv4 address and TCP port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub host: Ipv4Address,
    pub port: u16,
}

impl Endpoint {
    pub const fn new(host: Ipv4Address, port: u16) -> Self {
        Self { host, port }
    }

    /// Parse the argument string of a `connect` command.
    ///
    /// The first whitespace-separated token is the host, the second the
    /// port. Anything after the port is ignored.
    pub fn parse_args(args: &str) -> Self {
        let mut tokens = args.split_whitespace();

        let host_token = tokens.next();
        let host = host_token.and_then(parse_ipv4).unwrap_or_else(|| {
            if let Some(t) = host_token {
                log::debug!("[RoseBox/Net] bad host '{}', using {}", t, DEFAULT_HOST);
            }
            DEFAULT_HOST
        });

        let port_token = tokens.next();
        let port = port_token
            .and_then(|t| t.parse::<u16>().ok())
            .filter(|p| *p != 0)
            .unwrap_or_else(|| {
                if let Some(t) = port_token {
                    log::debug!("[RoseBox/Net] bad port '{}', using {}", t, DEFAULT_PORT);
                }
                DEFAULT_PORT
            });

        Self { host, port }
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Accept only IPv4-shaped tokens (digits and dots).
fn parse_ipv4(token: &str) -> Option<Ipv4Address> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }
    Ipv4Address::from_str(token).ok()
}
