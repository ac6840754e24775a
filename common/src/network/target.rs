//! # Probe Target Model
//!
//! Defines what a single probe is aimed at and which hosts a user may point
//! the scanner at.
//!
//! * A [`Target`] is the unit handed to a prober: a bare host (reachability)
//!   or a host and port (TCP connect).
//! * A [`ScanHost`] is the user-facing host argument. Only loopback and
//!   private home-network addresses are accepted.

use std::cmp::Ordering;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use thiserror::Error;

/// A distinct subject for one probe. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Reachability check against a host.
    Host { addr: IpAddr },
    /// TCP connect against a host and port.
    Port { addr: IpAddr, port: u16 },
}

impl Target {
    pub fn host(addr: IpAddr) -> Self {
        Target::Host { addr }
    }

    pub fn port(addr: IpAddr, port: u16) -> Self {
        Target::Port { addr, port }
    }

    pub fn addr(&self) -> IpAddr {
        match *self {
            Target::Host { addr } | Target::Port { addr, .. } => addr,
        }
    }

    pub fn port_number(&self) -> Option<u16> {
        match *self {
            Target::Host { .. } => None,
            Target::Port { port, .. } => Some(port),
        }
    }

    /// Presentation order: address first, then port. A bare host sorts before
    /// any of its ports.
    pub fn sort_key(&self) -> (IpAddr, Option<u16>) {
        (self.addr(), self.port_number())
    }
}

impl Ord for Target {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for Target {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Target::Host { addr } => write!(f, "{addr}"),
            Target::Port { addr, port } => write!(f, "{}", SocketAddr::new(addr, port)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("invalid host: {0}")]
    Invalid(String),
    #[error("{0} is not a local or private address")]
    NotPermitted(IpAddr),
}

/// A host the user asked to scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanHost {
    /// The `localhost` keyword. Resolved through the system resolver.
    Localhost,
    Addr(IpAddr),
}

impl Default for ScanHost {
    fn default() -> Self {
        ScanHost::Addr(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }
}

impl FromStr for ScanHost {
    type Err = TargetError;

    /// Parses a host argument.
    ///
    /// Supported formats:
    /// * **Keyword**: "localhost" (case-insensitive).
    /// * **Address**: loopback, `192.168.x.x` or `10.x.x.x`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if let Some(host) = parse_keyword(&trimmed.to_ascii_lowercase()) {
            return Ok(host);
        }

        let addr = trimmed
            .parse::<IpAddr>()
            .map_err(|_| TargetError::Invalid(trimmed.to_string()))?;

        if !is_permitted(&addr) {
            return Err(TargetError::NotPermitted(addr));
        }

        Ok(ScanHost::Addr(addr))
    }
}

impl fmt::Display for ScanHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanHost::Localhost => f.write_str("localhost"),
            ScanHost::Addr(addr) => write!(f, "{addr}"),
        }
    }
}

fn parse_keyword(s_lower: &str) -> Option<ScanHost> {
    match s_lower {
        "localhost" => Some(ScanHost::Localhost),
        _ => None,
    }
}

/// Whether the scanner may be pointed at `addr`: this machine or a home network.
pub fn is_permitted(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => {
            let [a, b, ..] = v4.octets();
            v4.is_loopback() || (a == 192 && b == 168) || a == 10
        }
        IpAddr::V6(v6) => v6.is_loopback(),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
