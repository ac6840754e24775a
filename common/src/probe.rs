//! # Probe Outcomes
//!
//! [`ProbeResult`] is produced exactly once per probe attempt and never mutated
//! afterwards. Its constructors keep the fingerprint tied to reachability: an
//! unreachable target never carries one.

use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::network::target::Target;

/// Fingerprint used when a responder sent data nothing could be made of,
/// or when a reverse lookup found no name.
pub const UNKNOWN: &str = "unknown";

/// Fingerprint used when a port accepted the connection but sent nothing back.
pub const NO_BANNER: &str = "running (no banner)";

/// Per-target failure classes. None of them is fatal to a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ProbeError {
    #[error("timed out")]
    Timeout,
    #[error("connection refused")]
    ConnectionRefused,
    #[error("unreachable")]
    Unreachable,
    #[error("name resolution failed")]
    DnsFailure,
    #[error("internal probe failure")]
    Internal,
}

impl ProbeError {
    /// Classifies a socket error. Anything that is neither a refusal nor a
    /// timeout counts as unreachable.
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => ProbeError::ConnectionRefused,
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => ProbeError::Timeout,
            _ => ProbeError::Unreachable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    target: Target,
    reachable: bool,
    latency: Duration,
    fingerprint: Option<String>,
    error: Option<ProbeError>,
}

impl ProbeResult {
    pub fn reachable(target: Target, latency: Duration, fingerprint: Option<String>) -> Self {
        Self {
            target,
            reachable: true,
            latency,
            fingerprint,
            error: None,
        }
    }

    pub fn unreachable(target: Target, latency: Duration, error: ProbeError) -> Self {
        Self {
            target,
            reachable: false,
            latency,
            fingerprint: None,
            error: Some(error),
        }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn is_reachable(&self) -> bool {
        self.reachable
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    pub fn error(&self) -> Option<ProbeError> {
        self.error
    }

    /// Compares classification only, ignoring latency.
    pub fn same_outcome(&self, other: &ProbeResult) -> bool {
        self.target == other.target
            && self.reachable == other.reachable
            && self.fingerprint == other.fingerprint
            && self.error == other.error
    }
}

/// Where a service was spotted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingOrigin {
    /// A port probe got an answer.
    Port(Target),
    /// A process listing line matched a signature rule.
    Process,
}

/// A labelled service detection, used by the service check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceFinding {
    pub label: String,
    pub origin: FindingOrigin,
}

impl ServiceFinding {
    pub fn port(label: impl Into<String>, target: Target) -> Self {
        Self {
            label: label.into(),
            origin: FindingOrigin::Port(target),
        }
    }

    pub fn process(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            origin: FindingOrigin::Process,
        }
    }
}

impl fmt::Display for ServiceFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.origin {
            FindingOrigin::Port(target) => match target.port_number() {
                Some(port) => write!(f, "{} on port {port}", self.label),
                None => write!(f, "{} on {target}", self.label),
            },
            FindingOrigin::Process => write!(f, "Process: {}", self.label),
        }
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
