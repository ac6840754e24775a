//! # TCP Port Prober
//!
//! Connects to one port with a bounded timeout and, depending on the port,
//! runs a small handshake to name the software answering:
//!
//! * **HTTP ports** get a fixed `GET /` request; the first response line that
//!   is either a `Server:` header or mentions a known server names it.
//! * **Greeting ports** (FTP, SSH, SMTP) are read without sending anything;
//!   the first line the server sends is the fingerprint.
//! * Every other port is connect-only.
//!
//! Handshake failures never turn an open port into an error: they only
//! degrade the fingerprint to [`UNKNOWN`] or [`NO_BANNER`].

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use selfcheck_common::catalog::{self, ProbeKind};
use selfcheck_common::network::target::Target;
use selfcheck_common::probe::{NO_BANNER, ProbeError, ProbeResult, UNKNOWN};
use selfcheck_common::signature::SignatureRule;
use selfcheck_protocols::{greeting, http};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use crate::scanner::Prober;
use crate::signature;

/// Time allowed for the handshake once connected, capped by the probe budget.
pub const DEFAULT_BANNER_TIMEOUT: Duration = Duration::from_millis(800);

const READ_CHUNK: usize = 512;

#[derive(Debug, Clone)]
pub struct TcpProber {
    banner_timeout: Duration,
    kinds: HashMap<u16, ProbeKind>,
    server_rules: Vec<SignatureRule>,
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new()
    }
}

impl TcpProber {
    /// A prober using the catalog's port registry and web server rules.
    pub fn new() -> Self {
        let kinds = catalog::HTTP_PORTS
            .iter()
            .chain(catalog::GREETING_PORTS)
            .map(|&port| (port, catalog::probe_kind(port)))
            .collect();

        Self {
            banner_timeout: DEFAULT_BANNER_TIMEOUT,
            kinds,
            server_rules: catalog::web_server_rules(),
        }
    }

    /// A prober that only checks whether ports accept connections.
    pub fn connect_only() -> Self {
        Self {
            kinds: HashMap::new(),
            ..Self::new()
        }
    }

    pub fn with_kind(mut self, port: u16, kind: ProbeKind) -> Self {
        self.kinds.insert(port, kind);
        self
    }

    pub fn with_banner_timeout(mut self, banner_timeout: Duration) -> Self {
        self.banner_timeout = banner_timeout;
        self
    }

    pub fn with_server_rules(mut self, rules: Vec<SignatureRule>) -> Self {
        self.server_rules = rules;
        self
    }

    pub fn kind_for(&self, port: u16) -> ProbeKind {
        self.kinds.get(&port).copied().unwrap_or(ProbeKind::Connect)
    }

    /// Probes `addr:port`, spending at most `budget` in total.
    ///
    /// The reported latency is the connect time; the handshake is not counted.
    pub async fn probe_port(&self, addr: IpAddr, port: u16, budget: Duration) -> ProbeResult {
        let target = Target::port(addr, port);
        let started = Instant::now();
        let deadline = started + budget;

        let connect = TcpStream::connect(SocketAddr::new(addr, port));
        let mut stream = match time::timeout_at(deadline, connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(err)) => {
                debug!(probe = %target, error = %err, "connect failed");
                return ProbeResult::unreachable(target, started.elapsed(), ProbeError::from_io(&err));
            }
            Err(_elapsed) => {
                return ProbeResult::unreachable(target, started.elapsed(), ProbeError::Timeout);
            }
        };
        let latency = started.elapsed();

        let banner_deadline = (Instant::now() + self.banner_timeout).min(deadline);
        let fingerprint = match self.kind_for(port) {
            ProbeKind::Http => Some(self.http_fingerprint(&mut stream, banner_deadline).await),
            ProbeKind::Greeting => Some(greeting_fingerprint(&mut stream, banner_deadline).await),
            ProbeKind::Connect => None,
        };

        ProbeResult::reachable(target, latency, fingerprint)
    }

    async fn http_fingerprint(&self, stream: &mut TcpStream, deadline: Instant) -> String {
        match time::timeout_at(deadline, stream.write_all(http::PROBE_REQUEST)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                debug!(error = %err, "HTTP request write failed");
                return NO_BANNER.to_string();
            }
            Err(_elapsed) => return NO_BANNER.to_string(),
        }

        let reply = read_until(stream, deadline, http::is_head_complete).await;
        if reply.is_silent() {
            return NO_BANNER.to_string();
        }
        fingerprint_http_response(&reply.bytes, &self.server_rules)
    }
}

/// Names the server behind an HTTP response.
///
/// Lines are checked in order. The first one that is a `Server:` header or
/// mentions a known server decides; if none does the server is [`UNKNOWN`].
pub fn fingerprint_http_response(response: &[u8], rules: &[SignatureRule]) -> String {
    String::from_utf8_lossy(response)
        .lines()
        .find_map(|line| {
            http::server_value(line)
                .or_else(|| signature::match_text(line, rules).map(str::to_string))
        })
        .unwrap_or_else(|| UNKNOWN.to_string())
}

async fn greeting_fingerprint(stream: &mut TcpStream, deadline: Instant) -> String {
    let reply = read_until(stream, deadline, greeting::has_line_end).await;
    match greeting::first_line(&reply.bytes) {
        Some(line) => line,
        None if reply.is_silent() => NO_BANNER.to_string(),
        None => UNKNOWN.to_string(),
    }
}

/// What a banner read collected, and whether it ended without the peer
/// closing or the reply completing.
struct Reply {
    bytes: Vec<u8>,
    stalled: bool,
}

impl Reply {
    /// Nothing arrived before a timeout or socket error.
    fn is_silent(&self) -> bool {
        self.stalled && self.bytes.is_empty()
    }
}

/// Reads until `done` holds, the peer closes, the buffer is full or `deadline`
/// passes. Whatever arrived is kept.
async fn read_until(stream: &mut TcpStream, deadline: Instant, done: fn(&[u8]) -> bool) -> Reply {
    let mut bytes: Vec<u8> = Vec::with_capacity(http::MAX_RESPONSE_BYTES);
    let mut chunk = [0u8; READ_CHUNK];

    while bytes.len() < http::MAX_RESPONSE_BYTES {
        let room = (http::MAX_RESPONSE_BYTES - bytes.len()).min(READ_CHUNK);
        match time::timeout_at(deadline, stream.read(&mut chunk[..room])).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => {
                bytes.extend_from_slice(&chunk[..n]);
                if done(&bytes) {
                    break;
                }
            }
            Ok(Err(err)) => {
                debug!(error = %err, "banner read failed");
                return Reply { bytes, stalled: true };
            }
            Err(_elapsed) => return Reply { bytes, stalled: true },
        }
    }

    Reply { bytes, stalled: false }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, target: Target, timeout: Duration) -> ProbeResult {
        match target {
            Target::Port { addr, port } => self.probe_port(addr, port, timeout).await,
            Target::Host { .. } => {
                warn!("TCP probe needs a port, got bare host {target}");
                ProbeResult::unreachable(target, Duration::ZERO, ProbeError::Internal)
            }
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
    const BUDGET: Duration = Duration::from_secs(2);

    /// Accepts one connection, optionally waits for a request, then writes `reply`.
    async fn stub_server(reply: &'static [u8], wait_for_request: bool) -> u16 {
        let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            if wait_for_request {
                let mut buf = [0u8; 256];
                let _ = socket.read(&mut buf).await;
            }
            let _ = socket.write_all(reply).await;
            // Hold the connection open so the prober has to stop on its own.
            time::sleep(Duration::from_secs(5)).await;
        });
        port
    }

    /// Accepts one connection, reads the request and hangs up without replying.
    async fn hang_up_server() -> u16 {
        let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 256];
            let _ = socket.read(&mut buf).await;
        });
        port
    }

    async fn closed_port() -> u16 {
        let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn http_server_header_becomes_the_fingerprint() {
        let port = stub_server(b"HTTP/1.0 200 OK\r\nServer: nginx\r\n\r\n", true).await;
        let prober = TcpProber::new().with_kind(port, ProbeKind::Http);

        let result = prober.probe_port(LOCALHOST, port, BUDGET).await;

        assert!(result.is_reachable());
        assert_eq!(result.fingerprint(), Some("nginx"));
        assert_eq!(result.error(), None);
    }

    #[tokio::test]
    async fn known_server_in_body_is_named_without_header() {
        let port = stub_server(b"HTTP/1.0 200 OK\r\n\r\n<h1>It works! Apache default page</h1>", true).await;
        let prober = TcpProber::new()
            .with_kind(port, ProbeKind::Http)
            .with_banner_timeout(Duration::from_millis(300));

        let result = prober.probe_port(LOCALHOST, port, BUDGET).await;

        assert_eq!(result.fingerprint(), Some("Apache"));
    }

    #[tokio::test]
    async fn unrecognised_response_is_unknown() {
        let port = stub_server(b"HTTP/1.0 200 OK\r\nX-Powered-By: magic\r\n\r\n", true).await;
        let prober = TcpProber::new().with_kind(port, ProbeKind::Http);

        let result = prober.probe_port(LOCALHOST, port, BUDGET).await;

        assert!(result.is_reachable());
        assert_eq!(result.fingerprint(), Some(UNKNOWN));
    }

    #[tokio::test]
    async fn silent_http_port_is_running_without_banner() {
        let port = stub_server(b"", true).await;
        let prober = TcpProber::new()
            .with_kind(port, ProbeKind::Http)
            .with_banner_timeout(Duration::from_millis(200));
        let started = std::time::Instant::now();

        let result = prober.probe_port(LOCALHOST, port, BUDGET).await;

        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(result.is_reachable());
        assert_eq!(result.fingerprint(), Some(NO_BANNER));
    }

    #[tokio::test]
    async fn http_port_closing_without_reply_is_unknown() {
        let port = hang_up_server().await;
        let prober = TcpProber::new()
            .with_kind(port, ProbeKind::Http)
            .with_banner_timeout(Duration::from_secs(1));

        let result = prober.probe_port(LOCALHOST, port, BUDGET).await;

        assert!(result.is_reachable());
        assert_eq!(result.fingerprint(), Some(UNKNOWN));
    }

    #[tokio::test]
    async fn greeting_line_becomes_the_fingerprint() {
        let port = stub_server(b"SSH-2.0-OpenSSH_9.6\r\n", false).await;
        let prober = TcpProber::new().with_kind(port, ProbeKind::Greeting);

        let result = prober.probe_port(LOCALHOST, port, BUDGET).await;

        assert_eq!(result.fingerprint(), Some("SSH-2.0-OpenSSH_9.6"));
    }

    #[tokio::test]
    async fn connect_only_ports_have_no_fingerprint() {
        let port = stub_server(b"ignored", false).await;

        let result = TcpProber::connect_only().probe_port(LOCALHOST, port, BUDGET).await;

        assert!(result.is_reachable());
        assert_eq!(result.fingerprint(), None);
    }

    #[tokio::test]
    async fn closed_port_is_unreachable_without_fingerprint() {
        let port = closed_port().await;

        let result = TcpProber::new().probe_port(LOCALHOST, port, BUDGET).await;

        assert!(!result.is_reachable());
        assert_eq!(result.fingerprint(), None);
        assert!(matches!(
            result.error(),
            Some(ProbeError::ConnectionRefused | ProbeError::Timeout)
        ));
    }

    #[tokio::test]
    async fn bare_host_targets_are_rejected() {
        let result = TcpProber::new().probe(Target::host(LOCALHOST), BUDGET).await;
        assert_eq!(result.error(), Some(ProbeError::Internal));
    }

    #[test]
    fn earliest_deciding_line_names_the_server() {
        let rules = catalog::web_server_rules();

        let keyword_first = b"HTTP/1.1 200 OK\r\nVia: 1.1 nginx-edge\r\nServer: Apache\r\n\r\n";
        assert_eq!(fingerprint_http_response(keyword_first, &rules), "nginx");

        let header_first = b"HTTP/1.1 200 OK\r\nServer: Caddy\r\n\r\npowered by nginx";
        assert_eq!(fingerprint_http_response(header_first, &rules), "Caddy");

        assert_eq!(fingerprint_http_response(b"", &rules), UNKNOWN);
    }

    #[test]
    fn default_registry_follows_the_catalog() {
        let prober = TcpProber::new();
        assert_eq!(prober.kind_for(8080), ProbeKind::Http);
        assert_eq!(prober.kind_for(22), ProbeKind::Greeting);
        assert_eq!(prober.kind_for(3306), ProbeKind::Connect);
        assert_eq!(TcpProber::connect_only().kind_for(80), ProbeKind::Connect);
    }

    #[tokio::test]
    #[ignore]
    async fn probe_port_should_find_known_open_port() {
        let addr: IpAddr = IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1));
        let result = TcpProber::connect_only().probe_port(addr, 443, BUDGET).await;
        assert!(result.is_reachable());
    }
}
