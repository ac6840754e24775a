//! Static port and keyword tables.
//!
//! These are the defaults the CLI feeds into the engine. The engine itself
//! takes targets and rules as plain arguments, so none of this is hard-wired.

use crate::signature::SignatureRule;

/// Ports checked on this computer.
pub const COMMON_PORTS: &[(u16, &str)] = &[
    (21, "FTP"),
    (22, "SSH"),
    (23, "Telnet"),
    (25, "SMTP"),
    (80, "HTTP"),
    (443, "HTTPS"),
    (445, "SMB"),
    (1433, "MSSQL"),
    (3306, "MySQL"),
    (3389, "RDP"),
    (5432, "PostgreSQL"),
    (5900, "VNC"),
    (8080, "HTTP alt"),
    (8443, "HTTPS alt"),
];

/// Ports a local web service usually sits on.
pub const WEB_PORTS: &[(u16, &str)] = &[
    (80, "HTTP"),
    (443, "HTTPS"),
    (8080, "HTTP alternate"),
    (3000, "Node.js dev server"),
    (5000, "Flask dev server"),
    (8000, "Python http.server"),
    (8443, "HTTPS alternate"),
    (9000, "PHP"),
    (8888, "Jupyter Notebook"),
];

/// Service groups for the service check.
pub const SERVICE_GROUPS: &[(&str, &[u16])] = &[
    ("Web server", &[80, 443, 8080, 3000, 5000]),
    ("Database", &[3306, 5432, 27017, 6379]),
];

/// Ports answered with a plaintext HTTP request.
pub const HTTP_PORTS: &[u16] = &[80, 8080, 3000, 5000, 8000, 8443, 9000, 8888];

/// Ports whose server speaks first (FTP, SSH, SMTP).
pub const GREETING_PORTS: &[u16] = &[21, 22, 25];

#[cfg(windows)]
const PROCESS_KEYWORDS: &[&str] = &["apache", "nginx", "mysql", "postgres", "mongo", "redis"];
#[cfg(not(windows))]
const PROCESS_KEYWORDS: &[&str] = &["apache", "nginx", "mysql", "postgres", "mongod", "redis", "ssh"];

/// Handshake performed after a successful connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    /// Send a minimal HTTP request and read the response head.
    Http,
    /// Read whatever the server says first.
    Greeting,
    /// Connect only.
    Connect,
}

pub fn probe_kind(port: u16) -> ProbeKind {
    if HTTP_PORTS.contains(&port) {
        ProbeKind::Http
    } else if GREETING_PORTS.contains(&port) {
        ProbeKind::Greeting
    } else {
        ProbeKind::Connect
    }
}

/// Keyword rules for the process listing, one rule per keyword, in table order.
pub fn process_rules() -> Vec<SignatureRule> {
    PROCESS_KEYWORDS
        .iter()
        .map(|keyword| SignatureRule::keyword(keyword))
        .collect()
}

/// Rules for naming the software behind an HTTP banner.
pub fn web_server_rules() -> Vec<SignatureRule> {
    vec![
        SignatureRule::new("Apache", ["apache"]),
        SignatureRule::new("nginx", ["nginx"]),
        SignatureRule::new("IIS", ["iis"]),
    ]
}

pub fn common_port_label(port: u16) -> Option<&'static str> {
    lookup(COMMON_PORTS, port)
}

pub fn web_port_label(port: u16) -> Option<&'static str> {
    lookup(WEB_PORTS, port)
}

pub fn service_group_label(port: u16) -> Option<&'static str> {
    SERVICE_GROUPS
        .iter()
        .find(|(_, ports)| ports.contains(&port))
        .map(|(label, _)| *label)
}

fn lookup(table: &[(u16, &'static str)], port: u16) -> Option<&'static str> {
    table.iter().find(|(p, _)| *p == port).map(|(_, label)| *label)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
