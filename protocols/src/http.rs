//! The minimal HTTP exchange used to fingerprint web servers.
//!
//! This is not an HTTP client. It sends one fixed request and only looks at
//! the response head.

/// Request sent to HTTP-capable ports.
pub const PROBE_REQUEST: &[u8] = b"GET / HTTP/1.0\r\nHost: localhost\r\n\r\n";

/// Upper bound on how much of a response is read.
pub const MAX_RESPONSE_BYTES: usize = 1024;

const SERVER_PREFIX: &str = "server:";

/// Value of `line` if it is a non-empty `Server:` header, matched
/// case-insensitively.
pub fn server_value(line: &str) -> Option<String> {
    let trimmed = line.trim_start();
    let prefix = trimmed.get(..SERVER_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(SERVER_PREFIX) {
        return None;
    }
    let value = trimmed[SERVER_PREFIX.len()..].trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// True once the buffer holds the blank line ending the response head.
pub fn is_head_complete(bytes: &[u8]) -> bool {
    bytes.windows(4).any(|w| w == b"\r\n\r\n") || bytes.windows(2).any(|w| w == b"\n\n")
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

    #[test]
    fn server_value_is_found_case_insensitively() {
        assert_eq!(server_value("SERVER:   nginx/1.24.0 \r"), Some("nginx/1.24.0".to_string()));
        assert_eq!(server_value("  Server: Caddy"), Some("Caddy".to_string()));
    }

    #[test]
    fn other_or_empty_lines_yield_none() {
        assert_eq!(server_value("HTTP/1.0 404 Not Found"), None);
        assert_eq!(server_value("Server:"), None);
        assert_eq!(server_value("X-Served-By: apache"), None);
        assert_eq!(server_value(""), None);
    }

    #[test]
    fn head_completion_is_detected() {
        assert!(is_head_complete(b"HTTP/1.0 200 OK\r\nServer: x\r\n\r\nbody"));
        assert!(is_head_complete(b"HTTP/1.0 200 OK\n\n"));
        assert!(!is_head_complete(b"HTTP/1.0 200 OK\r\nServer: x\r\n"));
    }
}
