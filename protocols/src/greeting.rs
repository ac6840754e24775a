//! Servers that speak first (SSH, FTP, SMTP) identify themselves in their
//! opening line.

/// Longest greeting line kept as a fingerprint.
pub const MAX_GREETING_LEN: usize = 128;

/// First non-empty line of `bytes`, trimmed and capped at [`MAX_GREETING_LEN`] characters.
pub fn first_line(bytes: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(bytes);
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.chars().take(MAX_GREETING_LEN).collect())
}

pub fn has_line_end(bytes: &[u8]) -> bool {
    bytes.contains(&b'\n')
}
