//! Plain-text result files.
//!
//! A report is a title line, a rule of `=` and one result per line. Nothing
//! is written when there are no results or saving is switched off.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use selfcheck_common::config::Config;

const RULE_WIDTH: usize = 40;

pub const OPEN_PORTS_FILE: &str = "my_open_ports.txt";
pub const NETWORK_DEVICES_FILE: &str = "my_network_devices.txt";
pub const SERVICES_FILE: &str = "my_services.txt";
pub const WEB_SERVERS_FILE: &str = "my_web_servers.txt";

pub const OPEN_PORTS_TITLE: &str = "My Open Ports";
pub const NETWORK_DEVICES_TITLE: &str = "My Network Devices";
pub const SERVICES_TITLE: &str = "My Services";

/// `<title> - <local time>`.
pub fn timestamped(title: &str) -> String {
    format!("{} - {}", title, Local::now().format("%Y-%m-%d %H:%M:%S"))
}

pub fn render(title: &str, lines: &[String]) -> String {
    let mut out = String::with_capacity(title.len() + RULE_WIDTH + lines.len() * 32);
    out.push_str(title);
    out.push('\n');
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push('\n');
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Writes the report into the configured output directory.
///
/// Returns the path written, or `None` when there was nothing to write.
pub fn save(cfg: &Config, file_name: &str, title: &str, lines: &[String]) -> anyhow::Result<Option<PathBuf>> {
    if !cfg.save || lines.is_empty() {
        return Ok(None);
    }

    fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("creating {}", cfg.output_dir.display()))?;

    let path = cfg.output_dir.join(file_name);
    fs::write(&path, render(title, lines)).with_context(|| format!("writing {}", path.display()))?;
    Ok(Some(path))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
