use std::net::IpAddr;
use std::sync::Arc;

use anyhow::Context;
use colored::*;
use selfcheck_common::catalog::{self, ProbeKind, WEB_PORTS};
use selfcheck_common::config::{Config, ScanConfig};
use selfcheck_common::network::target::{ScanHost, Target};
use selfcheck_common::probe::{ProbeResult, UNKNOWN};
use selfcheck_common::{info, success, warn};
use selfcheck_core::aggregate;
use selfcheck_core::network::resolver;
use selfcheck_core::network::tcp::TcpProber;

use crate::commands::{save_report, scan_with_progress};
use crate::mprint;
use crate::report;
use crate::terminal::{colors, print};

const HINTS: &[&str] = &[
    "Check what software started them",
    "Stop unused dev servers",
    "Secure or firewall exposed services",
];

/// Looks for web servers on `host`, which defaults to this computer.
pub async fn web(host: Option<ScanHost>, cfg: &Config) -> anyhow::Result<()> {
    let host = host.unwrap_or_default();
    let addr: IpAddr = resolver::resolve(&host)
        .await
        .with_context(|| format!("resolving {host}"))?;

    print::header(&format!("web services on {addr}"), cfg.quiet);
    info!("Local machine and private network only");

    let scan_cfg = cfg.scan_config(ScanConfig::web())?;
    let targets: Vec<Target> = WEB_PORTS
        .iter()
        .map(|&(port, _)| Target::port(addr, port))
        .collect();

    let results = scan_with_progress("Checking web ports", &targets, Arc::new(web_prober()), &scan_cfg).await;
    let results = aggregate::aggregate(results);
    let found: Vec<&ProbeResult> = aggregate::reachable_only(&results);

    if found.is_empty() {
        success!("No web servers detected (this is normal)");
        if cfg.quiet == 0 {
            print::print_status("To try it out, start a test server and run this again:");
            print::print_status(format!("  {}", "python -m http.server 8080".color(colors::ACCENT)));
        }
        return Ok(());
    }

    print::header(&format!("{} web services", found.len()), cfg.quiet);
    if cfg.quiet < 2 {
        for result in &found {
            print::print_status(console_line(result));
        }
        mprint!();
    }

    let lines: Vec<String> = found.iter().map(|r| report_line(r)).collect();
    save_report(cfg, report::WEB_SERVERS_FILE, &format!("Local Web Services on {addr}"), &lines)?;

    warn!("If you did not expect these services:");
    if cfg.quiet < 2 {
        for hint in HINTS {
            print::print_status(format!("  - {hint}"));
        }
    }
    Ok(())
}

/// Every web port gets the HTTP handshake, including the TLS ones.
fn web_prober() -> TcpProber {
    WEB_PORTS
        .iter()
        .fold(TcpProber::new(), |prober, &(port, _)| prober.with_kind(port, ProbeKind::Http))
}

fn port_parts(result: &ProbeResult) -> (u16, &'static str, &str) {
    let port = result.target().port_number().unwrap_or_default();
    let label = catalog::web_port_label(port).unwrap_or("web");
    (port, label, result.fingerprint().unwrap_or(UNKNOWN))
}

fn console_line(result: &ProbeResult) -> String {
    let (port, label, server) = port_parts(result);
    format!(
        "{} on port {}: {}",
        label.color(colors::PRIMARY),
        port.to_string().color(colors::ACCENT),
        server.color(colors::FINGERPRINT)
    )
}

/// `Port 8080 (HTTP alternate): nginx`.
fn report_line(result: &ProbeResult) -> String {
    let (port, label, server) = port_parts(result);
    format!("Port {port} ({label}): {server}")
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
    use std::time::Duration;

    #[test]
    fn report_lines_carry_port_label_and_server() {
        let result = ProbeResult::reachable(
            Target::port(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080),
            Duration::from_millis(2),
            Some("nginx".into()),
        );
        assert_eq!(report_line(&result), "Port 8080 (HTTP alternate): nginx");
    }

    #[test]
    fn every_web_port_is_probed_over_http() {
        let prober = web_prober();
        for &(port, _) in WEB_PORTS {
            assert_eq!(prober.kind_for(port), ProbeKind::Http, "port {port}");
        }
    }
}
