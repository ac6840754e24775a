use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Instant;

use colored::*;
use selfcheck_common::catalog::{self, COMMON_PORTS};
use selfcheck_common::config::{Config, ScanConfig};
use selfcheck_common::network::interface;
use selfcheck_common::network::target::Target;
use selfcheck_common::probe::ProbeResult;
use selfcheck_common::{success, warn};
use selfcheck_core::aggregate;
use selfcheck_core::network::tcp::TcpProber;

use crate::commands::{save_report, scan_with_progress};
use crate::mprint;
use crate::report;
use crate::terminal::{colors, format, print};

const KEY_WIDTH: usize = 8;

/// Checks the common port list on this computer.
pub async fn me(cfg: &Config) -> anyhow::Result<()> {
    let loopback = IpAddr::V4(Ipv4Addr::LOCALHOST);
    let lan = interface::local_ipv4();

    print::header("this computer", cfg.quiet);
    if cfg.quiet < 2 {
        print::aligned_line("Loopback", KEY_WIDTH, loopback.to_string().color(colors::IPV4_ADDR));
        print::aligned_line("LAN", KEY_WIDTH, lan.to_string().color(colors::IPV4_ADDR));
        mprint!();
    }

    let scan_cfg = cfg.scan_config(ScanConfig::ports())?;
    let targets: Vec<Target> = COMMON_PORTS
        .iter()
        .map(|&(port, _)| Target::port(loopback, port))
        .collect();

    let start_time = Instant::now();
    let results = scan_with_progress("Checking common ports", &targets, Arc::new(TcpProber::new()), &scan_cfg).await;
    let results = aggregate::aggregate(results);
    let open: Vec<&ProbeResult> = aggregate::reachable_only(&results);

    if open.is_empty() {
        print::header("no open ports", cfg.quiet);
        print::no_results(cfg.quiet);
        success!("None of the {} common ports are open", targets.len());
        return Ok(());
    }

    print::header("open ports", cfg.quiet);
    if cfg.quiet < 2 {
        for result in &open {
            print::print_status(port_line(result));
        }
    }

    warn!(
        "{} open ports found in {:.2}s. Close the ones you do not use.",
        open.len(),
        start_time.elapsed().as_secs_f64()
    );

    let lines: Vec<String> = open.iter().map(|r| report_line(r)).collect();
    let title = report::timestamped(report::OPEN_PORTS_TITLE);
    save_report(cfg, report::OPEN_PORTS_FILE, &title, &lines)
}

fn port_line(result: &ProbeResult) -> String {
    let port = result.target().port_number().unwrap_or_default();
    let label = catalog::common_port_label(port).unwrap_or("unknown");
    let mut line = format!(
        "Port {} ({}) {} {}",
        port.to_string().color(colors::ACCENT),
        label.color(colors::PRIMARY),
        format::status(result),
        format::latency_str(result.latency()).color(colors::SEPARATOR),
    );
    if let Some(fingerprint) = result.fingerprint() {
        line.push_str(&format!(" {}", fingerprint.color(colors::FINGERPRINT)));
    }
    line
}

/// `127.0.0.1:22 - SSH-2.0-OpenSSH_9.6`, falling back to the port label.
fn report_line(result: &ProbeResult) -> String {
    let target = result.target();
    let detail = result.fingerprint().unwrap_or_else(|| {
        target
            .port_number()
            .and_then(catalog::common_port_label)
            .unwrap_or("open")
    });
    format!("{target} - {detail}")
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
