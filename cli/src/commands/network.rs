use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use colored::*;
use selfcheck_common::config::{Config, ScanConfig};
use selfcheck_common::network::interface;
use selfcheck_common::network::range::Ipv4Range;
use selfcheck_common::network::target::Target;
use selfcheck_common::probe::{ProbeResult, UNKNOWN};
use selfcheck_common::{info, success};
use selfcheck_core::aggregate;
use selfcheck_core::network::ping::PingProber;

use crate::commands::{save_report, scan_with_progress};
use crate::mprint;
use crate::report;
use crate::terminal::{colors, format, print};

/// Host numbers swept inside the local /24.
const SWEEP_FIRST: u8 = 1;
const SWEEP_LAST: u8 = 20;

/// Pings the first hosts of the local subnet.
pub async fn network(cfg: &Config) -> anyhow::Result<()> {
    let local = interface::local_ipv4();
    let range = Ipv4Range::sweep(local, SWEEP_FIRST, SWEEP_LAST);
    let targets: Vec<Target> = range
        .to_iter()
        .filter(|ip| *ip != IpAddr::V4(local))
        .map(Target::host)
        .collect();

    print::header("network sweep", cfg.quiet);
    info!("Checking {} to {} (this computer is {local})", range.start_addr, range.end_addr);

    let scan_cfg = cfg.scan_config(ScanConfig::hosts())?;
    let start_time = Instant::now();
    let results = scan_with_progress(
        "Looking for devices",
        &targets,
        Arc::new(PingProber::new(!cfg.no_dns)),
        &scan_cfg,
    )
    .await;
    let results = aggregate::aggregate(results);
    let hosts: Vec<&ProbeResult> = aggregate::reachable_only(&results);

    if hosts.is_empty() {
        print::header("zero devices found", cfg.quiet);
        print::no_results(cfg.quiet);
        return Ok(());
    }

    print::header("devices", cfg.quiet);
    if cfg.quiet < 2 {
        print_hosts(&hosts);
    }
    print_summary(hosts.len(), start_time.elapsed(), cfg);

    let lines: Vec<String> = hosts.iter().map(|r| report_line(r)).collect();
    let title = report::timestamped(report::NETWORK_DEVICES_TITLE);
    save_report(cfg, report::NETWORK_DEVICES_FILE, &title, &lines)
}

fn print_hosts(hosts: &[&ProbeResult]) {
    for (idx, host) in hosts.iter().enumerate() {
        print::tree_head(idx, host.fingerprint().unwrap_or(UNKNOWN));
        print::as_tree_one_level(vec![
            format::ip_to_detail(host.target().addr()),
            format::latency_to_detail(host.latency()),
        ]);
        if idx + 1 != hosts.len() {
            mprint!();
        }
    }
}

fn print_summary(count: usize, total_time: Duration, cfg: &Config) {
    let active: ColoredString = format!("{count} devices").bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: ColoredString =
        format!("Sweep complete: {active} answered in {total_time}").color(colors::TEXT_DEFAULT);

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output.to_string());
        }
        _ => success!("{}", output),
    }
}

/// `192.168.1.7 - printer.lan`.
fn report_line(result: &ProbeResult) -> String {
    format!("{} - {}", result.target(), result.fingerprint().unwrap_or(UNKNOWN))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
