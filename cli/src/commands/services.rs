use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use anyhow::Context;
use colored::*;
use selfcheck_common::catalog::{self, SERVICE_GROUPS};
use selfcheck_common::config::{Config, ScanConfig};
use selfcheck_common::network::target::Target;
use selfcheck_common::probe::{FindingOrigin, ProbeResult, ServiceFinding};
use selfcheck_common::system::{ProcessDescriptor, ProcessSource};
use selfcheck_common::{success, warn};
use selfcheck_core::network::tcp::TcpProber;
use selfcheck_core::system::SysinfoProcesses;
use selfcheck_core::{aggregate, signature};

use crate::commands::{save_report, scan_with_progress};
use crate::report;
use crate::terminal::{colors, print};

/// Looks for known services by open port and by running process.
pub async fn services(cfg: &Config) -> anyhow::Result<()> {
    print::header("services", cfg.quiet);

    let loopback = IpAddr::V4(Ipv4Addr::LOCALHOST);
    let targets: Vec<Target> = SERVICE_GROUPS
        .iter()
        .flat_map(|(_, ports)| ports.iter().map(move |&port| Target::port(loopback, port)))
        .collect();

    let scan_cfg = cfg.scan_config(ScanConfig::ports())?;
    let results = scan_with_progress(
        "Checking service ports",
        &targets,
        Arc::new(TcpProber::connect_only()),
        &scan_cfg,
    )
    .await;

    let mut findings: Vec<ServiceFinding> = port_findings(&results);

    let processes: Vec<ProcessDescriptor> = match tokio::task::spawn_blocking(|| SysinfoProcesses.list())
        .await
        .context("process listing task failed")?
    {
        Ok(processes) => processes,
        Err(err) => {
            warn!("Could not list running processes: {err:#}");
            Vec::new()
        }
    };
    findings.extend(signature::process_findings(&processes, &catalog::process_rules()));

    let findings = aggregate::aggregate_findings(findings);
    if findings.is_empty() {
        print::no_results(cfg.quiet);
        success!("No known services found");
        return Ok(());
    }

    if cfg.quiet < 2 {
        for finding in &findings {
            print::print_status(console_line(finding));
        }
    }
    success!("{} services found", findings.len());

    let lines: Vec<String> = findings.iter().map(ToString::to_string).collect();
    let title = report::timestamped(report::SERVICES_TITLE);
    save_report(cfg, report::SERVICES_FILE, &title, &lines)
}

fn port_findings(results: &[ProbeResult]) -> Vec<ServiceFinding> {
    aggregate::reachable_only(results)
        .into_iter()
        .filter_map(|result| {
            let target = result.target();
            let label = catalog::service_group_label(target.port_number()?)?;
            Some(ServiceFinding::port(label, target))
        })
        .collect()
}

fn console_line(finding: &ServiceFinding) -> String {
    match finding.origin {
        FindingOrigin::Port(target) => format!(
            "{} on port {}",
            finding.label.color(colors::PRIMARY),
            target.port_number().unwrap_or_default().to_string().color(colors::ACCENT)
        ),
        FindingOrigin::Process => format!(
            "{} {}",
            "Process:".color(colors::SEPARATOR),
            finding.label.color(colors::FINGERPRINT)
        ),
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
