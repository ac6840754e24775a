use std::net::IpAddr;
use std::time::Duration;

use colored::*;
use selfcheck_common::probe::ProbeResult;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

pub fn ip_to_detail(ip: IpAddr) -> Detail {
    match ip {
        IpAddr::V4(ipv4_addr) => ("IPv4".to_string(), ipv4_addr.to_string().color(colors::IPV4_ADDR)),
        IpAddr::V6(ipv6_addr) => ("IPv6".to_string(), ipv6_addr.to_string().color(colors::IPV6_ADDR)),
    }
}

pub fn latency_to_detail(latency: Duration) -> Detail {
    ("Latency".to_string(), latency_str(latency).color(colors::ACCENT))
}

pub fn latency_str(latency: Duration) -> String {
    format!("{:.1}ms", latency.as_secs_f64() * 1_000.0)
}

/// `open` / `closed (reason)` for a port line.
pub fn status(result: &ProbeResult) -> ColoredString {
    match result.error() {
        None if result.is_reachable() => "open".color(colors::OPEN).bold(),
        Some(error) => format!("closed ({error})").color(colors::CLOSED),
        None => "closed".color(colors::CLOSED),
    }
}
