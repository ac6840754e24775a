//! Name lookups for the probers: forward resolution of the host argument and
//! reverse lookups of responsive hosts.

use std::net::IpAddr;
use std::time::Duration;

use selfcheck_common::network::target::ScanHost;
use selfcheck_common::probe::ProbeError;
use tokio::{net, task, time};
use tracing::debug;

/// Turns a host argument into an address. IPv4 is preferred for `localhost`.
pub async fn resolve(host: &ScanHost) -> Result<IpAddr, ProbeError> {
    match host {
        ScanHost::Addr(addr) => Ok(*addr),
        ScanHost::Localhost => {
            let addrs: Vec<IpAddr> = net::lookup_host(("localhost", 0))
                .await
                .map_err(|err| {
                    debug!(error = %err, "localhost did not resolve");
                    ProbeError::DnsFailure
                })?
                .map(|sock| sock.ip())
                .collect();

            addrs
                .iter()
                .find(|addr| addr.is_ipv4())
                .or_else(|| addrs.first())
                .copied()
                .ok_or(ProbeError::DnsFailure)
        }
    }
}

/// Reverse lookup of `addr`, bounded by `budget`.
///
/// The system resolver blocks, so it runs on the blocking pool; if `budget`
/// runs out first the lookup thread is left to finish on its own.
pub async fn reverse_lookup(addr: IpAddr, budget: Duration) -> Option<String> {
    if budget.is_zero() {
        return None;
    }

    let lookup = task::spawn_blocking(move || dns_lookup::lookup_addr(&addr));
    match time::timeout(budget, lookup).await {
        Ok(Ok(Ok(name))) => hostname(&name),
        Ok(Ok(Err(err))) => {
            debug!(%addr, error = %err, "reverse lookup failed");
            None
        }
        Ok(Err(err)) => {
            debug!(%addr, error = %err, "reverse lookup task failed");
            None
        }
        Err(_elapsed) => None,
    }
}

/// Resolvers hand back the address itself when there is no PTR record.
fn hostname(name: &str) -> Option<String> {
    let name = name.trim().trim_end_matches('.');
    if name.is_empty() || name.parse::<IpAddr>().is_ok() {
        return None;
    }
    Some(name.to_string())
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

    #[test]
    fn numeric_answers_are_not_hostnames() {
        assert_eq!(hostname("192.168.1.7"), None);
        assert_eq!(hostname(""), None);
        assert_eq!(hostname("printer.lan."), Some("printer.lan".to_string()));
    }

    #[tokio::test]
    async fn addresses_resolve_to_themselves() {
        let addr = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20));
        assert_eq!(resolve(&ScanHost::Addr(addr)).await, Ok(addr));
    }

    #[tokio::test]
    async fn localhost_resolves_to_loopback() {
        let addr = resolve(&ScanHost::Localhost).await.unwrap();
        assert!(addr.is_loopback());
    }

    #[tokio::test]
    async fn zero_budget_skips_the_lookup() {
        assert_eq!(reverse_lookup(IpAddr::V4(Ipv4Addr::LOCALHOST), Duration::ZERO).await, None);
    }

    #[tokio::test]
    #[ignore]
    async fn reverse_lookup_should_name_a_public_resolver() {
        let name = reverse_lookup(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)), Duration::from_secs(3)).await;
        assert!(name.is_some());
    }
}
