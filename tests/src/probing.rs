#![cfg(test)]
use std::sync::Arc;
use std::time::{Duration, Instant};

use selfcheck_common::catalog::ProbeKind;
use selfcheck_common::network::target::Target;
use selfcheck_common::probe::{ProbeError, ProbeResult};
use selfcheck_core::aggregate;
use selfcheck_core::network::ping::PingProber;
use selfcheck_core::network::tcp::TcpProber;
use selfcheck_core::scanner;

use crate::utils::{LOCALHOST, closed_port, http_stub, scan_config, silent_stub};

/// A closed port and an nginx stub probed together through the coordinator.
#[tokio::test]
async fn port_scan_keeps_input_order_and_classifies_each_port() -> anyhow::Result<()> {
    let nginx = http_stub(b"HTTP/1.0 200 OK\r\nServer: nginx\r\n\r\n").await;
    let closed = closed_port().await;
    let targets = vec![Target::port(LOCALHOST, closed), Target::port(LOCALHOST, nginx)];
    let prober = Arc::new(TcpProber::new().with_kind(nginx, ProbeKind::Http));

    let results = scanner::run(&targets, prober, &scan_config(1_000, 4, 5_000)).await;

    assert_eq!(results.len(), targets.len());
    assert_eq!(results[0].target(), targets[0]);
    assert_eq!(results[1].target(), targets[1]);

    let closed_result = &results[0];
    assert!(!closed_result.is_reachable());
    assert_eq!(closed_result.fingerprint(), None);
    assert!(matches!(
        closed_result.error(),
        Some(ProbeError::ConnectionRefused | ProbeError::Timeout)
    ));

    let nginx_result = &results[1];
    assert!(nginx_result.is_reachable());
    assert_eq!(nginx_result.fingerprint(), Some("nginx"));
    Ok(())
}

#[tokio::test]
async fn loopback_is_reachable() {
    let result = PingProber::new(false)
        .probe_host(LOCALHOST, Duration::from_secs(2))
        .await;

    assert!(result.is_reachable(), "loopback did not answer: {:?}", result.error());
}

#[tokio::test]
async fn short_deadline_still_yields_one_result_per_target() {
    let silent = silent_stub().await;
    let targets: Vec<Target> = (0..6).map(|_| Target::port(LOCALHOST, silent)).collect();
    let prober = Arc::new(
        TcpProber::new()
            .with_kind(silent, ProbeKind::Http)
            .with_banner_timeout(Duration::from_secs(30)),
    );
    let started = Instant::now();

    let results = scanner::run(&targets, prober, &scan_config(10_000, 2, 300)).await;

    assert!(started.elapsed() < Duration::from_millis(1_500));
    assert_eq!(results.len(), targets.len());
    for result in &results {
        assert_eq!(result.error(), Some(ProbeError::Timeout));
        assert_eq!(result.fingerprint(), None);
    }
}

#[tokio::test]
async fn repeated_scans_classify_identically() {
    let apache = http_stub(b"HTTP/1.1 404 Not Found\r\nServer: Apache/2.4.58\r\n\r\n").await;
    let closed = closed_port().await;
    let targets = vec![
        Target::port(LOCALHOST, apache),
        Target::port(LOCALHOST, closed),
        Target::port(LOCALHOST, apache),
    ];
    let prober = Arc::new(TcpProber::new().with_kind(apache, ProbeKind::Http));
    let cfg = scan_config(1_000, 3, 5_000);

    let first: Vec<ProbeResult> = aggregate::aggregate(scanner::run(&targets, Arc::clone(&prober), &cfg).await);
    let second: Vec<ProbeResult> = aggregate::aggregate(scanner::run(&targets, prober, &cfg).await);

    assert_eq!(first.len(), 2);
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert!(a.same_outcome(b), "{a:?} != {b:?}");
    }
}
