//! # Host Reachability Prober
//!
//! One echo request per host. With raw socket privileges on Unix the request
//! is sent natively over ICMP; otherwise the system `ping` utility is run.
//! A host that answers is then named by a reverse lookup.

use std::net::IpAddr;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use selfcheck_common::network::target::Target;
use selfcheck_common::probe::{ProbeError, ProbeResult, UNKNOWN};
use selfcheck_protocols::ping;
use tokio::process::Command;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use crate::network::resolver;
use crate::scanner::Prober;

/// Longest a single echo is waited for, whatever the probe budget.
const MAX_ECHO_WAIT: Duration = Duration::from_secs(1);

/// Kept back from the reverse lookup so the result lands inside the budget.
const LOOKUP_MARGIN: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct PingProber {
    resolve_names: bool,
    native: bool,
}

impl PingProber {
    /// Uses native ICMP when running as root on Unix.
    pub fn new(resolve_names: bool) -> Self {
        Self {
            resolve_names,
            native: cfg!(unix) && is_root::is_root(),
        }
    }

    /// Always shells out to `ping`.
    pub fn system(resolve_names: bool) -> Self {
        Self {
            resolve_names,
            native: false,
        }
    }

    /// Checks whether `addr` answers an echo request within `budget`.
    ///
    /// Reachable hosts carry their reverse name as fingerprint, or
    /// [`UNKNOWN`] when none is found or lookups are disabled.
    pub async fn probe_host(&self, addr: IpAddr, budget: Duration) -> ProbeResult {
        let target = Target::host(addr);
        let started = Instant::now();
        let deadline = started + budget;
        let wait = budget.min(MAX_ECHO_WAIT);

        if let Err(error) = self.echo(addr, wait, deadline).await {
            return ProbeResult::unreachable(target, started.elapsed(), error);
        }
        let latency = started.elapsed();

        let name = if self.resolve_names {
            let remaining = deadline
                .saturating_duration_since(Instant::now())
                .saturating_sub(LOOKUP_MARGIN);
            resolver::reverse_lookup(addr, remaining).await
        } else {
            None
        };

        ProbeResult::reachable(target, latency, Some(name.unwrap_or_else(|| UNKNOWN.to_string())))
    }

    async fn echo(&self, addr: IpAddr, wait: Duration, deadline: Instant) -> Result<(), ProbeError> {
        #[cfg(unix)]
        {
            if let (true, IpAddr::V4(v4)) = (self.native, addr) {
                match native_echo(v4, wait, deadline).await {
                    Ok(outcome) => return outcome,
                    Err(err) => debug!(error = %err, "native echo unavailable, using ping"),
                }
            }
        }

        system_echo(addr, wait, deadline).await
    }
}

/// Outer `Err` means the raw channel could not be used at all.
#[cfg(unix)]
async fn native_echo(
    addr: std::net::Ipv4Addr,
    wait: Duration,
    deadline: Instant,
) -> anyhow::Result<Result<(), ProbeError>> {
    use crate::network::icmp;

    let echo = tokio::task::spawn_blocking(move || icmp::echo(addr, wait));
    let outcome = match time::timeout_at(deadline, echo).await {
        Ok(Ok(reply)) => match reply? {
            Some(_rtt) => Ok(()),
            None => Err(ProbeError::Unreachable),
        },
        Ok(Err(err)) => {
            warn!("Echo task for {addr} failed: {err}");
            Err(ProbeError::Internal)
        }
        Err(_elapsed) => Err(ProbeError::Timeout),
    };
    Ok(outcome)
}

async fn system_echo(addr: IpAddr, wait: Duration, deadline: Instant) -> Result<(), ProbeError> {
    let invocation = ping::command(addr, wait);
    let mut child = Command::new(invocation.program)
        .args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|err| {
            warn!("Could not run {}: {err}", invocation.program);
            ProbeError::Internal
        })?;

    match time::timeout_at(deadline, child.wait()).await {
        Ok(Ok(status)) if status.success() => Ok(()),
        Ok(Ok(status)) => {
            debug!(%addr, %status, "ping reported no reply");
            Err(ProbeError::Unreachable)
        }
        Ok(Err(err)) => {
            warn!("Waiting on ping for {addr} failed: {err}");
            Err(ProbeError::Internal)
        }
        Err(_elapsed) => Err(ProbeError::Timeout),
    }
}

#[async_trait]
impl Prober for PingProber {
    async fn probe(&self, target: Target, timeout: Duration) -> ProbeResult {
        match target {
            Target::Host { addr } => self.probe_host(addr, timeout).await,
            Target::Port { .. } => {
                warn!("Reachability probe takes bare hosts, got {target}");
                ProbeResult::unreachable(target, Duration::ZERO, ProbeError::Internal)
            }
        }
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
