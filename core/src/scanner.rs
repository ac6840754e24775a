//! The central **abstraction** for probing.
//!
//! A [`Prober`] turns one [`Target`] into one [`ProbeResult`]. The coordinator
//! in this module fans a target list out over a prober with a concurrency cap,
//! a per-probe timeout and a deadline for the whole batch, and hands back one
//! result per target in input order no matter how the probes finish.
//!
//! High-level code depends on the trait only, which is also how the
//! coordinator is tested with fakes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use selfcheck_common::config::ScanConfig;
use selfcheck_common::network::target::Target;
use selfcheck_common::probe::{ProbeError, ProbeResult};
use tokio::sync::Semaphore;
use tokio::task::{AbortHandle, JoinSet};
use tokio::time::{self, Instant};
use tracing::{debug, warn};

/// Held back from the budget handed to a prober so its result lands before
/// the coordinator cuts it off at the full per-probe timeout.
const RESULT_MARGIN: Duration = Duration::from_millis(25);

/// Defines the strategy for probing a single target.
///
/// Implementations honour `timeout` themselves and never panic on network
/// errors; every outcome is expressed as a [`ProbeResult`].
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, target: Target, timeout: Duration) -> ProbeResult;
}

/// Called with `(completed, total)` each time a probe finishes.
pub type ProgressFn<'a> = &'a (dyn Fn(usize, usize) + Send + Sync);

/// Probes every target and returns one result per target, in input order.
pub async fn run<P>(targets: &[Target], prober: Arc<P>, cfg: &ScanConfig) -> Vec<ProbeResult>
where
    P: Prober + ?Sized + 'static,
{
    run_with_progress(targets, prober, cfg, None).await
}

/// Same as [`run`], reporting progress as probes complete.
///
/// When the total deadline passes, probes still waiting or in flight are
/// aborted and recorded as [`ProbeError::Timeout`].
pub async fn run_with_progress<P>(
    targets: &[Target],
    prober: Arc<P>,
    cfg: &ScanConfig,
    on_progress: Option<ProgressFn<'_>>,
) -> Vec<ProbeResult>
where
    P: Prober + ?Sized + 'static,
{
    let started = Instant::now();
    let total = targets.len();
    let per_probe = cfg.per_probe_timeout();
    let semaphore = Arc::new(Semaphore::new(cfg.max_concurrency()));
    let mut tasks: JoinSet<(usize, ProbeResult)> = JoinSet::new();

    for (idx, &target) in targets.iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let prober = Arc::clone(&prober);
        tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return (idx, ProbeResult::unreachable(target, Duration::ZERO, ProbeError::Internal));
            };
            (idx, probe_one(prober, target, per_probe).await)
        });
    }

    let mut slots: Vec<Option<ProbeResult>> = vec![None; total];
    let mut completed: usize = 0;
    let mut deadline_hit = false;
    let deadline = time::sleep_until(started + cfg.total_deadline());
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            biased;
            joined = tasks.join_next() => match joined {
                Some(Ok((idx, result))) => {
                    debug!(probe = %result.target(), reachable = result.is_reachable(), "probe finished");
                    slots[idx] = Some(result);
                    completed += 1;
                    if let Some(report) = on_progress {
                        report(completed, total);
                    }
                }
                Some(Err(err)) => warn!("Probe task failed: {err}"),
                None => break,
            },
            _ = &mut deadline => {
                deadline_hit = true;
                tasks.abort_all();
                break;
            }
        }
    }

    if deadline_hit {
        debug!(completed, total, "scan deadline reached");
    }

    let elapsed = started.elapsed();
    slots
        .into_iter()
        .zip(targets)
        .map(|(slot, &target)| {
            slot.unwrap_or_else(|| {
                let error = if deadline_hit {
                    ProbeError::Timeout
                } else {
                    ProbeError::Internal
                };
                ProbeResult::unreachable(target, elapsed, error)
            })
        })
        .collect()
}

/// Aborts the wrapped task when dropped, so a probe never outlives the task awaiting it.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Runs a probe on its own task so a panic stays contained, cut off once
/// `budget` is spent.
async fn probe_one<P>(prober: Arc<P>, target: Target, budget: Duration) -> ProbeResult
where
    P: Prober + ?Sized + 'static,
{
    let started = Instant::now();
    let handed_over = budget.saturating_sub(RESULT_MARGIN);
    let handle = tokio::spawn(async move { prober.probe(target, handed_over).await });
    let _guard = AbortOnDrop(handle.abort_handle());

    match time::timeout(budget, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => {
            if err.is_panic() {
                warn!("Probe for {target} panicked");
            }
            ProbeResult::unreachable(target, started.elapsed(), ProbeError::Internal)
        }
        Err(_elapsed) => ProbeResult::unreachable(target, started.elapsed(), ProbeError::Timeout),
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Sleeps for a per-port delay and echoes the target back as reachable.
    struct FakeProber {
        delay: fn(u16) -> Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl FakeProber {
        fn new(delay: fn(u16) -> Duration) -> Arc<Self> {
            Arc::new(Self {
                delay,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Prober for FakeProber {
        async fn probe(&self, target: Target, _timeout: Duration) -> ProbeResult {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            let port = target.port_number().unwrap_or(0);
            if port == 666 {
                panic!("boom");
            }
            time::sleep((self.delay)(port)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            ProbeResult::reachable(target, Duration::ZERO, Some(format!("svc-{port}")))
        }
    }

    fn targets(ports: impl IntoIterator<Item = u16>) -> Vec<Target> {
        ports
            .into_iter()
            .map(|port| Target::port(IpAddr::V4(Ipv4Addr::LOCALHOST), port))
            .collect()
    }

    fn cfg(per_probe_ms: u64, concurrency: usize, deadline_ms: u64) -> ScanConfig {
        ScanConfig::new(
            Duration::from_millis(per_probe_ms),
            concurrency,
            Duration::from_millis(deadline_ms),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn results_follow_input_order_not_completion_order() {
        // Later ports finish first.
        let prober = FakeProber::new(|port| Duration::from_millis(u64::from(60 - port) * 5));
        let input = targets(50..60);

        let results = run(&input, prober, &cfg(1_000, 10, 5_000)).await;

        assert_eq!(results.len(), input.len());
        for (result, target) in results.iter().zip(&input) {
            assert_eq!(result.target(), *target);
            assert!(result.is_reachable());
        }
    }

    #[tokio::test]
    async fn concurrency_never_exceeds_the_cap() {
        let prober = FakeProber::new(|_| Duration::from_millis(20));
        let input = targets(1..=24);

        let results = run(&input, Arc::clone(&prober), &cfg(1_000, 3, 5_000)).await;

        assert_eq!(results.len(), 24);
        assert!(prober.peak.load(Ordering::SeqCst) <= 3);
        assert!(prober.peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn deadline_turns_unfinished_probes_into_timeouts() {
        let prober = FakeProber::new(|port| {
            if port == 1 {
                Duration::from_millis(10)
            } else {
                Duration::from_secs(30)
            }
        });
        let input = targets(1..=5);
        let started = std::time::Instant::now();

        let results = run(&input, prober, &cfg(60_000, 5, 200)).await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(results.len(), 5);
        assert!(results[0].is_reachable());
        for result in &results[1..] {
            assert!(!result.is_reachable());
            assert_eq!(result.error(), Some(ProbeError::Timeout));
            assert_eq!(result.fingerprint(), None);
        }
    }

    #[tokio::test]
    async fn probes_that_overrun_their_budget_time_out() {
        let prober = FakeProber::new(|_| Duration::from_secs(30));
        let input = targets([7]);
        let started = std::time::Instant::now();

        let results = run(&input, prober, &cfg(200, 1, 10_000)).await;

        assert!(started.elapsed() < Duration::from_millis(400));
        assert_eq!(results[0].error(), Some(ProbeError::Timeout));
    }

    /// Spends exactly the budget it is handed, then reports reachable.
    struct PunctualProber {
        handed: Mutex<Option<Duration>>,
    }

    #[async_trait]
    impl Prober for PunctualProber {
        async fn probe(&self, target: Target, timeout: Duration) -> ProbeResult {
            *self.handed.lock().unwrap() = Some(timeout);
            time::sleep(timeout).await;
            ProbeResult::reachable(target, timeout, None)
        }
    }

    #[tokio::test]
    async fn probes_using_their_whole_budget_still_count() {
        let prober = Arc::new(PunctualProber { handed: Mutex::new(None) });
        let input = targets([9]);

        let results = run(&input, Arc::clone(&prober), &cfg(150, 1, 10_000)).await;

        let handed = prober.handed.lock().unwrap().unwrap();
        assert!(handed < Duration::from_millis(150));
        assert!(results[0].is_reachable(), "{:?}", results[0].error());
    }

    #[tokio::test]
    async fn a_panicking_probe_is_recorded_as_internal() {
        let prober = FakeProber::new(|_| Duration::from_millis(5));
        let input = targets([80, 666, 443]);

        let results = run(&input, prober, &cfg(1_000, 2, 5_000)).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].is_reachable());
        assert_eq!(results[1].error(), Some(ProbeError::Internal));
        assert!(results[2].is_reachable());
    }

    #[tokio::test]
    async fn progress_is_reported_for_every_probe() {
        let prober = FakeProber::new(|_| Duration::from_millis(1));
        let input = targets(1..=6);
        let seen: Mutex<Vec<(usize, usize)>> = Mutex::new(Vec::new());
        let record = |done: usize, total: usize| seen.lock().unwrap().push((done, total));

        run_with_progress(&input, prober, &cfg(1_000, 2, 5_000), Some(&record)).await;

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 6);
        assert_eq!(seen.last(), Some(&(6, 6)));
    }

    #[tokio::test]
    async fn empty_target_list_yields_no_results() {
        let prober = FakeProber::new(|_| Duration::ZERO);
        assert!(run(&[], prober, &cfg(100, 1, 100)).await.is_empty());
    }
}
