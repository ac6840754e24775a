pub mod me;
pub mod network;
pub mod services;
pub mod web;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use selfcheck_common::config::{Config, ScanConfig, ScanOverrides};
use selfcheck_common::network::target::{ScanHost, Target};
use selfcheck_common::probe::ProbeResult;
use selfcheck_common::success;
use selfcheck_core::scanner::{self, Prober};
use tracing::Instrument;

use crate::report;
use crate::terminal::spinner;

#[derive(Parser)]
#[command(name = "selfcheck")]
#[command(about = "A quick security self-check of this computer and its home network.")]
#[command(version)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Per-probe timeout in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum number of probes in flight
    #[arg(long, global = true, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Deadline for a whole check in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub deadline_ms: Option<u64>,

    /// Skip reverse lookups of discovered hosts
    #[arg(long, global = true)]
    pub no_dns: bool,

    /// Do not write result files
    #[arg(long, global = true)]
    pub no_save: bool,

    /// Directory result files are written to
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Less output; repeat for summaries only
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// Hide the start-up banner
    #[arg(long, global = true)]
    pub no_banner: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check which common ports are open on this computer
    #[command(alias = "m")]
    Me,
    /// Find devices on the local network
    #[command(alias = "n")]
    Network,
    /// Look for known services by port and running process
    #[command(alias = "s")]
    Services,
    /// Check for web servers on this computer or a home-network address
    #[command(alias = "w")]
    Web {
        /// Loopback, `localhost`, `192.168.x.x` or `10.x.x.x`
        host: Option<ScanHost>,
    },
    /// Run `me`, `network` and `services` in sequence
    #[command(alias = "a")]
    All,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        Config {
            no_dns: self.no_dns,
            no_banner: self.no_banner,
            quiet: self.quiet,
            save: !self.no_save,
            output_dir: self.output_dir.clone(),
            overrides: ScanOverrides {
                per_probe_timeout: self.timeout_ms.map(Duration::from_millis),
                max_concurrency: self.concurrency,
                total_deadline: self.deadline_ms.map(Duration::from_millis),
            },
        }
    }
}

/// Runs a scan with a progress bar labelled `message`.
pub(crate) async fn scan_with_progress<P>(
    message: &str,
    targets: &[Target],
    prober: Arc<P>,
    scan_cfg: &ScanConfig,
) -> Vec<ProbeResult>
where
    P: Prober + 'static,
{
    let span = spinner::progress_span(message, targets.len());
    let report_progress = |completed: usize, _total: usize| spinner::report_progress(&span, completed);

    scanner::run_with_progress(targets, prober, scan_cfg, Some(&report_progress))
        .instrument(span.clone())
        .await
}

/// Saves a report and tells the user where it went.
pub(crate) fn save_report(cfg: &Config, file_name: &str, title: &str, lines: &[String]) -> anyhow::Result<()> {
    if let Some(path) = report::save(cfg, file_name, title, lines)? {
        success!("Results saved to {}", path.display());
    }
    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
