use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("max concurrency must be at least 1")]
    NoConcurrency,
    #[error("per-probe timeout must be greater than zero")]
    ZeroProbeTimeout,
    #[error("total deadline must be greater than zero")]
    ZeroDeadline,
}

/// Engine knobs for one scan invocation. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    per_probe_timeout: Duration,
    max_concurrency: usize,
    total_deadline: Duration,
}

impl ScanConfig {
    pub fn new(
        per_probe_timeout: Duration,
        max_concurrency: usize,
        total_deadline: Duration,
    ) -> Result<Self, ConfigError> {
        if max_concurrency == 0 {
            return Err(ConfigError::NoConcurrency);
        }
        if per_probe_timeout.is_zero() {
            return Err(ConfigError::ZeroProbeTimeout);
        }
        if total_deadline.is_zero() {
            return Err(ConfigError::ZeroDeadline);
        }
        Ok(Self {
            per_probe_timeout,
            max_concurrency,
            total_deadline,
        })
    }

    /// Local TCP port checks.
    pub fn ports() -> Self {
        Self {
            per_probe_timeout: Duration::from_millis(1_000),
            max_concurrency: 16,
            total_deadline: Duration::from_secs(10),
        }
    }

    /// Subnet reachability sweep. Leaves room for a one second ping plus a reverse lookup.
    pub fn hosts() -> Self {
        Self {
            per_probe_timeout: Duration::from_millis(2_000),
            max_concurrency: 20,
            total_deadline: Duration::from_secs(8),
        }
    }

    /// Web service check on a single host.
    pub fn web() -> Self {
        Self {
            per_probe_timeout: Duration::from_millis(1_500),
            max_concurrency: 9,
            total_deadline: Duration::from_secs(8),
        }
    }

    pub fn per_probe_timeout(&self) -> Duration {
        self.per_probe_timeout
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn total_deadline(&self) -> Duration {
        self.total_deadline
    }

    /// Applies user overrides on top of `self`, validating the result.
    pub fn with_overrides(self, overrides: &ScanOverrides) -> Result<Self, ConfigError> {
        Self::new(
            overrides.per_probe_timeout.unwrap_or(self.per_probe_timeout),
            overrides.max_concurrency.unwrap_or(self.max_concurrency),
            overrides.total_deadline.unwrap_or(self.total_deadline),
        )
    }
}

/// Scan settings the user may force for every check of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOverrides {
    pub per_probe_timeout: Option<Duration>,
    pub max_concurrency: Option<usize>,
    pub total_deadline: Option<Duration>,
}

pub struct Config {
    /// Skips reverse lookups for hosts found by the network sweep.
    pub no_dns: bool,
    pub no_banner: bool,
    /// 0 prints everything, 1 drops headers, 2 prints only summaries.
    pub quiet: u8,
    /// Whether result files are written.
    pub save: bool,
    pub output_dir: PathBuf,
    pub overrides: ScanOverrides,
}

impl Config {
    pub fn scan_config(&self, base: ScanConfig) -> Result<ScanConfig, ConfigError> {
        base.with_overrides(&self.overrides)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            no_dns: false,
            no_banner: false,
            quiet: 0,
            save: true,
            output_dir: PathBuf::from("."),
            overrides: ScanOverrides::default(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_or_zero_settings_are_rejected() {
        let second = Duration::from_secs(1);
        assert_eq!(ScanConfig::new(second, 0, second), Err(ConfigError::NoConcurrency));
        assert_eq!(ScanConfig::new(Duration::ZERO, 4, second), Err(ConfigError::ZeroProbeTimeout));
        assert_eq!(ScanConfig::new(second, 4, Duration::ZERO), Err(ConfigError::ZeroDeadline));
        assert!(ScanConfig::new(second, 4, second).is_ok());
    }

    #[test]
    fn overrides_replace_only_what_they_set() {
        let overrides = ScanOverrides {
            max_concurrency: Some(3),
            ..ScanOverrides::default()
        };
        let cfg = ScanConfig::ports().with_overrides(&overrides).unwrap();
        assert_eq!(cfg.max_concurrency(), 3);
        assert_eq!(cfg.per_probe_timeout(), ScanConfig::ports().per_probe_timeout());
        assert_eq!(cfg.total_deadline(), ScanConfig::ports().total_deadline());
    }

    #[test]
    fn invalid_overrides_surface_as_errors() {
        let cfg = Config {
            overrides: ScanOverrides {
                max_concurrency: Some(0),
                ..ScanOverrides::default()
            },
            ..Config::default()
        };
        assert_eq!(cfg.scan_config(ScanConfig::hosts()), Err(ConfigError::NoConcurrency));
    }
}
