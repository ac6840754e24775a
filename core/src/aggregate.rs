//! # Result Aggregator
//!
//! Turns finished probe output into what gets reported: duplicates removed,
//! ordering fixed by target so repeated runs print the same thing.

use std::collections::HashSet;

use selfcheck_common::network::target::Target;
use selfcheck_common::probe::{FindingOrigin, ProbeResult, ServiceFinding};

/// Deduplicates by `(target, fingerprint)`, keeping the first occurrence, then
/// sorts by target. The sort is stable.
pub fn aggregate(results: Vec<ProbeResult>) -> Vec<ProbeResult> {
    let mut seen: HashSet<(Target, Option<String>)> = HashSet::with_capacity(results.len());
    let mut unique: Vec<ProbeResult> = results
        .into_iter()
        .filter(|r| seen.insert((r.target(), r.fingerprint().map(str::to_owned))))
        .collect();

    unique.sort_by_key(ProbeResult::target);
    unique
}

/// Keeps reachable results only, preserving order.
pub fn reachable_only(results: &[ProbeResult]) -> Vec<&ProbeResult> {
    results.iter().filter(|r| r.is_reachable()).collect()
}

/// Deduplicates findings by `(origin, label)`. Port findings come first in
/// target order, then process findings by label.
pub fn aggregate_findings(findings: Vec<ServiceFinding>) -> Vec<ServiceFinding> {
    let mut seen: HashSet<ServiceFinding> = HashSet::with_capacity(findings.len());
    let mut unique: Vec<ServiceFinding> = findings
        .into_iter()
        .filter(|f| seen.insert(f.clone()))
        .collect();

    unique.sort_by(|a, b| finding_key(a).cmp(&finding_key(b)));
    unique
}

fn finding_key(finding: &ServiceFinding) -> (u8, Option<Target>, &str) {
    match finding.origin {
        FindingOrigin::Port(target) => (0, Some(target), finding.label.as_str()),
        FindingOrigin::Process => (1, None, finding.label.as_str()),
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
