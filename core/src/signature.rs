//! # Signature Matcher
//!
//! Keyword rules are plain data (see [`SignatureRule`]); this module only
//! applies them. Matching is a case-insensitive substring test and the first
//! rule in table order wins, so every input yields at most one label.

use selfcheck_common::probe::ServiceFinding;
use selfcheck_common::signature::SignatureRule;
use selfcheck_common::system::ProcessDescriptor;

/// Label of the first rule with a keyword occurring in `text`.
pub fn match_text<'r>(text: &str, rules: &'r [SignatureRule]) -> Option<&'r str> {
    let lowered = text.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.matches_lowered(&lowered))
        .map(SignatureRule::label)
}

/// One label per matching line, in line order.
pub fn match_lines<'r, I, S>(lines: I, rules: &'r [SignatureRule]) -> Vec<&'r str>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| match_text(line.as_ref(), rules))
        .collect()
}

/// Runs the rules over a process listing, one finding per matching process.
pub fn process_findings(processes: &[ProcessDescriptor], rules: &[SignatureRule]) -> Vec<ServiceFinding> {
    match_lines(processes.iter().map(ToString::to_string), rules)
        .into_iter()
        .map(ServiceFinding::process)
        .collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
