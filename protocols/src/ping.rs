use std::net::IpAddr;
use std::time::Duration;

/// An OS `ping` invocation sending a single echo request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingCommand {
    pub program: &'static str,
    pub args: Vec<String>,
}

/// Builds the platform's `ping` arguments for one echo request waiting at most `wait`.
///
/// The utility's own wait is whole seconds on Unix, so it is rounded down
/// with a floor of one second.
pub fn command(addr: IpAddr, wait: Duration) -> PingCommand {
    PingCommand {
        program: "ping",
        args: platform_args(addr, wait),
    }
}

#[cfg(windows)]
fn platform_args(addr: IpAddr, wait: Duration) -> Vec<String> {
    let millis = wait.as_millis().max(1);
    vec![
        "-n".into(),
        "1".into(),
        "-w".into(),
        millis.to_string(),
        addr.to_string(),
    ]
}

#[cfg(target_os = "macos")]
fn platform_args(addr: IpAddr, wait: Duration) -> Vec<String> {
    vec![
        "-c".into(),
        "1".into(),
        "-t".into(),
        whole_seconds(wait).to_string(),
        addr.to_string(),
    ]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn platform_args(addr: IpAddr, wait: Duration) -> Vec<String> {
    vec![
        "-c".into(),
        "1".into(),
        "-W".into(),
        whole_seconds(wait).to_string(),
        addr.to_string(),
    ]
}

#[cfg(unix)]
fn whole_seconds(wait: Duration) -> u64 {
    wait.as_secs().max(1)
}
