//! Wire-level helpers for the probes: the HTTP fingerprinting request, banner
//! line extraction, ICMP echo packets and the OS `ping` invocation.

pub mod greeting;
pub mod http;
pub mod icmp;
pub mod ping;
