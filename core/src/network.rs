#[cfg(unix)]
pub mod icmp;
pub mod ping;
pub mod resolver;
pub mod tcp;
