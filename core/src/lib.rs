//! # Probing Engine
//!
//! * **[`scanner`]**: runs a [`scanner::Prober`] over a target list with a
//!   concurrency cap and a global deadline.
//! * **[`network`]**: concrete probers (TCP connect, ping) and the socket
//!   plumbing behind them.
//! * **[`signature`]**: keyword matching of banners and process listings.
//! * **[`aggregate`]**: ordering and deduplication of finished results.
//! * **[`system`]**: process listing backed by the OS.

pub mod aggregate;
pub mod network;
pub mod scanner;
pub mod signature;
pub mod system;
