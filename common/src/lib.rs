//! Shared model for `selfcheck`.
//!
//! Everything the probing engine and its collaborators exchange lives here:
//! scan targets, probe results, signature rules, scan configuration and the
//! static port and keyword catalogs.

pub mod catalog;
pub mod config;
pub mod network;
pub mod probe;
pub mod signature;
pub mod system;

#[doc(hidden)]
pub use tracing as __tracing;

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::__tracing::info!($($arg)*)
    };
}

/// Logs a positive outcome. Rendered with the success symbol by the CLI formatter.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::__tracing::info!(target: "selfcheck::success", $($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::__tracing::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::__tracing::error!($($arg)*)
    };
}
