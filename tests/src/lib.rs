//! End-to-end checks of the probing engine against real local listeners.

mod probing;
mod utils;
