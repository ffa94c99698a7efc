//! Shared utilities for the risk-limiting audit engine.

pub mod logging;
pub mod numeric;
pub mod stats;

pub use logging::{init_logging, LogFormat};
pub use numeric::{checked_div, checked_ln, checked_sqrt};
