//! Process-wide `tracing` setup. See `bin/logger_demo.rs` for the reload flow.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
