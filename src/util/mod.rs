//! Process-level helpers shared by the binary and tests

pub mod logging;

pub use logging::{init_logging, LoggingConfig};
