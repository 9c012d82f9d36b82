//! Logging utilities.
//!
//! Centralizes logger initialization behind the `log` facade. Everything in
//! the engine logs through `log::*` macros; the binary decides the backend.

mod init;

pub use init::{init_logging, LoggingConfig};
