//! Utility modules for liberator
//!
//! - Structured logging setup and configuration
//! - Cooperative cancellation shared by traversal and parsing workers

mod cancel;
pub mod logging;

pub use cancel::CancellationToken;
pub use logging::{init_from_env, init_logging, LoggingConfig};
