// Mon Feb 02 2026 - Alex

pub mod logging;

pub use logging::{init_from_env, init_logger, ScopedTimer};
