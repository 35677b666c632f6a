//! Infrastructure concerns: configuration and logging

pub mod config;
pub mod logging;

pub use config::{CONFIG_FILE_NAME, Config, ExtraTask, expand_variables};
pub use logging::init_logging;
