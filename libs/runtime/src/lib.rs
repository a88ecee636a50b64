//! Process-level plumbing shared by Evently binaries: layered configuration
//! and the tracing subscriber setup.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{
    default_logging_config, AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section,
    ServerConfig,
};
