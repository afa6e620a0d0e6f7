//! Configuration module for Tracebound
//!
//! Settings come from an optional TOML file. Every key has a default, so a
//! missing file or a partial file is fine; command-line flags are applied on
//! top of whatever was loaded and the result is validated once.
//!
//! # Example
//!
//! ```no_run
//! use tracebound::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("tracebound.toml")).unwrap();
//! println!("Scanning with concurrency {}", config.scanner.concurrency);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, OutputConfig, ScannerConfig, UserAgentConfig};

pub use parser::{load_config, load_config_or_default};
pub use validation::validate;
