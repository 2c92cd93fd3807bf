//! Configuration module for Site-Mirror
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and layering environment overrides on top of them.
//!
//! # Example
//!
//! ```no_run
//! use site_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirror.toml")).unwrap();
//! println!("Hosted API endpoint: {}", config.hosted.endpoint);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlMode, CrawlerConfig, HostedConfig, WorkspaceConfig};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, compute_config_hash, config_from_env, load_config,
    load_config_with_hash, API_KEY_ENV_VAR, ENDPOINT_ENV_VAR, MODE_ENV_VAR, WORKSPACE_ENV_VARS,
};
pub use validation::validate;
