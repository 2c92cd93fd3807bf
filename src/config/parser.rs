use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Environment variables that override the working directory, in priority order
pub const WORKSPACE_ENV_VARS: &[&str] = &["MIRROR_WORKSPACE_DIR", "GPTSCRIPT_WORKSPACE_DIR"];

/// Environment variable selecting the crawl backend
pub const MODE_ENV_VAR: &str = "MIRROR_MODE";

/// Environment variable overriding the hosted API endpoint
pub const ENDPOINT_ENV_VAR: &str = "FIRECRAWL_URL";

/// Environment variable overriding the hosted API key
pub const API_KEY_ENV_VAR: &str = "FIRECRAWL_API_KEY";

/// Loads and parses a configuration file from the given path
///
/// Environment overrides are applied after parsing and before validation.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use site_mirror::config::load_config;
///
/// let config = load_config(Path::new("mirror.toml")).unwrap();
/// println!("Mode: {}", config.crawler.mode);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config: Config = toml::from_str(&content)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;
    Ok(config)
}

/// Builds a configuration from defaults plus environment overrides
///
/// Used when no configuration file is given on the command line.
pub fn config_from_env() -> Result<Config, ConfigError> {
    let mut config = Config::default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;
    Ok(config)
}

/// Applies environment overrides through the given lookup function
///
/// Empty values are treated as unset.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(dir) = WORKSPACE_ENV_VARS.iter().find_map(|key| get(key)) {
        config.workspace.dir = Some(PathBuf::from(dir));
    }

    if let Some(mode) = get(MODE_ENV_VAR) {
        config.crawler.mode = mode.parse()?;
    }

    if let Some(endpoint) = get(ENDPOINT_ENV_VAR) {
        config.hosted.endpoint = endpoint;
    }

    if let Some(key) = get(API_KEY_ENV_VAR) {
        config.hosted.api_key = key;
    }

    Ok(())
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so separate runs can be correlated with the
/// configuration they used.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
