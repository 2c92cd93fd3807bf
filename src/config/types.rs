use crate::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Main configuration structure for Site-Mirror
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub hosted: HostedConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

/// Which acquisition backend drives a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CrawlMode {
    /// Same-process link-following crawler
    #[default]
    Follow,
    /// Hosted asynchronous crawl API, polled to completion
    Hosted,
}

impl FromStr for CrawlMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "follow" | "crawler" => Ok(Self::Follow),
            "hosted" | "firecrawl" => Ok(Self::Hosted),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for CrawlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Follow => write!(f, "follow"),
            Self::Hosted => write!(f, "hosted"),
        }
    }
}

/// Link-following crawler configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Backend used for the pass
    pub mode: CrawlMode,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Maximum pages fetched per seed (0 = unbounded)
    #[serde(rename = "max-pages")]
    pub max_pages: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            mode: CrawlMode::Follow,
            user_agent: format!("site-mirror/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            max_pages: 0,
        }
    }
}

/// Hosted crawl API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostedConfig {
    /// Base URL of the crawl API
    pub endpoint: String,

    /// Bearer token for the crawl API
    #[serde(rename = "api-key")]
    pub api_key: String,

    /// Page limit submitted with each crawl job
    #[serde(rename = "page-limit")]
    pub page_limit: u32,

    /// Delay between job status polls (milliseconds)
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,

    /// Maximum number of status polls before a job is given up on
    #[serde(rename = "max-polls")]
    pub max_polls: u32,

    /// Attempts per HTTP call before failing
    #[serde(rename = "retry-attempts")]
    pub retry_attempts: u32,

    /// Fixed delay between attempts (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3002".to_string(),
            api_key: "test".to_string(),
            page_limit: 100,
            poll_interval_ms: 2000,
            max_polls: 1800,
            retry_attempts: 3,
            retry_delay_ms: 500,
        }
    }
}

/// Where the mirror lives on disk
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Mirror root; the current directory when unset
    pub dir: Option<PathBuf>,

    /// Metadata document name, relative to the mirror root
    #[serde(rename = "metadata-file")]
    pub metadata_file: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            dir: None,
            metadata_file: ".metadata.json".to_string(),
        }
    }
}

impl Config {
    /// Resolves the working directory, falling back to the process's current directory
    pub fn working_dir(&self) -> std::io::Result<PathBuf> {
        match &self.workspace.dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir(),
        }
    }

    /// Path of the metadata document inside the given working directory
    pub fn metadata_path(&self, working_dir: &std::path::Path) -> PathBuf {
        working_dir.join(&self.workspace.metadata_file)
    }
}
