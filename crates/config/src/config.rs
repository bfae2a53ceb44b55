use std::{
    fs, io,
    num::{NonZeroU32, NonZeroU64},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use swaplist_explorer::DEFAULT_EXPLORER_URL;
use swaplist_retrieval::{DEFAULT_LOG_BUFFER, DEFAULT_RESULT_BUFFER};
use thiserror::Error;

/// Overrides `rpc.endpoint`.
pub const ENV_RPC_URL: &str = "SWAPLIST_RPC_URL";
/// Overrides `explorer.api_key`.
pub const ENV_EXPLORER_API_KEY: &str = "SWAPLIST_EXPLORER_API_KEY";
/// Overrides `logging.log_dir`.
pub const ENV_LOG_DIR: &str = "SWAPLIST_LOG_DIR";

/// Default value for `endpoint` in [`RpcConfig`].
const DEFAULT_RPC_ENDPOINT: &str = "https://rpc.gnosischain.com";

/// Default value for `max_requests_per_second` in [`RpcConfig`].
const DEFAULT_MAX_REQUESTS_PER_SECOND: u32 = 15;

/// Default value for `block_range_limit` in [`RetrievalConfig`].
const DEFAULT_BLOCK_RANGE_LIMIT: u64 = 5;

/// Default value for `path` in [`OutputConfig`].
const DEFAULT_OUTPUT_PATH: &str = "transactions.txt";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Node endpoint, `http(s)://` or `ws(s)://`.
    #[serde(default = "default_rpc_endpoint")]
    pub endpoint: String,

    /// Upper bound on node calls per second. `0` disables throttling.
    #[serde(default = "default_max_requests_per_second")]
    pub max_requests_per_second: u32,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: default_rpc_endpoint(),
            max_requests_per_second: default_max_requests_per_second(),
        }
    }
}

impl RpcConfig {
    /// Rate limit to apply, `None` when throttling is disabled.
    pub fn rate_limit(&self) -> Option<NonZeroU32> {
        NonZeroU32::new(self.max_requests_per_second)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Maximum number of blocks covered by one log query.
    #[serde(default = "default_block_range_limit")]
    pub block_range_limit: NonZeroU64,

    /// Capacity of the channel between log fetching and resolution.
    #[serde(default = "default_log_buffer")]
    pub log_buffer: usize,

    /// Capacity of the record channel returned to the caller.
    #[serde(default = "default_result_buffer")]
    pub result_buffer: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            block_range_limit: default_block_range_limit(),
            log_buffer: default_log_buffer(),
            result_buffer: default_result_buffer(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    #[serde(default = "default_explorer_url")]
    pub base_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: default_explorer_url(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// File the records are written to.
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Directory path for file-based logging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Prefix for log file names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file_prefix: Option<String>,

    /// Use JSON format for logs instead of compact format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_format: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub rpc: RpcConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub explorer: ExplorerConfig,

    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration (optional section in TOML).
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies the `SWAPLIST_*` overrides found through `lookup`. Empty values
    /// are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = get(ENV_RPC_URL) {
            self.rpc.endpoint = endpoint;
        }
        if let Some(key) = get(ENV_EXPLORER_API_KEY) {
            self.explorer.api_key = Some(key);
        }
        if let Some(dir) = get(ENV_LOG_DIR) {
            self.logging.log_dir = Some(dir.into());
        }
    }
}

fn default_rpc_endpoint() -> String {
    DEFAULT_RPC_ENDPOINT.to_owned()
}

fn default_max_requests_per_second() -> u32 {
    DEFAULT_MAX_REQUESTS_PER_SECOND
}

fn default_block_range_limit() -> NonZeroU64 {
    NonZeroU64::new(DEFAULT_BLOCK_RANGE_LIMIT).unwrap_or(NonZeroU64::MIN)
}

fn default_log_buffer() -> usize {
    DEFAULT_LOG_BUFFER
}

fn default_result_buffer() -> usize {
    DEFAULT_RESULT_BUFFER
}

fn default_explorer_url() -> String {
    DEFAULT_EXPLORER_URL.to_owned()
}

fn default_output_path() -> PathBuf {
    DEFAULT_OUTPUT_PATH.into()
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_config_load() {
        let config_string = r#"
            [rpc]
            endpoint = "wss://node.example:8546"
            max_requests_per_second = 30

            [retrieval]
            block_range_limit = 1000
            result_buffer = 32

            [explorer]
            api_key = "abc"

            [output]
            path = "/tmp/out.txt"

            [logging]
            log_dir = "/var/log/swaplist"
            json_format = true
        "#;

        let config = toml::from_str::<Config>(config_string);
        assert!(
            config.is_ok(),
            "should be able to load TOML config but got: {:?}",
            config.err()
        );
        let config = config.unwrap();

        assert_eq!(config.rpc.endpoint, "wss://node.example:8546");
        assert_eq!(config.rpc.rate_limit().map(NonZeroU32::get), Some(30));
        assert_eq!(config.retrieval.block_range_limit.get(), 1000);
        assert_eq!(config.retrieval.result_buffer, 32);
        assert_eq!(config.retrieval.log_buffer, DEFAULT_LOG_BUFFER);
        assert_eq!(config.explorer.base_url, DEFAULT_EXPLORER_URL);
        assert_eq!(config.explorer.api_key.as_deref(), Some("abc"));
        assert_eq!(config.output.path, PathBuf::from("/tmp/out.txt"));
        assert_eq!(config.logging.json_format, Some(true));
    }

    #[test]
    fn test_default_config_matches_library_defaults() {
        let config = Config::default();

        assert_eq!(config.retrieval.log_buffer, 64);
        assert_eq!(config.retrieval.result_buffer, 10);
        assert_eq!(config.explorer.base_url, "https://api.gnosisscan.io/api");
        assert!(config.explorer.api_key.is_none());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = toml::from_str::<Config>("").unwrap();

        assert_eq!(config.rpc.endpoint, DEFAULT_RPC_ENDPOINT);
        assert_eq!(
            config.rpc.max_requests_per_second,
            DEFAULT_MAX_REQUESTS_PER_SECOND
        );
        assert_eq!(
            config.retrieval.block_range_limit.get(),
            DEFAULT_BLOCK_RANGE_LIMIT
        );
        assert_eq!(config.retrieval.result_buffer, DEFAULT_RESULT_BUFFER);
        assert_eq!(config.output.path, PathBuf::from(DEFAULT_OUTPUT_PATH));
        assert!(config.explorer.api_key.is_none());
        assert!(config.logging.log_dir.is_none());
    }

    #[test]
    fn test_zero_rate_disables_throttling() {
        let config = toml::from_str::<Config>("[rpc]\nmax_requests_per_second = 0").unwrap();
        assert!(config.rpc.rate_limit().is_none());
    }

    #[test]
    fn test_zero_block_range_rejected() {
        let config = toml::from_str::<Config>("[retrieval]\nblock_range_limit = 0");
        assert!(config.is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_RPC_URL, "http://localhost:8545"),
            (ENV_EXPLORER_API_KEY, "from-env"),
            (ENV_LOG_DIR, "  "),
        ]);

        let mut config = Config::default();
        config.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.rpc.endpoint, "http://localhost:8545");
        assert_eq!(config.explorer.api_key.as_deref(), Some("from-env"));
        assert!(config.logging.log_dir.is_none());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("swaplist.toml");
        fs::write(&path, "[output]\npath = \"senders.txt\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.output.path, PathBuf::from("senders.txt"));

        let err = Config::from_file(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));

        fs::write(&path, "[rpc\n").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
