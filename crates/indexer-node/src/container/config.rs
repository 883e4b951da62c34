//! Layered node configuration: built-in defaults, overlaid by an optional
//! JSON config file, overlaid by environment variables, overlaid last by
//! explicit CLI flags.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use shared_types::ConfigError;

use crate::cli::Cli;

#[derive(Debug, Clone)]
pub struct IndexerOptions {
    pub elastic_index_name: String,
    pub elastic_urls: Vec<String>,
    pub elastic_queue_size: usize,
    pub elastic_abi_cache_size: usize,
    pub elastic_start_block: u32,
    pub elastic_delete_index_on_startup: bool,
}

impl Default for IndexerOptions {
    fn default() -> Self {
        Self {
            elastic_index_name: "chain".to_string(),
            elastic_urls: Vec::new(),
            elastic_queue_size: 10_000,
            elastic_abi_cache_size: 2_048,
            elastic_start_block: 0,
            elastic_delete_index_on_startup: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BlacklistOptions {
    pub signature_provider: Option<String>,
    pub contract: String,
    pub permission: String,
    pub producer_name: Option<String>,
    pub actor_blacklist: Vec<String>,
    pub chain_rpc_url: Option<String>,
}

impl BlacklistOptions {
    fn with_defaults() -> Self {
        Self {
            signature_provider: None,
            contract: "theblacklist".to_string(),
            permission: "blacklist".to_string(),
            producer_name: None,
            actor_blacklist: Vec::new(),
            chain_rpc_url: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryOptions {
    pub log_level: String,
    pub metrics_bind: Option<String>,
}

impl Default for TelemetryOptions {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_bind: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub indexer: IndexerOptions,
    pub blacklist: BlacklistOptions,
    pub telemetry: TelemetryOptions,
    pub http_bind: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            indexer: IndexerOptions::default(),
            blacklist: BlacklistOptions::with_defaults(),
            telemetry: TelemetryOptions::default(),
            http_bind: "127.0.0.1:8080".to_string(),
        }
    }
}

/// The config file layer: every field optional, since the file need only
/// mention what it overrides.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct FileOverrides {
    log_level: Option<String>,
    http_bind: Option<String>,
    metrics_bind: Option<String>,
    elastic_index_name: Option<String>,
    elastic_urls: Option<Vec<String>>,
    elastic_queue_size: Option<usize>,
    elastic_abi_cache_size: Option<usize>,
    elastic_start_block: Option<u32>,
    elastic_delete_index_on_startup: Option<bool>,
    chain_rpc_url: Option<String>,
    blacklist_signature_provider: Option<String>,
    blacklist_contract: Option<String>,
    blacklist_permission: Option<String>,
    producer_name: Option<String>,
    actor_blacklist: Option<Vec<String>>,
}

impl NodeConfig {
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = &cli.config {
            config.apply_file(path)?;
        }
        config.apply_env();
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e.to_string(),
        })?;
        let overrides: FileOverrides = serde_json::from_str(&contents).map_err(|e| ConfigError::FileParse {
            path: path.display().to_string(),
            source: e.to_string(),
        })?;

        if let Some(v) = overrides.log_level {
            self.telemetry.log_level = v;
        }
        if let Some(v) = overrides.http_bind {
            self.http_bind = v;
        }
        if let Some(v) = overrides.metrics_bind {
            self.telemetry.metrics_bind = Some(v);
        }
        if let Some(v) = overrides.elastic_index_name {
            self.indexer.elastic_index_name = v;
        }
        if let Some(v) = overrides.elastic_urls {
            self.indexer.elastic_urls = v;
        }
        if let Some(v) = overrides.elastic_queue_size {
            self.indexer.elastic_queue_size = v;
        }
        if let Some(v) = overrides.elastic_abi_cache_size {
            self.indexer.elastic_abi_cache_size = v;
        }
        if let Some(v) = overrides.elastic_start_block {
            self.indexer.elastic_start_block = v;
        }
        if let Some(v) = overrides.elastic_delete_index_on_startup {
            self.indexer.elastic_delete_index_on_startup = v;
        }
        if let Some(v) = overrides.chain_rpc_url {
            self.blacklist.chain_rpc_url = Some(v);
        }
        if let Some(v) = overrides.blacklist_signature_provider {
            self.blacklist.signature_provider = Some(v);
        }
        if let Some(v) = overrides.blacklist_contract {
            self.blacklist.contract = v;
        }
        if let Some(v) = overrides.blacklist_permission {
            self.blacklist.permission = v;
        }
        if let Some(v) = overrides.producer_name {
            self.blacklist.producer_name = Some(v);
        }
        if let Some(v) = overrides.actor_blacklist {
            self.blacklist.actor_blacklist = v;
        }
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            self.telemetry.log_level = v;
        }
        if let Ok(v) = std::env::var("HTTP_BIND") {
            self.http_bind = v;
        }
        if let Ok(v) = std::env::var("METRICS_BIND") {
            self.telemetry.metrics_bind = Some(v);
        }
        if let Ok(v) = std::env::var("ELASTIC_INDEX_NAME") {
            self.indexer.elastic_index_name = v;
        }
        if let Ok(v) = std::env::var("ELASTIC_URLS") {
            self.indexer.elastic_urls = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
        if let Some(v) = std::env::var("ELASTIC_QUEUE_SIZE").ok().and_then(|v| v.parse().ok()) {
            self.indexer.elastic_queue_size = v;
        }
        if let Some(v) = std::env::var("ELASTIC_ABI_CACHE_SIZE").ok().and_then(|v| v.parse().ok()) {
            self.indexer.elastic_abi_cache_size = v;
        }
        if let Some(v) = std::env::var("ELASTIC_START_BLOCK").ok().and_then(|v| v.parse().ok()) {
            self.indexer.elastic_start_block = v;
        }
        if let Some(v) = std::env::var("ELASTIC_DELETE_INDEX_ON_STARTUP").ok().and_then(|v| v.parse().ok()) {
            self.indexer.elastic_delete_index_on_startup = v;
        }
        if let Ok(v) = std::env::var("CHAIN_RPC_URL") {
            self.blacklist.chain_rpc_url = Some(v);
        }
        if let Ok(v) = std::env::var("BLACKLIST_SIGNATURE_PROVIDER") {
            self.blacklist.signature_provider = Some(v);
        }
        if let Ok(v) = std::env::var("BLACKLIST_CONTRACT") {
            self.blacklist.contract = v;
        }
        if let Ok(v) = std::env::var("BLACKLIST_PERMISSION") {
            self.blacklist.permission = v;
        }
        if let Ok(v) = std::env::var("PRODUCER_NAME") {
            self.blacklist.producer_name = Some(v);
        }
        if let Ok(v) = std::env::var("ACTOR_BLACKLIST") {
            self.blacklist.actor_blacklist = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(v) = &cli.log_level {
            self.telemetry.log_level = v.clone();
        }
        if let Some(v) = &cli.http_bind {
            self.http_bind = v.clone();
        }
        if let Some(v) = &cli.metrics_bind {
            self.telemetry.metrics_bind = Some(v.clone());
        }
        if let Some(v) = &cli.elastic_index_name {
            self.indexer.elastic_index_name = v.clone();
        }
        if !cli.elastic_urls.is_empty() {
            self.indexer.elastic_urls = cli.elastic_urls.clone();
        }
        if let Some(v) = cli.elastic_queue_size {
            self.indexer.elastic_queue_size = v;
        }
        if let Some(v) = cli.elastic_abi_cache_size {
            self.indexer.elastic_abi_cache_size = v;
        }
        if let Some(v) = cli.elastic_start_block {
            self.indexer.elastic_start_block = v;
        }
        if cli.elastic_delete_index_on_startup {
            self.indexer.elastic_delete_index_on_startup = true;
        }
        if let Some(v) = &cli.chain_rpc_url {
            self.blacklist.chain_rpc_url = Some(v.clone());
        }
        if let Some(v) = &cli.blacklist_signature_provider {
            self.blacklist.signature_provider = Some(v.clone());
        }
        if let Some(v) = &cli.blacklist_contract {
            self.blacklist.contract = v.clone();
        }
        if let Some(v) = &cli.blacklist_permission {
            self.blacklist.permission = v.clone();
        }
        if let Some(v) = &cli.producer_name {
            self.blacklist.producer_name = Some(v.clone());
        }
        if !cli.actor_blacklist.is_empty() {
            self.blacklist.actor_blacklist = cli.actor_blacklist.clone();
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.indexer.elastic_urls.is_empty() {
            return Err(ConfigError::NoBackendUrls);
        }
        if self.indexer.elastic_queue_size == 0 {
            return Err(ConfigError::MustBePositive { field: "elastic-queue-size" });
        }
        if self.indexer.elastic_abi_cache_size == 0 {
            return Err(ConfigError::MustBePositive { field: "elastic-abi-cache-size" });
        }
        // The blacklist reconciler's on-chain table reads have no other
        // transport; without it the plugin can install its HTTP route but
        // every `check_hash` call would fail immediately. Treated as fatal
        // at init rather than deferred to first use.
        if self.blacklist.chain_rpc_url.is_none() {
            return Err(ConfigError::MissingDependency(
                "chain-rpc-url is required for blacklist on-chain table reads".to_string(),
            ));
        }
        Ok(())
    }
}
