//! Command-line surface. Every option here is optional: a value left unset
//! falls through to the config file layer, then the environment, then the
//! built-in default (defaults -> config file -> env -> CLI flags, in that
//! precedence).

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "indexer-node")]
#[command(about = "Chain-data indexer and blacklist integrity checker")]
pub struct Cli {
    /// Path to a JSON config file overlaying the built-in defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// `RUST_LOG`-compatible filter string.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Local address to bind the blacklist HTTP surface to.
    #[arg(long)]
    pub http_bind: Option<String>,

    /// Local address to expose the Prometheus `/metrics` scrape endpoint
    /// on. Left unset disables the metrics listener.
    #[arg(long)]
    pub metrics_bind: Option<String>,

    /// Base URL(s) of the Elasticsearch-compatible document store. May be
    /// repeated; tried in order by the store client.
    #[arg(long = "elastic-url")]
    pub elastic_urls: Vec<String>,

    /// Index name the document store client addresses.
    #[arg(long)]
    pub elastic_index_name: Option<String>,

    /// Bound applied to each of the four ingestion queues.
    #[arg(long)]
    pub elastic_queue_size: Option<usize>,

    /// Bound applied to the ABI cache.
    #[arg(long)]
    pub elastic_abi_cache_size: Option<usize>,

    /// First accepted block number the pipeline writes.
    #[arg(long)]
    pub elastic_start_block: Option<u32>,

    /// Drop and recreate the index at startup instead of reusing it.
    #[arg(long)]
    pub elastic_delete_index_on_startup: bool,

    /// Base URL of the chain's `get_table_rows`-style RPC, used by the
    /// blacklist reconciler to read on-chain tables.
    #[arg(long)]
    pub chain_rpc_url: Option<String>,

    /// `PUBKEY=SCHEME:PAYLOAD`.
    #[arg(long)]
    pub blacklist_signature_provider: Option<String>,

    /// On-chain contract (and table scope) the blacklist plugin reads.
    #[arg(long)]
    pub blacklist_contract: Option<String>,

    /// Permission used when signing a correction submission.
    #[arg(long)]
    pub blacklist_permission: Option<String>,

    /// This producer's name, consumed for the submitted-hash lookup.
    #[arg(long)]
    pub producer_name: Option<String>,

    /// Locally enforced blacklist account set. May be repeated.
    #[arg(long = "actor-blacklist")]
    pub actor_blacklist: Vec<String>,
}
