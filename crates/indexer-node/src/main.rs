use clap::Parser;
use indexer_node::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    indexer_node::wiring::run(cli).await
}
