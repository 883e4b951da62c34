//! Adapters binding this workspace's ports to real, external collaborators:
//! the chain controller's signal bus and the chain's `get_table_rows` RPC.

pub mod chain_table;
pub mod controller_bridge;

pub use chain_table::HttpChainTableClient;
pub use controller_bridge::ControllerBridge;
