//! Process-wide configuration, assembled once at startup from the layered
//! sources `config::NodeConfig::load` reads.

pub mod config;

pub use config::NodeConfig;
