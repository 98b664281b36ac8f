pub mod cli;
pub mod load_config;
pub mod push_client;

pub use cli::{exit_code, run, Cli, Commands};
