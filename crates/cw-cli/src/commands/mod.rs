//! CLI command implementations

mod config;
mod connect;

pub use config::{config_get, config_init, config_show, load_console_config, resolve_config_path};
pub use connect::{connect_command, parse_viewport, ConnectArgs};
