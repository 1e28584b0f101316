pub mod config;
pub mod credentials;
pub mod logger;
pub(crate) mod settings_toml;

pub use config::*;
pub use credentials::{api_key, env_value, load_env_file};
pub use logger::setup_logging;
