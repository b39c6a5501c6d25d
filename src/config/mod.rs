pub mod app;

pub use app::{AppConfig, HttpConfig, SourceConfig, ENV_CONFIG_PATH};
