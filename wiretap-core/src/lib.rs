pub mod config;
pub mod error;

pub use config::{AccessLogConfig, AppConfig, FileSinkConfig, PushSinkConfig, ServerConfig};
pub use error::WiretapError;
