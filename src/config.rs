use clap::{Parser, ValueEnum};
use std::net::{AddrParseError, SocketAddr};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "agrichain",
    version,
    about = "Hash-linked provenance ledger for farm sensor readings"
)]
pub struct Config {
    /// Listen address: a bare port binds every interface, otherwise host:port
    #[arg(long, env = "ADDR", default_value = "8000")]
    pub addr: String,

    /// Log output format
    #[arg(long, env = "AGRICHAIN_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Log the whole ledger at debug level after every append
    #[arg(long, env = "AGRICHAIN_DUMP_CHAIN")]
    pub dump_chain: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Load `KEY=value` pairs from `.env` in the working directory, or one of its
/// parents. Returns the file used, if any. Existing variables are not overridden.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Load `KEY=value` pairs from `path`. Existing variables are not overridden.
pub fn load_env_file(path: &Path) -> bool {
    dotenvy::from_path(path).is_ok()
}

impl Config {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let addr = self.addr.trim();
        if addr.contains(':') {
            addr.parse()
        } else {
            format!("0.0.0.0:{}", addr).parse()
        }
    }
}
