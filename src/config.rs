// src/config.rs

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use dotenvy::dotenv;
use url::Url;

/// Tick period of the job poller when `POLL_INTERVAL_MS` is unset.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 4000;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote study-content backend. Always ends with '/'.
    pub api_base_url: Url,
    pub data_dir: PathBuf,
    pub listen_addr: SocketAddr,
    pub poll_interval: Duration,
    pub rust_log: String,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let api_base_url = env::var("API_BASE_URL").expect("API_BASE_URL must be set");
        let api_base_url = parse_base_url(&api_base_url).expect("API_BASE_URL must be an absolute URL");

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let listen_addr = env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3001".to_string())
            .parse()
            .expect("LISTEN_ADDR must be a socket address");

        let poll_interval = env::var("POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let log_dir = env::var("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("logs"));

        Self {
            api_base_url,
            data_dir,
            listen_addr,
            poll_interval: Duration::from_millis(poll_interval),
            rust_log,
            log_dir,
        }
    }
}

/// Parses a backend base URL, appending a trailing slash so `Url::join` keeps the path prefix.
pub fn parse_base_url(raw: &str) -> Result<Url, url::ParseError> {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("{}/", trimmed))
    }
}
