//! Process configuration: a TOML file (optional) overlaid with environment
//! variables. The store URI scheme decides which backend family is used.

use anyhow::{anyhow, Result};
use serde::Deserialize;

pub const DEFAULT_STORE_URI: &str = "memory://";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Verbose logging.
    #[serde(default)]
    pub debug: bool,
    /// Enables the remove-all administrative routes. Never set in production.
    #[serde(default)]
    pub testing: bool,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            worker_threads: None,
            debug: false,
            testing: false,
            log_format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_uri")]
    pub uri: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::with_uri(DEFAULT_STORE_URI)
    }
}

/// Backing store selected by the URI scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreScheme {
    Postgres,
    Sqlite,
    Memory,
    File,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_log_format() -> String { "compact".into() }
fn default_store_uri() -> String { DEFAULT_STORE_URI.into() }
fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 10 }
fn default_acquire_timeout() -> u64 { 10 }
fn default_idle_timeout() -> u64 { 600 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

fn parse_flag(v: &str) -> bool {
    matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

impl AppConfig {
    /// File (when present) + process environment, normalized and validated.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay environment variables read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(uri) = lookup("DATABASE_URI") {
            self.store.uri = uri;
        }
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse::<u16>()
                .map_err(|_| anyhow!("PORT must be an integer in 1..=65535, got {port:?}"))?;
        }
        if let Some(v) = lookup("DEBUG") {
            self.server.debug = parse_flag(&v);
        }
        if let Some(v) = lookup("TESTING") {
            self.server.testing = parse_flag(&v);
        }
        if let Some(v) = lookup("LOG_FORMAT") {
            self.server.log_format = v;
        }
        if let Some(v) = lookup("TOKIO_WORKER_THREADS") {
            self.server.worker_threads = v.trim().parse::<usize>().ok();
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.store.validate()?;
        Ok(())
    }
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StoreConfig {
    pub fn with_uri(uri: &str) -> Self {
        Self {
            uri: uri.to_string(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            acquire_timeout_secs: default_acquire_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            sqlx_logging: false,
        }
    }

    pub fn scheme(&self) -> Result<StoreScheme> {
        let lower = self.uri.trim().to_ascii_lowercase();
        if lower.starts_with("postgres://") || lower.starts_with("postgresql://") {
            Ok(StoreScheme::Postgres)
        } else if lower.starts_with("sqlite:") {
            Ok(StoreScheme::Sqlite)
        } else if lower.starts_with("memory://") {
            Ok(StoreScheme::Memory)
        } else if lower.starts_with("file://") {
            Ok(StoreScheme::File)
        } else {
            Err(anyhow!(
                "unsupported store uri {:?}; expected postgres://, sqlite:, memory:// or file://",
                self.redacted_uri()
            ))
        }
    }

    /// Path component of a `file://` URI.
    pub fn file_path(&self) -> Option<&str> {
        let uri = self.uri.trim();
        uri.get(..7)
            .filter(|p| p.eq_ignore_ascii_case("file://"))
            .map(|_| &uri[7..])
            .filter(|p| !p.is_empty())
    }

    /// In-memory SQLite lives inside a single connection.
    pub fn is_sqlite_memory(&self) -> bool {
        self.scheme().ok() == Some(StoreScheme::Sqlite) && self.uri.contains(":memory:")
    }

    /// URI with any password replaced, safe to log.
    pub fn redacted_uri(&self) -> String {
        let uri = self.uri.trim();
        let Some(scheme_end) = uri.find("://") else { return uri.to_string() };
        let rest = &uri[scheme_end + 3..];
        let Some(at) = rest.find('@') else { return uri.to_string() };
        match rest[..at].find(':') {
            Some(colon) => format!("{}{}:***{}", &uri[..scheme_end + 3], &rest[..colon], &rest[at..]),
            None => uri.to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let scheme = self.scheme()?;
        if scheme == StoreScheme::File && self.file_path().is_none() {
            return Err(anyhow!("file:// store uri must name a path"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("store.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("store.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("store timeouts must be positive seconds"));
        }
        Ok(())
    }
}
