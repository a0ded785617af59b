use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding every record. Relative paths resolve against the working directory.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    /// Rewrite through a temporary file and rename instead of overwriting in place.
    #[serde(default = "default_atomic_writes")]
    pub atomic_writes: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_file: default_data_file(), atomic_writes: default_atomic_writes() }
    }
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 8080 }
fn default_data_file() -> PathBuf { PathBuf::from("data.json") }
fn default_atomic_writes() -> bool { true }

/// Load from `CONFIG_PATH` (default `config.toml`). A missing file yields defaults.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    match std::fs::read_to_string(&path) {
        Ok(content) => parse(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(anyhow!("cannot read {path}: {e}")),
    }
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// File config, then environment overrides, then normalization.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.apply_env(|key| std::env::var(key).ok());
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Apply overrides from an environment lookup.
    /// `PORT` wins over `SERVER_PORT` because hosting platforms inject it.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(host) = get("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT").or_else(|| get("SERVER_PORT")).and_then(|p| p.trim().parse().ok()) {
            self.server.port = port;
        }
        if let Some(w) = get("TOKIO_WORKER_THREADS").and_then(|w| w.trim().parse().ok()) {
            self.server.worker_threads = Some(w);
        }
        if let Some(file) = get("DATA_FILE") {
            self.storage.data_file = PathBuf::from(file);
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.data_file.as_os_str().is_empty() {
            return Err(anyhow!("storage.data_file must not be empty"));
        }
        Ok(())
    }
}
