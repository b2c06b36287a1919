#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::{IvitError, Result};
use crate::utils::validation::{validate_positive_number, validate_url, Validate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://172.16.92.144";
pub const DEFAULT_PORT: u16 = 6530;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

pub const ENV_BASE_URL: &str = "IVIT_API_BASE_URL";
pub const ENV_PORT: &str = "IVIT_API_PORT";
pub const ENV_TIMEOUT_SECONDS: &str = "IVIT_TIMEOUT_SECONDS";

/// Where the iVIT-T service lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub base_url: String,
    pub port: u16,
    pub timeout_seconds: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            port: DEFAULT_PORT,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl ServiceConfig {
    pub fn new(base_url: impl Into<String>, port: u16) -> Self {
        Self {
            base_url: base_url.into(),
            port,
            ..Default::default()
        }
    }

    /// 依序套用：預設值 → TOML 檔案（若有）→ 環境變數
    pub fn from_sources(file: Option<&toml_config::TomlConfig>) -> Result<Self> {
        let base = file.map(|f| f.service_config()).unwrap_or_default();
        base.with_env_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = parse_env_value(ENV_PORT, &port)?;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_SECONDS) {
            self.timeout_seconds = parse_env_value(ENV_TIMEOUT_SECONDS, &timeout)?;
        }
        Ok(self)
    }

    /// `<base_url>:<port>`，不含結尾斜線
    pub fn service_root(&self) -> String {
        format!("{}:{}", self.base_url.trim_end_matches('/'), self.port)
    }
}

fn parse_env_value<T>(field: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| IvitError::InvalidConfigValueError {
            field: field.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

impl ConfigProvider for ServiceConfig {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;
        validate_positive_number("port", u64::from(self.port), 1)?;
        validate_positive_number("timeout_seconds", self.timeout_seconds, 1)?;
        Ok(())
    }
}
