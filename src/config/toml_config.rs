use crate::config::ServiceConfig;
use crate::utils::error::{IvitError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub service: Option<ServiceSection>,
    pub logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceSection {
    pub base_url: Option<String>,
    pub port: Option<u16>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(IvitError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| IvitError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${IVIT_HOST})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| IvitError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 將 `[service]` 疊加在預設值上
    pub fn service_config(&self) -> ServiceConfig {
        let mut config = ServiceConfig::default();
        if let Some(service) = &self.service {
            if let Some(base_url) = &service.base_url {
                config.base_url = base_url.clone();
            }
            if let Some(port) = service.port {
                config.port = port;
            }
            if let Some(timeout) = service.timeout_seconds {
                config.timeout_seconds = timeout;
            }
        }
        config
    }

    pub fn verbose(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.verbose).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.service_config().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_service_section() {
        let toml_content = r#"
[service]
base_url = "http://192.168.1.20"
port = 7000

[logging]
json = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let service = config.service_config();

        assert_eq!(service.service_root(), "http://192.168.1.20:7000");
        assert_eq!(service.timeout_seconds, crate::config::DEFAULT_TIMEOUT_SECONDS);
        assert!(config.json_logs());
        assert!(!config.verbose());
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.service_config(), ServiceConfig::default());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("IVIT_TOML_TEST_HOST", "http://ivit.internal");

        let toml_content = r#"
[service]
base_url = "${IVIT_TOML_TEST_HOST}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.service_config().base_url, "http://ivit.internal");

        std::env::remove_var("IVIT_TOML_TEST_HOST");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[service]
base_url = "invalid-url"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[service]\nport = 6531\ntimeout_seconds = 30\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        let service = config.service_config();
        assert_eq!(service.port, 6531);
        assert_eq!(service.timeout_seconds, 30);
    }
}
