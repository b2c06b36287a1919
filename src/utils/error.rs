use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IvitError {
    #[error("Failed to call API: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("HTTP Error: {status}")]
    HttpStatusError { status: u16 },

    #[error("Response format error: {detail}")]
    ResponseFormatError { detail: String },

    #[error("project not found: {name}")]
    ProjectNotFoundError { name: String },

    #[error("project name '{}' is ambiguous, matching ids: {}", .name, .candidates.join(", "))]
    AmbiguousProjectError { name: String, candidates: Vec<String> },

    #[error("parameter construction failed: {reason}")]
    ParameterConstructionError { reason: String },

    #[error("Invalid input for '{field}': {reason}")]
    InvalidInputError { field: String, reason: String },

    #[error("Request failed: {message}")]
    RejectedError { message: String },

    #[error("Unknown tool: {name}")]
    UnknownToolError { name: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// 錯誤類別，用於日誌與退出碼判斷
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Remote,
    Domain,
    Input,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// CLI 退出碼
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl IvitError {
    pub fn response_format(detail: impl Into<String>) -> Self {
        Self::ResponseFormatError {
            detail: detail.into(),
        }
    }

    pub fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInputError {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TransportError(_) | Self::HttpStatusError { .. } => ErrorCategory::Network,
            Self::ResponseFormatError { .. } | Self::RejectedError { .. } => ErrorCategory::Remote,
            Self::ProjectNotFoundError { .. }
            | Self::AmbiguousProjectError { .. }
            | Self::ParameterConstructionError { .. } => ErrorCategory::Domain,
            Self::InvalidInputError { .. } | Self::UnknownToolError { .. } => ErrorCategory::Input,
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Remote | ErrorCategory::Domain | ErrorCategory::Input => {
                ErrorSeverity::High
            }
            ErrorCategory::Configuration | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 顯示給使用者（或對話代理）的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ProjectNotFoundError { name } => {
                format!("Failed to find project '{}' in iVIT-T (project not found)", name)
            }
            Self::TransportError(e) if e.is_timeout() => {
                format!("Failed to call API: request to iVIT-T timed out ({})", e)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::TransportError(_) => "Check that the iVIT-T service is reachable at the configured base URL and port",
            Self::HttpStatusError { .. } => "Check the iVIT-T service logs; the endpoint returned a non-success status",
            Self::ResponseFormatError { .. } => "The iVIT-T API version may not match this client",
            Self::ProjectNotFoundError { .. } => "List projects with get_ivit_project and use an exact project name",
            Self::AmbiguousProjectError { .. } => "Rename one of the duplicated projects in iVIT-T",
            Self::ParameterConstructionError { .. } => "Check the project's default training parameters on the server",
            Self::InvalidInputError { .. } => "Fix the tool arguments and try again",
            Self::RejectedError { .. } => "Read the server message; the training request was refused",
            Self::UnknownToolError { .. } => "Run the `tools` command to list available tools",
            Self::IoError(_) => "Check file paths and permissions",
            Self::SerializationError(_) => "Check that the JSON input is well formed",
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Check the configuration file, IVIT_* environment variables and CLI flags"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, IvitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_display_text() {
        let err = IvitError::HttpStatusError { status: 503 };
        assert_eq!(err.to_string(), "HTTP Error: 503");

        let err = IvitError::RejectedError {
            message: "dataset is empty".to_string(),
        };
        assert_eq!(err.to_string(), "Request failed: dataset is empty");

        let err = IvitError::AmbiguousProjectError {
            name: "dup".to_string(),
            candidates: vec!["a".to_string(), "b".to_string()],
        };
        assert!(err.to_string().contains("a, b"));
    }

    #[test]
    fn test_project_not_found_is_domain_error() {
        let err = IvitError::ProjectNotFoundError {
            name: "unknown_project".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Domain);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("project not found"));
    }

    #[test]
    fn test_exit_codes_follow_severity() {
        let network = IvitError::HttpStatusError { status: 502 };
        assert_eq!(network.severity().exit_code(), 2);

        let domain = IvitError::ParameterConstructionError {
            reason: "default model 'yolov3' is not available".to_string(),
        };
        assert_eq!(domain.severity().exit_code(), 1);

        let config = IvitError::ConfigError {
            message: "bad file".to_string(),
        };
        assert_eq!(config.severity().exit_code(), 3);
    }
}
