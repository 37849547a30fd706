use crate::domain::parity::Parity;
use thiserror::Error;

/// 配置相關錯誤
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Final query for {parity} parity is not set (empty or placeholder)")]
    Unset { parity: Parity },

    #[error("Missing configuration value: {field}")]
    Missing { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    Invalid {
        field: String,
        value: String,
        reason: String,
    },

    #[error("TOML parsing error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// 網路呼叫錯誤（註冊與提交共用）
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Response from {url} could not be decoded: {reason}")]
    Decode { url: String, reason: String },

    #[error("Registration response is missing `{field}`")]
    MissingField { field: &'static str },
}

/// 持久化錯誤
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Refusing to persist a solution with an empty final query")]
    EmptyQuery,

    /// 紀錄檔某一行無法解析，需手動修復或刪除該行
    #[error("Corrupt record at {path}:{line}: {reason}")]
    Corrupt {
        path: String,
        line: usize,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum SolverError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SolverError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SolverError::Config(_) => ErrorCategory::Configuration,
            SolverError::Network(_) => ErrorCategory::Network,
            SolverError::Storage(_) => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SolverError::Config(_) => ErrorSeverity::High,
            // 遠端回應格式錯誤通常需要人工確認
            SolverError::Network(NetworkError::MissingField { .. })
            | SolverError::Network(NetworkError::Decode { .. }) => ErrorSeverity::High,
            SolverError::Network(_) => ErrorSeverity::Medium,
            SolverError::Storage(_) => ErrorSeverity::Critical,
        }
    }

    /// 提供給使用者的修復建議
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SolverError::Config(ConfigError::Unset { .. }) => {
                "Set queries.odd / queries.even in the configuration file to a real query"
            }
            SolverError::Config(_) => "Check the configuration file and environment variables",
            SolverError::Network(NetworkError::Transport { .. }) => {
                "Check network connectivity and the registration URL, then re-run"
            }
            SolverError::Network(NetworkError::Status { .. }) => {
                "Inspect the response body; the registrant details may be rejected"
            }
            SolverError::Network(_) => {
                "The remote service returned an unexpected payload; verify the endpoint"
            }
            SolverError::Storage(StorageError::Corrupt { .. }) => {
                "Repair or remove the reported line in the solutions file"
            }
            SolverError::Storage(_) => {
                "Make sure storage.path is writable and the disk is not full"
            }
        }
    }
}

pub type Result<T, E = SolverError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_and_severity() {
        let err = SolverError::from(ConfigError::Unset {
            parity: Parity::Odd,
        });
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.to_string().contains("odd"));

        let err = SolverError::from(StorageError::EmptyQuery);
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.severity(), ErrorSeverity::Critical);

        let err = SolverError::from(StorageError::Corrupt {
            path: "solutions.jsonl".to_string(),
            line: 3,
            reason: "EOF while parsing".to_string(),
        });
        assert!(err.recovery_suggestion().contains("Repair or remove"));

        let err = SolverError::from(NetworkError::Status {
            url: "http://x".to_string(),
            status: 503,
            body: String::new(),
        });
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_missing_field_message() {
        let err = NetworkError::MissingField {
            field: "accessToken",
        };
        assert_eq!(
            err.to_string(),
            "Registration response is missing `accessToken`"
        );
    }
}
