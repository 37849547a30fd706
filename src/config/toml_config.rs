use crate::domain::model::RegistrationRequest;
use crate::domain::query::DEFAULT_PLACEHOLDER_MARKERS;
use crate::utils::error::ConfigError;
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

pub const DEFAULT_STORAGE_PATH: &str = "./data/solutions.jsonl";

static ENV_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env reference pattern is a valid regex"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    pub registrant: RegistrantConfig,
    pub endpoints: EndpointsConfig,
    pub queries: QueriesConfig,
    pub storage: Option<StorageConfig>,
    pub http: Option<HttpConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrantConfig {
    pub name: String,
    pub identifier: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    pub registration_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueriesConfig {
    #[serde(default)]
    pub odd: String,
    #[serde(default)]
    pub even: String,
    pub placeholder_markers: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: Option<StorageBackend>,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

impl SolverConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    ///
    /// 先解析再替換環境變數，變數內容含引號或換行也不會破壞 TOML 結構。
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut document: toml::Value = toml::from_str(content)?;
        Self::substitute_in_value(&mut document);
        Ok(document.try_into()?)
    }

    fn substitute_in_value(value: &mut toml::Value) {
        match value {
            toml::Value::String(text) => *text = Self::substitute_env_vars(text),
            toml::Value::Array(items) => items.iter_mut().for_each(Self::substitute_in_value),
            toml::Value::Table(table) => table
                .iter_mut()
                .for_each(|(_, item)| Self::substitute_in_value(item)),
            _ => {}
        }
    }

    /// 替換環境變數 (例如 ${FINAL_QUERY_ODD})，找不到的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_REF
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 驗證配置的合理性
    ///
    /// 查詢字串不在這裡檢查：只有被選中的那一條才重要，由執行流程判斷。
    pub fn validate_config(&self) -> Result<(), ConfigError> {
        validation::validate_url("endpoints.registration_url", &self.endpoints.registration_url)?;

        validation::validate_non_empty_string("registrant.name", &self.registrant.name)?;
        validation::validate_non_empty_string("registrant.identifier", &self.registrant.identifier)?;
        validation::validate_no_whitespace("registrant.identifier", &self.registrant.identifier)?;
        validation::validate_email("registrant.email", &self.registrant.email)?;

        if self.storage_backend() == StorageBackend::File {
            validation::validate_path("storage.path", self.storage_path())?;
        }

        if let Some(timeout) = self.http.as_ref().and_then(|h| h.timeout_seconds) {
            validation::validate_positive_number("http.timeout_seconds", timeout, 1)?;
        }

        Ok(())
    }

    pub fn registration_request(&self) -> RegistrationRequest {
        RegistrationRequest {
            name: self.registrant.name.clone(),
            identifier: self.registrant.identifier.clone(),
            email: self.registrant.email.clone(),
        }
    }

    pub fn registration_url(&self) -> &str {
        &self.endpoints.registration_url
    }

    pub fn placeholder_markers(&self) -> Vec<String> {
        match &self.queries.placeholder_markers {
            Some(markers) => markers.clone(),
            None => DEFAULT_PLACEHOLDER_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage
            .as_ref()
            .and_then(|s| s.backend)
            .unwrap_or_default()
    }

    pub fn storage_path(&self) -> &str {
        self.storage
            .as_ref()
            .and_then(|s| s.path.as_deref())
            .unwrap_or(DEFAULT_STORAGE_PATH)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.http
            .as_ref()
            .and_then(|h| h.timeout_seconds)
            .map(Duration::from_secs)
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.http.as_ref().and_then(|h| h.user_agent.as_deref())
    }
}

impl Validate for SolverConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_config()
    }
}
