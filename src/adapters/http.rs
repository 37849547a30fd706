use crate::domain::model::{RegistrationRequest, RegistrationResponse, SubmissionResult};
use crate::domain::ports::{RegistrationClient, SubmissionClient};
use crate::utils::error::{ConfigError, NetworkError};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// 建立共用的 HTTP client；未設定逾時則沿用 reqwest 預設值
pub fn build_client(timeout: Option<Duration>, user_agent: Option<&str>) -> Result<Client, ConfigError> {
    let mut builder = Client::builder();

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(user_agent) = user_agent {
        builder = builder.user_agent(user_agent.to_string());
    }

    builder.build().map_err(|e| ConfigError::Invalid {
        field: "http".to_string(),
        value: format!("timeout={:?} user_agent={:?}", timeout, user_agent),
        reason: e.to_string(),
    })
}

/// 讀取回應內容；非 2xx 狀態視為錯誤，空內容回傳 `Value::Null`
async fn read_json_body(url: &str, response: Response) -> Result<Value, NetworkError> {
    let status = response.status();
    tracing::debug!("Response from {}: {}", url, status);

    let body = response.text().await.map_err(|source| NetworkError::Transport {
        url: url.to_string(),
        source,
    })?;

    if !status.is_success() {
        return Err(NetworkError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&body).map_err(|e| NetworkError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct GenerateWebhookResponse {
    webhook: Option<String>,
    #[serde(rename = "accessToken")]
    access_token: Option<String>,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, NetworkError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(NetworkError::MissingField { field })
}

#[derive(Debug, Clone)]
pub struct HttpRegistrationClient {
    client: Client,
    endpoint: String,
}

impl HttpRegistrationClient {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl RegistrationClient for HttpRegistrationClient {
    async fn register(
        &self,
        request: &RegistrationRequest,
    ) -> Result<RegistrationResponse, NetworkError> {
        tracing::debug!("Making registration request to: {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|source| NetworkError::Transport {
                url: self.endpoint.clone(),
                source,
            })?;

        let body = read_json_body(&self.endpoint, response).await?;
        if body.is_null() {
            return Err(NetworkError::MissingField { field: "webhook" });
        }

        let generated: GenerateWebhookResponse =
            serde_json::from_value(body).map_err(|e| NetworkError::Decode {
                url: self.endpoint.clone(),
                reason: e.to_string(),
            })?;

        Ok(RegistrationResponse {
            webhook_url: required(generated.webhook, "webhook")?,
            access_token: required(generated.access_token, "accessToken")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct HttpSubmissionClient {
    client: Client,
}

impl HttpSubmissionClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl SubmissionClient for HttpSubmissionClient {
    async fn submit(
        &self,
        webhook_url: &str,
        access_token: &str,
        final_query: &str,
    ) -> Result<SubmissionResult, NetworkError> {
        tracing::debug!("Submitting final query to: {}", webhook_url);

        let response = self
            .client
            .post(webhook_url)
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "finalQuery": final_query }))
            .send()
            .await
            .map_err(|source| NetworkError::Transport {
                url: webhook_url.to_string(),
                source,
            })?;

        let body = read_json_body(webhook_url, response).await?;
        Ok(SubmissionResult::from_json(body))
    }
}
