use crate::domain::model::{RegistrationRequest, RegistrationResponse, Solution, SubmissionResult};
use crate::utils::error::{NetworkError, StorageError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// 只追加的提交紀錄儲存
pub trait SolutionStore: Send + Sync {
    fn save(
        &self,
        identifier: &str,
        webhook_url: &str,
        final_query: &str,
        created_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Solution, StorageError>> + Send;
}

#[async_trait]
pub trait RegistrationClient: Send + Sync {
    async fn register(
        &self,
        request: &RegistrationRequest,
    ) -> Result<RegistrationResponse, NetworkError>;
}

#[async_trait]
pub trait SubmissionClient: Send + Sync {
    async fn submit(
        &self,
        webhook_url: &str,
        access_token: &str,
        final_query: &str,
    ) -> Result<SubmissionResult, NetworkError>;
}
