use crate::config::SolverConfig;
use crate::domain::model::{RegistrationRequest, Solution, SubmissionResult};
use crate::domain::parity::{resolve_parity, Parity};
use crate::domain::ports::{RegistrationClient, SolutionStore, SubmissionClient};
use crate::domain::query::select_query_with_markers;
use crate::domain::state_machine::{transition, RunEvent, RunState};
use crate::utils::error::{ConfigError, NetworkError, SolverError};
use chrono::Utc;

/// 一次執行所需的全部設定，建立後不再變動
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub request: RegistrationRequest,
    pub odd_query: String,
    pub even_query: String,
    pub placeholder_markers: Vec<String>,
}

impl From<&SolverConfig> for RunSettings {
    fn from(config: &SolverConfig) -> Self {
        Self {
            request: config.registration_request(),
            odd_query: config.queries.odd.clone(),
            even_query: config.queries.even.clone(),
            placeholder_markers: config.placeholder_markers(),
        }
    }
}

/// 不經網路即可推導出的決策結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub parity: Parity,
    pub final_query: String,
}

impl RunSettings {
    pub fn identifier(&self) -> &str {
        &self.request.identifier
    }

    pub fn plan(&self) -> Result<RunPlan, ConfigError> {
        let is_odd = resolve_parity(self.identifier());
        let final_query = select_query_with_markers(
            is_odd,
            &self.odd_query,
            &self.even_query,
            &self.placeholder_markers,
        )?;

        Ok(RunPlan {
            parity: Parity::from(is_odd),
            final_query,
        })
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub state: RunState,
    pub parity: Option<Parity>,
    pub solution: Option<Solution>,
    /// 有嘗試提交才會有值；失敗時內容為空
    pub submission: Option<SubmissionResult>,
    pub submission_error: Option<NetworkError>,
    /// 導致中止的錯誤
    pub failure: Option<SolverError>,
}

impl RunReport {
    fn new() -> Self {
        Self {
            state: RunState::Start,
            parity: None,
            solution: None,
            submission: None,
            submission_error: None,
            failure: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == RunState::Done
    }

    pub fn is_aborted(&self) -> bool {
        self.state == RunState::Aborted
    }

    pub fn summary(&self) -> String {
        match (&self.state, &self.failure, &self.submission_error) {
            (RunState::Aborted, Some(failure), _) => format!("aborted: {}", failure),
            (RunState::Done, _, Some(error)) => format!(
                "done (solution {} saved, submission failed: {})",
                self.solution_id(),
                error
            ),
            (RunState::Done, _, None) => {
                format!("done (solution {} saved and submitted)", self.solution_id())
            }
            (state, _, _) => format!("stopped in state {}", state),
        }
    }

    fn solution_id(&self) -> String {
        self.solution
            .as_ref()
            .map(|s| s.id.to_string())
            .unwrap_or_else(|| "-".to_string())
    }

    fn advance(&mut self, event: RunEvent) {
        match transition(self.state, &event) {
            Ok(next) => {
                tracing::debug!("State {} -> {}", self.state, next);
                self.state = next;
            }
            Err(e) => tracing::error!("Invalid state transition: {}", e),
        }
    }

    fn abort(mut self, error: SolverError) -> Self {
        tracing::error!(
            category = ?error.category(),
            severity = ?error.severity(),
            suggestion = error.recovery_suggestion(),
            "❌ Run aborted after {}: {}",
            self.state,
            error
        );
        self.advance(RunEvent::StepFailed {
            reason: error.to_string(),
        });
        self.failure = Some(error);
        self
    }
}

/// 依序執行：註冊、判斷奇偶、選擇查詢、保存、提交
pub struct Orchestrator<R, S, St>
where
    R: RegistrationClient,
    S: SubmissionClient,
    St: SolutionStore,
{
    settings: RunSettings,
    registrar: R,
    submitter: S,
    store: St,
}

impl<R, S, St> Orchestrator<R, S, St>
where
    R: RegistrationClient,
    S: SubmissionClient,
    St: SolutionStore,
{
    pub fn new(settings: RunSettings, registrar: R, submitter: S, store: St) -> Self {
        Self {
            settings,
            registrar,
            submitter,
            store,
        }
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    /// 執行一次完整流程。錯誤只記錄在報告中，不會往外拋。
    pub async fn run(&self) -> RunReport {
        let mut report = RunReport::new();
        let identifier = self.settings.identifier();

        tracing::info!("🚀 Starting run, registering '{}'", identifier);

        // 1) 註冊並取得 webhook 與 token
        let registration = match self.registrar.register(&self.settings.request).await {
            Ok(registration) => registration,
            Err(e) => return report.abort(e.into()),
        };
        tracing::info!(
            "📡 Received webhook={} accessTokenPresent={}",
            registration.webhook_url,
            !registration.access_token.is_empty()
        );
        report.advance(RunEvent::RegistrationSucceeded);

        // 2) 以識別碼數字判斷奇偶
        let is_odd = resolve_parity(identifier);
        let parity = Parity::from(is_odd);
        report.parity = Some(parity);
        tracing::info!("🔢 Identifier '{}' -> {} parity", identifier, parity);
        report.advance(RunEvent::ParityResolved);

        // 3) 選擇最終查詢
        let final_query = match select_query_with_markers(
            is_odd,
            &self.settings.odd_query,
            &self.settings.even_query,
            &self.settings.placeholder_markers,
        ) {
            Ok(query) => query,
            Err(e) => return report.abort(e.into()),
        };
        report.advance(RunEvent::QuerySelected);

        // 4) 先保存再提交
        let solution = match self
            .store
            .save(identifier, &registration.webhook_url, &final_query, Utc::now())
            .await
        {
            Ok(solution) => solution,
            Err(e) => return report.abort(e.into()),
        };
        tracing::info!("💾 Saved solution id={}", solution.id);
        report.solution = Some(solution);
        report.advance(RunEvent::SolutionPersisted);

        // 5) 提交失敗只記錄，不中止
        match self
            .submitter
            .submit(
                &registration.webhook_url,
                &registration.access_token,
                &final_query,
            )
            .await
        {
            Ok(result) => {
                tracing::info!("📨 Submission response: {}", describe_response(&result));
                report.submission = Some(result);
                report.advance(RunEvent::SubmissionAttempted { succeeded: true });
            }
            Err(e) => {
                tracing::error!("❌ Error submitting final query to webhook: {}", e);
                report.submission = Some(SubmissionResult::default());
                report.submission_error = Some(e);
                report.advance(RunEvent::SubmissionAttempted { succeeded: false });
            }
        }

        report.advance(RunEvent::Finished);
        tracing::info!("✅ Run finished: {}", report.summary());
        report
    }
}

fn describe_response(result: &SubmissionResult) -> String {
    match &result.raw_response {
        Some(map) => serde_json::Value::Object(map.clone()).to_string(),
        None => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemorySolutionStore;
    use crate::domain::model::RegistrationResponse;
    use crate::utils::error::StorageError;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct StubRegistrar {
        response: Option<RegistrationResponse>,
        calls: AtomicUsize,
    }

    impl StubRegistrar {
        fn ok(webhook: &str, token: &str) -> Self {
            Self {
                response: Some(RegistrationResponse {
                    webhook_url: webhook.to_string(),
                    access_token: token.to_string(),
                }),
                calls: AtomicUsize::new(0),
            }
        }

        fn missing_token() -> Self {
            Self {
                response: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RegistrationClient for StubRegistrar {
        async fn register(
            &self,
            _request: &RegistrationRequest,
        ) -> Result<RegistrationResponse, NetworkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone().ok_or(NetworkError::MissingField {
                field: "accessToken",
            })
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSubmitter {
        calls: Arc<Mutex<Vec<(String, String, String)>>>,
        fail: bool,
    }

    #[async_trait]
    impl SubmissionClient for RecordingSubmitter {
        async fn submit(
            &self,
            webhook_url: &str,
            access_token: &str,
            final_query: &str,
        ) -> Result<SubmissionResult, NetworkError> {
            self.calls.lock().unwrap().push((
                webhook_url.to_string(),
                access_token.to_string(),
                final_query.to_string(),
            ));
            if self.fail {
                Err(NetworkError::Status {
                    url: webhook_url.to_string(),
                    status: 502,
                    body: "bad gateway".to_string(),
                })
            } else {
                Ok(SubmissionResult::from_json(serde_json::json!({"success": true})))
            }
        }
    }

    struct FailingStore;

    impl SolutionStore for FailingStore {
        async fn save(
            &self,
            _identifier: &str,
            _webhook_url: &str,
            _final_query: &str,
            _created_at: DateTime<Utc>,
        ) -> Result<Solution, StorageError> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only filesystem",
            )))
        }
    }

    fn settings(identifier: &str, odd: &str, even: &str) -> RunSettings {
        RunSettings {
            request: RegistrationRequest {
                name: "Jane Doe".to_string(),
                identifier: identifier.to_string(),
                email: "jane@example.com".to_string(),
            },
            odd_query: odd.to_string(),
            even_query: even.to_string(),
            placeholder_markers: vec!["PUT YOUR".to_string()],
        }
    }

    #[tokio::test]
    async fn test_even_identifier_happy_path() {
        let submitter = RecordingSubmitter::default();
        let orchestrator = Orchestrator::new(
            settings("REG1234", "SELECT odd", "SELECT even"),
            StubRegistrar::ok("https://x/submit", "tok"),
            submitter.clone(),
            MemorySolutionStore::new(),
        );

        let report = orchestrator.run().await;

        assert!(report.is_done());
        assert_eq!(report.parity, Some(Parity::Even));
        assert!(report.failure.is_none());
        assert!(report.submission_error.is_none());

        let saved = orchestrator.store().solutions();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].final_query, "SELECT even");
        assert_eq!(saved[0].webhook_url, "https://x/submit");
        assert_eq!(saved[0].identifier, "REG1234");
        assert_eq!(report.solution.as_ref(), Some(&saved[0]));

        let calls = submitter.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![(
                "https://x/submit".to_string(),
                "tok".to_string(),
                "SELECT even".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_registration_failure_aborts_before_storage() {
        let submitter = RecordingSubmitter::default();
        let orchestrator = Orchestrator::new(
            settings("REG1234", "SELECT odd", "SELECT even"),
            StubRegistrar::missing_token(),
            submitter.clone(),
            MemorySolutionStore::new(),
        );

        let report = orchestrator.run().await;

        assert!(report.is_aborted());
        assert!(matches!(
            report.failure,
            Some(SolverError::Network(NetworkError::MissingField { .. }))
        ));
        assert!(report.parity.is_none());
        assert!(orchestrator.store().solutions().is_empty());
        assert!(submitter.calls.lock().unwrap().is_empty());
        assert!(report.summary().starts_with("aborted"));
    }

    #[tokio::test]
    async fn test_placeholder_query_aborts_after_registration() {
        let submitter = RecordingSubmitter::default();
        let registrar = StubRegistrar::ok("https://x/submit", "tok");
        let orchestrator = Orchestrator::new(
            settings("REG12345", "PUT YOUR SQL HERE", "SELECT even"),
            registrar,
            submitter.clone(),
            MemorySolutionStore::new(),
        );

        let report = orchestrator.run().await;

        assert!(report.is_aborted());
        assert_eq!(report.parity, Some(Parity::Odd));
        assert!(matches!(
            report.failure,
            Some(SolverError::Config(ConfigError::Unset {
                parity: Parity::Odd
            }))
        ));
        assert_eq!(orchestrator.registrar.calls.load(Ordering::SeqCst), 1);
        assert!(orchestrator.store().solutions().is_empty());
        assert!(submitter.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_skips_submission() {
        let submitter = RecordingSubmitter::default();
        let orchestrator = Orchestrator::new(
            settings("REG1234", "SELECT odd", "SELECT even"),
            StubRegistrar::ok("https://x/submit", "tok"),
            submitter.clone(),
            FailingStore,
        );

        let report = orchestrator.run().await;

        assert!(report.is_aborted());
        assert!(matches!(report.failure, Some(SolverError::Storage(_))));
        assert!(report.solution.is_none());
        assert!(submitter.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submission_failure_is_absorbed() {
        let submitter = RecordingSubmitter {
            fail: true,
            ..Default::default()
        };
        let orchestrator = Orchestrator::new(
            settings("REG1234", "SELECT odd", "SELECT even"),
            StubRegistrar::ok("https://x/submit", "tok"),
            submitter.clone(),
            MemorySolutionStore::new(),
        );

        let report = orchestrator.run().await;

        assert!(report.is_done());
        assert!(report.failure.is_none());
        assert!(matches!(
            report.submission_error,
            Some(NetworkError::Status { status: 502, .. })
        ));
        assert_eq!(report.submission, Some(SubmissionResult::default()));
        assert_eq!(orchestrator.store().solutions().len(), 1);
        assert_eq!(submitter.calls.lock().unwrap().len(), 1);
        assert!(report.summary().contains("submission failed"));
    }

    #[test]
    fn test_plan_without_network() {
        let plan = settings("REG12345", "SELECT odd", "SELECT even")
            .plan()
            .unwrap();
        assert_eq!(
            plan,
            RunPlan {
                parity: Parity::Odd,
                final_query: "SELECT odd".to_string()
            }
        );

        assert!(settings("REG12344", "SELECT odd", "").plan().is_err());
    }
}
