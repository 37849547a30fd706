use crate::domain::model::Solution;
use crate::domain::ports::SolutionStore;
use crate::utils::error::StorageError;
use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

fn new_solution(
    identifier: &str,
    webhook_url: &str,
    final_query: &str,
    created_at: DateTime<Utc>,
) -> Result<Solution, StorageError> {
    if final_query.trim().is_empty() {
        return Err(StorageError::EmptyQuery);
    }

    Ok(Solution {
        id: Uuid::new_v4(),
        identifier: identifier.to_string(),
        webhook_url: webhook_url.to_string(),
        final_query: final_query.to_string(),
        created_at,
    })
}

/// 每筆紀錄一行 JSON，只追加不覆寫
#[derive(Debug, Clone)]
pub struct JsonlSolutionStore {
    path: PathBuf,
}

impl JsonlSolutionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 讀回所有紀錄；檔案不存在時視為空
    ///
    /// 寫入中斷可能留下半行，此時回報該行行號 (從 1 起算)。
    pub fn load_all(&self) -> Result<Vec<Solution>, StorageError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut solutions = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let solution = serde_json::from_str(&line).map_err(|e| StorageError::Corrupt {
                path: self.path.display().to_string(),
                line: index + 1,
                reason: e.to_string(),
            })?;
            solutions.push(solution);
        }
        Ok(solutions)
    }
}

impl SolutionStore for JsonlSolutionStore {
    async fn save(
        &self,
        identifier: &str,
        webhook_url: &str,
        final_query: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Solution, StorageError> {
        let solution = new_solution(identifier, webhook_url, final_query, created_at)?;

        let mut line = serde_json::to_string(&solution)?;
        line.push('\n');

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;

        tracing::debug!("Appended solution {} to {}", solution.id, self.path.display());
        Ok(solution)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemorySolutionStore {
    solutions: Arc<Mutex<Vec<Solution>>>,
}

impl MemorySolutionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn solutions(&self) -> Vec<Solution> {
        self.solutions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SolutionStore for MemorySolutionStore {
    async fn save(
        &self,
        identifier: &str,
        webhook_url: &str,
        final_query: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Solution, StorageError> {
        let solution = new_solution(identifier, webhook_url, final_query, created_at)?;
        self.solutions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(solution.clone());
        Ok(solution)
    }
}
