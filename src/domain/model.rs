use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub name: String,
    #[serde(rename = "regNo")]
    pub identifier: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationResponse {
    pub webhook_url: String,
    pub access_token: String,
}

/// 已持久化的提交紀錄，建立後不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub id: Uuid,
    pub identifier: String,
    pub webhook_url: String,
    pub final_query: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionResult {
    /// webhook 回應內容，格式不固定
    pub raw_response: Option<Map<String, Value>>,
}

impl SubmissionResult {
    /// 把任意 JSON 回應整理成 map；非物件的值放在 `response` 之下
    pub fn from_json(value: Value) -> Self {
        let raw_response = match value {
            Value::Null => None,
            Value::Object(map) => Some(map),
            other => {
                let mut map = Map::new();
                map.insert("response".to_string(), other);
                Some(map)
            }
        };
        Self { raw_response }
    }
}
