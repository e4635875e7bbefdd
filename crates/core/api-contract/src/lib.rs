//! 外部接口的稳定 DTO：遥测 feed、oneM2M content instance、状态接口响应。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 遥测服务 `feeds/last.json` 响应体。
///
/// 只强制 `entry_id` 与 `created_at`，其余键原样保留在 `extra` 中。
#[derive(Debug, Clone, Deserialize)]
pub struct FeedEntry {
    pub entry_id: i64,
    pub created_at: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl FeedEntry {
    /// 提取 `fieldN` 槽位，数值统一转成文本，null 保留为 `None`。
    pub fn field_slots(&self) -> BTreeMap<String, Option<String>> {
        self.extra
            .iter()
            .filter(|(key, _)| is_field_slot(key))
            .map(|(key, value)| {
                let text = match value {
                    Value::Null => None,
                    Value::String(text) => Some(text.clone()),
                    other => Some(other.to_string()),
                };
                (key.clone(), text)
            })
            .collect()
    }
}

fn is_field_slot(key: &str) -> bool {
    match key.strip_prefix("field") {
        Some(index) => !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// oneM2M content instance 请求体：`{"m2m:cin": {...}}`。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentInstanceRequest {
    #[serde(rename = "m2m:cin")]
    pub cin: ContentInstance,
}

/// content instance 本体。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentInstance {
    pub lbl: Vec<String>,
    pub con: String,
}

impl ContentInstanceRequest {
    pub fn new(labels: Vec<String>, content: String) -> Self {
        Self {
            cin: ContentInstance {
                lbl: labels,
                con: content,
            },
        }
    }
}

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 状态接口：桥接进程整体状态。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeStatusDto {
    pub delivery_policy: String,
    pub poll_interval_seconds: u64,
    pub metrics: MetricsSnapshotDto,
    pub nodes: Vec<NodeStatusDto>,
}

/// 单节点水位。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatusDto {
    pub node_id: String,
    pub last_entry_id: Option<i64>,
    pub last_delivered_entry_id: Option<i64>,
}

/// 计数指标快照。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub cycles_started: u64,
    pub cycles_completed: u64,
    pub fetch_success: u64,
    pub fetch_failure: u64,
    pub up_to_date: u64,
    pub transform_failure: u64,
    pub submit_success: u64,
    pub submit_failure: u64,
    pub state_failure: u64,
    pub cycle_latency_ms_total: u64,
    pub cycle_latency_ms_count: u64,
}
