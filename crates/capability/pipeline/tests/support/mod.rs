//! 轮询测试用的脚本化拉取器、记录型提交器与故障存储。

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_ingest::{FetchError, ReadingFetcher};
use bridge_storage::{NodeStateStore, StorageError, StorageErrorKind};
use bridge_submit::{MiddlewareSubmitter, SubmitError};
use domain::{NodeConfig, NodeState, RawReading, SubmissionPayload};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub enum Script {
    Reading(RawReading),
    Status(u16),
}

/// 按 channel_id 返回预设结果，未设置的通道返回 404。
#[derive(Default)]
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn set(&self, channel_id: &str, script: Script) {
        self.scripts
            .lock()
            .expect("lock")
            .insert(channel_id.to_string(), script);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl ReadingFetcher for ScriptedFetcher {
    async fn fetch_last(&self, channel_id: &str, _api_key: &str) -> Result<RawReading, FetchError> {
        self.calls.lock().expect("lock").push(channel_id.to_string());
        let script = self.scripts.lock().expect("lock").get(channel_id).cloned();
        match script {
            Some(Script::Reading(reading)) => Ok(reading),
            Some(Script::Status(status)) => Err(FetchError::Status(status)),
            None => Err(FetchError::Status(404)),
        }
    }
}

/// 记录所有提交；`failing` 中的节点返回 500。
#[derive(Default)]
pub struct RecordingSubmitter {
    submissions: Mutex<Vec<(String, SubmissionPayload)>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingSubmitter {
    pub fn fail_for(&self, node_id: &str, failing: bool) {
        let mut set = self.failing.lock().expect("lock");
        if failing {
            set.insert(node_id.to_string());
        } else {
            set.remove(node_id);
        }
    }

    pub fn submissions(&self) -> Vec<(String, SubmissionPayload)> {
        self.submissions.lock().expect("lock").clone()
    }
}

#[async_trait]
impl MiddlewareSubmitter for RecordingSubmitter {
    async fn submit(
        &self,
        node: &NodeConfig,
        payload: &SubmissionPayload,
    ) -> Result<(), SubmitError> {
        self.submissions
            .lock()
            .expect("lock")
            .push((node.node_id.clone(), payload.clone()));
        if self.failing.lock().expect("lock").contains(&node.node_id) {
            return Err(SubmitError::Status(500));
        }
        Ok(())
    }
}

/// 读写都失败的存储。
pub struct BrokenStore;

#[async_trait]
impl NodeStateStore for BrokenStore {
    async fn load(&self, _node_id: &str) -> Result<NodeState, StorageError> {
        Err(StorageError::new(StorageErrorKind::Io, "disk unavailable"))
    }

    async fn save(&self, _node_id: &str, _state: NodeState) -> Result<(), StorageError> {
        Err(StorageError::new(StorageErrorKind::Io, "disk unavailable"))
    }

    async fn list(&self) -> Result<Vec<(String, NodeState)>, StorageError> {
        Err(StorageError::new(StorageErrorKind::Io, "disk unavailable"))
    }
}

pub fn node(node_id: &str, channel_id: &str) -> NodeConfig {
    NodeConfig::new(
        node_id,
        channel_id,
        format!("key-{}", channel_id),
        format!("http://om2m.local/~/in-cse/in-name/AE-WM-WL/{}/Data", node_id),
        "dev_guest:dev_guest",
    )
}

pub fn reading(entry_id: i64, created_at: &str, water_level: &str, temperature: &str) -> RawReading {
    let mut fields = BTreeMap::new();
    fields.insert("field6".to_string(), Some(water_level.to_string()));
    fields.insert("field7".to_string(), Some(temperature.to_string()));
    RawReading {
        entry_id,
        created_at: created_at.to_string(),
        fields,
    }
}

pub fn good_reading(entry_id: i64) -> Script {
    Script::Reading(reading(entry_id, "2024-06-01T12:00:00Z", "1.5", "26.3"))
}
