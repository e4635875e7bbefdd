//! JSON 文件水位存储
//!
//! 写入顺序：先写 `<file>.tmp`，再 rename 覆盖；落盘成功后才更新内存副本。

use crate::error::{StorageError, StorageErrorKind};
use crate::models::{STATE_FILE_VERSION, StateFile, StoredNodeState};
use crate::traits::NodeStateStore;
use domain::NodeState;
use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

pub struct JsonFileNodeStateStore {
    path: PathBuf,
    states: Mutex<HashMap<String, NodeState>>,
}

impl JsonFileNodeStateStore {
    /// 打开水位文件；文件不存在时从空状态开始。
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let states = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => decode(&raw)?,
            Err(err) if err.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                return Err(StorageError::new(
                    StorageErrorKind::Io,
                    format!("read {}: {}", path.display(), err),
                ));
            }
        };
        Ok(Self {
            path,
            states: Mutex::new(states),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, states: &HashMap<String, NodeState>) -> Result<(), StorageError> {
        let file = StateFile {
            version: STATE_FILE_VERSION,
            nodes: states
                .iter()
                .map(|(node_id, state)| (node_id.clone(), StoredNodeState::from(*state)))
                .collect::<BTreeMap<_, _>>(),
        };
        let raw = serde_json::to_vec_pretty(&file)?;
        let tmp = tmp_path(&self.path);
        tokio::fs::write(&tmp, raw).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

fn decode(raw: &str) -> Result<HashMap<String, NodeState>, StorageError> {
    let file: StateFile = serde_json::from_str(raw)?;
    if file.version != STATE_FILE_VERSION {
        return Err(StorageError::new(
            StorageErrorKind::Version,
            file.version.to_string(),
        ));
    }
    Ok(file
        .nodes
        .into_iter()
        .map(|(node_id, stored)| (node_id, NodeState::from(stored)))
        .collect())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[async_trait::async_trait]
impl NodeStateStore for JsonFileNodeStateStore {
    async fn load(&self, node_id: &str) -> Result<NodeState, StorageError> {
        let states = self.states.lock().await;
        Ok(states.get(node_id).copied().unwrap_or_default())
    }

    async fn save(&self, node_id: &str, state: NodeState) -> Result<(), StorageError> {
        let mut states = self.states.lock().await;
        let mut next = states.clone();
        next.insert(node_id.to_string(), state);
        self.persist(&next).await?;
        *states = next;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<(String, NodeState)>, StorageError> {
        let states = self.states.lock().await;
        let mut list = states
            .iter()
            .map(|(node_id, state)| (node_id.clone(), *state))
            .collect::<Vec<_>>();
        list.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(list)
    }
}
