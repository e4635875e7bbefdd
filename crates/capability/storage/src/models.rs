//! 水位文件的落盘格式

use domain::NodeState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const STATE_FILE_VERSION: u32 = 1;

/// 水位文件：`{"version": 1, "nodes": {"<node_id>": {...}}}`
#[derive(Debug, Serialize, Deserialize)]
pub struct StateFile {
    pub version: u32,
    #[serde(default)]
    pub nodes: BTreeMap<String, StoredNodeState>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StoredNodeState {
    pub last_entry_id: Option<i64>,
    #[serde(default)]
    pub last_delivered_entry_id: Option<i64>,
}

impl From<NodeState> for StoredNodeState {
    fn from(state: NodeState) -> Self {
        Self {
            last_entry_id: state.last_entry_id,
            last_delivered_entry_id: state.last_delivered_entry_id,
        }
    }
}

impl From<StoredNodeState> for NodeState {
    fn from(stored: StoredNodeState) -> Self {
        Self {
            last_entry_id: stored.last_entry_id,
            last_delivered_entry_id: stored.last_delivered_entry_id,
        }
    }
}
